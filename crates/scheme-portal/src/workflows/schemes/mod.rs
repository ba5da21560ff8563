//! Scheme catalog access and the eligibility rule engine.

pub mod criteria;
pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use criteria::{Criterion, EligibilityCriteria};
pub use domain::{Scheme, SchemeId};
pub use evaluation::{
    CoercedField, EligibilityEvaluator, EligibilityReport, EligibleScheme, EvaluationOutcome,
    IneligibleScheme, ELIGIBLE_CONFIDENCE, ELIGIBLE_REASON,
};
pub use repository::SchemeCatalog;
pub use router::{scheme_router, SchemeRoutes};
pub use service::{EligibilityService, SchemeServiceError};
