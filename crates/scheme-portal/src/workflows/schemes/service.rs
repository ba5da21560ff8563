use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::domain::{Scheme, SchemeId};
use super::evaluation::{EligibilityEvaluator, EligibilityReport};
use super::repository::SchemeCatalog;
use crate::error::{error_response, ErrorKind};
use crate::store::RepositoryError;
use crate::workflows::profiles::{CitizenId, ProfileRepository};

/// Service composing the catalog, the profile store, and the evaluator.
pub struct EligibilityService<C, P> {
    catalog: Arc<C>,
    profiles: Arc<P>,
    evaluator: EligibilityEvaluator,
}

impl<C, P> EligibilityService<C, P>
where
    C: SchemeCatalog + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(catalog: Arc<C>, profiles: Arc<P>) -> Self {
        Self {
            catalog,
            profiles,
            evaluator: EligibilityEvaluator::new(),
        }
    }

    pub fn catalog(&self) -> Result<Vec<Scheme>, SchemeServiceError> {
        Ok(self.catalog.list()?)
    }

    pub fn scheme(&self, id: &SchemeId) -> Result<Scheme, SchemeServiceError> {
        self.catalog
            .fetch(id)?
            .ok_or_else(|| SchemeServiceError::UnknownScheme(id.clone()))
    }

    /// Evaluate the citizen's stored profile against every catalog scheme.
    pub fn eligibility_for(
        &self,
        citizen_id: &CitizenId,
        today: NaiveDate,
    ) -> Result<EligibilityReport, SchemeServiceError> {
        let profile = self
            .profiles
            .fetch(citizen_id)?
            .ok_or_else(|| SchemeServiceError::UnknownProfile(citizen_id.clone()))?;
        let schemes = self.catalog.list()?;

        let report = self.evaluator.evaluate_all(&profile, &schemes, today);

        if !report.coerced_fields.is_empty() {
            warn!(
                citizen = %citizen_id,
                fields = ?report.coerced_fields,
                "non-numeric profile fields evaluated as zero"
            );
        }
        debug!(
            citizen = %citizen_id,
            total = report.total_schemes,
            eligible = report.eligible_count,
            "eligibility evaluated"
        );

        Ok(report)
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum SchemeServiceError {
    #[error("scheme '{0}' not found")]
    UnknownScheme(SchemeId),
    #[error("profile for citizen '{0}' not found")]
    UnknownProfile(CitizenId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SchemeServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemeServiceError::UnknownScheme(_) | SchemeServiceError::UnknownProfile(_) => {
                ErrorKind::NotFound
            }
            SchemeServiceError::Repository(err) => err.kind(),
        }
    }
}

impl IntoResponse for SchemeServiceError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}
