//! Scheme application intake and the admin-driven status lifecycle.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, StatusUpdate,
};
pub use repository::ApplicationRepository;
pub use router::{application_router, ApplicationRoutes};
pub use service::{ApplicationService, ApplicationServiceError};
