use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::info;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, StatusUpdate,
};
use super::repository::ApplicationRepository;
use crate::error::{error_response, ErrorKind};
use crate::store::RepositoryError;
use crate::workflows::profiles::CitizenId;
use crate::workflows::schemes::{SchemeCatalog, SchemeId};

/// Service guarding application creation and admin status changes.
pub struct ApplicationService<R, C> {
    repository: Arc<R>,
    catalog: Arc<C>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, C> ApplicationService<R, C>
where
    R: ApplicationRepository + 'static,
    C: SchemeCatalog + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Create a pending application for `citizen_id`. The repository's
    /// insert-if-absent closes the race between concurrent duplicate
    /// submissions.
    pub fn submit(
        &self,
        citizen_id: &CitizenId,
        submission: ApplicationSubmission,
    ) -> Result<Application, ApplicationServiceError> {
        let scheme_id = submission.scheme_id.trim();
        if scheme_id.is_empty() {
            return Err(ApplicationServiceError::MissingScheme);
        }
        let scheme_id = SchemeId(scheme_id.to_string());

        if self.catalog.fetch(&scheme_id)?.is_none() {
            return Err(ApplicationServiceError::InvalidScheme(scheme_id));
        }

        let application = Application {
            id: next_application_id(),
            citizen_id: citizen_id.clone(),
            scheme_id: scheme_id.clone(),
            status: ApplicationStatus::Pending,
            remarks: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let stored = self
            .repository
            .insert_if_absent(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationServiceError::DuplicateApplication(scheme_id.clone())
                }
                other => ApplicationServiceError::Repository(other),
            })?;

        info!(
            application = %stored.id,
            citizen = %stored.citizen_id,
            scheme = %stored.scheme_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Applications owned by `citizen_id`, oldest first.
    pub fn list(&self, citizen_id: &CitizenId) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.repository.for_citizen(citizen_id)?)
    }

    pub fn list_all(&self) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.repository.all()?)
    }

    /// Admin status change. Only stamps the update; nothing cascades.
    ///
    /// An unknown id is reported before the requested status is validated.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        update: StatusUpdate,
    ) -> Result<Application, ApplicationServiceError> {
        if self.repository.fetch(application_id)?.is_none() {
            return Err(ApplicationServiceError::NotFound(application_id.clone()));
        }

        let requested = update.requested().unwrap_or_default();
        let status = ApplicationStatus::from_admin_input(requested)
            .ok_or_else(|| ApplicationServiceError::InvalidStatus(requested.to_string()))?;

        let remarks = update
            .remarks
            .map(|remarks| remarks.trim().to_string())
            .filter(|remarks| !remarks.is_empty());

        let updated = self
            .repository
            .update_status(application_id, status, remarks, Utc::now())
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    ApplicationServiceError::NotFound(application_id.clone())
                }
                other => ApplicationServiceError::Repository(other),
            })?;

        info!(
            application = %updated.id,
            status = updated.status.label(),
            "application status updated"
        );
        Ok(updated)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("scheme_id is required")]
    MissingScheme,
    #[error("scheme '{0}' does not exist")]
    InvalidScheme(SchemeId),
    #[error("an application for scheme '{0}' already exists")]
    DuplicateApplication(SchemeId),
    #[error("application '{0}' not found")]
    NotFound(ApplicationId),
    #[error("status '{0}' must be one of approved, rejected, pending")]
    InvalidStatus(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationServiceError::MissingScheme | ApplicationServiceError::InvalidStatus(_) => {
                ErrorKind::Validation
            }
            ApplicationServiceError::InvalidScheme(_) | ApplicationServiceError::NotFound(_) => {
                ErrorKind::NotFound
            }
            ApplicationServiceError::DuplicateApplication(_) => ErrorKind::Conflict,
            ApplicationServiceError::Repository(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApplicationServiceError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}
