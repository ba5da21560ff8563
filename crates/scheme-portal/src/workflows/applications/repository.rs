use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationId, ApplicationStatus};
use crate::store::RepositoryError;
use crate::workflows::profiles::CitizenId;

/// Application store contract.
pub trait ApplicationRepository: Send + Sync {
    /// Atomic insert-if-absent on the (citizen id, scheme id) pair; a second
    /// insert for the same pair fails with [`RepositoryError::Conflict`].
    fn insert_if_absent(&self, application: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn for_citizen(&self, citizen_id: &CitizenId) -> Result<Vec<Application>, RepositoryError>;
    fn all(&self) -> Result<Vec<Application>, RepositoryError>;
    /// Update by record id, failing with [`RepositoryError::NotFound`] when
    /// the id is unknown.
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        remarks: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError>;
}
