use chrono::{DateTime, Utc};

use super::domain::{EditRequest, EditRequestId, EditRequestStatus};
use crate::store::RepositoryError;
use crate::workflows::profiles::CitizenId;

/// Edit-request store contract.
pub trait EditRequestRepository: Send + Sync {
    /// Insert-if-absent keyed on record id.
    fn insert(&self, request: EditRequest) -> Result<EditRequest, RepositoryError>;
    fn fetch(&self, id: &EditRequestId) -> Result<Option<EditRequest>, RepositoryError>;
    fn for_citizen(&self, citizen_id: &CitizenId) -> Result<Vec<EditRequest>, RepositoryError>;
    fn all(&self) -> Result<Vec<EditRequest>, RepositoryError>;
    /// Conditional update: move the request to `next` only while its stored
    /// status is still `expected`, otherwise fail with
    /// [`RepositoryError::StaleState`].
    fn transition(
        &self,
        id: &EditRequestId,
        expected: EditRequestStatus,
        next: EditRequestStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<EditRequest, RepositoryError>;
}
