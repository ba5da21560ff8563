use chrono::{DateTime, Utc};

use super::changes::ProfileChanges;
use super::domain::{ApplicantProfile, CitizenId};
use crate::store::RepositoryError;

/// Profile store contract. There is no general update: profiles
/// change only through an approved edit request.
pub trait ProfileRepository: Send + Sync {
    /// Insert-if-absent keyed on citizen id.
    fn insert(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError>;
    fn fetch(&self, citizen_id: &CitizenId) -> Result<Option<ApplicantProfile>, RepositoryError>;
    /// Merge an approved change set into the stored profile in one write.
    fn apply_changes(
        &self,
        citizen_id: &CitizenId,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError>;
}
