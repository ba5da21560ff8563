//! Applicant profiles and the validated change sets that may be merged into
//! them.

pub mod changes;
pub mod domain;
pub mod repository;

pub use changes::{ChangeSetError, ProfileChanges, ProfileField};
pub use domain::{ApplicantProfile, CitizenId, DeclaredNumber, ProfileRole};
pub use repository::ProfileRepository;
