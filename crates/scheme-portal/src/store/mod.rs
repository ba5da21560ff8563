//! Document-store contracts shared by the workflow repositories, plus the
//! in-memory adapters and the sample scheme catalog.

pub mod memory;
pub mod seed;

use std::sync::{Mutex, MutexGuard};

use crate::error::ErrorKind;

pub use memory::{
    InMemoryApplicationStore, InMemoryEditRequestStore, InMemoryProfileStore,
    InMemorySchemeCatalog,
};
pub use seed::{sample_schemes, seed_catalog};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Insert-if-absent found an existing document for the key.
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    /// Conditional update filter no longer matches the stored document.
    #[error("record changed since it was read")]
    StaleState,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Conflict | RepositoryError::StaleState => ErrorKind::Conflict,
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::Unavailable(_) => ErrorKind::Store,
        }
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
}
