use super::domain::{Scheme, SchemeId};
use crate::store::RepositoryError;

/// Read-mostly scheme catalog, unique on scheme id.
pub trait SchemeCatalog: Send + Sync {
    /// All schemes in catalog order.
    fn list(&self) -> Result<Vec<Scheme>, RepositoryError>;
    fn fetch(&self, id: &SchemeId) -> Result<Option<Scheme>, RepositoryError>;
    /// Insert-if-absent keyed on scheme id.
    fn insert(&self, scheme: Scheme) -> Result<Scheme, RepositoryError>;
    fn remove(&self, id: &SchemeId) -> Result<Scheme, RepositoryError>;
}
