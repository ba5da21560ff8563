use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{lock, RepositoryError};
use crate::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus,
};
use crate::workflows::edit_requests::{
    EditRequest, EditRequestId, EditRequestRepository, EditRequestStatus,
};
use crate::workflows::profiles::{ApplicantProfile, CitizenId, ProfileChanges, ProfileRepository};
use crate::workflows::schemes::{Scheme, SchemeCatalog, SchemeId};

/// Scheme catalog kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySchemeCatalog {
    schemes: Mutex<Vec<Scheme>>,
}

impl SchemeCatalog for InMemorySchemeCatalog {
    fn list(&self) -> Result<Vec<Scheme>, RepositoryError> {
        Ok(lock(&self.schemes)?.clone())
    }

    fn fetch(&self, id: &SchemeId) -> Result<Option<Scheme>, RepositoryError> {
        Ok(lock(&self.schemes)?
            .iter()
            .find(|scheme| &scheme.id == id)
            .cloned())
    }

    fn insert(&self, scheme: Scheme) -> Result<Scheme, RepositoryError> {
        let mut guard = lock(&self.schemes)?;
        if guard.iter().any(|existing| existing.id == scheme.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(scheme.clone());
        Ok(scheme)
    }

    fn remove(&self, id: &SchemeId) -> Result<Scheme, RepositoryError> {
        let mut guard = lock(&self.schemes)?;
        let position = guard
            .iter()
            .position(|scheme| &scheme.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(guard.remove(position))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<CitizenId, ApplicantProfile>>,
}

impl ProfileRepository for InMemoryProfileStore {
    fn insert(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError> {
        let mut guard = lock(&self.profiles)?;
        if guard.contains_key(&profile.citizen_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.citizen_id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch(&self, citizen_id: &CitizenId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        Ok(lock(&self.profiles)?.get(citizen_id).cloned())
    }

    fn apply_changes(
        &self,
        citizen_id: &CitizenId,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError> {
        let mut guard = lock(&self.profiles)?;
        let profile = guard.get_mut(citizen_id).ok_or(RepositoryError::NotFound)?;
        changes.apply_to(profile, at);
        Ok(profile.clone())
    }
}

#[derive(Debug, Default)]
struct ApplicationTable {
    rows: Vec<Application>,
    by_id: HashMap<ApplicationId, usize>,
    by_pair: HashMap<(CitizenId, SchemeId), usize>,
}

/// Application store with a unique (citizen id, scheme id) index. The
/// existence check and the insert share one lock.
#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    table: Mutex<ApplicationTable>,
}

impl ApplicationRepository for InMemoryApplicationStore {
    fn insert_if_absent(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut table = lock(&self.table)?;
        let pair = (
            application.citizen_id.clone(),
            application.scheme_id.clone(),
        );
        if table.by_pair.contains_key(&pair) || table.by_id.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }

        let index = table.rows.len();
        table.by_id.insert(application.id.clone(), index);
        table.by_pair.insert(pair, index);
        table.rows.push(application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.by_id.get(id).map(|&index| table.rows[index].clone()))
    }

    fn for_citizen(&self, citizen_id: &CitizenId) -> Result<Vec<Application>, RepositoryError> {
        Ok(lock(&self.table)?
            .rows
            .iter()
            .filter(|application| &application.citizen_id == citizen_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(lock(&self.table)?.rows.clone())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        remarks: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let mut table = lock(&self.table)?;
        let index = *table.by_id.get(id).ok_or(RepositoryError::NotFound)?;
        let application = &mut table.rows[index];
        application.status = status;
        if remarks.is_some() {
            application.remarks = remarks;
        }
        application.updated_at = Some(at);
        Ok(application.clone())
    }
}

#[derive(Debug, Default)]
struct EditRequestTable {
    rows: Vec<EditRequest>,
    by_id: HashMap<EditRequestId, usize>,
}

/// Edit-request store. `transition` compares and swaps the status under one
/// lock.
#[derive(Debug, Default)]
pub struct InMemoryEditRequestStore {
    table: Mutex<EditRequestTable>,
}

impl EditRequestRepository for InMemoryEditRequestStore {
    fn insert(&self, request: EditRequest) -> Result<EditRequest, RepositoryError> {
        let mut table = lock(&self.table)?;
        if table.by_id.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        let index = table.rows.len();
        table.by_id.insert(request.id.clone(), index);
        table.rows.push(request.clone());
        Ok(request)
    }

    fn fetch(&self, id: &EditRequestId) -> Result<Option<EditRequest>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.by_id.get(id).map(|&index| table.rows[index].clone()))
    }

    fn for_citizen(&self, citizen_id: &CitizenId) -> Result<Vec<EditRequest>, RepositoryError> {
        Ok(lock(&self.table)?
            .rows
            .iter()
            .filter(|request| &request.citizen_id == citizen_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<EditRequest>, RepositoryError> {
        Ok(lock(&self.table)?.rows.clone())
    }

    fn transition(
        &self,
        id: &EditRequestId,
        expected: EditRequestStatus,
        next: EditRequestStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<EditRequest, RepositoryError> {
        let mut table = lock(&self.table)?;
        let index = *table.by_id.get(id).ok_or(RepositoryError::NotFound)?;
        let request = &mut table.rows[index];
        if request.status != expected {
            return Err(RepositoryError::StaleState);
        }
        request.status = next;
        request.resolved_at = resolved_at;
        Ok(request.clone())
    }
}
