use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};

use super::domain::{
    Decision, EditRequest, EditRequestId, EditRequestStatus, EditRequestSubmission,
};
use super::repository::EditRequestRepository;
use crate::auth::Identity;
use crate::error::{error_response, ErrorKind};
use crate::store::RepositoryError;
use crate::workflows::profiles::{
    ApplicantProfile, ChangeSetError, CitizenId, ProfileChanges, ProfileRepository,
};

/// Service running the edit-request state machine and the profile write it
/// guards.
pub struct EditRequestService<E, P> {
    requests: Arc<E>,
    profiles: Arc<P>,
}

static EDIT_REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_edit_request_id() -> EditRequestId {
    let id = EDIT_REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EditRequestId(format!("edit-{id:06}"))
}

impl<E, P> EditRequestService<E, P>
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(requests: Arc<E>, profiles: Arc<P>) -> Self {
        Self { requests, profiles }
    }

    /// The caller's stored profile.
    pub fn profile(&self, citizen_id: &CitizenId) -> Result<ApplicantProfile, EditRequestError> {
        self.profiles
            .fetch(citizen_id)?
            .ok_or_else(|| EditRequestError::ProfileNotFound(citizen_id.clone()))
    }

    /// Record a pending change proposal after validating the change set.
    pub fn create(
        &self,
        citizen_id: &CitizenId,
        submission: EditRequestSubmission,
    ) -> Result<EditRequest, EditRequestError> {
        let requested_changes = match submission.changes {
            Some(Value::Object(map)) => map,
            _ => return Err(ChangeSetError::Empty.into()),
        };
        ProfileChanges::parse(&requested_changes)?;

        if self.profiles.fetch(citizen_id)?.is_none() {
            return Err(EditRequestError::ProfileNotFound(citizen_id.clone()));
        }

        let reason = submission
            .reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());

        let request = EditRequest {
            id: next_edit_request_id(),
            citizen_id: citizen_id.clone(),
            requested_changes,
            reason,
            status: EditRequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };

        let stored = self.requests.insert(request)?;
        info!(request = %stored.id, citizen = %stored.citizen_id, "edit request submitted");
        Ok(stored)
    }

    /// Citizens see their own requests; administrators see every request.
    pub fn list(&self, identity: &Identity) -> Result<Vec<EditRequest>, EditRequestError> {
        if identity.is_admin() {
            Ok(self.requests.all()?)
        } else {
            let citizen_id = CitizenId(identity.key.clone());
            Ok(self.requests.for_citizen(&citizen_id)?)
        }
    }

    /// Resolve a pending request exactly once.
    ///
    /// The status change is claimed first through a conditional update on
    /// `pending`, so only one concurrent caller can proceed. An approval then
    /// writes the profile; if that write fails the claim is rolled back to
    /// `pending` before the error is returned.
    pub fn resolve(
        &self,
        id: &EditRequestId,
        decision: Decision,
    ) -> Result<EditRequest, EditRequestError> {
        let current = self
            .requests
            .fetch(id)?
            .ok_or_else(|| EditRequestError::NotFound(id.clone()))?;
        if current.status.is_terminal() {
            warn!(request = %id, status = current.status.label(), "edit request already resolved");
            return Err(EditRequestError::AlreadyProcessed(id.clone()));
        }

        let changes = match decision {
            Decision::Approve => Some(ProfileChanges::parse(&current.requested_changes)?),
            Decision::Reject => None,
        };

        let resolved_at = Utc::now();
        let claimed = self
            .requests
            .transition(
                id,
                EditRequestStatus::Pending,
                decision.target_status(),
                Some(resolved_at),
            )
            .map_err(|err| match err {
                RepositoryError::StaleState => EditRequestError::AlreadyProcessed(id.clone()),
                RepositoryError::NotFound => EditRequestError::NotFound(id.clone()),
                other => EditRequestError::Repository(other),
            })?;

        if let Some(changes) = changes {
            if let Err(err) = self
                .profiles
                .apply_changes(&claimed.citizen_id, &changes, resolved_at)
            {
                self.release_claim(id);
                return Err(match err {
                    RepositoryError::NotFound => {
                        EditRequestError::ProfileNotFound(claimed.citizen_id.clone())
                    }
                    other => EditRequestError::Repository(other),
                });
            }
            info!(
                request = %id,
                citizen = %claimed.citizen_id,
                fields = ?changes.touched_keys(),
                unfrozen = changes.unfreezes(),
                "edit request approved and profile updated"
            );
        } else {
            info!(request = %id, citizen = %claimed.citizen_id, "edit request rejected");
        }

        Ok(claimed)
    }

    fn release_claim(&self, id: &EditRequestId) {
        if let Err(err) = self.requests.transition(
            id,
            EditRequestStatus::Approved,
            EditRequestStatus::Pending,
            None,
        ) {
            error!(
                request = %id,
                error = %err,
                "failed to roll back approval after profile write failure"
            );
        } else {
            warn!(request = %id, "approval rolled back to pending after profile write failure");
        }
    }
}

/// Error raised by the edit-request service.
#[derive(Debug, thiserror::Error)]
pub enum EditRequestError {
    #[error(transparent)]
    InvalidChanges(#[from] ChangeSetError),
    #[error("edit request '{0}' not found")]
    NotFound(EditRequestId),
    #[error("edit request '{0}' has already been processed")]
    AlreadyProcessed(EditRequestId),
    #[error("profile for citizen '{0}' not found")]
    ProfileNotFound(CitizenId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EditRequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditRequestError::InvalidChanges(_) => ErrorKind::Validation,
            EditRequestError::NotFound(_) | EditRequestError::ProfileNotFound(_) => {
                ErrorKind::NotFound
            }
            EditRequestError::AlreadyProcessed(_) => ErrorKind::Conflict,
            EditRequestError::Repository(err) => err.kind(),
        }
    }
}

impl IntoResponse for EditRequestError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}
