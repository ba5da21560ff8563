use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflows::profiles::CitizenId;

/// Identifier wrapper for edit requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditRequestId(pub String);

impl fmt::Display for EditRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Edit-request state. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl EditRequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            EditRequestStatus::Pending => "pending",
            EditRequestStatus::Approved => "approved",
            EditRequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, EditRequestStatus::Pending)
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> EditRequestStatus {
        match self {
            Decision::Approve => EditRequestStatus::Approved,
            Decision::Reject => EditRequestStatus::Rejected,
        }
    }
}

/// Citizen-proposed profile change awaiting (or past) admin resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub id: EditRequestId,
    pub citizen_id: CitizenId,
    pub requested_changes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: EditRequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /api/edit-request`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditRequestSubmission {
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for the admin resolution endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub action: Decision,
}
