use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::profiles::CitizenId;
use crate::workflows::schemes::SchemeId;

/// Identifier wrapper for scheme applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Admin-controlled application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Statuses an administrator may set. Accepts either the status itself
    /// or the console's approve/reject verbs.
    pub fn from_admin_input(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" | "approve" => Some(ApplicationStatus::Approved),
            "rejected" | "reject" => Some(ApplicationStatus::Rejected),
            "pending" => Some(ApplicationStatus::Pending),
            _ => None,
        }
    }
}

/// A citizen's enrollment request for one scheme. Holds only references to
/// the citizen and the scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub citizen_id: CitizenId,
    pub scheme_id: SchemeId,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /api/applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    #[serde(default)]
    pub scheme_id: String,
}

/// Request body for the admin status update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl StatusUpdate {
    pub fn requested(&self) -> Option<&str> {
        self.status.as_deref().or(self.action.as_deref())
    }
}
