use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::criteria::EligibilityCriteria;

/// Identifier wrapper for catalog schemes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeId(pub String);

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Benefit program published in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: SchemeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub benefits: String,
    #[serde(default)]
    pub eligibility_criteria: EligibilityCriteria,
    #[serde(default)]
    pub documents_required: Vec<String>,
    #[serde(default)]
    pub application_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub application_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub requires_income_cert: bool,
    #[serde(default)]
    pub requires_caste_cert: bool,
}

impl Scheme {
    /// Whether `today` falls inside the validity window. Open-ended bounds
    /// are unrestricted.
    pub fn accepting_applications(&self, today: NaiveDate) -> bool {
        let started = self
            .application_start_date
            .map(|start| start <= today)
            .unwrap_or(true);
        let not_ended = self
            .application_end_date
            .map(|end| today <= end)
            .unwrap_or(true);
        started && not_ended
    }
}
