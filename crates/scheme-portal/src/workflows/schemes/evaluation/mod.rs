mod rules;

pub use rules::CoercedField;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Scheme, SchemeId};
use crate::workflows::profiles::ApplicantProfile;
use rules::ApplicantFacts;

/// Confidence reported when every declared criterion passes.
pub const ELIGIBLE_CONFIDENCE: f64 = 0.95;
pub const ELIGIBLE_REASON: &str = "Eligible";

/// Stateless rule engine. Criteria are checked in a fixed order and the first
/// failure decides the outcome, so every verdict names exactly one rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, profile: &ApplicantProfile, scheme: &Scheme) -> EvaluationOutcome {
        let facts = ApplicantFacts::from_profile(profile);
        self.evaluate_facts(&facts, scheme)
    }

    fn evaluate_facts(&self, facts: &ApplicantFacts, scheme: &Scheme) -> EvaluationOutcome {
        let failure = scheme
            .eligibility_criteria
            .rules()
            .iter()
            .find_map(|criterion| rules::check(criterion, facts));

        match failure {
            Some(failure) => EvaluationOutcome {
                eligible: false,
                confidence: failure.confidence,
                reason: failure.reason.to_string(),
                failed_rule: Some(failure.rule.to_string()),
                coerced_fields: facts.coerced.clone(),
            },
            None => EvaluationOutcome {
                eligible: true,
                confidence: ELIGIBLE_CONFIDENCE,
                reason: ELIGIBLE_REASON.to_string(),
                failed_rule: None,
                coerced_fields: facts.coerced.clone(),
            },
        }
    }

    /// Score one profile against the whole catalog, preserving catalog order.
    pub fn evaluate_all(
        &self,
        profile: &ApplicantProfile,
        schemes: &[Scheme],
        today: NaiveDate,
    ) -> EligibilityReport {
        let facts = ApplicantFacts::from_profile(profile);
        let mut eligible_schemes = Vec::new();
        let mut ineligible_schemes = Vec::new();

        for scheme in schemes {
            let outcome = self.evaluate_facts(&facts, scheme);
            if outcome.eligible {
                eligible_schemes.push(EligibleScheme {
                    scheme: scheme.clone(),
                    eligibility_confidence: outcome.confidence,
                    eligibility_reason: outcome.reason,
                    accepting_applications: scheme.accepting_applications(today),
                });
            } else {
                ineligible_schemes.push(IneligibleScheme {
                    scheme_id: scheme.id.clone(),
                    name: scheme.name.clone(),
                    confidence: outcome.confidence,
                    reason: outcome.reason,
                });
            }
        }

        EligibilityReport {
            total_schemes: schemes.len(),
            eligible_count: eligible_schemes.len(),
            eligible_schemes,
            ineligible_schemes,
            coerced_fields: facts.coerced,
        }
    }
}

/// Verdict for one (profile, scheme) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub eligible: bool,
    pub confidence: f64,
    pub reason: String,
    /// Criterion key that decided an ineligible verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_rule: Option<String>,
    /// Profile fields that compared as zero because they were not numbers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coerced_fields: Vec<CoercedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibleScheme {
    #[serde(flatten)]
    pub scheme: Scheme,
    pub eligibility_confidence: f64,
    pub eligibility_reason: String,
    pub accepting_applications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IneligibleScheme {
    pub scheme_id: SchemeId,
    pub name: String,
    pub confidence: f64,
    pub reason: String,
}

/// Catalog-wide eligibility summary for one applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    pub total_schemes: usize,
    pub eligible_count: usize,
    pub eligible_schemes: Vec<EligibleScheme>,
    pub ineligible_schemes: Vec<IneligibleScheme>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coerced_fields: Vec<CoercedField>,
}
