use serde::{Deserialize, Serialize};

use super::super::criteria::Criterion;
use crate::workflows::profiles::ApplicantProfile;

/// Profile attribute that was missing or non-numeric and compared as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercedField {
    Income,
    Age,
}

/// Normalized view of the profile attributes the rules read.
pub(crate) struct ApplicantFacts {
    pub income: i64,
    pub age: i64,
    pub caste: String,
    pub gender: String,
    pub coerced: Vec<CoercedField>,
}

impl ApplicantFacts {
    pub fn from_profile(profile: &ApplicantProfile) -> Self {
        let mut coerced = Vec::new();
        if profile.income.is_coerced() {
            coerced.push(CoercedField::Income);
        }
        if profile.age.is_coerced() {
            coerced.push(CoercedField::Age);
        }

        Self {
            income: profile.income.or_zero(),
            age: profile.age.or_zero(),
            caste: profile
                .caste
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_ascii_uppercase(),
            gender: profile
                .gender
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase(),
            coerced,
        }
    }
}

/// Fixed verdict attached to the first rule an applicant fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RuleFailure {
    pub rule: &'static str,
    pub confidence: f64,
    pub reason: &'static str,
}

pub(crate) fn check(criterion: &Criterion, facts: &ApplicantFacts) -> Option<RuleFailure> {
    let failed = match criterion {
        Criterion::MaxIncome(limit) => facts.income > *limit,
        Criterion::MinIncome(floor) => facts.income < *floor,
        Criterion::MinAge(min) => facts.age < *min,
        Criterion::MaxAge(max) => facts.age > *max,
        Criterion::AllowedCaste(allowed) => !allowed.contains(&facts.caste),
        Criterion::Gender(gender) => facts.gender != *gender,
    };

    failed.then(|| failure_for(criterion))
}

fn failure_for(criterion: &Criterion) -> RuleFailure {
    let (confidence, reason) = match criterion {
        Criterion::MaxIncome(_) => (0.8, "Income exceeds limit"),
        Criterion::MinIncome(_) => (0.8, "Income below minimum"),
        Criterion::MinAge(_) => (0.7, "Below minimum age"),
        Criterion::MaxAge(_) => (0.7, "Above maximum age"),
        Criterion::AllowedCaste(_) => (0.9, "Caste not eligible"),
        Criterion::Gender(_) => (0.9, "Gender not eligible"),
    };

    RuleFailure {
        rule: criterion.key(),
        confidence,
        reason,
    }
}
