use chrono::NaiveDate;
use tracing::info;

use super::RepositoryError;
use crate::workflows::schemes::{Criterion, EligibilityCriteria, Scheme, SchemeCatalog, SchemeId};

struct SchemeSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    benefits: &'static str,
    criteria: Vec<Criterion>,
    documents: &'static [&'static str],
    window: ((i32, u32, u32), (i32, u32, u32)),
    income_cert: bool,
    caste_cert: bool,
}

impl SchemeSeed {
    fn into_scheme(self) -> Scheme {
        let ((start_y, start_m, start_d), (end_y, end_m, end_d)) = self.window;
        Scheme {
            id: SchemeId(self.id.to_string()),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category.to_string(),
            benefits: self.benefits.to_string(),
            eligibility_criteria: EligibilityCriteria::new(self.criteria),
            documents_required: self.documents.iter().map(|doc| doc.to_string()).collect(),
            application_start_date: NaiveDate::from_ymd_opt(start_y, start_m, start_d),
            application_end_date: NaiveDate::from_ymd_opt(end_y, end_m, end_d),
            requires_income_cert: self.income_cert,
            requires_caste_cert: self.caste_cert,
        }
    }
}

const CALENDAR_2024_2025: ((i32, u32, u32), (i32, u32, u32)) = ((2024, 1, 1), (2025, 12, 31));

/// The central welfare schemes the portal ships with.
pub fn sample_schemes() -> Vec<Scheme> {
    vec![
        SchemeSeed {
            id: "PM_KISAN",
            name: "PM-KISAN (Pradhan Mantri Kisan Samman Nidhi)",
            description: "Financial assistance of Rs. 6000 per year to farmer families",
            category: "Agriculture",
            benefits: "Rs. 6000 per year in three equal installments",
            criteria: vec![Criterion::MinAge(18), Criterion::MaxIncome(200_000)],
            documents: &["Aadhaar Card", "Land Records", "Bank Account"],
            window: CALENDAR_2024_2025,
            income_cert: true,
            caste_cert: false,
        },
        SchemeSeed {
            id: "SCHOLARSHIP_SC_ST",
            name: "Post Matric Scholarship for SC/ST Students",
            description: "Financial assistance for SC/ST students pursuing higher education",
            category: "Education",
            benefits: "Up to Rs. 50,000 per year for education expenses",
            criteria: vec![
                Criterion::MinAge(16),
                Criterion::MaxAge(35),
                Criterion::allowed_caste(["SC", "ST"]),
                Criterion::MaxIncome(250_000),
            ],
            documents: &[
                "Aadhaar Card",
                "Caste Certificate",
                "Income Certificate",
                "Admission Proof",
            ],
            window: ((2024, 6, 1), (2025, 8, 31)),
            income_cert: true,
            caste_cert: true,
        },
        SchemeSeed {
            id: "UJJWALA_YOJANA",
            name: "Pradhan Mantri Ujjwala Yojana",
            description: "Free LPG connections to women from Below Poverty Line (BPL) households",
            category: "Welfare",
            benefits: "Free LPG connection",
            criteria: vec![Criterion::gender("female"), Criterion::MaxIncome(100_000)],
            documents: &["Aadhaar Card", "BPL Card", "Address Proof"],
            window: CALENDAR_2024_2025,
            income_cert: true,
            caste_cert: false,
        },
        SchemeSeed {
            id: "AYUSHMAN_BHARAT",
            name: "Ayushman Bharat - Pradhan Mantri Jan Arogya Yojana",
            description: "Health insurance coverage of Rs. 5 lakh per family per year",
            category: "Health",
            benefits: "Rs. 5 lakh health insurance coverage",
            criteria: vec![Criterion::MaxIncome(300_000)],
            documents: &["Aadhaar Card", "Income Certificate", "Ration Card"],
            window: CALENDAR_2024_2025,
            income_cert: true,
            caste_cert: false,
        },
        SchemeSeed {
            id: "MUDRA_LOAN",
            name: "Pradhan Mantri MUDRA Yojana",
            description: "Loans up to Rs. 10 lakh for small businesses",
            category: "Business",
            benefits: "Loans from Rs. 50,000 to Rs. 10 lakh",
            criteria: vec![Criterion::MinAge(18), Criterion::MaxIncome(500_000)],
            documents: &["Aadhaar Card", "Business Plan", "Bank Statements"],
            window: CALENDAR_2024_2025,
            income_cert: false,
            caste_cert: false,
        },
        SchemeSeed {
            id: "WIDOW_PENSION",
            name: "Widow Pension Scheme",
            description: "Monthly pension for widows",
            category: "Social Security",
            benefits: "Rs. 1000 per month",
            criteria: vec![
                Criterion::gender("female"),
                Criterion::MinAge(40),
                Criterion::MaxIncome(150_000),
            ],
            documents: &[
                "Aadhaar Card",
                "Husband Death Certificate",
                "Income Certificate",
            ],
            window: CALENDAR_2024_2025,
            income_cert: true,
            caste_cert: false,
        },
        SchemeSeed {
            id: "OLD_AGE_PENSION",
            name: "National Old Age Pension Scheme",
            description: "Monthly pension for senior citizens",
            category: "Social Security",
            benefits: "Rs. 500-2000 per month based on age",
            criteria: vec![Criterion::MinAge(60), Criterion::MaxIncome(200_000)],
            documents: &["Aadhaar Card", "Age Proof", "Income Certificate"],
            window: CALENDAR_2024_2025,
            income_cert: true,
            caste_cert: false,
        },
    ]
    .into_iter()
    .map(SchemeSeed::into_scheme)
    .collect()
}

/// Load [`sample_schemes`] into an empty catalog. A catalog that already has
/// entries is left alone. Returns the number of schemes inserted.
pub fn seed_catalog<C: SchemeCatalog + ?Sized>(catalog: &C) -> Result<usize, RepositoryError> {
    if !catalog.list()?.is_empty() {
        return Ok(0);
    }

    let mut inserted = 0;
    for scheme in sample_schemes() {
        match catalog.insert(scheme) {
            Ok(_) => inserted += 1,
            Err(RepositoryError::Conflict) => {}
            Err(err) => return Err(err),
        }
    }
    info!(schemes = inserted, "seeded scheme catalog");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySchemeCatalog;

    #[test]
    fn sample_catalog_has_unique_ids_and_valid_windows() {
        let schemes = sample_schemes();
        assert_eq!(schemes.len(), 7);

        let mut ids: Vec<_> = schemes.iter().map(|scheme| scheme.id.0.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 7);

        for scheme in &schemes {
            let start = scheme.application_start_date.expect("start date");
            let end = scheme.application_end_date.expect("end date");
            assert!(start <= end, "{} window inverted", scheme.id);
            assert!(!scheme.eligibility_criteria.is_unconstrained());
        }
    }

    #[test]
    fn seeding_only_fills_an_empty_catalog() {
        let catalog = InMemorySchemeCatalog::default();
        assert_eq!(seed_catalog(&catalog).expect("seed"), 7);
        assert_eq!(seed_catalog(&catalog).expect("reseed"), 0);
        assert_eq!(catalog.list().expect("list").len(), 7);
    }
}
