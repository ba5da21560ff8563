//! End-to-end scenarios for the portal core: catalog evaluation, application
//! intake, and edit-request resolution driven through the public services and
//! the in-memory stores, including concurrent admin and citizen actions.

mod common {
    use std::sync::Arc;

    use chrono::Utc;

    use scheme_portal::store::{
        seed_catalog, InMemoryApplicationStore, InMemoryEditRequestStore, InMemoryProfileStore,
        InMemorySchemeCatalog,
    };
    use scheme_portal::workflows::applications::ApplicationService;
    use scheme_portal::workflows::edit_requests::EditRequestService;
    use scheme_portal::workflows::profiles::{
        ApplicantProfile, CitizenId, DeclaredNumber, ProfileRepository,
    };
    use scheme_portal::workflows::schemes::EligibilityService;

    pub(super) struct Portal {
        pub profiles: Arc<InMemoryProfileStore>,
        pub eligibility: EligibilityService<InMemorySchemeCatalog, InMemoryProfileStore>,
        pub applications: Arc<ApplicationService<InMemoryApplicationStore, InMemorySchemeCatalog>>,
        pub edits: Arc<EditRequestService<InMemoryEditRequestStore, InMemoryProfileStore>>,
        pub application_store: Arc<InMemoryApplicationStore>,
    }

    pub(super) fn portal() -> Portal {
        let catalog = Arc::new(InMemorySchemeCatalog::default());
        seed_catalog(catalog.as_ref()).expect("seed catalog");
        let profiles = Arc::new(InMemoryProfileStore::default());
        let application_store = Arc::new(InMemoryApplicationStore::default());

        Portal {
            eligibility: EligibilityService::new(Arc::clone(&catalog), Arc::clone(&profiles)),
            applications: Arc::new(ApplicationService::new(
                Arc::clone(&application_store),
                Arc::clone(&catalog),
            )),
            edits: Arc::new(EditRequestService::new(
                Arc::new(InMemoryEditRequestStore::default()),
                Arc::clone(&profiles),
            )),
            profiles,
            application_store,
        }
    }

    pub(super) fn register(
        portal: &Portal,
        citizen: &str,
        income: i64,
        age: i64,
        gender: &str,
        caste: &str,
    ) -> CitizenId {
        let citizen_id = CitizenId(citizen.to_string());
        let mut profile = ApplicantProfile::register(citizen_id.clone(), Utc::now());
        profile.income = DeclaredNumber::from(income);
        profile.age = DeclaredNumber::from(age);
        profile.gender = Some(gender.to_string());
        profile.caste = Some(caste.to_string());
        portal.profiles.insert(profile).expect("register profile");
        citizen_id
    }
}

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveDate;
use serde_json::json;

use common::*;
use scheme_portal::error::ErrorKind;
use scheme_portal::workflows::applications::{ApplicationRepository, ApplicationSubmission};
use scheme_portal::workflows::edit_requests::{
    Decision, EditRequestError, EditRequestStatus, EditRequestSubmission,
};
use scheme_portal::workflows::profiles::ProfileRepository;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date")
}

#[test]
fn young_sc_student_is_matched_against_seeded_catalog() {
    let portal = portal();
    let student = register(&portal, "1001", 120_000, 19, "male", "sc");

    let report = portal
        .eligibility
        .eligibility_for(&student, today())
        .expect("report");

    assert_eq!(report.total_schemes, 7);
    let eligible: Vec<_> = report
        .eligible_schemes
        .iter()
        .map(|entry| entry.scheme.id.0.as_str())
        .collect();
    assert_eq!(
        eligible,
        vec!["PM_KISAN", "SCHOLARSHIP_SC_ST", "AYUSHMAN_BHARAT", "MUDRA_LOAN"]
    );
    assert_eq!(report.eligible_count, 4);

    let reasons: Vec<_> = report
        .ineligible_schemes
        .iter()
        .map(|entry| (entry.scheme_id.0.as_str(), entry.reason.as_str()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("UJJWALA_YOJANA", "Income exceeds limit"),
            ("WIDOW_PENSION", "Below minimum age"),
            ("OLD_AGE_PENSION", "Below minimum age"),
        ]
    );
}

#[test]
fn concurrent_duplicate_submissions_store_one_application() {
    let portal = portal();
    let citizen = register(&portal, "2002", 80_000, 45, "female", "GEN");
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let service = Arc::clone(&portal.applications);
            let barrier = Arc::clone(&barrier);
            let citizen = citizen.clone();
            thread::spawn(move || {
                barrier.wait();
                service.submit(
                    &citizen,
                    ApplicationSubmission {
                        scheme_id: "WIDOW_PENSION".to_string(),
                    },
                )
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .collect();
    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(err) if err.kind() == ErrorKind::Conflict))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 5);
    assert_eq!(
        portal
            .application_store
            .for_citizen(&citizen)
            .expect("list")
            .len(),
        1
    );
}

#[test]
fn concurrent_approve_and_reject_resolve_exactly_once() {
    for round in 0..20 {
        let portal = portal();
        let citizen = register(&portal, &format!("30{round:02}"), 50_000, 30, "female", "ST");
        let request = portal
            .edits
            .create(
                &citizen,
                EditRequestSubmission {
                    changes: Some(json!({"email": "new@portal.example", "frozen": false})),
                    reason: None,
                },
            )
            .expect("request created");

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [Decision::Approve, Decision::Reject]
            .into_iter()
            .map(|decision| {
                let edits = Arc::clone(&portal.edits);
                let barrier = Arc::clone(&barrier);
                let id = request.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    edits.resolve(&id, decision)
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();

        let winners: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1, "exactly one resolution wins");
        assert!(results.iter().any(|result| matches!(
            result,
            Err(EditRequestError::AlreadyProcessed(_))
        )));

        let profile = portal
            .profiles
            .fetch(&citizen)
            .expect("fetch")
            .expect("profile");
        match winners[0].status {
            EditRequestStatus::Approved => {
                assert_eq!(profile.email.as_deref(), Some("new@portal.example"));
                assert!(!profile.frozen);
            }
            EditRequestStatus::Rejected => {
                assert_eq!(profile.email, None);
                assert!(profile.frozen);
            }
            EditRequestStatus::Pending => panic!("winner left the request pending"),
        }
    }
}
