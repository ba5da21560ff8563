use chrono::{NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use scheme_portal::auth::{IssuedToken, TokenRegistry};
use scheme_portal::store::{
    seed_catalog, InMemoryApplicationStore, InMemoryEditRequestStore, InMemoryProfileStore,
    InMemorySchemeCatalog, RepositoryError,
};
use scheme_portal::workflows::profiles::{
    ApplicantProfile, CitizenId, DeclaredNumber, ProfileRepository,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory backing stores shared by the HTTP routers and the CLI demo.
#[derive(Clone, Default)]
pub(crate) struct PortalStores {
    pub(crate) catalog: Arc<InMemorySchemeCatalog>,
    pub(crate) profiles: Arc<InMemoryProfileStore>,
    pub(crate) applications: Arc<InMemoryApplicationStore>,
    pub(crate) edit_requests: Arc<InMemoryEditRequestStore>,
}

impl PortalStores {
    pub(crate) fn build(seed: bool) -> Result<Self, RepositoryError> {
        let stores = Self::default();
        if seed {
            seed_catalog(stores.catalog.as_ref())?;
        }
        Ok(stores)
    }
}

pub(crate) const DEMO_CITIZEN_ID: &str = "999988887777";

/// Registration-time profile for the walkthrough citizen.
pub(crate) fn demo_profile() -> ApplicantProfile {
    let mut profile = ApplicantProfile::register(CitizenId(DEMO_CITIZEN_ID.to_string()), Utc::now());
    profile.name = Some("Meena Kumari".to_string());
    profile.email = Some("meena@example.in".to_string());
    profile.phone = Some("9800000000".to_string());
    profile.age = DeclaredNumber::from(42);
    profile.income = DeclaredNumber::from(140_000);
    profile.caste = Some("OBC".to_string());
    profile.gender = Some("female".to_string());
    profile.state = Some("Maharashtra".to_string());
    profile.district = Some("Pune".to_string());
    profile
}

/// Register the walkthrough citizen and issue them a bearer token. An
/// existing profile for the same id is kept.
pub(crate) fn enroll_demo_citizen(
    stores: &PortalStores,
    registry: &TokenRegistry,
) -> Result<(CitizenId, IssuedToken), RepositoryError> {
    let profile = demo_profile();
    let citizen_id = profile.citizen_id.clone();
    match stores.profiles.insert(profile) {
        Ok(_) | Err(RepositoryError::Conflict) => {}
        Err(err) => return Err(err),
    }
    let token = registry.issue_citizen_token(&citizen_id);
    Ok((citizen_id, token))
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2025-03-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"))
        );
        assert!(parse_date("01/03/2025").is_err());
    }

    #[test]
    fn enrolling_twice_keeps_the_profile_and_issues_fresh_tokens() {
        let stores = PortalStores::build(false).expect("stores");
        let registry = TokenRegistry::new("admin", Duration::hours(1));

        let (citizen, first) = enroll_demo_citizen(&stores, &registry).expect("first");
        let (_, second) = enroll_demo_citizen(&stores, &registry).expect("second");

        assert_eq!(citizen.0, DEMO_CITIZEN_ID);
        assert_ne!(first.token, second.token);
        assert!(stores.profiles.fetch(&citizen).expect("fetch").is_some());
    }
}
