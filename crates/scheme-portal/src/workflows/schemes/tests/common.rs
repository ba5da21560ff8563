use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::auth::{AuthError, Identity, IdentityProvider};
use crate::store::{InMemoryProfileStore, InMemorySchemeCatalog};
use crate::workflows::profiles::{ApplicantProfile, CitizenId, DeclaredNumber, ProfileRepository};
use crate::workflows::schemes::{
    scheme_router, Criterion, EligibilityCriteria, EligibilityService, Scheme, SchemeCatalog,
    SchemeId, SchemeRoutes,
};

pub(super) const CITIZEN_TOKEN: &str = "citizen-token";
pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const CITIZEN: &str = "100200300400";

/// Identity provider backed by a fixed token table.
#[derive(Default)]
pub(super) struct StaticIdentities {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentities {
    pub(super) fn standard() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(
            CITIZEN_TOKEN.to_string(),
            Identity::citizen(&CitizenId(CITIZEN.to_string())),
        );
        tokens.insert(ADMIN_TOKEN.to_string(), Identity::admin("ops"));
        Self { tokens }
    }
}

impl IdentityProvider for StaticIdentities {
    fn resolve(&self, bearer_token: &str) -> Result<Identity, AuthError> {
        self.tokens.get(bearer_token).cloned().ok_or(AuthError::Invalid)
    }
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date")
}

pub(super) fn scheme(id: &str, rules: Vec<Criterion>) -> Scheme {
    Scheme {
        id: SchemeId(id.to_string()),
        name: format!("{id} scheme"),
        description: String::new(),
        category: "Welfare".to_string(),
        benefits: String::new(),
        eligibility_criteria: EligibilityCriteria::new(rules),
        documents_required: vec!["Aadhaar Card".to_string()],
        application_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        application_end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
        requires_income_cert: false,
        requires_caste_cert: false,
    }
}

pub(super) fn profile(income: i64, age: i64) -> ApplicantProfile {
    let mut profile = ApplicantProfile::register(CitizenId(CITIZEN.to_string()), Utc::now());
    profile.income = DeclaredNumber::from(income);
    profile.age = DeclaredNumber::from(age);
    profile.caste = Some("OBC".to_string());
    profile.gender = Some("female".to_string());
    profile
}

pub(super) struct Harness {
    pub catalog: Arc<InMemorySchemeCatalog>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub router: Router,
}

pub(super) fn harness(schemes: Vec<Scheme>) -> Harness {
    let catalog = Arc::new(InMemorySchemeCatalog::default());
    for scheme in schemes {
        catalog.insert(scheme).expect("catalog insert");
    }
    let profiles = Arc::new(InMemoryProfileStore::default());
    let service = Arc::new(EligibilityService::new(
        Arc::clone(&catalog),
        Arc::clone(&profiles),
    ));
    let router = scheme_router(SchemeRoutes::new(
        service,
        Arc::new(StaticIdentities::standard()),
    ));

    Harness {
        catalog,
        profiles,
        router,
    }
}

impl Harness {
    pub(super) fn with_profile(self, profile: ApplicantProfile) -> Self {
        self.profiles.insert(profile).expect("profile insert");
        self
    }
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

pub(super) fn post_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
