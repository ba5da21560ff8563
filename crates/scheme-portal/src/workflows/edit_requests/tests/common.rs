use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use crate::auth::TokenRegistry;
use crate::store::{InMemoryEditRequestStore, InMemoryProfileStore, RepositoryError};
use crate::workflows::edit_requests::{
    edit_request_router, EditRequestRoutes, EditRequestService, EditRequestSubmission,
};
use crate::workflows::profiles::{
    ApplicantProfile, CitizenId, DeclaredNumber, ProfileChanges, ProfileRepository,
};

pub(super) const ADMIN_TOKEN: &str = "admin-secret";
pub(super) const CITIZEN_TOKEN: &str = "citizen-1122";
pub(super) const CITIZEN: &str = "1122";

pub(super) type MemoryService = EditRequestService<InMemoryEditRequestStore, InMemoryProfileStore>;

pub(super) fn citizen() -> CitizenId {
    CitizenId(CITIZEN.to_string())
}

pub(super) fn registered_profile() -> ApplicantProfile {
    let mut profile = ApplicantProfile::register(citizen(), Utc::now());
    profile.name = Some("Asha Devi".to_string());
    profile.email = Some("asha@old.example".to_string());
    profile.age = DeclaredNumber::from(41);
    profile.income = DeclaredNumber::from(90_000);
    profile.gender = Some("female".to_string());
    profile
}

pub(super) fn submission(changes: Value) -> EditRequestSubmission {
    EditRequestSubmission {
        changes: Some(changes),
        reason: Some("moved house".to_string()),
    }
}

pub(super) fn email_change() -> EditRequestSubmission {
    submission(json!({"email": "x@y.com"}))
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryProfileStore>) {
    let profiles = Arc::new(InMemoryProfileStore::default());
    profiles
        .insert(registered_profile())
        .expect("profile insert");
    let service = Arc::new(EditRequestService::new(
        Arc::new(InMemoryEditRequestStore::default()),
        Arc::clone(&profiles),
    ));
    (service, profiles)
}

pub(super) fn registry() -> Arc<TokenRegistry> {
    let registry = TokenRegistry::new(ADMIN_TOKEN, Duration::hours(1));
    registry.register_citizen_token(CITIZEN_TOKEN, &citizen(), Utc::now() + Duration::hours(1));
    Arc::new(registry)
}

pub(super) fn router(service: Arc<MemoryService>) -> Router {
    edit_request_router(EditRequestRoutes::new(service, registry()))
}

/// Profile store that reads normally but fails every write.
#[derive(Default)]
pub(super) struct ReadOnlyProfiles {
    inner: InMemoryProfileStore,
}

impl ReadOnlyProfiles {
    pub(super) fn with_registered_profile() -> Self {
        let profiles = Self::default();
        profiles
            .inner
            .insert(registered_profile())
            .expect("profile insert");
        profiles
    }
}

impl ProfileRepository for ReadOnlyProfiles {
    fn insert(&self, profile: ApplicantProfile) -> Result<ApplicantProfile, RepositoryError> {
        self.inner.insert(profile)
    }

    fn fetch(&self, citizen_id: &CitizenId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        self.inner.fetch(citizen_id)
    }

    fn apply_changes(
        &self,
        _citizen_id: &CitizenId,
        _changes: &ProfileChanges,
        _at: DateTime<Utc>,
    ) -> Result<ApplicantProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("write rejected".to_string()))
    }
}

pub(super) fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

pub(super) fn raw_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: &'static str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request")
}

pub(super) fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
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
