use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::auth::TokenRegistry;
use crate::store::{seed_catalog, InMemoryApplicationStore, InMemorySchemeCatalog, RepositoryError};
use crate::workflows::applications::{
    application_router, Application, ApplicationId, ApplicationRepository, ApplicationRoutes,
    ApplicationService, ApplicationStatus, ApplicationSubmission,
};
use crate::workflows::profiles::CitizenId;

pub(super) const ADMIN_TOKEN: &str = "admin-secret";
pub(super) const CITIZEN_TOKEN: &str = "citizen-4455";
pub(super) const OTHER_TOKEN: &str = "citizen-7788";
pub(super) const CITIZEN: &str = "4455";
pub(super) const OTHER_CITIZEN: &str = "7788";

pub(super) type MemoryService = ApplicationService<InMemoryApplicationStore, InMemorySchemeCatalog>;

pub(super) fn citizen() -> CitizenId {
    CitizenId(CITIZEN.to_string())
}

pub(super) fn submission(scheme_id: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        scheme_id: scheme_id.to_string(),
    }
}

pub(super) fn seeded_catalog() -> Arc<InMemorySchemeCatalog> {
    let catalog = Arc::new(InMemorySchemeCatalog::default());
    seed_catalog(catalog.as_ref()).expect("seed catalog");
    catalog
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryApplicationStore>) {
    let repository = Arc::new(InMemoryApplicationStore::default());
    let service = Arc::new(ApplicationService::new(
        Arc::clone(&repository),
        seeded_catalog(),
    ));
    (service, repository)
}

pub(super) fn registry() -> Arc<TokenRegistry> {
    let registry = TokenRegistry::new(ADMIN_TOKEN, Duration::hours(1));
    let expires_at = Utc::now() + Duration::hours(1);
    registry.register_citizen_token(CITIZEN_TOKEN, &citizen(), expires_at);
    registry.register_citizen_token(
        OTHER_TOKEN,
        &CitizenId(OTHER_CITIZEN.to_string()),
        expires_at,
    );
    Arc::new(registry)
}

pub(super) fn routes(service: Arc<MemoryService>) -> ApplicationRoutes<InMemoryApplicationStore, InMemorySchemeCatalog> {
    ApplicationRoutes::new(service, registry())
}

pub(super) fn router(service: Arc<MemoryService>) -> Router {
    application_router(routes(service))
}

/// Repository whose backing store is always down.
pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert_if_absent(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(unavailable())
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(unavailable())
    }

    fn for_citizen(&self, _citizen_id: &CitizenId) -> Result<Vec<Application>, RepositoryError> {
        Err(unavailable())
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(unavailable())
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
        _remarks: Option<String>,
        _at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        Err(unavailable())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_string())
}

pub(super) fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
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
