use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;

use super::domain::SchemeId;
use super::repository::SchemeCatalog;
use super::service::EligibilityService;
use crate::auth::{authenticate, IdentityProvider};
use crate::workflows::profiles::ProfileRepository;

/// Router state: the eligibility service plus the identity provider.
pub struct SchemeRoutes<C, P> {
    pub(crate) service: Arc<EligibilityService<C, P>>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
}

impl<C, P> Clone for SchemeRoutes<C, P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<C, P> SchemeRoutes<C, P> {
    pub fn new(
        service: Arc<EligibilityService<C, P>>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self { service, identity }
    }
}

/// Router builder exposing the public catalog and the eligibility check.
pub fn scheme_router<C, P>(routes: SchemeRoutes<C, P>) -> Router
where
    C: SchemeCatalog + 'static,
    P: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/schemes", get(catalog_handler::<C, P>))
        .route("/api/schemes/eligible", post(eligibility_handler::<C, P>))
        .route("/api/schemes/:scheme_id", get(scheme_handler::<C, P>))
        .with_state(routes)
}

pub(crate) async fn catalog_handler<C, P>(State(routes): State<SchemeRoutes<C, P>>) -> Response
where
    C: SchemeCatalog + 'static,
    P: ProfileRepository + 'static,
{
    match routes.service.catalog() {
        Ok(schemes) => (StatusCode::OK, axum::Json(schemes)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn scheme_handler<C, P>(
    State(routes): State<SchemeRoutes<C, P>>,
    Path(scheme_id): Path<String>,
) -> Response
where
    C: SchemeCatalog + 'static,
    P: ProfileRepository + 'static,
{
    match routes.service.scheme(&SchemeId(scheme_id)) {
        Ok(scheme) => (StatusCode::OK, axum::Json(scheme)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn eligibility_handler<C, P>(
    State(routes): State<SchemeRoutes<C, P>>,
    headers: HeaderMap,
) -> Response
where
    C: SchemeCatalog + 'static,
    P: ProfileRepository + 'static,
{
    let citizen_id = match authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_citizen())
    {
        Ok(citizen_id) => citizen_id,
        Err(err) => return err.into_response(),
    };

    let today = Utc::now().date_naive();
    match routes.service.eligibility_for(&citizen_id, today) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => err.into_response(),
    }
}
