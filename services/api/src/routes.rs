use crate::infra::{AppState, PortalStores};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use scheme_portal::auth::IdentityProvider;
use scheme_portal::workflows::applications::{
    application_router, ApplicationRoutes, ApplicationService,
};
use scheme_portal::workflows::edit_requests::{
    edit_request_router, EditRequestRoutes, EditRequestService,
};
use scheme_portal::workflows::schemes::{scheme_router, EligibilityService, SchemeRoutes};
use serde_json::json;
use std::sync::Arc;

/// Every portal route plus the operational endpoints. Expects an
/// `Extension<AppState>` layer for `/ready` and `/metrics`.
pub(crate) fn portal_router(
    stores: &PortalStores,
    identity: Arc<dyn IdentityProvider>,
) -> axum::Router {
    let eligibility = Arc::new(EligibilityService::new(
        Arc::clone(&stores.catalog),
        Arc::clone(&stores.profiles),
    ));
    let applications = Arc::new(ApplicationService::new(
        Arc::clone(&stores.applications),
        Arc::clone(&stores.catalog),
    ));
    let edit_requests = Arc::new(EditRequestService::new(
        Arc::clone(&stores.edit_requests),
        Arc::clone(&stores.profiles),
    ));

    scheme_router(SchemeRoutes::new(eligibility, Arc::clone(&identity)))
        .merge(application_router(ApplicationRoutes::new(
            applications,
            Arc::clone(&identity),
        )))
        .merge(edit_request_router(EditRequestRoutes::new(
            edit_requests,
            identity,
        )))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
