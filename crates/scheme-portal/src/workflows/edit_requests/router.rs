use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::{EditRequestId, EditRequestSubmission, Resolution};
use super::repository::EditRequestRepository;
use super::service::EditRequestService;
use crate::auth::{authenticate, IdentityProvider};
use crate::error::rejection_response;
use crate::workflows::profiles::ProfileRepository;

/// Router state: the edit-request service plus the identity provider.
pub struct EditRequestRoutes<E, P> {
    pub(crate) service: Arc<EditRequestService<E, P>>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
}

impl<E, P> Clone for EditRequestRoutes<E, P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<E, P> EditRequestRoutes<E, P> {
    pub fn new(
        service: Arc<EditRequestService<E, P>>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self { service, identity }
    }
}

/// Router builder for profile reads, edit proposals, and admin resolution.
pub fn edit_request_router<E, P>(routes: EditRequestRoutes<E, P>) -> Router
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/profile", get(profile_handler::<E, P>))
        .route("/api/edit-request", post(create_handler::<E, P>))
        .route("/api/edit-requests", get(list_handler::<E, P>))
        .route("/api/admin/edit-requests", get(admin_list_handler::<E, P>))
        .route(
            "/api/admin/edit-request/:request_id",
            put(resolve_handler::<E, P>),
        )
        .with_state(routes)
}

pub(crate) async fn profile_handler<E, P>(
    State(routes): State<EditRequestRoutes<E, P>>,
    headers: HeaderMap,
) -> Response
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    let citizen_id = match authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_citizen())
    {
        Ok(citizen_id) => citizen_id,
        Err(err) => return err.into_response(),
    };

    match routes.service.profile(&citizen_id) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_handler<E, P>(
    State(routes): State<EditRequestRoutes<E, P>>,
    headers: HeaderMap,
    body: Result<axum::Json<EditRequestSubmission>, JsonRejection>,
) -> Response
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    let citizen_id = match authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_citizen())
    {
        Ok(citizen_id) => citizen_id,
        Err(err) => return err.into_response(),
    };

    let axum::Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match routes.service.create(&citizen_id, submission) {
        Ok(request) => {
            let payload = json!({
                "message": "Edit request submitted successfully",
                "request": request,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler<E, P>(
    State(routes): State<EditRequestRoutes<E, P>>,
    headers: HeaderMap,
) -> Response
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    let identity = match authenticate(routes.identity.as_ref(), &headers) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match routes.service.list(&identity) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_list_handler<E, P>(
    State(routes): State<EditRequestRoutes<E, P>>,
    headers: HeaderMap,
) -> Response
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    let identity = match authenticate(routes.identity.as_ref(), &headers) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = identity.require_admin() {
        return err.into_response();
    }

    match routes.service.list(&identity) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn resolve_handler<E, P>(
    State(routes): State<EditRequestRoutes<E, P>>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    body: Result<axum::Json<Resolution>, JsonRejection>,
) -> Response
where
    E: EditRequestRepository + 'static,
    P: ProfileRepository + 'static,
{
    if let Err(err) = authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_admin())
    {
        return err.into_response();
    }

    let axum::Json(resolution) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    let id = EditRequestId(request_id);
    match routes.service.resolve(&id, resolution.action) {
        Ok(request) => {
            let payload = json!({
                "message": format!("Edit request {}", request.status.label()),
                "request": request,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
