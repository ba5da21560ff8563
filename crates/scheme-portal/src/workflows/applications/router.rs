use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, ApplicationSubmission, StatusUpdate};
use super::repository::ApplicationRepository;
use super::service::ApplicationService;
use crate::auth::{authenticate, IdentityProvider};
use crate::error::rejection_response;
use crate::workflows::schemes::SchemeCatalog;

/// Router state: the application service plus the identity provider.
pub struct ApplicationRoutes<R, C> {
    pub(crate) service: Arc<ApplicationService<R, C>>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
}

impl<R, C> Clone for ApplicationRoutes<R, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<R, C> ApplicationRoutes<R, C> {
    pub fn new(
        service: Arc<ApplicationService<R, C>>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self { service, identity }
    }
}

/// Router builder for citizen submissions and admin status changes.
pub fn application_router<R, C>(routes: ApplicationRoutes<R, C>) -> Router
where
    R: ApplicationRepository + 'static,
    C: SchemeCatalog + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            get(list_handler::<R, C>).post(submit_handler::<R, C>),
        )
        .route("/api/admin/applications", get(admin_list_handler::<R, C>))
        .route(
            "/api/admin/applications/:application_id",
            put(status_handler::<R, C>),
        )
        .with_state(routes)
}

pub(crate) async fn submit_handler<R, C>(
    State(routes): State<ApplicationRoutes<R, C>>,
    headers: HeaderMap,
    body: Result<axum::Json<ApplicationSubmission>, JsonRejection>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: SchemeCatalog + 'static,
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

    match routes.service.submit(&citizen_id, submission) {
        Ok(application) => {
            let payload = json!({
                "message": "Application created successfully",
                "application": application,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler<R, C>(
    State(routes): State<ApplicationRoutes<R, C>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: SchemeCatalog + 'static,
{
    let citizen_id = match authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_citizen())
    {
        Ok(citizen_id) => citizen_id,
        Err(err) => return err.into_response(),
    };

    match routes.service.list(&citizen_id) {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_list_handler<R, C>(
    State(routes): State<ApplicationRoutes<R, C>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: SchemeCatalog + 'static,
{
    if let Err(err) = authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_admin())
    {
        return err.into_response();
    }

    match routes.service.list_all() {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn status_handler<R, C>(
    State(routes): State<ApplicationRoutes<R, C>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    body: Result<axum::Json<StatusUpdate>, JsonRejection>,
) -> Response
where
    R: ApplicationRepository + 'static,
    C: SchemeCatalog + 'static,
{
    if let Err(err) = authenticate(routes.identity.as_ref(), &headers)
        .and_then(|identity| identity.require_admin())
    {
        return err.into_response();
    }

    let axum::Json(update) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    let id = ApplicationId(application_id);
    match routes.service.update_status(&id, update) {
        Ok(application) => {
            let payload = json!({
                "message": format!("Application {}", application.status.label()),
                "application": application,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
