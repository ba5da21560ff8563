use super::common::*;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::workflows::edit_requests::router::resolve_handler;
use crate::workflows::edit_requests::{Decision, EditRequestRoutes, Resolution};
use crate::workflows::profiles::ProfileRepository;

#[tokio::test]
async fn profile_route_returns_callers_profile() {
    let (service, _) = build_service();

    let response = router(service)
        .oneshot(get_request("/api/profile", CITIZEN_TOKEN))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["citizen_id"], CITIZEN);
    assert_eq!(payload["frozen"], true);
    assert_eq!(payload["role"], "citizen");
}

#[tokio::test]
async fn submit_then_approve_updates_profile() {
    let (service, profiles) = build_service();
    let router = router(service);

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/edit-request",
            CITIZEN_TOKEN,
            json!({"changes": {"email": "x@y.com"}, "reason": "new address"}),
        ))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let payload = read_json_body(created).await;
    assert_eq!(payload["message"], "Edit request submitted successfully");
    let request_id = payload["request"]["id"]
        .as_str()
        .expect("request id")
        .to_string();

    let approved = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/edit-request/{request_id}"),
            ADMIN_TOKEN,
            json!({"action": "approve"}),
        ))
        .await
        .expect("route executes");
    assert_eq!(approved.status(), StatusCode::OK);
    let payload = read_json_body(approved).await;
    assert_eq!(payload["request"]["status"], "approved");

    let profile = profiles.fetch(&citizen()).expect("fetch").expect("profile");
    assert_eq!(profile.email.as_deref(), Some("x@y.com"));

    let second = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/edit-request/{request_id}"),
            ADMIN_TOKEN,
            json!({"action": "approve"}),
        ))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_route_rejects_immutable_fields() {
    let (service, _) = build_service();

    let response = router(service)
        .oneshot(json_request(
            "POST",
            "/api/edit-request",
            CITIZEN_TOKEN,
            json!({"changes": {"role": "admin"}}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().expect("message").contains("role"));
}

#[tokio::test]
async fn list_routes_scope_by_role() {
    let (service, _) = build_service();
    service.create(&citizen(), email_change()).expect("created");
    let router = router(service);

    let own = router
        .clone()
        .oneshot(get_request("/api/edit-requests", CITIZEN_TOKEN))
        .await
        .expect("route executes");
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(read_json_body(own).await.as_array().expect("array").len(), 1);

    let admin_view = router
        .clone()
        .oneshot(get_request("/api/edit-requests", ADMIN_TOKEN))
        .await
        .expect("route executes");
    assert_eq!(admin_view.status(), StatusCode::OK);

    let forbidden = router
        .oneshot(get_request("/api/admin/edit-requests", CITIZEN_TOKEN))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn resolve_handler_requires_admin_credentials() {
    let (service, _) = build_service();
    let request = service.create(&citizen(), email_change()).expect("created");
    let routes = EditRequestRoutes::new(service, registry());

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        format!("Bearer {CITIZEN_TOKEN}").parse().expect("header"),
    );

    let response = resolve_handler(
        State(routes),
        Path(request.id.0.clone()),
        headers,
        Ok(axum::Json(Resolution {
            action: Decision::Approve,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn resolve_route_returns_not_found_for_unknown_request() {
    let (service, _) = build_service();

    let response = router(service)
        .oneshot(json_request(
            "PUT",
            "/api/admin/edit-request/edit-000000",
            ADMIN_TOKEN,
            json!({"action": "reject"}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_request_routes_authenticate_before_reading_the_body() {
    let (service, _) = build_service();
    let router = router(service);

    let create = router
        .clone()
        .oneshot(raw_request("POST", "/api/edit-request", None, None, "not json"))
        .await
        .expect("route executes");
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);

    let resolve = router
        .oneshot(raw_request(
            "PUT",
            "/api/admin/edit-request/edit-000000",
            Some(CITIZEN_TOKEN),
            Some("application/json"),
            "{",
        ))
        .await
        .expect("route executes");
    assert_eq!(resolve.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_edit_request_bodies_are_validation_errors() {
    let (service, _) = build_service();
    let router = router(service);

    let create = router
        .clone()
        .oneshot(raw_request(
            "POST",
            "/api/edit-request",
            Some(CITIZEN_TOKEN),
            Some("application/json"),
            "not json",
        ))
        .await
        .expect("route executes");
    assert_eq!(create.status(), StatusCode::BAD_REQUEST);
    assert!(read_json_body(create).await["error"].is_string());

    let resolve = router
        .oneshot(raw_request(
            "PUT",
            "/api/admin/edit-request/edit-000000",
            Some(ADMIN_TOKEN),
            Some("application/json"),
            "{\"action\": \"maybe\"}",
        ))
        .await
        .expect("route executes");
    assert_eq!(resolve.status(), StatusCode::BAD_REQUEST);
    assert!(read_json_body(resolve).await["error"].is_string());
}
