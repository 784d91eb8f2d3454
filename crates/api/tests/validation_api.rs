//! Input checks declared on routes reject bad requests before the handler.

mod common;

use std::sync::Arc;

use academia_api::middleware::validate::with_checks;
use academia_core::roles::Role;
use academia_core::store::MemoryStore;
use academia_core::validation::ValidationConfig;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::{body_json, post_json};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    common::build_test_app(Arc::new(MemoryStore::new()))
}

/// Echo route guarded by nested and wildcard path checks.
fn schedule_app() -> Router {
    let validation = ValidationConfig::default();
    let checks = vec![
        validation.validate_path("periodo.inicio", "date", "body", "mandatory"),
        validation.validate_path("items.$.id", "integer", "body", "mandatory"),
    ];
    let echo = with_checks(post(|Json(body): Json<Value>| async move { Json(body) }), checks);

    Router::new()
        .route("/cronograma", echo)
        .with_state(common::test_state(Arc::new(MemoryStore::new()), common::test_config()))
}

#[tokio::test]
async fn missing_mandatory_body_field_names_the_field() {
    let response = post_json(app(), "/api/v1/auth/login", json!({ "password": "x" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 422);
    assert_eq!(json["error"]["id"], "validation_error");
    assert_eq!(json["error"]["message"], "The field 'dni' is mandatory");
}

#[tokio::test]
async fn non_integer_dni_is_invalid() {
    let body = json!({ "dni": "12.5", "password": "x" });
    let response = post_json(app(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "The field 'dni' has an invalid value");
}

#[tokio::test]
async fn checks_run_in_declaration_order() {
    let body = json!({ "dni": "abc" });
    let json = body_json(post_json(app(), "/api/v1/auth/login", body).await).await;
    assert_eq!(json["error"]["message"], "The field 'dni' has an invalid value");
}

#[tokio::test]
async fn role_outside_allowed_values_is_invalid() {
    let body = json!({ "dni": 40123456, "password": "x", "rol": "rector" });
    let json = body_json(post_json(app(), "/api/v1/auth/login", body).await).await;
    assert_eq!(json["error"]["message"], "The field 'rol' has an invalid value");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"dni\": "))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_import_selector_is_rejected_by_path_check() {
    let store = Arc::new(MemoryStore::new());
    let token = common::token_for(&store, Role::Admin).await;
    let app = common::build_test_app(Arc::clone(&store));

    let response = common::post_csv(app, "/api/v1/import/usuarios", Some(&token), "u.csv", "a,b").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "The field 'entidad' has an invalid value");
}

#[tokio::test]
async fn curriculum_code_must_be_a_positive_integer() {
    let store = Arc::new(MemoryStore::new());
    let token = common::token_for(&store, Role::Admin).await;

    for code in ["abc", "0"] {
        let app = common::build_test_app(Arc::clone(&store));
        let uri = format!("/api/v1/import/carreras/{code}/materias");
        let response = common::post_csv(app, &uri, Some(&token), "plan.csv", "Código,Nombre").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "code {code}");

        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "The field 'codigo' has an invalid value");
    }
}

// ---------------------------------------------------------------------------
// Nested path checks on a route
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nested_path_checks_pass_well_formed_bodies() {
    let body = json!({
        "periodo": { "inicio": "2024-03-01" },
        "items": [{ "id": 1 }, { "id": "2" }]
    });

    let response = post_json(schedule_app(), "/cronograma", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, body);
}

#[tokio::test]
async fn nested_path_failure_names_the_full_path() {
    let body = json!({ "periodo": { "inicio": "marzo" }, "items": [] });

    let response = post_json(schedule_app(), "/cronograma", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["id"], "validation_error");
    assert_eq!(json["error"]["message"], "The field 'periodo.inicio' has an invalid value");
}

#[tokio::test]
async fn wildcard_failure_names_the_element_index() {
    let body = json!({
        "periodo": { "inicio": "2024-03-01" },
        "items": [{ "id": 1 }, { "id": "uno" }, { "id": 3 }]
    });

    let response = post_json(schedule_app(), "/cronograma", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "The field 'items.1.id' has an invalid value");
}

#[tokio::test]
async fn missing_parent_object_is_not_found() {
    let response = post_json(schedule_app(), "/cronograma", json!({ "items": [] })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "The field 'periodo' was not found");
}
