#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use academia_api::auth::jwt::{generate_access_token, JwtConfig};
use academia_api::config::ServerConfig;
use academia_api::routes;
use academia_api::state::{AppState, ImportLocks};
use academia_core::password::hash_password;
use academia_core::roles::Role;
use academia_core::store::{
    BulkWriteSummary, Collection, Document, DocumentStore, Filter, MemoryStore, StoreError,
    UpsertOp,
};
use academia_core::types::DocId;
use academia_core::validation::ValidationConfig;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

const MULTIPART_BOUNDARY: &str = "academia-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Each call gets its own upload directory under the system temp dir and a
/// 64 KiB upload limit.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        import_timeout_secs: 30,
        upload_dir: unique_upload_dir(),
        max_upload_bytes: 64 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

fn unique_upload_dir() -> PathBuf {
    std::env::temp_dir()
        .join("academia-api-tests")
        .join(uuid::Uuid::new_v4().to_string())
}

/// Build the full application router over `store` with [`test_config`].
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    build_test_app_with(store, test_config())
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeouts, tracing,
/// panic recovery) that production uses.
pub fn build_test_app_with(store: Arc<MemoryStore>, config: ServerConfig) -> Router {
    build_test_app_over(store, config)
}

/// Shared state over `store`, for routers assembled by hand.
pub fn test_state(store: Arc<dyn DocumentStore>, config: ServerConfig) -> AppState {
    AppState {
        store,
        config: Arc::new(config),
        import_locks: Arc::new(ImportLocks::new()),
    }
}

/// Same as [`build_test_app_with`], over any document store.
pub fn build_test_app_over(store: Arc<dyn DocumentStore>, config: ServerConfig) -> Router {
    let request_timeout_secs = config.request_timeout_secs;
    let validation = ValidationConfig::default();
    let api = routes::api_routes(&validation, &config);
    let state = test_state(store, config);

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router().layer(routes::timeout(request_timeout_secs)))
        .nest("/api/v1", api)
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Store doubles
// ---------------------------------------------------------------------------

/// [`MemoryStore`] whose bulk writes stall for `write_delay` and then fail
/// when `fail_writes` is set.
#[derive(Default)]
pub struct SlowStore {
    pub inner: Arc<MemoryStore>,
    pub write_delay: Duration,
    pub fail_writes: bool,
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.find_one(collection, filter).await
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        self.inner.find(collection, filter).await
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<DocId, StoreError> {
        self.inner.insert_one(collection, document).await
    }

    async fn bulk_upsert(
        &self,
        collection: Collection,
        ops: &[UpsertOp],
    ) -> Result<BulkWriteSummary, StoreError> {
        tokio::time::sleep(self.write_delay).await;
        if self.fail_writes {
            return Err(StoreError::Backend("connection reset by peer".into()));
        }
        self.inner.bulk_upsert(collection, ops).await
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a multipart form with a single `file` field.
pub async fn post_csv(
    app: Router,
    uri: &str,
    token: Option<&str>,
    filename: &str,
    contents: &str,
) -> Response {
    let body = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {contents}\r\n\
         --{MULTIPART_BOUNDARY}--\r\n"
    );

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert `value` into `collection` and return the new document id.
pub async fn seed(store: &MemoryStore, collection: Collection, value: Value) -> DocId {
    let Value::Object(document) = value else {
        panic!("fixtures must be JSON objects");
    };
    store.insert_one(collection, document).await.unwrap()
}

/// Create an account of `role` with a hashed password.
pub async fn seed_account(store: &MemoryStore, role: Role, dni: i64, password: &str) -> DocId {
    let mut account = Document::new();
    account.insert("dni".into(), json!(dni));
    account.insert("nombres".into(), json!("Ana"));
    account.insert("apellidos".into(), json!("Gomez"));
    account.insert(
        "password".into(),
        json!(hash_password(password).expect("hashing should succeed")),
    );
    store.insert_one(role.accounts(), account).await.unwrap()
}

/// Access token for a freshly inserted account of `role`.
pub async fn token_for(store: &MemoryStore, role: Role) -> String {
    let id = seed(store, role.accounts(), json!({ "dni": 30111222 })).await;
    generate_access_token(&id, role, &test_config().jwt).expect("token generation should succeed")
}
