use std::sync::{Arc, Once};

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use tower::ServiceExt;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use crate::{
    config::AuthConfig,
    middleware::auth::{auth_middleware, CurrentUser},
    models::jwt::Claims,
    services::jwt_service::{JwtService, SharedTokenService},
};

pub const TEST_SECRET: &str = "s3cr3t";

static INIT: Once = Once::new();

/// Initialize logging exactly once
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_target(false)
            .with_thread_ids(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .with_span_events(FmtSpan::NONE)
            .init();
    });
}

pub fn setup_test_service() -> Arc<JwtService> {
    init_tracing();
    let service = JwtService::new(AuthConfig::new(TEST_SECRET, 1, 72))
        .expect("Failed to build token service");
    Arc::new(service)
}

async fn me(CurrentUser(claims): CurrentUser) -> Json<Claims> {
    Json(claims.as_ref().clone())
}

async fn whoami(user: Option<CurrentUser>) -> String {
    match user {
        Some(CurrentUser(claims)) => format!("user {}", claims.user_id),
        None => "anonymous".to_string(),
    }
}

/// `/me` sits behind the auth middleware; `/open` and `/whoami` do not.
pub fn create_test_app(tokens: SharedTokenService) -> Router {
    info!("Creating test application");
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(from_fn_with_state(tokens, auth_middleware));

    Router::new()
        .route("/open", get(me))
        .route("/whoami", get(whoami))
        .merge(protected)
}

pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
    headers
}

pub async fn test_request(app: Router, uri: &str, headers: Option<HeaderMap>) -> (StatusCode, String) {
    info!(uri = %uri, "Making test request");

    let mut request = Request::builder().method("GET").uri(uri);

    // Add custom headers if provided
    if let Some(custom_headers) = headers {
        for (key, value) in custom_headers.iter() {
            request = request.header(key, value);
        }
    }

    let request = request.body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = String::from_utf8(
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec(),
    )
    .unwrap();

    info!(status = %status, body = %body, "Test response received");
    (status, body)
}
