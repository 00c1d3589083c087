use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use http::header::AUTHORIZATION;
use tracing::debug;

use crate::{
    context::Context,
    identity,
    models::jwt::Claims,
    services::jwt_service::SharedTokenService,
};

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated identity of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<Claims>);

pub async fn auth_middleware(
    State(tokens): State<SharedTokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Get the authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = tokens.verify_access_token(token).map_err(|e| {
        debug!(error = %e, "Rejected request");
        StatusCode::UNAUTHORIZED
    })?;

    let ctx = request
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_default();
    let ctx = identity::attach(&ctx, Arc::new(claims));
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Context>()
            .and_then(identity::retrieve)
            .map(CurrentUser)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
