//! Bearer-token guard for protected routes.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::rest::error::map_domain_error;
use crate::api::rest::problem::ProblemResponse;
use crate::domain::error::DomainError;
use crate::domain::service::AuthService;

/// Id of the caller, inserted into request extensions by [`require_bearer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

/// Reject the request with 401 unless it carries a valid access token.
pub async fn require_bearer(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ProblemResponse> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    // nested routers see a stripped uri; problems report the full path
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri().path().to_owned(), |o| o.0.path().to_owned());

    let Some(token) = token else {
        debug!(%path, "missing bearer token");
        return Err(map_domain_error(&DomainError::Unauthorized, &path));
    };

    let user_id = auth
        .authenticate(token)
        .map_err(|e| map_domain_error(&e, &path))?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

/// Token part of `Bearer <token>`; the scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
