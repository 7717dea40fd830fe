use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use service::{auth::service::OtpAuthenticator, store::BoxStore};
use tracing::debug;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn BoxStore>,
    pub auth: OtpAuthenticator,
}

/// Middleware for `/store`: verify the `OTP` authorization header and, for
/// body-carrying methods, require a JSON content type.
///
/// Any authentication failure answers 401 with a new nonce in
/// `WWW-Authenticate`, which is what a client uses for its next attempt.
pub async fn require_otp(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().to_owned());

    if let Err(reason) = state.auth.verify(authorization.as_deref()).await {
        debug!(method = %req.method(), reason = %reason, code = reason.code(), "request denied, issuing challenge");
        return Err(ApiError::Challenge(state.auth.challenge().await));
    }

    if carries_body(req.method()) && !is_json(req.headers()) {
        return Err(ApiError::BadRequest("content type must be application/json".into()));
    }

    Ok(next.run(req).await)
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// `application/json`, with or without parameters such as `charset`.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
