use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use service::storage::merge::into_payload;
use tracing::debug;

use crate::auth::ServerState;
use crate::errors::ApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoxQuery {
    /// Top-level key to address.
    #[serde(rename = "box")]
    pub key: Option<String>,
}

impl BoxQuery {
    /// An empty `box=` names no box.
    fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

#[utoipa::path(
    get, path = "/store", tag = "store",
    params(BoxQuery),
    responses(
        (status = 200, description = "Whole store, the box value, or null when the box is absent"),
        (status = 401, description = "OTP challenge issued"),
        (status = 500, description = "Serialization failure")
    )
)]
pub async fn get_store(
    State(state): State<ServerState>,
    Query(q): Query<BoxQuery>,
) -> Result<Response, ApiError> {
    let value = state.store.get(q.key()).await;
    let body = serde_json::to_vec(&value).map_err(|e| {
        debug!(error = %e, "store value serialization failed");
        ApiError::Internal(e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[utoipa::path(
    post, path = "/store", tag = "store",
    request_body(content = crate::openapi::StorePatchDoc, content_type = "application/json"),
    responses(
        (status = 200, description = "Merged and persisted"),
        (status = 400, description = "Body is not a JSON object or content type is not JSON"),
        (status = 401, description = "OTP challenge issued")
    )
)]
pub async fn post_store(State(state): State<ServerState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?;
    let payload = into_payload(value)?;
    state.store.merge(payload).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete, path = "/store", tag = "store",
    params(BoxQuery),
    responses(
        (status = 204, description = "Box removed and store persisted"),
        (status = 401, description = "OTP challenge issued"),
        (status = 404, description = "No such box")
    )
)]
pub async fn delete_store(
    State(state): State<ServerState>,
    Query(q): Query<BoxQuery>,
) -> Result<StatusCode, ApiError> {
    let key = q.key().ok_or(ApiError::NotFound)?;
    if state.store.delete_box(key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
