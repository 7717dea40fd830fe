pub mod store;

use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::{observability::encode_metrics, types::Health};

use crate::auth::{self, ServerState};
use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

/// Build the full application router: `/store` behind the OTP guard,
/// health, metrics and API docs in the open.
pub fn build_router(state: ServerState) -> Router {
    let store_routes = Router::new()
        .route(
            "/store",
            get(store::get_store)
                .post(store::post_store)
                .delete(store::delete_store),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_otp));

    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    public
        .merge(store_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
