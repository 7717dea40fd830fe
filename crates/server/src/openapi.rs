use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Any JSON object; it is deep-merged into the store.
#[derive(ToSchema)]
#[schema(value_type = Object)]
pub struct StorePatchDoc(pub serde_json::Map<String, serde_json::Value>);

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::store::get_store,
        crate::routes::store::post_store,
        crate::routes::store::delete_store,
    ),
    components(
        schemas(
            HealthResponse,
            StorePatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "store", description = "Hierarchical box store; requires `Authorization: OTP nonce=\"..\", hash=\"..\"` when a secret is configured")
    )
)]
pub struct ApiDoc;
