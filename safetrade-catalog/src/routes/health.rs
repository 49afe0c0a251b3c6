use axum::Json;
use safetrade_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("safetrade-catalog", env!("CARGO_PKG_VERSION")))
}
