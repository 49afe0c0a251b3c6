use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::middleware::ModeratorUser;
use safetrade_shared::types::api::ApiResponse;

use crate::clients::ProductRecord;
use crate::detection;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub dangerous: bool,
}

/// POST /internal/detection/:product_id (service-to-service, no auth)
///
/// Classifies one product and records a system incident when it is flagged.
/// The caller owns the follow-up: flipping the product to reported is the
/// catalog's move, not ours.
pub async fn detect_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<DetectionResponse>> {
    let product = state.catalog
        .find_product(product_id)
        .await
        .map_err(|e| AppError::internal(format!("catalog lookup failed: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound, "product not found"))?;

    let dangerous = detection::scan_product(&state, &product).await;

    Ok(Json(DetectionResponse { dangerous }))
}

/// GET /moderation/detect-dangerous
///
/// Bulk sweep over every active listing. Each listing is scanned in turn;
/// a failure to persist one system incident never aborts the rest of the
/// sweep. Returns the dangerous subset.
pub async fn detect_dangerous_products(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
) -> AppResult<Json<ApiResponse<Vec<ProductRecord>>>> {
    let products = state.catalog
        .active_products()
        .await
        .map_err(|e| AppError::internal(format!("failed to load active listings: {e}")))?;

    let mut dangerous = Vec::new();
    for product in products {
        if detection::scan_product(&state, &product).await {
            dangerous.push(product);
        }
    }

    tracing::info!(flagged = dangerous.len(), "dangerous listing sweep finished");

    Ok(Json(ApiResponse::ok(dangerous)))
}
