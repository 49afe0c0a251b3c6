use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::types::ProductStatus;

use crate::events::publisher;
use crate::models::Product;
use crate::schema::products;
use crate::AppState;

/// The plain status setter. No prior-state validation happens here: which
/// transitions are legal is the moderation engine's concern, this just
/// writes what it is told.
pub(crate) fn apply_status(
    conn: &mut PgConnection,
    product_id: Uuid,
    status: ProductStatus,
) -> Result<Option<Product>, diesel::result::Error> {
    diesel::update(products::table.find(product_id))
        .set((
            products::status.eq(status.to_string()),
            products::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(conn)
        .optional()
}

/// GET /internal/products/:id (service-to-service, no auth)
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, StatusCode> {
    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "db pool error on internal product lookup");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let product: Option<Product> = products::table
        .find(product_id)
        .first(&mut conn)
        .optional()
        .map_err(|e| {
            tracing::error!(error = %e, "db error on internal product lookup");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    product.map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: ProductStatus,
}

#[derive(Debug, Serialize)]
pub struct ChangeStatusResponse {
    pub ok: bool,
}

/// PATCH /internal/products/:id/status (service-to-service, no auth)
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<ChangeStatusRequest>,
) -> AppResult<Json<ChangeStatusResponse>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let updated = apply_status(&mut conn, product_id, body.status)
        .map_err(|e| AppError::internal(format!("failed to change status: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound, "product not found"))?;

    publisher::publish_product_status_changed(&state.rabbitmq, product_id, &updated.status).await;

    tracing::info!(product_id = %product_id, status = %updated.status, "product status changed");

    Ok(Json(ChangeStatusResponse { ok: true }))
}

/// GET /internal/products/active (service-to-service, no auth)
pub async fn active_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "db pool error on internal active listing fetch");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let items = products::table
        .filter(products::status.eq(ProductStatus::Active.to_string()))
        .order(products::created_at.asc())
        .load::<Product>(&mut conn)
        .map_err(|e| {
            tracing::error!(error = %e, "db error on internal active listing fetch");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(items))
}

// --- Batch product lookup ---

#[derive(Debug, Deserialize)]
pub struct BatchProductsRequest {
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BatchProductEntry {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub status: String,
}

/// POST /internal/products/batch (service-to-service, no auth)
pub async fn batch_products(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchProductsRequest>,
) -> Json<Vec<BatchProductEntry>> {
    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "db pool error on batch product lookup");
            return Json(vec![]);
        }
    };

    let found: Vec<Product> = products::table
        .filter(products::id.eq_any(&req.product_ids))
        .load::<Product>(&mut conn)
        .unwrap_or_default();

    let entries = found
        .into_iter()
        .map(|p| BatchProductEntry {
            id: p.id,
            seller_id: p.seller_id,
            name: p.name,
            status: p.status,
        })
        .collect();

    Json(entries)
}
