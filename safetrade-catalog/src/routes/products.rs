use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::types::api::ApiResponse;
use safetrade_shared::types::auth::{AuthUser, UserRole};
use safetrade_shared::types::pagination::{Paginated, PaginationParams};
use safetrade_shared::types::ProductStatus;

use crate::events::publisher;
use crate::models::{NewProduct, Product, ProductImage, UpdateProduct};
use crate::routes::internal;
use crate::schema::{product_images, products};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 3, max = 120, message = "name must be between 3 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 50, message = "category is required"))]
    pub category: String,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub price_cents: i64,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 3, max = 120, message = "name must be between 3 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50, message = "category is required"))]
    pub category: Option<String>,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub price_cents: Option<i64>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub category: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl ProductFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

// --- Create product ---

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    body.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let (latitude, longitude) = match body.location.as_deref() {
        Some(location) => geocode_or_none(&state, location).await,
        None => (None, None),
    };

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let new_product = NewProduct {
        seller_id: auth.id,
        name: body.name,
        description: body.description,
        category: body.category,
        price_cents: body.price_cents,
        location: body.location,
        latitude,
        longitude,
        status: ProductStatus::Active.to_string(),
    };

    let product: Product = diesel::insert_into(products::table)
        .values(&new_product)
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to create product: {e}")))?;

    publisher::publish_product_created(&state.rabbitmq, product.id, product.seller_id, &product.name).await;

    // Content scan; a flagged listing is reported in a second, separate step.
    run_detection(&state, product.id).await;

    let product = reload(&mut conn, product.id)?.unwrap_or(product);

    tracing::info!(product_id = %product.id, seller_id = %product.seller_id, "product created");

    Ok(Json(ApiResponse::ok(product)))
}

// --- Update product ---

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    body.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let product = load_product(&mut conn, product_id)?;
    require_owner(&auth, &product)?;

    let status: ProductStatus = product.status.parse().unwrap_or(ProductStatus::Active);
    if matches!(status, ProductStatus::Deleted | ProductStatus::Banned) {
        return Err(AppError::new(ErrorCode::ProductNotEditable, "listing can no longer be edited"));
    }

    let (location, latitude, longitude) = match body.location {
        Some(location) => {
            let (lat, lon) = geocode_or_none(&state, &location).await;
            (Some(Some(location)), Some(lat), Some(lon))
        }
        None => (None, None, None),
    };

    let changes = UpdateProduct {
        name: body.name,
        description: body.description,
        category: body.category,
        price_cents: body.price_cents,
        location,
        latitude,
        longitude,
    };

    let updated: Product = diesel::update(products::table.find(product_id))
        .set((&changes, products::updated_at.eq(chrono::Utc::now())))
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to update product: {e}")))?;

    publisher::publish_product_updated(&state.rabbitmq, updated.id, updated.seller_id).await;

    // Edited text goes through the same scan as a fresh listing.
    run_detection(&state, updated.id).await;

    let updated = reload(&mut conn, updated.id)?.unwrap_or(updated);

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Browse ---

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Product>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let (items, total): (Vec<Product>, i64) = if let Some(ref category) = params.category {
        let items = products::table
            .filter(products::status.eq(ProductStatus::Active.to_string()))
            .filter(products::category.eq(category))
            .order(products::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Product>(&mut conn)
            .map_err(|e| AppError::internal(format!("db error: {e}")))?;

        let total: i64 = products::table
            .filter(products::status.eq(ProductStatus::Active.to_string()))
            .filter(products::category.eq(category))
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::internal(format!("db error: {e}")))?;

        (items, total)
    } else {
        let items = products::table
            .filter(products::status.eq(ProductStatus::Active.to_string()))
            .order(products::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Product>(&mut conn)
            .map_err(|e| AppError::internal(format!("db error: {e}")))?;

        let total: i64 = products::table
            .filter(products::status.eq(ProductStatus::Active.to_string()))
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::internal(format!("db error: {e}")))?;

        (items, total)
    };

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let product = load_product(&mut conn, product_id)?;

    let images = product_images::table
        .filter(product_images::product_id.eq(product_id))
        .order(product_images::position.asc())
        .load::<ProductImage>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    Ok(Json(ApiResponse::ok(ProductDetail { product, images })))
}

// --- Lifecycle controls for the owner ---

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let product = load_product(&mut conn, product_id)?;
    require_owner(&auth, &product)?;

    let deleted = internal::apply_status(&mut conn, product_id, ProductStatus::Deleted)
        .map_err(|e| AppError::internal(format!("failed to delete product: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound, "product not found"))?;

    publisher::publish_product_status_changed(&state.rabbitmq, product_id, &deleted.status).await;

    tracing::info!(product_id = %product_id, "product deleted");

    Ok(Json(ApiResponse::ok(deleted)))
}

pub async fn deactivate_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let product = load_product(&mut conn, product_id)?;
    require_owner(&auth, &product)?;

    let status: ProductStatus = product.status.parse().unwrap_or(ProductStatus::Active);
    if status != ProductStatus::Active {
        return Err(AppError::new(
            ErrorCode::ProductNotEditable,
            "only an active listing can be deactivated",
        ));
    }

    let updated = internal::apply_status(&mut conn, product_id, ProductStatus::Deactivated)
        .map_err(|e| AppError::internal(format!("failed to deactivate product: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound, "product not found"))?;

    publisher::publish_product_status_changed(&state.rabbitmq, product_id, &updated.status).await;

    Ok(Json(ApiResponse::ok(updated)))
}

pub async fn reactivate_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let product = load_product(&mut conn, product_id)?;
    require_owner(&auth, &product)?;

    let status: ProductStatus = product.status.parse().unwrap_or(ProductStatus::Active);
    if status.under_moderation() {
        return Err(AppError::new(
            ErrorCode::ReactivationBlocked,
            "listing is under moderation and cannot be reactivated",
        ));
    }
    if status != ProductStatus::Deactivated {
        return Err(AppError::new(
            ErrorCode::ProductNotEditable,
            "only a deactivated listing can be reactivated",
        ));
    }

    let updated = internal::apply_status(&mut conn, product_id, ProductStatus::Active)
        .map_err(|e| AppError::internal(format!("failed to reactivate product: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound, "product not found"))?;

    publisher::publish_product_status_changed(&state.rabbitmq, product_id, &updated.status).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Helpers ---

pub(crate) fn load_product(conn: &mut PgConnection, product_id: Uuid) -> AppResult<Product> {
    let product: Option<Product> = products::table
        .find(product_id)
        .first(conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    match product {
        Some(p) if p.status != ProductStatus::Deleted.to_string() => Ok(p),
        _ => Err(AppError::new(ErrorCode::ProductNotFound, "product not found")),
    }
}

fn require_owner(auth: &AuthUser, product: &Product) -> AppResult<()> {
    if product.seller_id != auth.id && auth.role != UserRole::Admin {
        return Err(AppError::new(
            ErrorCode::NotProductOwner,
            "you do not own this listing",
        ));
    }
    Ok(())
}

fn reload(conn: &mut PgConnection, product_id: Uuid) -> AppResult<Option<Product>> {
    products::table
        .find(product_id)
        .first(conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))
}

async fn geocode_or_none(state: &AppState, location: &str) -> (Option<f64>, Option<f64>) {
    match state.geocoder.geocode(location).await {
        Ok(Some((lat, lon))) => (Some(lat), Some(lon)),
        Ok(None) => {
            tracing::debug!(location = %location, "geocoder found no match");
            (None, None)
        }
        Err(e) => {
            tracing::warn!(error = %e, location = %location, "geocoding failed, saving without coordinates");
            (None, None)
        }
    }
}

/// Ask the moderation service for a verdict and, when the listing is
/// flagged, report it through the plain status setter. The scan being
/// unavailable leaves the listing active; moderators can still sweep later.
async fn run_detection(state: &AppState, product_id: Uuid) {
    match state.moderation.detect(product_id).await {
        Ok(true) => {
            let mut conn = match state.db.get() {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, product_id = %product_id, "db pool error after detection");
                    return;
                }
            };
            match internal::apply_status(&mut conn, product_id, ProductStatus::Reported) {
                Ok(Some(updated)) => {
                    publisher::publish_product_status_changed(&state.rabbitmq, product_id, &updated.status).await;
                    tracing::warn!(product_id = %product_id, "listing flagged by content scan");
                }
                Ok(None) => {
                    tracing::warn!(product_id = %product_id, "flagged listing vanished before status change");
                }
                Err(e) => {
                    tracing::error!(error = %e, product_id = %product_id, "failed to flag listing");
                }
            }
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(error = %e, product_id = %product_id, "content scan unavailable, listing left as-is");
        }
    }
}
