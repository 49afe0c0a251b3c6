use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult};
use safetrade_shared::types::api::ApiResponse;
use safetrade_shared::types::auth::AuthUser;

use crate::events::publisher;
use crate::models::{Like, NewLike};
use crate::routes::products::load_product;
use crate::schema::{likes, products};
use crate::AppState;

/// POST /products/:id/like - idempotent; liking twice returns the existing like
pub async fn like_product(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Like>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let product = load_product(&mut conn, product_id)?;

    let already_liked = likes::table
        .filter(likes::user_id.eq(auth.id))
        .filter(likes::product_id.eq(product.id))
        .first::<Like>(&mut conn)
        .optional()?;

    if let Some(existing) = already_liked {
        return Ok(Json(ApiResponse::ok(existing)));
    }

    let new_like = NewLike {
        user_id: auth.id,
        product_id: product.id,
    };

    let like = diesel::insert_into(likes::table)
        .values(&new_like)
        .get_result::<Like>(&mut conn)?;

    diesel::update(products::table.filter(products::id.eq(product.id)))
        .set(products::like_count.eq(products::like_count + 1))
        .execute(&mut conn)?;

    publisher::publish_product_liked(&state.rabbitmq, product.id, auth.id).await;

    Ok(Json(ApiResponse::ok(like)))
}

/// DELETE /products/:id/like
pub async fn unlike_product(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(
        likes::table
            .filter(likes::user_id.eq(auth.id))
            .filter(likes::product_id.eq(product_id)),
    )
    .execute(&mut conn)?;

    if removed > 0 {
        diesel::update(products::table.filter(products::id.eq(product_id)))
            .set(products::like_count.eq(products::like_count - 1))
            .execute(&mut conn)?;
    }

    Ok(Json(ApiResponse::ok("like removed")))
}

#[derive(Debug, Serialize)]
pub struct LikeCheckResponse {
    pub already_liked: bool,
}

/// GET /products/:id/like - check if current user already liked the product
pub async fn check_like(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<LikeCheckResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let already_liked = likes::table
        .filter(likes::user_id.eq(auth.id))
        .filter(likes::product_id.eq(product_id))
        .first::<Like>(&mut conn)
        .optional()?
        .is_some();

    Ok(Json(ApiResponse::ok(LikeCheckResponse { already_liked })))
}
