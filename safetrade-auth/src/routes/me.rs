use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::types::auth::AuthUser;
use safetrade_shared::types::ApiResponse;

use crate::schema::users;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let account = users::table
        .filter(users::id.eq(user.id))
        .first::<crate::models::User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(MeResponse {
        id: account.id,
        email: account.email,
        display_name: account.display_name,
        role: account.role,
        email_verified: account.email_verified,
        created_at: account.created_at,
    })))
}
