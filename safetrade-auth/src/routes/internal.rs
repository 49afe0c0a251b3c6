use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::User;
use crate::schema::users;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserInternal {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
}

/// GET /internal/users/:id (service-to-service, no auth)
///
/// Existence check + directory entry; the moderation service uses this to
/// validate moderator assignments and to find a listing owner's inbox.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserInternal>, StatusCode> {
    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "db pool error on internal user lookup");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let user: Option<User> = users::table
        .find(user_id)
        .first(&mut conn)
        .optional()
        .map_err(|e| {
            tracing::error!(error = %e, "db error on internal user lookup");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    user.map(|u| {
        Json(UserInternal {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
        })
    })
    .ok_or(StatusCode::NOT_FOUND)
}

// --- Batch user lookup ---

#[derive(Debug, Deserialize)]
pub struct BatchUsersRequest {
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BatchUserEntry {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub role: String,
}

/// POST /internal/users/batch (service-to-service, no auth)
pub async fn batch_users(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchUsersRequest>,
) -> Json<Vec<BatchUserEntry>> {
    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "db pool error on batch user lookup");
            return Json(vec![]);
        }
    };

    let found: Vec<User> = users::table
        .filter(users::id.eq_any(&req.user_ids))
        .load::<User>(&mut conn)
        .unwrap_or_default();

    let entries = found
        .into_iter()
        .map(|u| BatchUserEntry {
            id: u.id,
            display_name: u.display_name,
            role: u.role,
        })
        .collect();

    Json(entries)
}
