use axum::extract::{Path, State};
use axum::Json;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::types::api::ApiResponse;
use safetrade_shared::types::auth::AuthUser;
use safetrade_shared::types::ProductStatus;

use crate::events::publisher;
use crate::lifecycle::{self, IncidentStatus, IncidentType};
use crate::models::{Incident, NewIncident};
use crate::schema::incidents;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub product_id: Uuid,
    pub incident_type: String,
    pub comment: Option<String>,
}

/// POST /moderation/report
///
/// Opens a pending incident and flags the listing. The two writes stand or
/// fall together: when the catalog refuses the status change, the freshly
/// inserted incident is removed again and the report fails.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let incident_type: IncidentType = body.incident_type.parse().map_err(|_| {
        AppError::new(
            ErrorCode::ValidationError,
            "incident_type must be one of: dangerous, fraud, inappropriate, other",
        )
    })?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let new_incident = NewIncident {
        product_id: body.product_id,
        incident_type: incident_type.to_string(),
        comment: body.comment,
        reporter_id: auth.id,
        status: IncidentStatus::Pending.to_string(),
    };

    let incident: Incident = diesel::insert_into(incidents::table)
        .values(&new_incident)
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to create incident: {e}")))?;

    match state.catalog.change_status(body.product_id, ProductStatus::Reported).await {
        Ok(true) => {}
        Ok(false) => {
            roll_back_incident(&mut conn, incident.id);
            return Err(AppError::new(ErrorCode::ProductNotFound, "product not found"));
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = %body.product_id, "failed to flag reported listing");
            roll_back_incident(&mut conn, incident.id);
            return Err(AppError::new(
                ErrorCode::StatusChangeFailed,
                "could not flag the reported listing",
            ));
        }
    }

    publisher::publish_incident_created(&state.rabbitmq, &incident).await;

    tracing::info!(
        incident_id = incident.id,
        product_id = %incident.product_id,
        reporter_id = %incident.reporter_id,
        "report created"
    );

    Ok(Json(ApiResponse::ok(incident)))
}

fn roll_back_incident(conn: &mut PgConnection, incident_id: i64) {
    if let Err(e) = diesel::delete(incidents::table.find(incident_id)).execute(conn) {
        tracing::error!(error = %e, incident_id, "failed to roll back orphaned incident");
    }
}

#[derive(Debug, Deserialize)]
pub struct AppealRequest {
    pub reason: String,
}

/// PATCH /moderation/incident/:id/appeal
///
/// One-time challenge by the listing owner against an accepted incident.
/// Only allowed while the listing is suspended; re-opens the incident for
/// a second moderator.
pub async fn appeal_incident(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(incident_id): Path<i64>,
    Json(body): Json<AppealRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    if body.reason.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "appeal reason is required"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let incident: Incident = incidents::table
        .find(incident_id)
        .first(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound, "incident not found"))?;

    let product = state.catalog
        .find_product(incident.product_id)
        .await
        .map_err(|e| AppError::internal(format!("catalog lookup failed: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound, "product not found"))?;

    // Only the listing owner appeals; moderators may file on their behalf.
    if product.seller_id != auth.id && !auth.is_moderator() {
        return Err(AppError::new(
            ErrorCode::Forbidden,
            "only the listing owner can appeal this incident",
        ));
    }

    let product_status: ProductStatus = product.status.parse()
        .unwrap_or(ProductStatus::Active);
    lifecycle::check_appeal(product_status, incident.appeal_reason.as_deref())?;

    // Conditional write: a concurrent appeal loses here rather than
    // overwriting the first one.
    let updated: Incident = diesel::update(
        incidents::table
            .find(incident_id)
            .filter(incidents::appeal_reason.is_null()),
    )
    .set((
        incidents::status.eq(IncidentStatus::Appealed.to_string()),
        incidents::appeal_reason.eq(&body.reason),
        incidents::updated_at.eq(chrono::Utc::now()),
    ))
    .get_result(&mut conn)
    .optional()
    .map_err(|e| AppError::internal(format!("failed to record appeal: {e}")))?
    .ok_or_else(|| {
        AppError::new(
            ErrorCode::AppealAlreadySubmitted,
            "an appeal has already been submitted for this incident",
        )
    })?;

    publisher::publish_incident_appealed(&state.rabbitmq, &updated).await;

    tracing::info!(incident_id, product_id = %updated.product_id, "incident appealed");

    Ok(Json(ApiResponse::ok(updated)))
}
