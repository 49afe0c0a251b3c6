use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use safetrade_shared::errors::{AppError, AppResult, ErrorCode};
use safetrade_shared::middleware::ModeratorUser;
use safetrade_shared::types::api::ApiResponse;
use safetrade_shared::types::pagination::{Paginated, PaginationParams};
use safetrade_shared::types::ProductStatus;

use crate::clients::{ProductSummary, UserSummary};
use crate::events::publisher;
use crate::lifecycle::{self, AssignmentSlot, AssignmentView, IncidentStatus, ResolutionVerdict};
use crate::models::Incident;
use crate::schema::incidents;
use crate::AppState;

// --- List incidents by status ---

pub async fn list_incidents_by_status(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Path(status): Path<String>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Incident>>>> {
    let status: IncidentStatus = status.parse().map_err(|_| {
        AppError::new(
            ErrorCode::ValidationError,
            "status must be one of: pending, accepted, rejected, appealed",
        )
    })?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let offset = params.offset() as i64;
    let limit = params.limit() as i64;

    let items = incidents::table
        .filter(incidents::status.eq(status.to_string()))
        .order(incidents::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<Incident>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let total: i64 = incidents::table
        .filter(incidents::status.eq(status.to_string()))
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- List all incidents, enriched for the dashboard ---

#[derive(Debug, Serialize)]
pub struct IncidentDetail {
    #[serde(flatten)]
    pub incident: Incident,
    pub product: Option<ProductSummary>,
    pub moderator: Option<UserSummary>,
    pub appeal_moderator: Option<UserSummary>,
    pub reporter: Option<UserSummary>,
}

pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<IncidentDetail>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let offset = params.offset() as i64;
    let limit = params.limit() as i64;

    let items = incidents::table
        .order(incidents::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<Incident>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let total: i64 = incidents::table
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    // Collect referenced ids once, then enrich via the internal batch routes.
    let product_ids: Vec<Uuid> = dedup(items.iter().map(|i| i.product_id));
    let user_ids: Vec<Uuid> = dedup(
        items.iter().flat_map(|i| {
            [
                i.moderator_id,
                i.appeal_moderator_id,
                (!i.is_system_generated()).then_some(i.reporter_id),
            ]
            .into_iter()
            .flatten()
        }),
    );

    let products = state.catalog.product_summaries(&product_ids).await;
    let users = state.users.user_summaries(&user_ids).await;

    let find_user = |id: Option<Uuid>| -> Option<UserSummary> {
        id.and_then(|id| users.iter().find(|u| u.id == id).cloned())
    };

    let details: Vec<IncidentDetail> = items
        .into_iter()
        .map(|incident| {
            let product = products.iter().find(|p| p.id == incident.product_id).cloned();
            let reporter = if incident.is_system_generated() {
                None
            } else {
                find_user(Some(incident.reporter_id))
            };
            IncidentDetail {
                product,
                moderator: find_user(incident.moderator_id),
                appeal_moderator: find_user(incident.appeal_moderator_id),
                reporter,
                incident,
            }
        })
        .collect();

    let paginated = Paginated::new(details, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

fn dedup(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = ids.collect();
    out.sort_unstable();
    out.dedup();
    out
}

// --- Assign moderator ---

/// PATCH /moderation/incident/:id/assign/:moderator_id
///
/// The write is conditional on the slot still being empty, so the loser of
/// a near-simultaneous double assignment gets "already assigned" instead
/// of silently overwriting the winner.
pub async fn assign_moderator(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Path((incident_id, moderator_id)): Path<(i64, Uuid)>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let incident: Incident = incidents::table
        .find(incident_id)
        .first(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound, "incident not found"))?;

    let assignee = state.users
        .find_user(moderator_id)
        .await
        .map_err(|e| AppError::internal(format!("user lookup failed: {e}")))?;
    if assignee.is_none() {
        return Err(AppError::new(ErrorCode::ModeratorNotFound, "moderator not found"));
    }

    let view = AssignmentView {
        status: incident.status.parse().unwrap_or(IncidentStatus::Pending),
        moderator_id: incident.moderator_id,
        appeal_moderator_id: incident.appeal_moderator_id,
    };
    let slot = lifecycle::assignment_slot(&view, moderator_id)?;

    let updated: Incident = match slot {
        AssignmentSlot::Initial => diesel::update(
            incidents::table
                .find(incident_id)
                .filter(incidents::moderator_id.is_null()),
        )
        .set((
            incidents::moderator_id.eq(moderator_id),
            incidents::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("failed to assign moderator: {e}")))?
        .ok_or_else(|| {
            AppError::new(ErrorCode::AlreadyAssigned, "incident already assigned to a moderator")
        })?,
        AssignmentSlot::Appeal => diesel::update(
            incidents::table
                .find(incident_id)
                .filter(incidents::appeal_moderator_id.is_null()),
        )
        .set((
            incidents::appeal_moderator_id.eq(moderator_id),
            incidents::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("failed to assign appeal moderator: {e}")))?
        .ok_or_else(|| {
            AppError::new(ErrorCode::AlreadyAssigned, "appeal already assigned to a moderator")
        })?,
    };

    publisher::publish_incident_assigned(
        &state.rabbitmq,
        incident_id,
        moderator_id,
        slot == AssignmentSlot::Appeal,
    )
    .await;

    tracing::info!(incident_id, moderator_id = %moderator_id, slot = ?slot, "moderator assigned");

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Resolve incident ---

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub final_status: String,
}

/// PATCH /moderation/incident/:id/resolve
pub async fn resolve_incident(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Path(incident_id): Path<i64>,
    Json(body): Json<ResolveRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    apply_resolution(&state, incident_id, &body.final_status).await
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// PATCH /moderation/incident/:id/status
///
/// Legacy dashboard route; same semantics as resolve.
pub async fn update_incident_status(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Path(incident_id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    apply_resolution(&state, incident_id, &body.status).await
}

/// Shared resolution path.
///
/// The review phase is read off the incident itself (an appeal moderator on
/// record means this is the post-appeal ruling), and the product is driven
/// to the status that phase + verdict dictate. The appeal moderator field
/// is never written here; assignment is its only writer.
async fn apply_resolution(
    state: &AppState,
    incident_id: i64,
    verdict: &str,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let verdict: ResolutionVerdict = verdict.parse().map_err(|_| {
        AppError::new(
            ErrorCode::InvalidResolution,
            "final status must be 'accepted' or 'rejected'",
        )
    })?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let incident: Incident = incidents::table
        .find(incident_id)
        .first(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound, "incident not found"))?;

    let phase = lifecycle::review_phase(incident.appeal_moderator_id);
    let target = lifecycle::resolved_product_status(verdict, phase);

    // A listing deleted since the report was filed is skipped; any other
    // catalog failure aborts the resolution before the incident is touched.
    let product = state.catalog
        .find_product(incident.product_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, incident_id, "catalog lookup failed during resolution");
            AppError::new(ErrorCode::StatusChangeFailed, "could not update the listing status")
        })?;

    if product.is_some() {
        state.catalog
            .change_status(incident.product_id, target)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, incident_id, "status change failed during resolution");
                AppError::new(ErrorCode::StatusChangeFailed, "could not update the listing status")
            })?;
    }

    let updated: Incident = diesel::update(incidents::table.find(incident_id))
        .set((
            incidents::status.eq(verdict.incident_status().to_string()),
            incidents::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to resolve incident: {e}")))?;

    if let Some(product) = product {
        notify_owner(state, &product.seller_id, &product.name, target).await;
    }

    publisher::publish_incident_resolved(&state.rabbitmq, &updated, &target.to_string()).await;

    tracing::info!(
        incident_id,
        verdict = %updated.status,
        phase = ?phase,
        product_status = %target,
        "incident resolved"
    );

    Ok(Json(ApiResponse::ok(updated)))
}

/// Best-effort owner notification; a failed email never unwinds a ruling.
async fn notify_owner(state: &AppState, seller_id: &Uuid, product_name: &str, target: ProductStatus) {
    let owner = match state.users.find_user(*seller_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            tracing::warn!(seller_id = %seller_id, "listing owner not found, skipping notification");
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, seller_id = %seller_id, "owner lookup failed, skipping notification");
            return;
        }
    };

    let result = match target {
        ProductStatus::Suspended => state.email.send_listing_suspended(&owner.email, product_name).await,
        ProductStatus::Banned => state.email.send_listing_banned(&owner.email, product_name).await,
        ProductStatus::Active => state.email.send_listing_reinstated(&owner.email, product_name).await,
        _ => Ok(()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, seller_id = %seller_id, "failed to send resolution email");
    }
}
