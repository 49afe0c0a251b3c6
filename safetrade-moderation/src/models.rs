use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::incidents;

/// Reporter id recorded on incidents opened by the detection pipeline
/// instead of a human reporter.
pub const SYSTEM_REPORTER: Uuid = Uuid::nil();

/// Fixed comment stored on system-generated incidents.
pub const AUTO_DETECTION_COMMENT: &str = "Automatically flagged by content scan";

// --- Incident ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = incidents)]
pub struct Incident {
    pub id: i64,
    pub product_id: Uuid,
    pub incident_type: String,
    pub comment: Option<String>,
    pub reporter_id: Uuid,
    pub status: String,
    pub moderator_id: Option<Uuid>,
    pub appeal_moderator_id: Option<Uuid>,
    pub appeal_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    pub fn is_system_generated(&self) -> bool {
        self.reporter_id == SYSTEM_REPORTER
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = incidents)]
pub struct NewIncident {
    pub product_id: Uuid,
    pub incident_type: String,
    pub comment: Option<String>,
    pub reporter_id: Uuid,
    pub status: String,
}
