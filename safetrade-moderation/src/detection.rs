use diesel::prelude::*;

use crate::clients::ProductRecord;
use crate::events::publisher;
use crate::lifecycle::{IncidentStatus, IncidentType};
use crate::models::{Incident, NewIncident, AUTO_DETECTION_COMMENT, SYSTEM_REPORTER};
use crate::schema::incidents;
use crate::AppState;

/// Classify a product and, when flagged, record a system incident.
///
/// The verdict is returned no matter what happens to the incident insert:
/// detection must keep working when the audit trail cannot be written, so
/// persistence failures are logged and swallowed. Changing the product
/// status is explicitly NOT done here; that is the caller's move.
pub async fn scan_product(state: &AppState, product: &ProductRecord) -> bool {
    let dangerous = state.classifier.is_dangerous(&product.name, &product.description);

    if dangerous {
        tracing::info!(
            product_id = %product.id,
            name = %product.name,
            "dangerous listing detected"
        );
        record_detection(state, product).await;
    }

    dangerous
}

/// Best-effort system incident for a flagged product.
async fn record_detection(state: &AppState, product: &ProductRecord) {
    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, product_id = %product.id, "db pool error while recording detection");
            return;
        }
    };

    let new_incident = NewIncident {
        product_id: product.id,
        incident_type: IncidentType::Dangerous.to_string(),
        comment: Some(AUTO_DETECTION_COMMENT.to_string()),
        reporter_id: SYSTEM_REPORTER,
        status: IncidentStatus::Pending.to_string(),
    };

    match diesel::insert_into(incidents::table)
        .values(&new_incident)
        .get_result::<Incident>(&mut conn)
    {
        Ok(incident) => {
            publisher::publish_incident_created(&state.rabbitmq, &incident).await;
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = %product.id, "failed to record detection incident");
        }
    }
}
