use uuid::Uuid;

use safetrade_shared::clients::rabbitmq::RabbitMQClient;
use safetrade_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Incident;

pub async fn publish_incident_created(rabbitmq: &RabbitMQClient, incident: &Incident) {
    let event = Event::new(
        "safetrade-moderation",
        routing_keys::MODERATION_INCIDENT_CREATED,
        payloads::IncidentCreated {
            incident_id: incident.id,
            product_id: incident.product_id,
            reporter_id: incident.reporter_id,
            incident_type: incident.incident_type.clone(),
        },
    )
    .with_user(incident.reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_INCIDENT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish incident.created event");
    }
}

pub async fn publish_incident_assigned(
    rabbitmq: &RabbitMQClient,
    incident_id: i64,
    moderator_id: Uuid,
    appeal: bool,
) {
    let event = Event::new(
        "safetrade-moderation",
        routing_keys::MODERATION_INCIDENT_ASSIGNED,
        payloads::IncidentAssigned {
            incident_id,
            moderator_id,
            appeal,
        },
    )
    .with_user(moderator_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_INCIDENT_ASSIGNED, &event).await {
        tracing::error!(error = %e, "failed to publish incident.assigned event");
    }
}

pub async fn publish_incident_appealed(rabbitmq: &RabbitMQClient, incident: &Incident) {
    let event = Event::new(
        "safetrade-moderation",
        routing_keys::MODERATION_INCIDENT_APPEALED,
        payloads::IncidentAppealed {
            incident_id: incident.id,
            product_id: incident.product_id,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_INCIDENT_APPEALED, &event).await {
        tracing::error!(error = %e, "failed to publish incident.appealed event");
    }
}

pub async fn publish_incident_resolved(
    rabbitmq: &RabbitMQClient,
    incident: &Incident,
    product_status: &str,
) {
    let event = Event::new(
        "safetrade-moderation",
        routing_keys::MODERATION_INCIDENT_RESOLVED,
        payloads::IncidentResolved {
            incident_id: incident.id,
            product_id: incident.product_id,
            final_status: incident.status.clone(),
            product_status: product_status.to_string(),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_INCIDENT_RESOLVED, &event).await {
        tracing::error!(error = %e, "failed to publish incident.resolved event");
    }
}
