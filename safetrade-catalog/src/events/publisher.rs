use uuid::Uuid;

use safetrade_shared::clients::rabbitmq::RabbitMQClient;
use safetrade_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_product_created(
    rabbitmq: &RabbitMQClient,
    product_id: Uuid,
    seller_id: Uuid,
    name: &str,
) {
    let event = Event::new(
        "safetrade-catalog",
        routing_keys::CATALOG_PRODUCT_CREATED,
        payloads::ProductCreated {
            product_id,
            seller_id,
            name: name.to_string(),
        },
    )
    .with_user(seller_id);

    if let Err(e) = rabbitmq.publish(routing_keys::CATALOG_PRODUCT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish product.created event");
    }
}

pub async fn publish_product_updated(rabbitmq: &RabbitMQClient, product_id: Uuid, seller_id: Uuid) {
    let event = Event::new(
        "safetrade-catalog",
        routing_keys::CATALOG_PRODUCT_UPDATED,
        payloads::ProductUpdated {
            product_id,
            seller_id,
        },
    )
    .with_user(seller_id);

    if let Err(e) = rabbitmq.publish(routing_keys::CATALOG_PRODUCT_UPDATED, &event).await {
        tracing::error!(error = %e, "failed to publish product.updated event");
    }
}

pub async fn publish_product_status_changed(
    rabbitmq: &RabbitMQClient,
    product_id: Uuid,
    status: &str,
) {
    let event = Event::new(
        "safetrade-catalog",
        routing_keys::CATALOG_PRODUCT_STATUS_CHANGED,
        payloads::ProductStatusChanged {
            product_id,
            status: status.to_string(),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::CATALOG_PRODUCT_STATUS_CHANGED, &event).await {
        tracing::error!(error = %e, "failed to publish product.status_changed event");
    }
}

pub async fn publish_product_liked(rabbitmq: &RabbitMQClient, product_id: Uuid, user_id: Uuid) {
    let event = Event::new(
        "safetrade-catalog",
        routing_keys::CATALOG_PRODUCT_LIKED,
        payloads::ProductLiked {
            product_id,
            user_id,
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::CATALOG_PRODUCT_LIKED, &event).await {
        tracing::error!(error = %e, "failed to publish product.liked event");
    }
}
