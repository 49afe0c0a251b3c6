use uuid::Uuid;

use safetrade_shared::clients::rabbitmq::RabbitMQClient;
use safetrade_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_user_registered(rabbitmq: &RabbitMQClient, user_id: Uuid, email: &str) {
    let event = Event::new(
        "safetrade-auth",
        routing_keys::AUTH_USER_REGISTERED,
        payloads::UserRegistered {
            user_id,
            email: email.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::AUTH_USER_REGISTERED, &event).await {
        tracing::error!(error = %e, "failed to publish user.registered event");
    }
}
