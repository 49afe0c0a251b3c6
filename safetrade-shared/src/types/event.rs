use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ Event envelope wrapping all domain events.
///
/// Routing key format: `safetrade.{domain}.{entity}.{action}`
/// Example: `safetrade.moderation.incident.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Auth events
    pub const AUTH_USER_REGISTERED: &str = "safetrade.auth.user.registered";

    // Catalog events
    pub const CATALOG_PRODUCT_CREATED: &str = "safetrade.catalog.product.created";
    pub const CATALOG_PRODUCT_UPDATED: &str = "safetrade.catalog.product.updated";
    pub const CATALOG_PRODUCT_STATUS_CHANGED: &str = "safetrade.catalog.product.status_changed";
    pub const CATALOG_PRODUCT_LIKED: &str = "safetrade.catalog.product.liked";

    // Moderation events
    pub const MODERATION_INCIDENT_CREATED: &str = "safetrade.moderation.incident.created";
    pub const MODERATION_INCIDENT_ASSIGNED: &str = "safetrade.moderation.incident.assigned";
    pub const MODERATION_INCIDENT_APPEALED: &str = "safetrade.moderation.incident.appealed";
    pub const MODERATION_INCIDENT_RESOLVED: &str = "safetrade.moderation.incident.resolved";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub user_id: Uuid,
        pub email: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProductCreated {
        pub product_id: Uuid,
        pub seller_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProductUpdated {
        pub product_id: Uuid,
        pub seller_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProductStatusChanged {
        pub product_id: Uuid,
        pub status: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProductLiked {
        pub product_id: Uuid,
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct IncidentCreated {
        pub incident_id: i64,
        pub product_id: Uuid,
        pub reporter_id: Uuid,
        pub incident_type: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct IncidentAssigned {
        pub incident_id: i64,
        pub moderator_id: Uuid,
        pub appeal: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct IncidentAppealed {
        pub incident_id: i64,
        pub product_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct IncidentResolved {
        pub incident_id: i64,
        pub product_id: Uuid,
        pub final_status: String,
        pub product_status: String,
    }
}
