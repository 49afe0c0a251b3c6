use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use safetrade_shared::types::ProductStatus;

/// Internal view of a product as served by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub status: String,
}

/// Client for the catalog service's internal routes (service-to-service).
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn find_product(&self, product_id: Uuid) -> Result<Option<ProductRecord>, String> {
        let url = format!("{}/internal/products/{}", self.base_url, product_id);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("catalog lookup failed: {e}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(format!("catalog lookup error: {}", response.status()));
        }

        let product = response
            .json::<ProductRecord>()
            .await
            .map_err(|e| format!("catalog response parse failed: {e}"))?;
        Ok(Some(product))
    }

    /// The dumb status setter. Returns false when the product does not exist.
    pub async fn change_status(
        &self,
        product_id: Uuid,
        status: ProductStatus,
    ) -> Result<bool, String> {
        let url = format!("{}/internal/products/{}/status", self.base_url, product_id);
        let response = self.client
            .patch(&url)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(|e| format!("catalog status change failed: {e}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(format!("catalog status change error: {}", response.status()));
        }
        Ok(true)
    }

    pub async fn active_products(&self) -> Result<Vec<ProductRecord>, String> {
        let url = format!("{}/internal/products/active", self.base_url);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("catalog active listing fetch failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("catalog active listing error: {}", response.status()));
        }

        response
            .json::<Vec<ProductRecord>>()
            .await
            .map_err(|e| format!("catalog response parse failed: {e}"))
    }

    /// Batch summaries for dashboard enrichment. Degrades to an empty list
    /// when the catalog is unreachable.
    pub async fn product_summaries(&self, product_ids: &[Uuid]) -> Vec<ProductSummary> {
        if product_ids.is_empty() {
            return vec![];
        }
        let url = format!("{}/internal/products/batch", self.base_url);
        let result = self.client
            .post(&url)
            .json(&serde_json::json!({ "product_ids": product_ids }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                response.json().await.unwrap_or_default()
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "product batch lookup failed");
                vec![]
            }
            Err(e) => {
                tracing::warn!(error = %e, "product batch lookup failed");
                vec![]
            }
        }
    }
}

/// Internal view of a user as served by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub role: String,
}

/// Client for the auth service's internal user-directory routes.
#[derive(Clone)]
pub struct UserDirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl UserDirectoryClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, String> {
        let url = format!("{}/internal/users/{}", self.base_url, user_id);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("user lookup failed: {e}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(format!("user lookup error: {}", response.status()));
        }

        let user = response
            .json::<UserRecord>()
            .await
            .map_err(|e| format!("user response parse failed: {e}"))?;
        Ok(Some(user))
    }

    /// Batch summaries for dashboard enrichment. Degrades to an empty list
    /// when the auth service is unreachable.
    pub async fn user_summaries(&self, user_ids: &[Uuid]) -> Vec<UserSummary> {
        if user_ids.is_empty() {
            return vec![];
        }
        let url = format!("{}/internal/users/batch", self.base_url);
        let result = self.client
            .post(&url)
            .json(&serde_json::json!({ "user_ids": user_ids }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                response.json().await.unwrap_or_default()
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "user batch lookup failed");
                vec![]
            }
            Err(e) => {
                tracing::warn!(error = %e, "user batch lookup failed");
                vec![]
            }
        }
    }
}
