use serde::Deserialize;
use uuid::Uuid;

/// Client for the moderation service's internal detection route.
#[derive(Clone)]
pub struct ModerationClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    dangerous: bool,
}

impl ModerationClient {
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

    /// Ask the moderation service to scan a product. Returns the verdict;
    /// recording the system incident is the moderation service's business.
    pub async fn detect(&self, product_id: Uuid) -> Result<bool, String> {
        let url = format!("{}/internal/detection/{}", self.base_url, product_id);
        let response = self.client
            .post(&url)
            .send()
            .await
            .map_err(|e| format!("detection request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("detection API error: {}", response.status()));
        }

        let verdict: DetectionResponse = response
            .json()
            .await
            .map_err(|e| format!("detection response parse failed: {e}"))?;
        Ok(verdict.dangerous)
    }
}
