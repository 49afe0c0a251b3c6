use reqwest::Client;
use serde::Deserialize;

/// Nominatim-style forward geocoder. Lookups are advisory: a listing is saved
/// without coordinates when the geocoder is down or finds nothing.
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeHit {
    pub lat: String,
    pub lon: String,
}

impl GeocodingClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent("safetrade-backend")
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn geocode(&self, query: &str) -> Result<Option<(f64, f64)>, String> {
        let url = format!("{}/search", self.base_url);
        let response = self.client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| format!("geocoding request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("geocoding API error: {}", response.status()));
        }

        let hits: Vec<GeocodeHit> = response
            .json()
            .await
            .map_err(|e| format!("geocoding response parse failed: {e}"))?;

        Ok(first_coordinates(&hits))
    }
}

fn first_coordinates(hits: &[GeocodeHit]) -> Option<(f64, f64)> {
    let hit = hits.first()?;
    let lat = hit.lat.parse::<f64>().ok()?;
    let lon = hit.lon.parse::<f64>().ok()?;
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_hit() {
        let hits: Vec<GeocodeHit> = serde_json::from_str(
            r#"[{"lat": "48.8566", "lon": "2.3522"}, {"lat": "0", "lon": "0"}]"#,
        )
        .unwrap();
        assert_eq!(first_coordinates(&hits), Some((48.8566, 2.3522)));
    }

    #[test]
    fn empty_result_yields_none() {
        assert_eq!(first_coordinates(&[]), None);
    }

    #[test]
    fn malformed_coordinates_yield_none() {
        let hits = vec![GeocodeHit { lat: "not-a-number".into(), lon: "2.35".into() }];
        assert_eq!(first_coordinates(&hits), None);
    }
}
