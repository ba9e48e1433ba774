//! Remote lookups against the Mapbox geocoding API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::LocationBackend;
use crate::error::LookupError;
use crate::model::Candidate;

/// Default Mapbox forward geocoding endpoint.
pub const MAPBOX_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

const DEFAULT_LIMIT: usize = 5;
const DEFAULT_TYPES: &str = "place,address,poi";

/// Location backend calling the Mapbox geocoding API.
///
/// The access token is injected at construction. Without one, every search
/// fails with [`LookupError::NotConfigured`] and no request is sent.
///
/// This backend is cheap to clone; clones share the HTTP client's pool.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use wayfinder_lib::backend::MapboxGeocoder;
///
/// let geocoder = MapboxGeocoder::new(Some("pk.my-token".to_string()))
///     .with_limit(3)
///     .with_timeout(Duration::from_secs(10));
///
/// let candidates = geocoder.search("pier 1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    token: Option<String>,
    endpoint: String,
    limit: usize,
    types: String,
    timeout: Option<Duration>,
    http_client: Client,
}

impl MapboxGeocoder {
    /// Creates a geocoder with the default endpoint, limit and place types.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            endpoint: MAPBOX_ENDPOINT.to_string(),
            limit: DEFAULT_LIMIT,
            types: DEFAULT_TYPES.to_string(),
            timeout: None,
            http_client: Client::new(),
        }
    }

    /// Sets the geocoding endpoint (the part before `/<query>.json`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the maximum number of results requested.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the comma-separated feature types requested.
    pub fn with_types(mut self, types: impl Into<String>) -> Self {
        self.types = types.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Returns `true` if a token was injected.
    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    /// Builds the request URL for `query`.
    fn request_url(&self, token: &str, query: &str) -> Result<Url, LookupError> {
        let raw = format!(
            "{}/{}.json",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(query)
        );
        let mut url = Url::parse(&raw).map_err(|e| LookupError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("access_token", token)
            .append_pair("autocomplete", "true")
            .append_pair("limit", &self.limit.to_string())
            .append_pair("types", &self.types);
        Ok(url)
    }
}

#[async_trait]
impl LocationBackend for MapboxGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        let Some(token) = self.token.as_deref() else {
            return Err(LookupError::NotConfigured);
        };

        let url = self.request_url(token, query)?;
        let mut request = self.http_client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            return Err(LookupError::http(status.as_u16(), message));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        parse_features(&body)
    }

    fn name(&self) -> &'static str {
        "mapbox"
    }
}

impl MapboxGeocoder {
    fn map_send_error(&self, error: reqwest::Error) -> LookupError {
        match self.timeout {
            Some(timeout) if error.is_timeout() => LookupError::Timeout(timeout),
            _ => LookupError::Network(error),
        }
    }
}

// =============================================================================
// Response mapping
// =============================================================================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    place_name: Option<String>,
    #[serde(default)]
    center: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Parses a geocoding response body into candidates.
pub fn parse_features(body: &str) -> Result<Vec<Candidate>, LookupError> {
    let collection: FeatureCollection = serde_json::from_str(body)
        .map_err(|e| LookupError::parse_with_body(e.to_string(), body))?;

    Ok(collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| feature.into_candidate(index))
        .collect())
}

impl Feature {
    fn into_candidate(self, index: usize) -> Candidate {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("location-{index}"));
        let name = match self.text.filter(|text| !text.is_empty()) {
            Some(text) => text,
            None => self
                .place_name
                .as_deref()
                .and_then(|place| place.split(',').next())
                .map(|segment| segment.trim().to_string())
                .unwrap_or_default(),
        };

        Candidate {
            id,
            name,
            address: self.place_name,
            distance: None,
            coordinates: self.center.map(Into::into),
        }
    }
}

/// Extracts the `message` field Mapbox puts in error bodies.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|error| error.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    #[test]
    fn test_parse_single_feature() {
        let body = r#"{"features":[{"id":"a1","text":"Pier 1","place_name":"Pier 1, SF, CA","center":[-122.4,37.8]}]}"#;
        let candidates = parse_features(body).unwrap();

        assert_eq!(
            candidates,
            vec![Candidate {
                id: "a1".to_string(),
                name: "Pier 1".to_string(),
                address: Some("Pier 1, SF, CA".to_string()),
                distance: None,
                coordinates: Some(Coordinates::new(-122.4, 37.8)),
            }]
        );
    }

    #[test]
    fn test_parse_fallbacks() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"place_name":"Ferry Building, San Francisco, California"},
            {"id":"poi.2","text":"Coit Tower"}
        ]}"#;
        let candidates = parse_features(body).unwrap();

        assert_eq!(candidates[0].id, "location-0");
        assert_eq!(candidates[0].name, "Ferry Building");
        assert_eq!(candidates[0].coordinates, None);
        assert_eq!(candidates[1].id, "poi.2");
        assert_eq!(candidates[1].address, None);
    }

    #[test]
    fn test_parse_missing_features_is_empty() {
        assert!(parse_features("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_features("not json").unwrap_err();
        assert!(matches!(err, LookupError::Parse { body: Some(_), .. }));
    }

    #[test]
    fn test_request_url() {
        let geocoder = MapboxGeocoder::new(Some("pk.test".to_string()));
        let url = geocoder.request_url("pk.test", "san francisco/ca").unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/san%20francisco%2Fca.json\
             ?access_token=pk.test&autocomplete=true&limit=5&types=place%2Caddress%2Cpoi"
        );
    }

    #[test]
    fn test_blank_token_is_not_configured() {
        assert!(!MapboxGeocoder::new(Some("   ".to_string())).is_configured());
        assert!(!MapboxGeocoder::new(None).is_configured());
        assert!(MapboxGeocoder::new(Some("pk.x".to_string())).is_configured());
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let geocoder = MapboxGeocoder::new(None).with_endpoint("http://127.0.0.1:1");
        let err = geocoder.search("san").await.unwrap_err();
        assert!(err.is_configuration());
    }
}
