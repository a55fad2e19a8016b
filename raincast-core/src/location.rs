use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Coordinates;

/// Default Open-Meteo geocoding endpoint.
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// One candidate place returned by the geocoding source, best match first.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub country: Option<String>,
}

/// Free-text place lookup returning a ranked candidate list.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, name: &str) -> Result<Vec<GeoCandidate>>;
}

/// Geocoder backed by the Open-Meteo geocoding API (no API key required).
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new() -> Self {
        Self::with_base_url(GEOCODING_URL.to_string())
    }

    /// Override the endpoint, e.g. to point at a local mock server.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }
}

impl Default for OpenMeteoGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeoCandidate>,
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, name: &str) -> Result<Vec<GeoCandidate>> {
        debug!(name, "geocoding place name");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("geocoding request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            Error::SourceUnavailable(format!("failed to read geocoding response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: GeocodingResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("geocoding JSON: {e}")))?;

        Ok(parsed.results)
    }
}

/// A click on the front end's map widget, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapClick {
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of the map input mode. `Pending` means no click has happened yet;
/// the caller should keep prompting rather than treat it as a failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapSelection {
    Selected(Coordinates),
    Pending,
}

/// Turns a place name, explicit coordinates, or a map click into one
/// best-effort `Coordinates` value. No caching and no retry: transient
/// geocoding failures propagate to the caller uninterpreted.
#[derive(Debug)]
pub struct LocationResolver {
    geocoder: Box<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Box<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve a free-text place name to the highest-ranked candidate.
    ///
    /// The name must contain letters and whitespace only; anything else is
    /// rejected with `InvalidInput` before any network call. An empty
    /// candidate list is `NotFound`.
    pub async fn resolve_by_name(&self, name: &str) -> Result<Coordinates> {
        let trimmed = name.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
        {
            return Err(Error::InvalidInput(format!(
                "place name '{name}' must contain letters and spaces only"
            )));
        }

        let candidates = self.geocoder.search(trimmed).await?;
        let best = candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(trimmed.to_string()))?;

        debug!(
            place = best.name.as_deref().unwrap_or(trimmed),
            latitude = best.latitude,
            longitude = best.longitude,
            "resolved place name"
        );

        Coordinates::new(best.latitude, best.longitude)
    }

    /// Range-check explicit coordinates; no network involved.
    pub fn resolve_by_coordinates(&self, latitude: f64, longitude: f64) -> Result<Coordinates> {
        Coordinates::new(latitude, longitude)
    }

    /// Resolve the map input mode. A missing click yields `Pending`, which
    /// is a prompt-again signal, not an error.
    pub fn resolve_by_map_click(&self, click: Option<MapClick>) -> Result<MapSelection> {
        match click {
            None => Ok(MapSelection::Pending),
            Some(click) => {
                Coordinates::new(click.latitude, click.longitude).map(MapSelection::Selected)
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Back off to a char boundary so multi-byte bodies can't panic the slice.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
