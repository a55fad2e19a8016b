use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Coordinates, FEATURE_NAMES, HourlySeries, RawForecast};

use super::WeatherSource;

/// Default Open-Meteo forecast endpoint.
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Weather source backed by the Open-Meteo forecast API (no API key
/// required). Requests exactly the 13 model variables for the current
/// forecast day, in the location's local timezone.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    base_url: String,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new() -> Self {
        Self::with_base_url(FORECAST_URL.to_string())
    }

    /// Override the endpoint, e.g. to point at a local mock server.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }
}

impl Default for OpenMeteoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: HourlySeries,
    daily: OmDaily,
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<RawForecast> {
        debug!(%coordinates, "fetching hourly forecast");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("hourly", FEATURE_NAMES.join(",")),
                ("daily", "sunrise,sunset".to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("forecast request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            Error::SourceUnavailable(format!("failed to read forecast response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        // Every required series is a mandatory field of `HourlySeries`, so a
        // single parse converts any missing variable into one well-defined
        // error instead of scattered lookup failures.
        let parsed: OmForecastResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("forecast JSON: {e}")))?;

        let sunrise = parsed
            .daily
            .sunrise
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("daily 'sunrise' is empty".to_string()))?;
        let sunset = parsed
            .daily
            .sunset
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("daily 'sunset' is empty".to_string()))?;

        Ok(RawForecast {
            hourly: parsed.hourly,
            sunrise,
            sunset,
        })
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

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn forecast_body() -> serde_json::Value {
        let series = |v: f64| json!([v, v + 1.0]);
        json!({
            "hourly": {
                "time": ["2026-08-29T00:00", "2026-08-29T01:00"],
                "temperature_2m": series(24.0),
                "dew_point_2m": series(18.0),
                "relative_humidity_2m": series(70.0),
                "cloud_cover": series(40.0),
                "wind_speed_10m": series(12.0),
                "weather_code": json!([61, 61]),
                "surface_pressure": series(950.0),
                "pressure_msl": series(1010.0),
                "visibility": series(8000.0),
                "rain": series(0.4),
                "is_day": json!([1, 1]),
                "uv_index": series(3.0),
                "shortwave_radiation": series(420.0),
            },
            "daily": {
                "sunrise": ["2026-08-29T06:01"],
                "sunset": ["2026-08-29T18:33"],
            }
        })
    }

    #[tokio::test]
    async fn fetch_forecast_parses_series_and_daily_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("forecast_days", "1"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::with_base_url(format!("{}/v1/forecast", server.uri()));
        let coords = Coordinates::new(12.97, 77.59).unwrap();

        let forecast = source.fetch_forecast(coords).await.unwrap();
        assert_eq!(forecast.sunrise, "2026-08-29T06:01");
        assert_eq!(forecast.sunset, "2026-08-29T18:33");
        assert_eq!(forecast.hourly.temperature_2m, vec![24.0, 25.0]);
        assert_eq!(forecast.hourly.latest().unwrap().rain, 1.4);
    }

    #[tokio::test]
    async fn fetch_forecast_missing_variable_is_malformed() {
        let server = MockServer::start().await;
        let mut body = forecast_body();
        body["hourly"]
            .as_object_mut()
            .unwrap()
            .remove("uv_index");
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::with_base_url(format!("{}/v1/forecast", server.uri()));
        let coords = Coordinates::new(12.97, 77.59).unwrap();

        let err = source.fetch_forecast(coords).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(err.to_string().contains("uv_index"));
    }

    #[tokio::test]
    async fn fetch_forecast_http_error_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::with_base_url(format!("{}/v1/forecast", server.uri()));
        let coords = Coordinates::new(12.97, 77.59).unwrap();

        let err = source.fetch_forecast(coords).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn fetch_forecast_missing_sunrise_is_malformed() {
        let server = MockServer::start().await;
        let mut body = forecast_body();
        body["daily"]["sunrise"] = json!([]);
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let source = OpenMeteoSource::with_base_url(format!("{}/v1/forecast", server.uri()));
        let coords = Coordinates::new(12.97, 77.59).unwrap();

        let err = source.fetch_forecast(coords).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn truncate_body_backs_off_to_char_boundary() {
        // 300 bytes of 3-byte chars puts byte 200 inside a character.
        let body = "雨".repeat(100);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated, format!("{}...", "雨".repeat(66)));
    }
}
