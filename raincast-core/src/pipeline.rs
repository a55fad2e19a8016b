use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{AlertTier, Coordinates, FeatureVector, WeatherReport};
use crate::predictor::Predictor;
use crate::source::WeatherSource;

/// Map a WMO weather code to a human-readable condition label.
///
/// Total over all integers: the 14 documented codes get their exact label,
/// everything else falls back to "Weather Unavailable".
pub fn condition_label(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Cloudy",
        45 => "Fog",
        48 => "Rime Fog",
        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Heavy Drizzle",
        61 => "Light Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        80 => "Rain Showers",
        95 => "Thunderstorm",
        _ => "Weather Unavailable",
    }
}

/// Format a visibility in meters as kilometers with one decimal place.
pub fn meters_to_km(meters: f64) -> String {
    format!("{:.1} km", meters / 1000.0)
}

/// Format a local ISO-8601 timestamp as a 12-hour clock with AM/PM.
/// Open-Meteo omits seconds, but the variant with seconds is accepted too.
pub fn format_clock(iso_time: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(iso_time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(iso_time, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| Error::MalformedResponse(format!("bad timestamp '{iso_time}': {e}")))?;
    Ok(parsed.format("%I:%M %p").to_string())
}

/// Coordinates in, presentation model out: one fetch, one feature
/// extraction, one prediction, one derivation pass.
///
/// Stateless and idempotent -- the same coordinates against the same
/// upstream snapshot yield the same report, and nothing is retained between
/// invocations. Both collaborators are injected so tests can swap in stubs.
#[derive(Debug)]
pub struct WeatherFeaturePipeline {
    source: Box<dyn WeatherSource>,
    predictor: Arc<dyn Predictor>,
}

impl WeatherFeaturePipeline {
    pub fn new(source: Box<dyn WeatherSource>, predictor: Arc<dyn Predictor>) -> Self {
        Self { source, predictor }
    }

    /// Run one fetch-and-predict cycle. Upstream failures propagate with
    /// their kind unchanged; there are no fallback values.
    pub async fn run(&self, coordinates: Coordinates) -> Result<WeatherReport> {
        let forecast = self.source.fetch_forecast(coordinates).await?;

        let latest = forecast.hourly.latest()?;
        let features = FeatureVector::from(&latest);
        let precipitation_mm = self.predictor.predict(&features)?;

        debug!(
            %coordinates,
            precipitation_mm,
            rain_now = latest.rain,
            "prediction complete"
        );

        Ok(WeatherReport {
            coordinates,
            condition: condition_label(latest.weather_code as i64),
            temperature_c: latest.temperature_2m,
            dew_point_c: latest.dew_point_2m,
            humidity_pct: latest.relative_humidity_2m,
            wind_kmh: latest.wind_speed_10m,
            pressure_msl_hpa: latest.pressure_msl,
            visibility_km: meters_to_km(latest.visibility),
            sunrise: format_clock(&forecast.sunrise)?,
            sunset: format_clock(&forecast.sunset)?,
            alert: AlertTier::from_rain_mm(latest.rain),
            precipitation_mm,
            rain_expected: precipitation_mm > 0.0,
            hourly_rain: forecast.hourly.rain_series(),
        })
    }
}
