use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated latitude/longitude pair. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting out-of-range values with `InvalidInput`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.latitude, self.longitude)
    }
}

/// The `hourly` object of an Open-Meteo forecast response: one time series
/// plus the 13 variable series the model consumes. Every field is required;
/// a response missing any of them fails deserialization and is reported as
/// `MalformedResponse` at the fetch boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub dew_point_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub cloud_cover: Vec<f64>,
    pub wind_speed_10m: Vec<f64>,
    pub weather_code: Vec<f64>,
    pub surface_pressure: Vec<f64>,
    pub pressure_msl: Vec<f64>,
    pub visibility: Vec<f64>,
    pub rain: Vec<f64>,
    pub is_day: Vec<f64>,
    pub uv_index: Vec<f64>,
    pub shortwave_radiation: Vec<f64>,
}

impl HourlySeries {
    fn variable_lengths(&self) -> [(&'static str, usize); 13] {
        [
            ("temperature_2m", self.temperature_2m.len()),
            ("dew_point_2m", self.dew_point_2m.len()),
            ("relative_humidity_2m", self.relative_humidity_2m.len()),
            ("cloud_cover", self.cloud_cover.len()),
            ("wind_speed_10m", self.wind_speed_10m.len()),
            ("weather_code", self.weather_code.len()),
            ("surface_pressure", self.surface_pressure.len()),
            ("pressure_msl", self.pressure_msl.len()),
            ("visibility", self.visibility.len()),
            ("rain", self.rain.len()),
            ("is_day", self.is_day.len()),
            ("uv_index", self.uv_index.len()),
            ("shortwave_radiation", self.shortwave_radiation.len()),
        ]
    }

    /// Extract the most recent reported hour (index `len - 1` of every
    /// series) as the current snapshot. The last element is treated as "now"
    /// regardless of wall-clock time.
    ///
    /// Empty or unequal-length series are a `MalformedResponse`: the record
    /// is built from exactly one hour, never averaged or padded.
    pub fn latest(&self) -> Result<HourlyRecord> {
        let lengths = self.variable_lengths();
        let expected = lengths[0].1;
        for (name, len) in lengths {
            if len == 0 {
                return Err(Error::MalformedResponse(format!(
                    "hourly series '{name}' is empty"
                )));
            }
            if len != expected {
                return Err(Error::MalformedResponse(format!(
                    "hourly series '{name}' has {len} entries, expected {expected}"
                )));
            }
        }

        let last = expected - 1;
        Ok(HourlyRecord {
            temperature_2m: self.temperature_2m[last],
            dew_point_2m: self.dew_point_2m[last],
            relative_humidity_2m: self.relative_humidity_2m[last],
            cloud_cover: self.cloud_cover[last],
            wind_speed_10m: self.wind_speed_10m[last],
            weather_code: self.weather_code[last],
            surface_pressure: self.surface_pressure[last],
            pressure_msl: self.pressure_msl[last],
            visibility: self.visibility[last],
            rain: self.rain[last],
            is_day: self.is_day[last],
            uv_index: self.uv_index[last],
            shortwave_radiation: self.shortwave_radiation[last],
        })
    }

    /// Pair each hourly timestamp with its rain amount, for charting.
    pub fn rain_series(&self) -> Vec<HourlySample> {
        self.time
            .iter()
            .zip(self.rain.iter())
            .map(|(time, rain)| HourlySample {
                time: time.clone(),
                rain_mm: *rain,
            })
            .collect()
    }
}

/// One hour's worth of the 13 model variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyRecord {
    pub temperature_2m: f64,
    pub dew_point_2m: f64,
    pub relative_humidity_2m: f64,
    pub cloud_cover: f64,
    pub wind_speed_10m: f64,
    pub weather_code: f64,
    pub surface_pressure: f64,
    pub pressure_msl: f64,
    pub visibility: f64,
    pub rain: f64,
    pub is_day: f64,
    pub uv_index: f64,
    pub shortwave_radiation: f64,
}

/// One point of the hourly rain chart. The timestamp stays in the source's
/// local-time ISO form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySample {
    pub time: String,
    pub rain_mm: f64,
}

/// Everything one forecast fetch returns: the hourly series for the current
/// forecast day plus the daily sunrise/sunset pair as ISO-8601 local times.
/// Created fresh on every prediction request and discarded once the report
/// is built.
#[derive(Debug, Clone)]
pub struct RawForecast {
    pub hourly: HourlySeries,
    pub sunrise: String,
    pub sunset: String,
}

/// Variable names in the exact order the model was trained with. The trainer
/// uses this to locate CSV columns, so dashboard and trainer cannot drift
/// apart silently.
pub const FEATURE_NAMES: [&str; 13] = [
    "temperature_2m",
    "dew_point_2m",
    "relative_humidity_2m",
    "cloud_cover",
    "wind_speed_10m",
    "weather_code",
    "surface_pressure",
    "pressure_msl",
    "visibility",
    "rain",
    "is_day",
    "uv_index",
    "shortwave_radiation",
];

/// The fixed-order numeric input consumed by the prediction model.
///
/// Built from exactly one `HourlyRecord`; there are no defaults and no
/// imputation. The field order here must match `FEATURE_NAMES` and the order
/// used at training time -- a mismatch is a silent correctness bug, which is
/// why the ordering is pinned by a test rather than left implicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; 13]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; 13] {
        &self.0
    }

    pub fn to_vec(self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn from_ordered(values: [f64; 13]) -> Self {
        Self(values)
    }
}

impl From<&HourlyRecord> for FeatureVector {
    fn from(r: &HourlyRecord) -> Self {
        Self([
            r.temperature_2m,
            r.dew_point_2m,
            r.relative_humidity_2m,
            r.cloud_cover,
            r.wind_speed_10m,
            r.weather_code,
            r.surface_pressure,
            r.pressure_msl,
            r.visibility,
            r.rain,
            r.is_day,
            r.uv_index,
            r.shortwave_radiation,
        ])
    }
}

/// Coarse severity classification of the rain falling right now, derived
/// from the snapshot's raw `rain` value. Independent of the model's
/// predicted precipitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    None,
    LightRain,
    HeavyRain,
}

impl AlertTier {
    pub fn from_rain_mm(rain_mm: f64) -> Self {
        if rain_mm > 10.0 {
            AlertTier::HeavyRain
        } else if rain_mm > 0.0 {
            AlertTier::LightRain
        } else {
            AlertTier::None
        }
    }
}

/// The derived, read-only view handed to whatever front end renders it.
///
/// `precipitation_mm` is the regression output verbatim: the model has no
/// clamp, so slightly negative values can occur and are passed through.
/// Presentation decides how to show them; this crate does not round them
/// away.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub coordinates: Coordinates,
    pub condition: &'static str,
    pub temperature_c: f64,
    pub dew_point_c: f64,
    pub humidity_pct: f64,
    pub wind_kmh: f64,
    pub pressure_msl_hpa: f64,
    pub visibility_km: String,
    pub sunrise: String,
    pub sunset: String,
    pub alert: AlertTier,
    pub precipitation_mm: f64,
    pub rain_expected: bool,
    pub hourly_rain: Vec<HourlySample>,
}
