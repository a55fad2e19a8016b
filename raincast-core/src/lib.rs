//! Core library for the `raincast` rainfall-prediction dashboard.
//!
//! This crate defines:
//! - Configuration handling (model path, endpoint overrides)
//! - Location resolution (place name, coordinates, map click)
//! - The weather feature pipeline: fetch hourly observations, extract the
//!   latest-hour feature vector, predict precipitation, derive the report
//! - The prediction model abstraction and its random-forest implementation
//!
//! It is used by `raincast-cli` and `raincast-train`, but can also be reused
//! by other front ends or services.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod source;

pub use config::Config;
pub use error::{Error, Result};
pub use location::{GeoCandidate, Geocoder, LocationResolver, MapClick, MapSelection, OpenMeteoGeocoder};
pub use model::{
    AlertTier, Coordinates, FEATURE_NAMES, FeatureVector, HourlyRecord, HourlySample,
    HourlySeries, RawForecast, WeatherReport,
};
pub use pipeline::WeatherFeaturePipeline;
pub use predictor::{Predictor, RainfallModel};
pub use source::{WeatherSource, open_meteo::OpenMeteoSource};
