use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Coordinates, RawForecast};

pub mod open_meteo;

/// A source of hourly weather observations for a set of coordinates.
///
/// One call fetches the current forecast day's hourly series plus the daily
/// sunrise/sunset pair, in the source's local timezone. Implementations must
/// report transport failures as `SourceUnavailable` and responses missing
/// any required series as `MalformedResponse`; they never substitute
/// defaults for missing data.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<RawForecast>;
}
