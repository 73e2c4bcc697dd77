use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{Coordinates, RawWeather, UnitPreference, WeatherFetchError};

pub mod open_meteo;

/// One weather fetch per refresh cycle: current conditions plus the daily
/// forecast, in the measurement system the caller asked for. Implementations
/// make a single attempt with a bounded timeout; retry policy belongs to the
/// scheduler.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: UnitPreference,
    ) -> Result<RawWeather, WeatherFetchError>;
}

pub(crate) fn validate_coordinates(coordinates: Coordinates) -> Result<(), WeatherFetchError> {
    if coordinates.is_valid() {
        Ok(())
    } else {
        Err(WeatherFetchError::transport(format!(
            "coordinates out of range: ({}, {})",
            coordinates.latitude, coordinates.longitude
        )))
    }
}
