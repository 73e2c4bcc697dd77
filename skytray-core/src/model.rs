use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::icons;

/// Longest forecast the presentation layer will show. The provider is asked
/// for exactly this many days; anything longer is truncated in `normalize`.
pub const MAX_FORECAST_DAYS: usize = 15;

/// Temperature unit preference. The provider performs the conversion (via a
/// request parameter), so values flow through the pipeline unconverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Imperial,
    Celsius,
}

impl UnitPreference {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitPreference::Imperial => "°F",
            UnitPreference::Celsius => "°C",
        }
    }
}

/// Geographic coordinates as resolved once per refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Current conditions exactly as the provider reported them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCurrent {
    pub weather_code: u16,
    pub temperature: f64,
}

/// One forecast day exactly as the provider reported it. Discarded after
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawForecastDay {
    pub date: NaiveDate,
    pub weather_code: u16,
    pub temp_high: f64,
    pub temp_low: f64,
}

/// Everything a single provider fetch returns.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWeather {
    pub current: RawCurrent,
    pub forecast: Vec<RawForecastDay>,
}

/// Presentation-ready forecast day.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// E.g. "Sat, Jun 01".
    pub label: String,
    pub is_weekend: bool,
    pub glyph: &'static str,
    pub description: &'static str,
    pub temp_high: f64,
    pub temp_low: f64,
    pub unit: UnitPreference,
}

impl ForecastDay {
    fn from_raw(raw: &RawForecastDay, unit: UnitPreference) -> Self {
        Self {
            date: raw.date,
            label: raw.date.format("%a, %b %d").to_string(),
            is_weekend: matches!(raw.date.weekday(), Weekday::Sat | Weekday::Sun),
            glyph: icons::glyph(raw.weather_code),
            description: icons::description(raw.weather_code),
            temp_high: raw.temp_high,
            temp_low: raw.temp_low,
            unit,
        }
    }
}

/// The single artifact one refresh cycle produces. Immutable once built; the
/// scheduler replaces the published model wholesale, never edits it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherModel {
    pub location_label: String,
    pub current_glyph: &'static str,
    pub current_description: &'static str,
    pub current_temperature: f64,
    pub unit: UnitPreference,
    pub forecast: Vec<ForecastDay>,
    pub last_updated: DateTime<Utc>,
}

impl WeatherModel {
    /// Build the presentation model from raw provider data. Pure apart from
    /// stamping `last_updated`; temperatures pass through unconverted, and an
    /// unrecognized weather code falls back to the unknown glyph rather than
    /// failing.
    pub fn normalize(
        location_label: impl Into<String>,
        current: &RawCurrent,
        forecast: &[RawForecastDay],
        unit: UnitPreference,
    ) -> Self {
        let forecast = forecast
            .iter()
            .take(MAX_FORECAST_DAYS)
            .map(|day| ForecastDay::from_raw(day, unit))
            .collect();

        Self {
            location_label: location_label.into(),
            current_glyph: icons::glyph(current.weather_code),
            current_description: icons::description(current.weather_code),
            current_temperature: current.temperature,
            unit,
            forecast,
            last_updated: Utc::now(),
        }
    }
}

/// Status of the in-flight (or most recent) refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Fetching,
    Succeeded,
    Failed(String),
}

/// Geolocation lookup failed, timed out, or returned something unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("location unavailable: {0}")]
pub struct LocationUnavailable(pub String);

/// Weather request failed. `status` is the HTTP status when the provider
/// answered at all; transport errors (timeout, connect, malformed payload)
/// carry no status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("weather fetch failed: {message}")]
pub struct WeatherFetchError {
    pub status: Option<u16>,
    pub message: String,
}

impl WeatherFetchError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: format!("HTTP {status}: {}", message.into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Any failure that aborts a refresh cycle. Caught at the scheduler boundary
/// and turned into a `RefreshState::Failed`; never escapes to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Location(#[from] LocationUnavailable),
    #[error(transparent)]
    Weather(#[from] WeatherFetchError),
}
