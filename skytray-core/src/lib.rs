//! Core library for the `skytray` applet.
//!
//! This crate defines:
//! - Preference handling (unit, refresh interval, location override)
//! - The refresh pipeline: location resolution, weather fetch, normalization
//! - The scheduler that drives the pipeline and publishes presentation models
//!
//! It is used by `skytray-applet`, but can also be reused by other binaries or
//! services.

pub mod config;
pub mod icons;
pub mod location;
pub mod model;
pub mod provider;
pub mod scheduler;

pub use config::{Config, Preferences, RefreshInterval};
pub use location::{IpLocator, LocationSource, ResolvedLocation};
pub use model::{
    Coordinates, ForecastDay, LocationUnavailable, RawCurrent, RawForecastDay, RawWeather,
    RefreshError, RefreshState, UnitPreference, WeatherFetchError, WeatherModel,
};
pub use provider::{WeatherProvider, open_meteo::OpenMeteoProvider};
pub use scheduler::{Published, RefreshScheduler, SchedulerHandle};
