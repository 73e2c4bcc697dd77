//! Approximate location resolution.
//!
//! The default path asks ipinfo.io where the machine's public IP is. A
//! configured zipcode takes precedence and is geocoded through Nominatim
//! (OpenStreetMap) instead; both services are free and keyless.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;

use crate::model::{Coordinates, LocationUnavailable};

pub const IPINFO_URL: &str = "https://ipinfo.io/json";
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

// Nominatim's usage policy requires an identifying user agent.
const USER_AGENT: &str = concat!("skytray/", env!("CARGO_PKG_VERSION"));

/// Coordinates plus a human-readable place label for the dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub label: String,
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn resolve(&self) -> Result<ResolvedLocation, LocationUnavailable>;
}

#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    ipinfo_url: String,
    nominatim_url: String,
    zipcode: Option<String>,
}

impl IpLocator {
    pub fn new(timeout: Duration, zipcode: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build geolocation HTTP client")?;

        Ok(Self {
            http,
            ipinfo_url: IPINFO_URL.to_string(),
            nominatim_url: NOMINATIM_URL.to_string(),
            zipcode,
        })
    }

    /// Point the locator at alternative endpoints (used by tests).
    pub fn with_endpoints(
        mut self,
        ipinfo_url: impl Into<String>,
        nominatim_url: impl Into<String>,
    ) -> Self {
        self.ipinfo_url = ipinfo_url.into();
        self.nominatim_url = nominatim_url.into();
        self
    }

    async fn resolve_from_ip(&self) -> Result<ResolvedLocation, LocationUnavailable> {
        let res = self
            .http
            .get(&self.ipinfo_url)
            .send()
            .await
            .map_err(|e| LocationUnavailable(format!("ipinfo request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationUnavailable(format!("ipinfo returned HTTP {status}")));
        }

        let body: IpInfoResponse = res
            .json()
            .await
            .map_err(|e| LocationUnavailable(format!("malformed ipinfo response: {e}")))?;

        let loc = body
            .loc
            .as_deref()
            .ok_or_else(|| LocationUnavailable("ipinfo response has no loc field".to_string()))?;

        let coordinates = parse_lat_long(loc)?;

        let label = join_present(&[body.city, body.region, body.country]);
        let label = if label.is_empty() {
            "Unknown Location".to_string()
        } else {
            label
        };

        tracing::info!("location detected: {label} ({}, {})", coordinates.latitude, coordinates.longitude);
        Ok(ResolvedLocation { coordinates, label })
    }

    async fn resolve_from_zipcode(&self, zipcode: &str) -> Result<ResolvedLocation, LocationUnavailable> {
        let res = self
            .http
            .get(&self.nominatim_url)
            .query(&[("postalcode", zipcode), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| LocationUnavailable(format!("nominatim request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationUnavailable(format!(
                "nominatim returned HTTP {status}"
            )));
        }

        let places: Vec<NominatimPlace> = res
            .json()
            .await
            .map_err(|e| LocationUnavailable(format!("malformed nominatim response: {e}")))?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| LocationUnavailable(format!("no location found for zipcode {zipcode}")))?;

        let coordinates = Coordinates {
            latitude: parse_coordinate(&place.lat, "latitude")?,
            longitude: parse_coordinate(&place.lon, "longitude")?,
        };

        let label = place
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Zipcode {zipcode}"));

        tracing::info!("location set from zipcode {zipcode}: {label}");
        Ok(ResolvedLocation { coordinates, label })
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn resolve(&self) -> Result<ResolvedLocation, LocationUnavailable> {
        match &self.zipcode {
            Some(zipcode) => self.resolve_from_zipcode(zipcode).await,
            None => self.resolve_from_ip().await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// "latitude,longitude".
    loc: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

fn parse_lat_long(loc: &str) -> Result<Coordinates, LocationUnavailable> {
    let (lat, long) = loc
        .split_once(',')
        .ok_or_else(|| LocationUnavailable(format!("invalid loc format: {loc}")))?;

    Ok(Coordinates {
        latitude: parse_coordinate(lat, "latitude")?,
        longitude: parse_coordinate(long, "longitude")?,
    })
}

fn parse_coordinate(value: &str, what: &str) -> Result<f64, LocationUnavailable> {
    value
        .trim()
        .parse()
        .map_err(|_| LocationUnavailable(format!("invalid {what}: {value}")))
}

fn join_present(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
