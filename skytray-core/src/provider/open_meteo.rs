//! Open-Meteo client. Free, keyless, and able to convert units server-side,
//! which keeps conversion out of the pipeline entirely.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{
    Coordinates, MAX_FORECAST_DAYS, RawCurrent, RawForecastDay, RawWeather, UnitPreference,
    WeatherFetchError,
};
use crate::provider::{WeatherProvider, validate_coordinates};

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    base_url: String,
}

impl OpenMeteoProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build weather HTTP client")?;

        Ok(Self {
            http,
            base_url: OPEN_METEO_URL.to_string(),
        })
    }

    /// Point the provider at an alternative endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: UnitPreference,
    ) -> Result<RawWeather, WeatherFetchError> {
        validate_coordinates(coordinates)?;

        let mut query = vec![
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
            ),
            ("timezone", "auto".to_string()),
            ("forecast_days", MAX_FORECAST_DAYS.to_string()),
        ];
        // Celsius is Open-Meteo's default; only Imperial needs the parameter.
        if unit == UnitPreference::Imperial {
            query.push(("temperature_unit", "fahrenheit".to_string()));
        }

        let res = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(request_error)?;

        let status = res.status();
        let body = res.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(WeatherFetchError::http(status.as_u16(), truncate_body(&body)));
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body).map_err(|e| {
            WeatherFetchError::transport(format!("malformed forecast payload: {e}"))
        })?;

        Ok(parsed.into_raw())
    }
}

fn request_error(err: reqwest::Error) -> WeatherFetchError {
    if err.is_timeout() {
        WeatherFetchError::transport("request timed out")
    } else {
        WeatherFetchError::transport(err.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    weather_code: u16,
}

/// Open-Meteo reports daily values as parallel column arrays.
#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<NaiveDate>,
    weather_code: Vec<u16>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

impl OmForecastResponse {
    fn into_raw(self) -> RawWeather {
        let OmDaily {
            time,
            weather_code,
            temperature_2m_max,
            temperature_2m_min,
        } = self.daily;

        // Zipping truncates to the shortest column if the arrays ever disagree.
        let forecast = time
            .into_iter()
            .zip(weather_code)
            .zip(temperature_2m_max.into_iter().zip(temperature_2m_min))
            .map(|((date, code), (high, low))| RawForecastDay {
                date,
                weather_code: code,
                temp_high: high,
                temp_low: low,
            })
            .collect();

        RawWeather {
            current: RawCurrent {
                weather_code: self.current.weather_code,
                temperature: self.current.temperature_2m,
            },
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COORDS: Coordinates = Coordinates {
        latitude: 40.7,
        longitude: -74.0,
    };

    fn provider(server: &MockServer) -> OpenMeteoProvider {
        OpenMeteoProvider::new(Duration::from_secs(2))
            .expect("client should build")
            .with_base_url(format!("{}/v1/forecast", server.uri()))
    }

    fn sample_body(days: usize) -> serde_json::Value {
        let start = NaiveDate::parse_from_str("2024-06-01", "%Y-%m-%d").expect("valid date");
        let time: Vec<String> = (0..days)
            .map(|i| (start + chrono::Duration::days(i as i64)).to_string())
            .collect();
        serde_json::json!({
            "current": {"temperature_2m": 72.0, "weather_code": 0},
            "daily": {
                "time": time,
                "weather_code": vec![0u16; days],
                "temperature_2m_max": vec![75.0; days],
                "temperature_2m_min": vec![60.0; days],
            },
        })
    }

    #[tokio::test]
    async fn fetch_parses_current_and_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "40.7"))
            .and(query_param("longitude", "-74"))
            .and(query_param("forecast_days", "15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body(15)))
            .mount(&server)
            .await;

        let raw = provider(&server)
            .fetch(COORDS, UnitPreference::Celsius)
            .await
            .expect("fetch should succeed");
        assert_eq!(raw.current.temperature, 72.0);
        assert_eq!(raw.current.weather_code, 0);
        assert_eq!(raw.forecast.len(), 15);
        assert_eq!(raw.forecast[0].date.to_string(), "2024-06-01");
        assert_eq!(raw.forecast[14].date.to_string(), "2024-06-15");
    }

    #[tokio::test]
    async fn imperial_requests_fahrenheit_from_the_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body(3)))
            .mount(&server)
            .await;

        let raw = provider(&server)
            .fetch(COORDS, UnitPreference::Imperial)
            .await
            .expect("fetch should succeed");
        // Values come back as sent: the provider converted, not us.
        assert_eq!(raw.forecast[0].temp_high, 75.0);
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .fetch(COORDS, UnitPreference::Imperial)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(500));
        assert!(err.message.contains("boom"));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"current\": {}}"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .fetch(COORDS, UnitPreference::Imperial)
            .await
            .unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.message.contains("malformed forecast payload"));
    }

    #[tokio::test]
    async fn timeout_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_body(1))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new(Duration::from_millis(50))
            .expect("client should build")
            .with_base_url(format!("{}/v1/forecast", server.uri()));

        let err = provider.fetch(COORDS, UnitPreference::Imperial).await.unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn invalid_coordinates_fail_before_any_request() {
        let server = MockServer::start().await;
        // No mock mounted: a request would 404 and fail differently.
        let err = provider(&server)
            .fetch(
                Coordinates { latitude: 95.0, longitude: 0.0 },
                UnitPreference::Imperial,
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("out of range"));
    }

    #[tokio::test]
    async fn short_forecast_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body(4)))
            .mount(&server)
            .await;

        let raw = provider(&server)
            .fetch(COORDS, UnitPreference::Celsius)
            .await
            .expect("fetch should succeed");
        assert_eq!(raw.forecast.len(), 4);
    }
}
