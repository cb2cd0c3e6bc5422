use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{Forecast, ForecastPoint, Place},
};

use super::AirQualityProvider;

const GEO_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const FORECAST_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution/forecast";

/// Only the next 24 hourly samples are kept.
const FORECAST_HOURS: usize = 24;

/// Fixed timeout for each upstream call; failures surface immediately,
/// there are no retries.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, http }
    }

    /// Resolve a place name to coordinates via the geocoding endpoint.
    /// Zero results classify as `PlaceNotFound`.
    async fn geocode(&self, place: &Place) -> Result<(f64, f64)> {
        let query = place.query();

        let res = self
            .http
            .get(GEO_URL)
            .query(&[("q", query.as_str()), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::upstream("Failed to send request to OpenWeather (geocoding)", e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::upstream("Failed to read OpenWeather geocoding response body", e))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "OpenWeather geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: Vec<OwGeoEntry> = serde_json::from_str(&body)
            .map_err(|e| Error::upstream("Failed to parse OpenWeather geocoding JSON", e))?;

        let entry = parsed.first().ok_or_else(|| Error::PlaceNotFound(place.city.clone()))?;

        debug!(city = %place.city, lat = entry.lat, lon = entry.lon, "geocoded place");

        Ok((entry.lat, entry.lon))
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Forecast> {
        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                Error::upstream("Failed to send request to OpenWeather (air pollution forecast)", e)
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::upstream("Failed to read OpenWeather forecast response body", e))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "OpenWeather forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OwPollutionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::upstream("Failed to parse OpenWeather forecast JSON", e))?;

        let points = parsed
            .list
            .into_iter()
            .take(FORECAST_HOURS)
            .map(|entry| {
                let timestamp = unix_to_utc(entry.dt).ok_or_else(|| {
                    Error::Upstream(format!("OpenWeather returned invalid timestamp {}", entry.dt))
                })?;

                // The AQI category must stay in 1..=5; anything else means a
                // malformed upstream response.
                if !(1..=5).contains(&entry.main.aqi) {
                    return Err(Error::Upstream(format!(
                        "OpenWeather returned AQI {} outside 1..=5",
                        entry.main.aqi
                    )));
                }

                Ok(ForecastPoint { timestamp, aqi: entry.main.aqi })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(hours = points.len(), "fetched pollution forecast");

        Ok(Forecast { points })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwPollutionMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    dt: i64,
    main: OwPollutionMain,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[async_trait]
impl AirQualityProvider for OpenWeatherProvider {
    async fn forecast(&self, place: &Place) -> Result<Forecast> {
        let (lat, lon) = self.geocode(place).await?;
        self.fetch_forecast(lat, lon).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
