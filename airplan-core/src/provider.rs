use crate::{
    Config,
    error::Result,
    model::{Forecast, Place},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of hourly air quality forecasts.
#[async_trait]
pub trait AirQualityProvider: Send + Sync + Debug {
    /// Resolve `place` and fetch its hourly AQI forecast (up to 24 samples).
    async fn forecast(&self, place: &Place) -> Result<Forecast>;
}

/// Construct the OpenWeather provider from config. Fails with
/// `Error::MissingApiKey` before any network call when no credential is
/// available.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn AirQualityProvider>> {
    let api_key = config.resolve_api_key()?;
    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}
