use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    config::WeatherConfig,
    error::FetchError,
    http::HttpFetcher,
    model::{Coordinates, WeatherReading},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions at `coords` using `api_key`.
    async fn current_weather(
        &self,
        coords: Coordinates,
        api_key: &str,
    ) -> Result<WeatherReading, FetchError>;
}

/// Construct the OpenWeather provider described by `config`.
pub fn provider_from_config(config: &WeatherConfig) -> Arc<dyn WeatherProvider> {
    Arc::new(OpenWeatherProvider::new(
        HttpFetcher::new(),
        config.endpoint.clone(),
        config.units.clone(),
    ))
}
