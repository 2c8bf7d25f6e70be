use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::FetchError,
    http::HttpFetcher,
    model::{Conditions, Coordinates, WeatherReading},
};

use super::WeatherProvider;

pub const DEFAULT_ENDPOINT: &str = "http://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_UNITS: &str = "imperial";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    http: HttpFetcher,
    endpoint: String,
    units: String,
}

impl OpenWeatherProvider {
    pub fn new(http: HttpFetcher, endpoint: String, units: String) -> Self {
        Self {
            http,
            endpoint,
            units,
        }
    }

    /// Current-weather URL for `coords`, keyed with `api_key`.
    pub fn request_url(&self, coords: Coordinates, api_key: &str) -> Result<Url, FetchError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", self.units.clone()),
            ],
        )
        .map_err(|_| FetchError::InvalidUrl(self.endpoint.clone()))
    }
}

impl Default for OpenWeatherProvider {
    fn default() -> Self {
        Self::new(HttpFetcher::new(), DEFAULT_ENDPOINT.to_string(), DEFAULT_UNITS.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

/// Translate a current-weather JSON body into a reading.
///
/// Only `main.temp` and `weather[0].id` are read.
pub fn translate_response(body: &str) -> Result<WeatherReading, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(FetchError::Decode)?;

    let temperature_f = parsed
        .main
        .and_then(|m| m.temp)
        .ok_or(FetchError::MissingField("main.temp"))?;

    let id = parsed
        .weather
        .first()
        .and_then(|w| w.id)
        .ok_or(FetchError::MissingField("weather[0].id"))?;

    Ok(WeatherReading {
        temperature_f,
        conditions: Conditions::from_condition_code(id),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(
        &self,
        coords: Coordinates,
        api_key: &str,
    ) -> Result<WeatherReading, FetchError> {
        let url = self.request_url(coords, api_key)?;
        let body = self.http.fetch_text(Method::GET, url).await?;
        let reading = translate_response(&body)?;

        debug!(?reading, "translated OpenWeather response");
        Ok(reading)
    }
}
