//! Host position sources.
//!
//! The relay only needs "where is the phone right now". [`FixedLocator`]
//! answers with configured coordinates, [`IpLocator`] asks an IP lookup
//! service, and [`CachingLocator`] adds the timeout and position-age rules
//! on top of either.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    config::LocationConfig,
    error::LocateError,
    model::{Coordinates, Position},
};

/// Limits applied to one position query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateOptions {
    /// Give up on the lookup after this long.
    pub timeout: Duration,
    /// A previously obtained fix this young may be reused.
    pub maximum_age: Duration,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(60),
        }
    }
}

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn current_position(&self, options: &LocateOptions) -> Result<Position, LocateError>;
}

/// Always reports the same coordinates.
#[derive(Debug, Clone)]
pub struct FixedLocator {
    coords: Coordinates,
}

impl FixedLocator {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn current_position(&self, _options: &LocateOptions) -> Result<Position, LocateError> {
        Ok(Position {
            coords: self.coords,
            timestamp: Utc::now(),
        })
    }
}

/// Resolves the host position from its public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn current_position(&self, _options: &LocateOptions) -> Result<Position, LocateError> {
        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|source| LocateError::Request {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocateError::HttpStatus {
                url: self.endpoint.clone(),
                status,
            });
        }

        let body = res.text().await.map_err(|source| LocateError::Request {
            url: self.endpoint.clone(),
            source,
        })?;
        let parsed: IpLookupResponse = serde_json::from_str(&body).map_err(LocateError::Decode)?;

        match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Position {
                coords: Coordinates::new(lat, lon),
                timestamp: Utc::now(),
            }),
            _ => Err(LocateError::Unavailable(parsed.message.unwrap_or(parsed.status))),
        }
    }
}

/// Applies [`LocateOptions`] to an inner locator.
#[derive(Debug)]
pub struct CachingLocator<L> {
    inner: L,
    last: Mutex<Option<Position>>,
}

impl<L: Locator> CachingLocator<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    fn is_fresh(position: &Position, maximum_age: Duration) -> bool {
        match (Utc::now() - position.timestamp).to_std() {
            Ok(age) => age <= maximum_age,
            // Timestamp in the future; treat as just taken.
            Err(_) => true,
        }
    }
}

#[async_trait]
impl<L: Locator> Locator for CachingLocator<L> {
    async fn current_position(&self, options: &LocateOptions) -> Result<Position, LocateError> {
        if let Some(cached) = *self.last.lock().await {
            if Self::is_fresh(&cached, options.maximum_age) {
                debug!(?cached.coords, "reusing cached position");
                return Ok(cached);
            }
        }

        let position = tokio::time::timeout(options.timeout, self.inner.current_position(options))
            .await
            .map_err(|_| LocateError::Timeout(options.timeout))??;

        *self.last.lock().await = Some(position);
        Ok(position)
    }
}

/// Pick the position source described by `config`.
pub fn locator_from_config(config: &LocationConfig) -> Arc<dyn Locator> {
    if config.use_current_location {
        Arc::new(CachingLocator::new(IpLocator::new(config.lookup_endpoint.clone())))
    } else {
        Arc::new(CachingLocator::new(FixedLocator::new(config.fixed_coords())))
    }
}
