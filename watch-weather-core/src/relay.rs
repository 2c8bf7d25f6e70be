//! Event handling and the locate → fetch → deliver pipeline.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    bridge::{BridgeEvent, DeviceBridge},
    error::RelayError,
    location::{LocateOptions, Locator},
    model::{InboundMessage, OutboundMessage, WeatherReading},
    provider::WeatherProvider,
};

/// The credential used for the next weather fetch.
///
/// Each update starts from the built-in default, so an override only lasts
/// until the next inbound message that lacks one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    default_key: String,
    active_key: String,
}

impl Credentials {
    pub fn new(default_key: impl Into<String>) -> Self {
        let default_key = default_key.into();
        Self {
            active_key: default_key.clone(),
            default_key,
        }
    }

    pub fn active(&self) -> &str {
        &self.active_key
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Reset to the default, then take the payload's non-empty override.
    pub fn apply(&mut self, payload: &InboundMessage) {
        self.active_key = payload
            .api_key_override()
            .unwrap_or(&self.default_key)
            .to_string();
    }
}

/// Shared collaborators of every pipeline run.
#[derive(Debug, Clone)]
pub struct Services {
    pub locator: Arc<dyn Locator>,
    pub provider: Arc<dyn WeatherProvider>,
    pub bridge: Arc<dyn DeviceBridge>,
}

/// Reacts to bridge events.
#[derive(Debug)]
pub struct Relay {
    services: Services,
    credentials: Credentials,
    options: LocateOptions,
}

impl Relay {
    pub fn new(services: Services, credentials: Credentials, options: LocateOptions) -> Self {
        Self {
            services,
            credentials,
            options,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Handle one event.
    ///
    /// `Ready` is handled in place. An app message updates the credential
    /// before returning, so the returned job already carries the key it
    /// will use; the caller decides whether to await or spawn it.
    pub async fn dispatch(&mut self, event: BridgeEvent) -> Option<WeatherJob> {
        match event {
            BridgeEvent::Ready => {
                info!("device link ready");
                self.on_ready().await;
                None
            }
            BridgeEvent::AppMessage { payload } => {
                info!("app message received");
                Some(self.on_app_message(&payload))
            }
        }
    }

    /// Send the empty poke that makes the watch ask for weather.
    pub async fn on_ready(&self) {
        match self.services.bridge.send(&OutboundMessage::Poke).await {
            Ok(()) => info!("device poked"),
            Err(err) => error!(error = %err, "failed to poke device"),
        }
    }

    pub fn on_app_message(&mut self, payload: &InboundMessage) -> WeatherJob {
        self.credentials.apply(payload);

        WeatherJob {
            services: self.services.clone(),
            api_key: self.credentials.active().to_string(),
            options: self.options,
        }
    }
}

/// One weather fetch, bound to the credential active when it was created.
#[derive(Debug)]
pub struct WeatherJob {
    services: Services,
    api_key: String,
    options: LocateOptions,
}

impl WeatherJob {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Locate, fetch, translate and deliver. Any stage failure ends the run.
    pub async fn run(self) -> Result<WeatherReading, RelayError> {
        let position = self
            .services
            .locator
            .current_position(&self.options)
            .await
            .map_err(RelayError::Locate)?;

        let reading = self
            .services
            .provider
            .current_weather(position.coords, &self.api_key)
            .await
            .map_err(RelayError::Fetch)?;

        self.services
            .bridge
            .send(&OutboundMessage::Weather(reading))
            .await
            .map_err(RelayError::Deliver)?;

        Ok(reading)
    }

    /// [`run`](Self::run), with the outcome reported through the log only.
    pub async fn run_logged(self) {
        match self.run().await {
            Ok(reading) => info!(
                temperature = reading.temperature_f,
                conditions = reading.conditions.as_u8(),
                "weather sent to device"
            ),
            Err(err @ RelayError::Locate(_)) => {
                warn!(stage = err.stage(), error = ?err, "location unavailable, skipping fetch")
            }
            Err(err) => error!(stage = err.stage(), error = ?err, "weather update aborted"),
        }
    }
}
