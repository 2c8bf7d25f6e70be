//! Core library for the watchface weather companion.
//!
//! This crate defines:
//! - Configuration, stored settings and the settings page descriptor
//! - The OpenWeather provider and condition-code mapping
//! - Location sources and the device bridge abstraction
//! - The relay that turns bridge events into weather messages
//!
//! It is used by `watch-weather-cli`, but the relay can be driven by any host
//! that implements [`DeviceBridge`].

pub mod bridge;
pub mod config;
pub mod config_page;
pub mod error;
pub mod http;
pub mod location;
pub mod model;
pub mod provider;
pub mod relay;

pub use bridge::{BridgeEvent, DeviceBridge, JsonLinesBridge};
pub use config::{Config, LocationConfig, Settings, WeatherConfig};
pub use error::{BridgeError, FetchError, LocateError, RelayError};
pub use location::{LocateOptions, Locator, locator_from_config};
pub use model::{Conditions, Coordinates, InboundMessage, OutboundMessage, Position, WeatherReading};
pub use provider::{WeatherProvider, provider_from_config};
pub use relay::{Credentials, Relay, Services, WeatherJob};
