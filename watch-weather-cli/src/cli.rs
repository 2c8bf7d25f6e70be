use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use watch_weather_core::{
    Config, Coordinates, Credentials, JsonLinesBridge, Locator, Relay, Services, Settings,
    config_page::config_page_json, location::FixedLocator, locator_from_config,
    model::KEY_API_KEY, provider_from_config,
};

use crate::{form, host};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "watch-weather", version, about = "Weather companion for the watchface")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the settings page and store the answers.
    Configure,

    /// Print the settings page descriptor as JSON.
    Schema,

    /// Relay bridge events read from stdin; device messages go to stdout.
    Run,

    /// Fetch the weather once and print the device message.
    Fetch {
        /// Latitude override; requires --lon.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude override; requires --lat.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// API key sent as if the watch had it stored.
        #[arg(long)]
        api_key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => {
                let current = Settings::load()?;
                if let Some(settings) = form::render(&current)? {
                    settings.save()?;
                    info!(path = %Settings::settings_file_path()?.display(), "settings saved");
                }
            }
            Command::Schema => {
                println!("{}", config_page_json().context("Failed to serialize settings page")?);
            }
            Command::Run => {
                let config = Config::load()?;
                warn_on_missing_key(&config);
                host::run(&config).await?;
            }
            Command::Fetch { lat, lon, api_key } => {
                let config = Config::load()?;
                warn_on_missing_key(&config);
                let mut payload = Settings::load()?.to_payload();
                if let Some(key) = api_key {
                    payload = payload.with(KEY_API_KEY, key);
                }

                let locator: Arc<dyn Locator> = match (lat, lon) {
                    (Some(lat), Some(lon)) => {
                        Arc::new(FixedLocator::new(Coordinates::new(lat, lon)))
                    }
                    _ => locator_from_config(&config.location),
                };
                let services = Services {
                    locator,
                    provider: provider_from_config(&config.weather),
                    bridge: Arc::new(JsonLinesBridge::new(tokio::io::stdout())),
                };
                let mut relay = Relay::new(
                    services,
                    Credentials::new(config.weather.default_api_key.clone()),
                    config.location.locate_options(),
                );

                relay.on_app_message(&payload).run().await?;
            }
        }

        Ok(())
    }
}

pub(crate) fn warn_on_missing_key(config: &Config) {
    if config.weather.default_api_key.is_empty() {
        warn!(
            "No built-in OpenWeather key configured; requests fail unless the watch sends one.\n\
             Hint: set `default_api_key` under [weather] in {}",
            Config::config_file_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "config.toml".into())
        );
    }
}
