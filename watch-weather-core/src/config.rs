use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{
    location::LocateOptions,
    model::{Coordinates, InboundMessage, KEY_AMERICAN_DATE, KEY_API_KEY},
    provider::openweather::{DEFAULT_ENDPOINT, DEFAULT_UNITS},
};

/// How the OpenWeather request is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Built-in credential used whenever the watch sends no override.
    pub default_api_key: String,
    pub endpoint: String,
    pub units: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            default_api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            units: DEFAULT_UNITS.to_string(),
        }
    }
}

/// Where the host position comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Look the position up on every request. When off, the fixed
    /// `latitude`/`longitude` are used instead.
    pub use_current_location: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub timeout_secs: u64,
    pub maximum_age_secs: u64,
    pub lookup_endpoint: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            use_current_location: true,
            latitude: 42.36,
            longitude: -71.1,
            timeout_secs: 15,
            maximum_age_secs: 60,
            lookup_endpoint: "http://ip-api.com/json".to_string(),
        }
    }
}

impl LocationConfig {
    pub fn fixed_coords(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn locate_options(&self) -> LocateOptions {
        LocateOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            maximum_age: Duration::from_secs(self.maximum_age_secs),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// default_api_key = "..."
///
/// [location]
/// use_current_location = false
/// latitude = 42.36
/// longitude = -71.1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherConfig,
    pub location: LocationConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        load_toml(&Self::config_file_path()?)
    }

    pub fn save(&self) -> Result<()> {
        save_toml(&Self::config_file_path()?, self)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}

/// Values the user submitted through the settings page.
///
/// This is the host-side store; the watch echoes these back in its requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub american_date: bool,
    pub open_weather_api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            american_date: true,
            open_weather_api_key: String::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        load_toml(&Self::settings_file_path()?)
    }

    pub fn save(&self) -> Result<()> {
        save_toml(&Self::settings_file_path()?, self)
    }

    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("settings.toml"))
    }

    /// Take whatever the submitted form mapping carries.
    pub fn apply_payload(&mut self, payload: &InboundMessage) {
        if let Some(flag) = payload.american_date() {
            self.american_date = flag;
        }
        if let Some(key) = payload.get(KEY_API_KEY).and_then(|v| v.as_str()) {
            self.open_weather_api_key = key.trim().to_string();
        }
    }

    /// The inbound mapping the watch sends after these settings were applied.
    pub fn to_payload(&self) -> InboundMessage {
        InboundMessage::new()
            .with(KEY_AMERICAN_DATE, self.american_date)
            .with(KEY_API_KEY, self.open_weather_api_key.clone())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "watch-weather", "watch-weather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

pub(crate) fn load_toml<T>(path: &Path) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        // First run: nothing stored yet.
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    toml::from_str(&contents).with_context(|| format!("Failed to parse file: {}", path.display()))
}

pub(crate) fn save_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let toml = toml::to_string_pretty(value).context("Failed to serialize to TOML")?;

    fs::write(path, toml).with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_companion_behavior() {
        let cfg = Config::default();

        assert_eq!(cfg.weather.endpoint, "http://api.openweathermap.org/data/2.5/weather");
        assert_eq!(cfg.weather.units, "imperial");
        assert!(cfg.location.use_current_location);
        assert_eq!(cfg.location.lookup_endpoint, "http://ip-api.com/json");

        let opts = cfg.location.locate_options();
        assert_eq!(opts.timeout, Duration::from_secs(15));
        assert_eq!(opts.maximum_age, Duration::from_secs(60));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [weather]
            default_api_key = "BUILTIN"

            [location]
            use_current_location = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.weather.default_api_key, "BUILTIN");
        assert_eq!(cfg.weather.units, "imperial");
        assert!(!cfg.location.use_current_location);
        assert_eq!(cfg.location.fixed_coords(), Coordinates::new(42.36, -71.1));
        assert_eq!(cfg.location.timeout_secs, 15);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let cfg: Config = load_toml(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[weather\nnope").unwrap();

        let err = load_toml::<Config>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse file"));
    }

    #[test]
    fn settings_survive_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            american_date: false,
            open_weather_api_key: "abc123".into(),
        };

        save_toml(&path, &settings).unwrap();
        let loaded: Settings = load_toml(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn submitted_form_updates_settings() {
        let mut settings = Settings {
            american_date: true,
            open_weather_api_key: "old".into(),
        };

        settings.apply_payload(
            &InboundMessage::new()
                .with(KEY_AMERICAN_DATE, false)
                .with(KEY_API_KEY, "  new-key "),
        );
        assert!(!settings.american_date);
        assert_eq!(settings.open_weather_api_key, "new-key");

        // Clearing the field goes back to the built-in key.
        settings.apply_payload(&InboundMessage::new().with(KEY_API_KEY, ""));
        assert_eq!(settings.open_weather_api_key, "");
        assert!(!settings.american_date);
    }

    #[test]
    fn settings_payload_carries_both_keys() {
        let payload = Settings::default().to_payload();

        assert_eq!(payload.american_date(), Some(true));
        assert_eq!(payload.api_key_override(), None);
        assert!(payload.get(KEY_API_KEY).is_some());
    }
}
