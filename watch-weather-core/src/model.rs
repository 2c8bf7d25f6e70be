use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Message key carrying the user's OpenWeather API key override.
pub const KEY_API_KEY: &str = "OpenWeatherAPIKey";
/// Message key carrying the date-format toggle.
pub const KEY_AMERICAN_DATE: &str = "AmericanDate";
/// Outbound key for the temperature in Fahrenheit.
pub const KEY_TEMPERATURE: &str = "TEMPERATURE";
/// Outbound key for the mapped condition category.
pub const KEY_CONDITIONS: &str = "CONDITIONS";

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A located fix together with the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coords: Coordinates,
    pub timestamp: DateTime<Utc>,
}

/// Compact sky/precipitation category understood by the watch firmware.
///
/// The discriminants are the wire values; the watch indexes its icon table
/// with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conditions {
    Sunny = 0,
    PartlyCloudy = 1,
    Cloudy = 2,
    Rainy = 3,
    Snowy = 4,
    Stormy = 5,
}

/// Ordered threshold rules; the first predicate that holds wins.
///
/// The ranges overlap (e.g. 801 is both `> 800` and `> 700`), so the order
/// of this table is part of the mapping.
const CONDITION_RULES: &[(fn(i64) -> bool, Conditions)] = &[
    (|id: i64| id > 802, Conditions::Cloudy),
    (|id: i64| id > 800, Conditions::PartlyCloudy),
    (|id: i64| id == 800, Conditions::Sunny),
    (|id: i64| id > 700, Conditions::Cloudy),
    (|id: i64| id > 600 || id == 511, Conditions::Snowy),
    (|id: i64| id > 300, Conditions::Rainy),
    (|id: i64| id > 200, Conditions::Stormy),
];

impl Conditions {
    /// Map an OpenWeather condition id onto a category.
    ///
    /// Ids at or below 200 match no rule and fall back to `Sunny`.
    pub fn from_condition_code(id: i64) -> Self {
        CONDITION_RULES
            .iter()
            .find(|(matches, _)| matches(id))
            .map(|(_, conditions)| *conditions)
            .unwrap_or(Conditions::Sunny)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Current temperature and category derived from one API response.
///
/// Goes on the wire only through [`OutboundMessage::to_dictionary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temperature_f: f64,
    pub conditions: Conditions,
}

/// Everything the companion ever sends to the watch.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Empty dictionary; prompts the firmware to ask for weather.
    Poke,
    Weather(WeatherReading),
}

impl OutboundMessage {
    /// Flat key/value form handed to the device bridge.
    pub fn to_dictionary(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        if let OutboundMessage::Weather(reading) = self {
            dict.insert(KEY_TEMPERATURE.to_string(), Value::from(reading.temperature_f));
            dict.insert(KEY_CONDITIONS.to_string(), Value::from(reading.conditions.as_u8()));
        }
        dict
    }

    pub fn is_poke(&self) -> bool {
        matches!(self, OutboundMessage::Poke)
    }
}

/// Flat key/value payload received from the watch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct InboundMessage(Map<String, Value>);

impl InboundMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The API key override, if one was sent and is non-empty.
    pub fn api_key_override(&self) -> Option<&str> {
        self.0
            .get(KEY_API_KEY)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
    }

    /// Date-format toggle; the watch sends it either as a bool or as 0/1.
    pub fn american_date(&self) -> Option<bool> {
        match self.0.get(KEY_AMERICAN_DATE)? {
            Value::Bool(flag) => Some(*flag),
            Value::Number(n) => n.as_i64().map(|n| n == 1),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for InboundMessage {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn condition_codes_follow_threshold_order() {
        let cases = [
            (803, Conditions::Cloudy),
            (804, Conditions::Cloudy),
            (801, Conditions::PartlyCloudy),
            (802, Conditions::PartlyCloudy),
            (800, Conditions::Sunny),
            (799, Conditions::Cloudy),
            (741, Conditions::Cloudy),
            (701, Conditions::Cloudy),
            (700, Conditions::Snowy),
            (611, Conditions::Snowy),
            (601, Conditions::Snowy),
            (600, Conditions::Rainy),
            (511, Conditions::Snowy),
            (520, Conditions::Rainy),
            (321, Conditions::Rainy),
            (301, Conditions::Rainy),
            (300, Conditions::Stormy),
            (210, Conditions::Stormy),
            (201, Conditions::Stormy),
        ];

        for (id, expected) in cases {
            assert_eq!(Conditions::from_condition_code(id), expected, "id {id}");
        }
    }

    #[test]
    fn unhandled_low_codes_fall_back_to_sunny() {
        assert_eq!(Conditions::from_condition_code(200), Conditions::Sunny);
        assert_eq!(Conditions::from_condition_code(150), Conditions::Sunny);
        assert_eq!(Conditions::from_condition_code(0), Conditions::Sunny);
        assert_eq!(Conditions::from_condition_code(-5), Conditions::Sunny);
    }

    #[test]
    fn weather_message_has_fixed_keys() {
        let msg = OutboundMessage::Weather(WeatherReading {
            temperature_f: 72.5,
            conditions: Conditions::Sunny,
        });

        assert_eq!(
            Value::Object(msg.to_dictionary()),
            json!({ "TEMPERATURE": 72.5, "CONDITIONS": 0 })
        );
    }

    #[test]
    fn every_category_encodes_as_its_icon_index() {
        let all = [
            Conditions::Sunny,
            Conditions::PartlyCloudy,
            Conditions::Cloudy,
            Conditions::Rainy,
            Conditions::Snowy,
            Conditions::Stormy,
        ];

        for (index, conditions) in all.into_iter().enumerate() {
            let dict = OutboundMessage::Weather(WeatherReading {
                temperature_f: -3.5,
                conditions,
            })
            .to_dictionary();

            assert_eq!(dict.len(), 2);
            assert_eq!(dict[KEY_CONDITIONS], json!(index));
            assert_eq!(dict[KEY_TEMPERATURE], json!(-3.5));
        }
    }

    #[test]
    fn poke_is_empty() {
        assert!(OutboundMessage::Poke.to_dictionary().is_empty());
    }

    #[test]
    fn blank_api_key_is_not_an_override() {
        let msg = InboundMessage::new().with(KEY_API_KEY, "");
        assert_eq!(msg.api_key_override(), None);

        let msg = InboundMessage::new().with(KEY_API_KEY, "abc123");
        assert_eq!(msg.api_key_override(), Some("abc123"));
    }

    #[test]
    fn american_date_accepts_bool_and_int() {
        let as_bool = InboundMessage::new().with(KEY_AMERICAN_DATE, true);
        assert_eq!(as_bool.american_date(), Some(true));

        let as_int = InboundMessage::new().with(KEY_AMERICAN_DATE, 0);
        assert_eq!(as_int.american_date(), Some(false));
        assert_eq!(InboundMessage::new().american_date(), None);
    }
}
