//! Declarative description of the settings page shown by the host.

use serde::Serialize;

use crate::model::{KEY_AMERICAN_DATE, KEY_API_KEY};

/// Extra HTML-ish attributes of a text input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputAttributes {
    #[serde(rename = "type")]
    pub input_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConfigItem {
    Heading {
        #[serde(rename = "defaultValue")]
        default_value: &'static str,
    },
    Section {
        items: Vec<ConfigItem>,
    },
    Toggle {
        #[serde(rename = "messageKey")]
        message_key: &'static str,
        label: &'static str,
        #[serde(rename = "defaultValue")]
        default_value: bool,
        description: &'static str,
    },
    Input {
        #[serde(rename = "messageKey")]
        message_key: &'static str,
        #[serde(rename = "defaultValue")]
        default_value: &'static str,
        label: &'static str,
        description: &'static str,
        attributes: InputAttributes,
    },
    Submit {
        #[serde(rename = "defaultValue")]
        default_value: &'static str,
    },
}

impl ConfigItem {
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            ConfigItem::Toggle { message_key, .. } | ConfigItem::Input { message_key, .. } => {
                Some(*message_key)
            }
            _ => None,
        }
    }
}

pub fn config_page() -> Vec<ConfigItem> {
    vec![
        ConfigItem::Heading {
            default_value: "Demonic Descent Configuration",
        },
        ConfigItem::Section {
            items: vec![
                ConfigItem::Heading {
                    default_value: "Time and Date",
                },
                ConfigItem::Toggle {
                    message_key: KEY_AMERICAN_DATE,
                    label: "Use American date format",
                    default_value: true,
                    description: "Set false for '01 Jan', true for 'Jan 01'",
                },
            ],
        },
        ConfigItem::Section {
            items: vec![
                ConfigItem::Heading {
                    default_value: "Weather",
                },
                ConfigItem::Input {
                    message_key: KEY_API_KEY,
                    default_value: "",
                    label: "Open Weather API Key",
                    description: "Leave blank to use the built-in key, \
                                  but it may stop working in the future.",
                    attributes: InputAttributes { input_type: "text" },
                },
            ],
        },
        ConfigItem::Submit {
            default_value: "Submit",
        },
    ]
}

/// Every message key declared on the page, in page order.
pub fn message_keys(page: &[ConfigItem]) -> Vec<&'static str> {
    page.iter()
        .flat_map(|item| match item {
            ConfigItem::Section { items } => message_keys(items),
            other => other.message_key().into_iter().collect(),
        })
        .collect()
}

/// Page as the host's JSON configuration schema.
pub fn config_page_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&config_page())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;

    #[test]
    fn declared_keys_match_relay_keys() {
        assert_eq!(message_keys(&config_page()), vec![KEY_AMERICAN_DATE, KEY_API_KEY]);
    }

    #[test]
    fn declared_keys_match_settings_payload() {
        let payload = Settings::default().to_payload();
        for key in message_keys(&config_page()) {
            assert!(payload.get(key).is_some(), "settings payload lacks {key}");
        }
    }

    #[test]
    fn serializes_to_host_schema() {
        let value = serde_json::to_value(config_page()).unwrap();

        assert_eq!(
            value[0],
            json!({ "type": "heading", "defaultValue": "Demonic Descent Configuration" })
        );
        assert_eq!(
            value[1]["items"][1],
            json!({
                "type": "toggle",
                "messageKey": "AmericanDate",
                "label": "Use American date format",
                "defaultValue": true,
                "description": "Set false for '01 Jan', true for 'Jan 01'"
            })
        );
        assert_eq!(value[2]["items"][1]["attributes"], json!({ "type": "text" }));
        assert_eq!(value[2]["items"][1]["defaultValue"], json!(""));
        assert_eq!(value[3], json!({ "type": "submit", "defaultValue": "Submit" }));
    }

    #[test]
    fn toggle_default_matches_settings_default() {
        let toggle_default = config_page().iter().find_map(|item| match item {
            ConfigItem::Section { items } => items.iter().find_map(|i| match i {
                ConfigItem::Toggle { default_value, .. } => Some(*default_value),
                _ => None,
            }),
            _ => None,
        });

        assert_eq!(toggle_default, Some(Settings::default().american_date));
    }
}
