use anyhow::Result;
use inquire::{Confirm, InquireError, Text};

use watch_weather_core::{
    InboundMessage, Settings,
    config_page::{ConfigItem, config_page},
    model::{KEY_AMERICAN_DATE, KEY_API_KEY},
};

/// Walk the settings page in the terminal.
///
/// Returns the updated settings, or `None` if the user backed out.
pub fn render(current: &Settings) -> Result<Option<Settings>> {
    let mut submitted = InboundMessage::new();

    match walk(&config_page(), current, &mut submitted, 0) {
        Ok(true) => {
            let mut settings = current.clone();
            settings.apply_payload(&submitted);
            Ok(Some(settings))
        }
        Ok(false) | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            eprintln!("Settings unchanged.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn walk(
    items: &[ConfigItem],
    current: &Settings,
    submitted: &mut InboundMessage,
    depth: usize,
) -> Result<bool, InquireError> {
    for item in items {
        match item {
            ConfigItem::Heading { default_value } => {
                let underline = if depth == 0 { '=' } else { '-' };
                let rule = underline.to_string().repeat(default_value.len());
                eprintln!("\n{default_value}\n{rule}");
            }
            ConfigItem::Section { items } => {
                if !walk(items, current, submitted, depth + 1)? {
                    return Ok(false);
                }
            }
            ConfigItem::Toggle {
                message_key,
                label,
                default_value,
                description,
            } => {
                let initial = stored_flag(current, message_key).unwrap_or(*default_value);
                let answer = Confirm::new(label)
                    .with_default(initial)
                    .with_help_message(description)
                    .prompt()?;
                submitted.insert(message_key, answer);
            }
            ConfigItem::Input {
                message_key,
                default_value,
                label,
                description,
                ..
            } => {
                let initial = stored_text(current, message_key).unwrap_or(*default_value);
                let answer = Text::new(label)
                    .with_initial_value(initial)
                    .with_help_message(description)
                    .prompt()?;
                submitted.insert(message_key, answer);
            }
            ConfigItem::Submit { default_value } => {
                return Confirm::new(default_value).with_default(true).prompt();
            }
        }
    }

    Ok(true)
}

fn stored_flag(current: &Settings, key: &str) -> Option<bool> {
    (key == KEY_AMERICAN_DATE).then_some(current.american_date)
}

fn stored_text<'a>(current: &'a Settings, key: &str) -> Option<&'a str> {
    (key == KEY_API_KEY).then_some(current.open_weather_api_key.as_str())
}
