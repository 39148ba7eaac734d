//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default bot username on the platform.
pub const DEFAULT_BOT_NAME: &str = "burritobob";

/// Default liveness endpoint port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default waiting window before the round report is sent.
pub const DEFAULT_ORDER_TIMEOUT_SECS: u64 = 600;

/// Default filling menu offered at the filling step.
pub const DEFAULT_FILLINGS: &str = "vegetarian,ham,bacon,sausage,chorizo";

/// Bot configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Platform bot token (`xoxb-...`).
    pub bot_token: SecretString,
    /// Socket Mode app token (`xapp-...`).
    pub app_token: SecretString,
    /// Bot username on the platform.
    pub bot_name: String,
    /// Liveness endpoint port.
    pub port: u16,
    /// Configured filling list, in menu order.
    pub fillings: Vec<String>,
    /// How long a round collects answers before the report is sent.
    pub order_timeout: Duration,
}

impl BotConfig {
    /// Build config from environment variables.
    ///
    /// `BOT_API_KEY` and `SLACK_APP_TOKEN` are mandatory; everything else
    /// falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("BOT_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("BOT_API_KEY".into()))?;

        let app_token = std::env::var("SLACK_APP_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("SLACK_APP_TOKEN".into()))?;

        let bot_name =
            std::env::var("BOT_NAME").unwrap_or_else(|_| DEFAULT_BOT_NAME.to_string());

        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("not a port number: {raw}"),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let fillings = parse_fillings(
            &std::env::var("FILLING_OPTIONS").unwrap_or_else(|_| DEFAULT_FILLINGS.to_string()),
        );
        if fillings.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "FILLING_OPTIONS".into(),
                message: "filling list must not be empty".into(),
            });
        }

        let timeout_secs: u64 = match std::env::var("ORDER_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ORDER_TIMEOUT_SECS".into(),
                message: format!("not a number of seconds: {raw}"),
            })?,
            Err(_) => DEFAULT_ORDER_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            app_token: SecretString::from(app_token),
            bot_name,
            port,
            fillings,
            order_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse a comma-separated filling list, lowercased and trimmed.
pub fn parse_fillings(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
