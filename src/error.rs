//! Error types for Burrito Bob.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Notification gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Gateway {name} disconnected: {reason}")]
    Disconnected { name: String, reason: String },

    #[error("Failed to send message via gateway {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message event: {0}")]
    InvalidMessage(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
