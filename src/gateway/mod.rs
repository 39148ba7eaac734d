//! Notification gateway abstraction for message I/O.
//!
//! The order-round core only needs two capabilities from the chat
//! platform: a stream of inbound message events and a way to send a
//! direct message to a named user. Everything platform-specific lives
//! behind the [`Gateway`] trait.

pub mod slack;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Deserialize;

use crate::error::GatewayError;

pub use slack::SlackGateway;

/// A single inbound message event, validated once at the boundary.
///
/// Deserializes directly from the platform's event payload; fields
/// the payload omits fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    /// Declared event type ("message" for chat messages).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Message text, empty if the event carried none.
    #[serde(default)]
    pub text: String,
    /// Channel identifier, if present (DM channels start with 'D').
    #[serde(default)]
    pub channel: Option<String>,
    /// Sender's platform user id.
    #[serde(default)]
    pub user: Option<String>,
    /// Declared sender username (set for bot-authored messages).
    #[serde(default)]
    pub username: Option<String>,
}

impl MessageEvent {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// One entry from the platform's member list snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Platform user id (unique).
    pub id: String,
    /// Username (the handle DMs are addressed to).
    pub name: String,
    /// Display name ("real name" in the member list).
    pub real_name: String,
    /// Whether the platform flags this member as a bot.
    pub is_bot: bool,
}

/// Stream of inbound message events.
pub type MessageStream = Pin<Box<dyn Stream<Item = MessageEvent> + Send>>;

/// A chat-platform connection the bot talks through.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Gateway name for logging.
    fn name(&self) -> &str;

    /// The bot's own platform user id, if the platform reports one.
    async fn self_id(&self) -> Result<Option<String>, GatewayError>;

    /// Start listening and return the inbound event stream.
    async fn start(&self) -> Result<MessageStream, GatewayError>;

    /// Snapshot the current member list.
    async fn member_list(&self) -> Result<Vec<Member>, GatewayError>;

    /// Send a direct message to a user by username. Resolving on the
    /// returned future is the completion signal callers sequence on.
    async fn send_to_user(&self, username: &str, text: &str) -> Result<(), GatewayError>;

    /// Verify the gateway can reach the platform.
    async fn health_check(&self) -> Result<(), GatewayError>;

    /// Shut the gateway down.
    async fn shutdown(&self) -> Result<(), GatewayError>;
}
