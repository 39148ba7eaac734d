//! Slack gateway — Web API outbound, Socket Mode inbound.
//!
//! Native Slack Web API implementation adapted to the Gateway trait
//! (MessageStream, member_list, send_to_user). Inbound events arrive
//! over a Socket Mode websocket opened with `apps.connections.open`;
//! every envelope is acked and `events_api` message events are pushed
//! onto the stream.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message;

use crate::error::GatewayError;
use crate::gateway::{Gateway, Member, MessageEvent, MessageStream};

/// Delay before retrying after a connection or parse failure.
const RECONNECT_DELAY: std::time::Duration = std::time::Duration::from_secs(5);

/// Slack gateway — talks to the Web API with the bot token and to
/// Socket Mode with the app token.
pub struct SlackGateway {
    bot_token: SecretString,
    app_token: SecretString,
    client: reqwest::Client,
    /// username → user id, filled from member-list snapshots.
    user_ids: RwLock<HashMap<String, String>>,
}

impl SlackGateway {
    pub fn new(bot_token: SecretString, app_token: SecretString) -> Self {
        Self {
            bot_token,
            app_token,
            client: reqwest::Client::new(),
            user_ids: RwLock::new(HashMap::new()),
        }
    }

    fn api_url(method: &str) -> String {
        format!("https://slack.com/api/{method}")
    }

    /// GET a Web API method with the bot token.
    async fn get_call(&self, method: &str) -> Result<Value, GatewayError> {
        let resp = self
            .client
            .get(Self::api_url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let data: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        check_ok(&data, method)?;
        Ok(data)
    }

    /// POST a Web API method with a JSON body and the bot token.
    async fn post_call(&self, method: &str, body: Value) -> Result<Value, GatewayError> {
        let resp = self
            .client
            .post(Self::api_url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let data: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        check_ok(&data, method)?;
        Ok(data)
    }

    /// Resolve a username to a user id, refreshing the member snapshot
    /// on a cache miss.
    async fn user_id_for(&self, username: &str) -> Result<String, GatewayError> {
        if let Some(id) = self.user_ids.read().await.get(username) {
            return Ok(id.clone());
        }
        self.member_list().await?;
        self.user_ids
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownUser(username.to_string()))
    }

    /// Open a DM channel with a user and return its channel id.
    async fn open_dm(&self, user_id: &str) -> Result<String, GatewayError> {
        let data = self
            .post_call("conversations.open", serde_json::json!({ "users": user_id }))
            .await?;
        data.get("channel")
            .and_then(|c| c.get("id"))
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                GatewayError::Http("conversations.open returned no channel id".to_string())
            })
    }
}

#[async_trait]
impl Gateway for SlackGateway {
    fn name(&self) -> &str {
        "slack"
    }

    async fn self_id(&self) -> Result<Option<String>, GatewayError> {
        let data = self.post_call("auth.test", serde_json::json!({})).await?;
        Ok(data
            .get("user_id")
            .and_then(Value::as_str)
            .map(String::from))
    }

    async fn start(&self) -> Result<MessageStream, GatewayError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let client = self.client.clone();
        let app_token = self.app_token.clone();

        tokio::spawn(async move {
            tracing::info!("Slack gateway listening for events...");

            loop {
                if tx.is_closed() {
                    tracing::info!("Slack listener channel closed");
                    return;
                }

                let ws_url = match open_socket_url(&client, &app_token).await {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!("Socket Mode open error: {e}");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                        continue;
                    }
                };

                match tokio_tungstenite::connect_async(ws_url.as_str()).await {
                    Ok((ws, _)) => {
                        if let Err(e) = read_socket(ws, &tx).await {
                            tracing::warn!("Socket Mode session ended: {e}");
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Socket Mode connect error: {e}");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn member_list(&self) -> Result<Vec<Member>, GatewayError> {
        let data = self.get_call("users.list").await?;
        let members = parse_members(&data);

        let mut cache = self.user_ids.write().await;
        cache.clear();
        for member in &members {
            cache.insert(member.name.clone(), member.id.clone());
        }

        Ok(members)
    }

    async fn send_to_user(&self, username: &str, text: &str) -> Result<(), GatewayError> {
        let user_id = self.user_id_for(username).await?;
        let channel = self.open_dm(&user_id).await?;

        self.post_call(
            "chat.postMessage",
            serde_json::json!({ "channel": channel, "text": text }),
        )
        .await
        .map_err(|e| GatewayError::SendFailed {
            name: self.name().into(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        self.post_call("auth.test", serde_json::json!({}))
            .await
            .map_err(|e| GatewayError::StartupFailed {
                name: self.name().into(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), GatewayError> {
        tracing::info!("Slack gateway shutting down");
        Ok(())
    }
}

// ── Socket Mode plumbing ────────────────────────────────────────────

/// Request a fresh Socket Mode websocket URL.
async fn open_socket_url(
    client: &reqwest::Client,
    app_token: &SecretString,
) -> anyhow::Result<String> {
    let resp = client
        .post(SlackGateway::api_url("apps.connections.open"))
        .bearer_auth(app_token.expose_secret())
        .send()
        .await?;

    let data: Value = resp.json().await?;
    if !data.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        let reason = data
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        anyhow::bail!("apps.connections.open failed: {reason}");
    }

    data.get("url")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| anyhow::anyhow!("apps.connections.open returned no url"))
}

/// Pump one websocket session: ack every envelope, forward message
/// events. Returns when Slack asks for a reconnect or the socket
/// closes.
async fn read_socket(
    ws: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    tx: &tokio::sync::mpsc::UnboundedSender<MessageEvent>,
) -> anyhow::Result<()> {
    let (mut write, mut read) = ws.split();

    while let Some(frame) = read.next().await {
        let frame = frame?;
        let text = match &frame {
            Message::Text(text) => text.as_str(),
            Message::Close(_) => anyhow::bail!("socket closed by peer"),
            _ => continue,
        };

        let envelope: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Unparseable Socket Mode frame: {e}");
                continue;
            }
        };

        // Every envelope with an id must be acked promptly
        if let Some(envelope_id) = envelope.get("envelope_id").and_then(Value::as_str) {
            let ack = serde_json::json!({ "envelope_id": envelope_id }).to_string();
            write.send(Message::Text(ack.into())).await?;
        }

        match envelope.get("type").and_then(Value::as_str) {
            Some("hello") => tracing::debug!("Socket Mode hello received"),
            Some("disconnect") => {
                tracing::info!("Socket Mode disconnect requested, reconnecting");
                return Ok(());
            }
            Some("events_api") => {
                let Some(event) = envelope
                    .get("payload")
                    .and_then(|p| p.get("event"))
                else {
                    continue;
                };
                match serde_json::from_value::<MessageEvent>(event.clone()) {
                    Ok(message) => {
                        if tx.send(message).is_err() {
                            anyhow::bail!("listener channel closed");
                        }
                    }
                    Err(e) => tracing::warn!("Malformed event payload, skipping: {e}"),
                }
            }
            _ => tracing::debug!("Ignoring unhandled Socket Mode envelope"),
        }
    }

    Ok(())
}

// ── Parsing helpers ─────────────────────────────────────────────────

/// Check the Web API `ok` flag, turning `ok: false` into an error.
fn check_ok(data: &Value, method: &str) -> Result<(), GatewayError> {
    if data.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(());
    }
    let reason = data
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Err(GatewayError::Http(format!("{method} failed: {reason}")))
}

/// Wire shape of one `users.list` entry.
#[derive(Deserialize)]
struct RawMember {
    id: String,
    name: String,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    profile: RawProfile,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    deleted: bool,
}

#[derive(Deserialize, Default)]
struct RawProfile {
    #[serde(default)]
    real_name: Option<String>,
}

#[derive(Deserialize)]
struct MembersResponse {
    #[serde(default)]
    members: Vec<RawMember>,
}

impl From<RawMember> for Member {
    fn from(raw: RawMember) -> Self {
        let real_name = raw
            .real_name
            .or(raw.profile.real_name)
            .unwrap_or_else(|| raw.name.clone());
        Self {
            id: raw.id,
            name: raw.name,
            real_name,
            is_bot: raw.is_bot,
        }
    }
}

/// Map a `users.list` response to Members, skipping deleted accounts.
fn parse_members(data: &Value) -> Vec<Member> {
    let response: MembersResponse = match serde_json::from_value(data.clone()) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Malformed users.list response: {e}");
            return Vec::new();
        }
    };

    response
        .members
        .into_iter()
        .filter(|m| !m.deleted)
        .map(Member::from)
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────
