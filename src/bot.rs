//! Bot event loop — the single consumer that owns all round state.
//!
//! Inbound gateway events and the round timer both post to one mpsc
//! queue; one consumer processes them strictly in arrival order, so
//! every handler runs to completion before the next starts and no
//! locking is needed around the round.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::classify;
use crate::config::BotConfig;
use crate::error::Result;
use crate::gateway::{Gateway, Member, MessageEvent};
use crate::round::manager::{Outgoing, RoundManager};
use crate::round::model::Participant;

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum Event {
    /// An inbound message from the gateway.
    Inbound(MessageEvent),
    /// The round's waiting window elapsed.
    RoundTimeout,
}

/// The bot: one gateway, one member directory, at most one round.
pub struct Bot {
    config: BotConfig,
    gateway: Arc<dyn Gateway>,
    manager: RoundManager,
    /// Member snapshot, loaded at startup and refreshed at round start.
    directory: HashMap<String, Member>,
    bot_id: Option<String>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Bot {
    pub fn new(config: BotConfig, gateway: Arc<dyn Gateway>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = RoundManager::new(config.bot_name.clone(), config.fillings.clone());
        Self {
            config,
            gateway,
            manager,
            directory: HashMap::new(),
            bot_id: None,
            tx,
            rx,
        }
    }

    /// Whether a round is currently collecting answers.
    pub fn round_active(&self) -> bool {
        self.manager.is_active()
    }

    /// Connect the gateway and process events until the stream closes.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(gateway = self.gateway.name(), "Connecting gateway");
        self.gateway.health_check().await?;
        self.bot_id = self.gateway.self_id().await?;

        let members = self.gateway.member_list().await?;
        self.update_directory(&members);
        tracing::info!(members = members.len(), "Member list loaded");

        let mut stream = self.gateway.start().await?;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                if tx.send(Event::Inbound(event)).is_err() {
                    break;
                }
            }
            tracing::info!("Gateway stream closed");
        });

        while let Some(event) = self.rx.recv().await {
            self.handle_event(event).await;
        }

        self.gateway.shutdown().await?;
        Ok(())
    }

    /// Process one event to completion.
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Inbound(message) => self.handle_inbound(message).await,
            Event::RoundTimeout => match self.manager.complete_round() {
                Some(report) => self.deliver(vec![report]).await,
                None => tracing::debug!("Round timeout fired with no active round"),
            },
        }
    }

    async fn handle_inbound(&mut self, event: MessageEvent) {
        if !classify::is_chat_message(&event) || !classify::is_direct_message(&event) {
            return;
        }
        if classify::is_from_bot(&event, self.bot_id.as_deref(), &self.config.bot_name) {
            return;
        }

        if self.manager.is_active() {
            let Some(sender_id) = event.user.clone() else {
                tracing::warn!("Chat message without a sender id, dropping");
                return;
            };
            let sender_name = self.directory.get(&sender_id).map(|m| m.name.clone());
            let outgoing =
                self.manager
                    .handle_message(&sender_id, sender_name.as_deref(), &event.text);
            self.deliver(outgoing).await;
        } else if classify::mentions_order_trigger(&event) {
            self.start_round(&event).await;
        }
    }

    async fn start_round(&mut self, trigger: &MessageEvent) {
        let Some(sender_id) = trigger.user.as_deref() else {
            tracing::warn!("Trigger message without a sender id, ignoring");
            return;
        };

        // Fresh member snapshot for this round
        let members = match self.gateway.member_list().await {
            Ok(members) => members,
            Err(e) => {
                tracing::error!(error = %e, "Member list snapshot failed, round not started");
                return;
            }
        };
        self.update_directory(&members);

        let Some(initiator) = members.iter().find(|m| m.id == sender_id) else {
            tracing::warn!(sender_id, "Trigger sender not in member list, ignoring");
            return;
        };
        let initiator = Participant::from(initiator);

        let outgoing = self.manager.start_round(initiator, &members, Utc::now());
        if outgoing.is_empty() {
            return;
        }
        // Ack first, then the broadcast; sends are awaited in order
        self.deliver(outgoing).await;

        // One-shot, non-cancellable timer posting back to this queue
        let tx = self.tx.clone();
        let delay = self.config.order_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Event::RoundTimeout);
        });
    }

    async fn deliver(&self, outgoing: Vec<Outgoing>) {
        for message in outgoing {
            if let Err(e) = self.gateway.send_to_user(&message.to, &message.text).await {
                tracing::error!(error = %e, to = %message.to, "Failed to send message");
            }
        }
    }

    fn update_directory(&mut self, members: &[Member]) {
        self.directory = members.iter().map(|m| (m.id.clone(), m.clone())).collect();
    }
}
