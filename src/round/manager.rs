//! RoundManager — coordinates round lifecycle and per-step advances.
//!
//! Owns the single active round (if any). All methods are synchronous
//! and side-effect free on the outside world: they mutate round state
//! and return the messages to deliver, so the event loop stays the
//! only place that talks to the gateway.

use chrono::{DateTime, Utc};

use crate::classify::match_filling;
use crate::gateway::Member;
use crate::round::model::{ItemType, Participant, Salsa};
use crate::round::prompts;
use crate::round::report;
use crate::round::state::{Order, Step};

/// System accounts never invited to a round.
const EXCLUDED_ACCOUNTS: &[&str] = &["slackbot"];

/// A message to deliver to a user, by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub to: String,
    pub text: String,
}

impl Outgoing {
    pub fn new(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            text: text.into(),
        }
    }
}

/// One participant's slot in the round registry.
#[derive(Debug, Clone)]
pub struct ParticipantOrder {
    pub participant: Participant,
    pub order: Order,
}

impl ParticipantOrder {
    fn new(participant: Participant) -> Self {
        Self {
            participant,
            order: Order::new(),
        }
    }
}

/// One order-collection cycle, trigger to report.
#[derive(Debug, Clone)]
pub struct Round {
    pub initiator: Participant,
    pub started_at: DateTime<Utc>,
    /// Registry in member-snapshot order, built fresh at round start.
    pub participants: Vec<ParticipantOrder>,
}

/// Coordinates the order round: start, per-message advance, report.
pub struct RoundManager {
    bot_name: String,
    fillings: Vec<String>,
    round: Option<Round>,
}

impl RoundManager {
    pub fn new(bot_name: impl Into<String>, fillings: Vec<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            fillings,
            round: None,
        }
    }

    /// Whether a round is currently collecting answers.
    pub fn is_active(&self) -> bool {
        self.round.is_some()
    }

    /// The active round, if any.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Start a round: snapshot the member list into fresh order
    /// records and return the initiator acknowledgment followed by the
    /// interest prompt for every participant.
    ///
    /// The caller is responsible for checking `is_active()` first and
    /// for arming the round timer.
    pub fn start_round(
        &mut self,
        initiator: Participant,
        members: &[Member],
        now: DateTime<Utc>,
    ) -> Vec<Outgoing> {
        if self.round.is_some() {
            tracing::warn!("start_round called while a round is already active, ignoring");
            return Vec::new();
        }

        let participants: Vec<ParticipantOrder> = members
            .iter()
            .filter(|m| {
                !m.is_bot
                    && m.name != self.bot_name
                    && !EXCLUDED_ACCOUNTS.contains(&m.name.as_str())
            })
            .map(|m| ParticipantOrder::new(Participant::from(m)))
            .collect();

        tracing::info!(
            initiator = %initiator.name,
            participants = participants.len(),
            "Order round started"
        );

        let mut outgoing = vec![Outgoing::new(&initiator.name, prompts::ROUND_STARTED_ACK)];
        let interest = prompts::interest_prompt(&initiator.real_name);
        outgoing.extend(
            participants
                .iter()
                .map(|p| Outgoing::new(&p.participant.name, &interest)),
        );

        self.round = Some(Round {
            initiator,
            started_at: now,
            participants,
        });

        outgoing
    }

    /// Advance the sender's order by one step in response to a direct
    /// message. Returns the replies to deliver.
    ///
    /// Senders without an order record (outside the snapshot, or an
    /// unrecognized step) get the generic "please be patient" reply
    /// when their username is known, otherwise the message is dropped.
    pub fn handle_message(
        &mut self,
        sender_id: &str,
        sender_name: Option<&str>,
        text: &str,
    ) -> Vec<Outgoing> {
        let Some(round) = self.round.as_mut() else {
            tracing::warn!(sender_id, "handle_message called with no active round");
            return Vec::new();
        };
        let initiator_real_name = round.initiator.real_name.clone();

        let Some(entry) = round
            .participants
            .iter_mut()
            .find(|p| p.participant.id == sender_id)
        else {
            return match sender_name {
                Some(name) => vec![Outgoing::new(name, prompts::BE_PATIENT)],
                None => {
                    tracing::warn!(sender_id, "Message from unresolvable sender, dropping");
                    Vec::new()
                }
            };
        };
        let name = entry.participant.name.clone();

        match entry.order.step {
            Step::Interest => {
                // Once answered, further replies at this step are ignored
                if entry.order.wants_food.is_some() {
                    return Vec::new();
                }
                let lowered = text.to_lowercase();
                if lowered.contains("yes") {
                    entry.order.wants_food = Some(true);
                    entry.order.in_progress = true;
                    advance(&mut entry.order);
                    vec![Outgoing::new(name, prompts::ITEM_TYPE_PROMPT)]
                } else if lowered.contains("no") {
                    entry.order.wants_food = Some(false);
                    Vec::new()
                } else {
                    vec![Outgoing::new(name, prompts::INTEREST_RETRY)]
                }
            }

            Step::ItemType => match ItemType::match_text(text) {
                Some(item) => {
                    entry.order.item_type = Some(item);
                    advance(&mut entry.order);
                    vec![Outgoing::new(name, prompts::filling_prompt(&self.fillings))]
                }
                None => vec![Outgoing::new(name, prompts::ITEM_TYPE_RETRY)],
            },

            Step::Filling => match match_filling(text, &self.fillings) {
                Some(filling) => {
                    entry.order.filling = Some(filling.to_string());
                    advance(&mut entry.order);
                    vec![Outgoing::new(name, prompts::SALSA_PROMPT)]
                }
                None => vec![Outgoing::new(name, prompts::FILLING_RETRY)],
            },

            Step::Salsa => match Salsa::match_text(text) {
                Some(salsa) => {
                    entry.order.salsa = Some(salsa);
                    advance(&mut entry.order);
                    vec![Outgoing::new(name, prompts::INSTRUCTIONS_PROMPT)]
                }
                None => vec![Outgoing::new(name, prompts::SALSA_RETRY)],
            },

            Step::Instructions => {
                // Raw text, no validation
                entry.order.special_instructions = Some(text.to_string());
                entry.order.in_progress = false;
                advance(&mut entry.order);
                vec![Outgoing::new(name, prompts::closing(&initiator_real_name))]
            }

            Step::Done => vec![Outgoing::new(name, prompts::BE_PATIENT)],
        }
    }

    /// End the round: render the report for the initiator and tear the
    /// round down unconditionally, even if the report is empty.
    /// Returns `None` when no round is active.
    pub fn complete_round(&mut self) -> Option<Outgoing> {
        let round = self.round.take()?;
        tracing::info!(initiator = %round.initiator.name, "Order round complete, sending report");
        let text = report::render(&round.participants);
        Some(Outgoing::new(round.initiator.name, text))
    }
}

fn advance(order: &mut Order) {
    if let Err(e) = order.advance() {
        tracing::warn!("Order step advance failed: {e}");
    }
}
