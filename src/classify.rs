//! Pure predicates recognizing message shape.
//!
//! All text matching here is case-insensitive substring search, not
//! exact-word matching. The interview stays forgiving of free-text
//! replies on purpose.

use crate::gateway::MessageEvent;

/// The phrase that starts a new order round.
pub const ORDER_TRIGGER: &str = "start order";

/// True if the event is a chat message carrying non-empty text.
pub fn is_chat_message(event: &MessageEvent) -> bool {
    event.kind == "message" && !event.text.is_empty()
}

/// True if the event arrived on a direct-message channel.
///
/// DM channel ids start with 'D' on the platform.
pub fn is_direct_message(event: &MessageEvent) -> bool {
    event
        .channel
        .as_deref()
        .is_some_and(|c| c.starts_with('D'))
}

/// True if the event was sent by the bot itself, either by user id or
/// by its reserved username.
pub fn is_from_bot(event: &MessageEvent, bot_id: Option<&str>, bot_name: &str) -> bool {
    let id_matches = match (event.user.as_deref(), bot_id) {
        (Some(user), Some(id)) => user == id,
        _ => false,
    };
    let name_matches = event.username.as_deref() == Some(bot_name);
    id_matches || name_matches
}

/// True if the text mentions the order trigger phrase.
pub fn mentions_order_trigger(event: &MessageEvent) -> bool {
    event.text.to_lowercase().contains(ORDER_TRIGGER)
}

/// Find the first configured filling mentioned in the text, in
/// configured-list order. Returns `None` if no filling matches.
pub fn match_filling<'a>(text: &str, fillings: &'a [String]) -> Option<&'a str> {
    let lowered = text.to_lowercase();
    fillings
        .iter()
        .find(|f| lowered.contains(f.as_str()))
        .map(String::as_str)
}
