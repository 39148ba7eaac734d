//! Report rendering for a finished round.

use crate::round::manager::ParticipantOrder;

/// Heading over the names of participants who said yes but never
/// finished the interview.
pub const ABANDONED_HEADING: &str =
    "People who started orders but didn't complete the order:";

/// Render the round report sent to the initiator.
///
/// Completed orders get one line each; abandoned ones are listed by
/// name under a separate heading. Decliners and non-responders are
/// omitted entirely. Both sections are rendered even when empty.
pub fn render(participants: &[ParticipantOrder]) -> String {
    let completed: Vec<String> = participants
        .iter()
        .filter(|p| p.order.is_complete())
        .map(order_line)
        .collect();

    let abandoned: Vec<String> = participants
        .iter()
        .filter(|p| p.order.is_abandoned())
        .map(|p| p.participant.real_name.clone())
        .collect();

    format!(
        "{}\n\n{}\n{}",
        completed.join("\n"),
        ABANDONED_HEADING,
        abandoned.join("\n")
    )
}

fn order_line(entry: &ParticipantOrder) -> String {
    let order = &entry.order;
    let filling = order.filling.as_deref().unwrap_or_default();
    let item = order.item_type.map(|t| t.to_string()).unwrap_or_default();
    let salsa = order.salsa.map(|s| s.to_string()).unwrap_or_default();
    let instructions = order.special_instructions.as_deref().unwrap_or_default();
    format!(
        "{} wants a {filling} {item} with {salsa} salsa\nSpecial Instructions: {instructions}",
        entry.participant.real_name
    )
}
