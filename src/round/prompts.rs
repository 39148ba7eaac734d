//! Interview prompt text for each step.

/// Acknowledgment sent to the initiator when a round starts.
pub const ROUND_STARTED_ACK: &str =
    "I will ask everyone what they want and get back to you in a minute.";

/// Clarification when the interest answer isn't yes or no.
pub const INTEREST_RETRY: &str =
    "I don't think you understood.  That was a 'yes' or 'no' question...please try again.";

/// Item-type question sent after a yes.
pub const ITEM_TYPE_PROMPT: &str = "Great!  Would you like a burrito or a taco?";

/// Clarification when the item-type answer matches neither option.
pub const ITEM_TYPE_RETRY: &str =
    "I have no idea what you're asking for - do you want a burrito or taco?";

/// Clarification when the filling isn't on the menu.
pub const FILLING_RETRY: &str = "This isn't they type of place where you can order off menu.  \
Let's stick to the list provided.....can you try that again?";

/// Salsa question.
pub const SALSA_PROMPT: &str = "Got it - let's talk salsa, would you like hot or mild?";

/// Clarification when the salsa answer matches neither option.
pub const SALSA_RETRY: &str =
    "I don't think they have that kind of salsa, how about hot or mild?";

/// Special-instructions question.
pub const INSTRUCTIONS_PROMPT: &str =
    "Ok, one last thing - are there any special instructions I should know about?";

/// Catch-all for senders with no order record or an unrecognized step.
pub const BE_PATIENT: &str = "An order is already in progress, please be patient.";

/// The interest question broadcast to every participant at round start.
pub fn interest_prompt(initiator_real_name: &str) -> String {
    format!(
        "WHOA! {initiator_real_name} wants to go get Jalapenos for breakfast.  \
Would you like to place an order?"
    )
}

/// The filling menu, rendered as the configured list joined by newlines.
pub fn filling_prompt(fillings: &[String]) -> String {
    format!(
        "Good choice.  What would you like in it?  Your options are: \n{}",
        fillings.join("\n")
    )
}

/// Closing acknowledgment naming the initiator.
pub fn closing(initiator_real_name: &str) -> String {
    format!("Thanks - I'll let {initiator_real_name} know about your order.")
}
