//! Interview state machine — tracks which step a participant is on.

use crate::round::model::{ItemType, Salsa};

/// The steps of the order interview.
///
/// Progresses linearly: Interest → ItemType → Filling → Salsa →
/// Instructions → Done. Steps never decrease and never skip; a
/// participant who declines at the interest step simply stays there
/// with `wants_food` set to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Interest,
    ItemType,
    Filling,
    Salsa,
    Instructions,
    Done,
}

impl Step {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (Interest, ItemType)
                | (ItemType, Filling)
                | (Filling, Salsa)
                | (Salsa, Instructions)
                | (Instructions, Done)
        )
    }

    /// Whether this step is terminal (the interview is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<Step> {
        use Step::*;
        match self {
            Interest => Some(ItemType),
            ItemType => Some(Filling),
            Filling => Some(Salsa),
            Salsa => Some(Instructions),
            Instructions => Some(Done),
            Done => None,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::Interest
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Interest => "interest",
            Self::ItemType => "item_type",
            Self::Filling => "filling",
            Self::Salsa => "salsa",
            Self::Instructions => "instructions",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// One participant's answers collected so far.
///
/// Mutated only by the round manager in response to that
/// participant's own messages.
#[derive(Debug, Clone, Default)]
pub struct Order {
    /// Current interview step.
    pub step: Step,
    /// Interest answer: `None` until the participant replies yes or no.
    pub wants_food: Option<bool>,
    /// True from "yes" until the closing step stores the instructions.
    pub in_progress: bool,
    pub item_type: Option<ItemType>,
    pub filling: Option<String>,
    pub salsa: Option<Salsa>,
    pub special_instructions: Option<String>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next step. Returns an error at the terminal step.
    pub fn advance(&mut self) -> Result<Step, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| "Already at terminal step".to_string())?;
        if !self.step.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.step, next));
        }
        self.step = next;
        Ok(next)
    }

    /// Whether the participant declined at the interest step.
    pub fn declined(&self) -> bool {
        self.wants_food == Some(false)
    }

    /// Whether the interview ran to completion.
    pub fn is_complete(&self) -> bool {
        self.wants_food == Some(true) && !self.in_progress
    }

    /// Whether the participant said yes but never finished.
    pub fn is_abandoned(&self) -> bool {
        self.wants_food == Some(true) && self.in_progress
    }
}
