//! Participant and answer types.

use crate::gateway::Member;

/// One group member snapshotted into a round.
///
/// Immutable for the round's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Platform user id.
    pub id: String,
    /// Username DMs are addressed to.
    pub name: String,
    /// Full display name used in prompts and the report.
    pub real_name: String,
}

impl From<&Member> for Participant {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            real_name: member.real_name.clone(),
        }
    }
}

/// What kind of item the participant wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Taco,
    Burrito,
}

impl ItemType {
    /// Find an item type mentioned in free text. "taco" wins over
    /// "burrito" when both appear.
    pub fn match_text(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        if lowered.contains("taco") {
            Some(Self::Taco)
        } else if lowered.contains("burrito") {
            Some(Self::Burrito)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taco => write!(f, "taco"),
            Self::Burrito => write!(f, "burrito"),
        }
    }
}

/// Salsa choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Salsa {
    Hot,
    Mild,
}

impl Salsa {
    /// Find a salsa mentioned in free text. "hot" wins over "mild"
    /// when both appear.
    pub fn match_text(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        if lowered.contains("hot") {
            Some(Self::Hot)
        } else if lowered.contains("mild") {
            Some(Self::Mild)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Salsa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hot => write!(f, "hot"),
            Self::Mild => write!(f, "mild"),
        }
    }
}
