//! Order round: per-participant interview records and round lifecycle.

pub mod manager;
pub mod model;
pub mod prompts;
pub mod report;
pub mod state;

pub use manager::{Outgoing, RoundManager};
pub use model::{ItemType, Participant, Salsa};
pub use state::{Order, Step};
