//! Match entities and the progression engine.
//!
//! [`models`] defines the match arena types; [`progression`] implements
//! score reporting, disputes, forfeits and advancement on top of
//! [`crate::bracket::Bracket`].

pub mod models;
pub mod progression;

pub use models::{BracketSide, Match, MatchId, MatchSlot, MatchStatus, SlotIndex};
pub use progression::{MatchError, ProgressionResult};
