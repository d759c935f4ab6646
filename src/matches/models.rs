//! Match entity and slot models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::participant::ParticipantId;

/// Match ID type
pub type MatchId = Uuid;

/// Index of a participant slot within a match (0 or 1). Forward pointers
/// are (match id, slot index) pairs rather than object references so the
/// bracket graph has no ownership cycles.
pub type SlotIndex = usize;

/// Which bracket a match belongs to. Single elimination, Swiss and round
/// robin only ever use `Winners`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
    GrandFinalReset,
}

/// One participant slot of a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSlot {
    /// Waiting on an upstream result.
    Tbd,
    /// No opponent; the other slot advances automatically.
    Bye,
    Taken(ParticipantId),
}

impl MatchSlot {
    pub fn participant(self) -> Option<ParticipantId> {
        match self {
            Self::Taken(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for MatchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tbd => write!(f, "TBD"),
            Self::Bye => write!(f, "BYE"),
            Self::Taken(id) => write!(f, "{id}"),
        }
    }
}

/// Match lifecycle status
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// One or both slots still waiting on upstream results.
    Pending,
    /// Both slots filled with real participants; results may be reported.
    Ready,
    InProgress,
    Completed,
    Disputed,
}

/// A single contest between two participant slots.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Match {
    pub id: MatchId,
    /// 1-based round number within its bracket side.
    pub round: u32,
    /// 1-based position within the round.
    pub number: u32,
    pub side: BracketSide,
    pub slots: [MatchSlot; 2],
    pub score: Option<(u32, u32)>,
    pub winner: Option<ParticipantId>,
    pub loser: Option<ParticipantId>,
    /// Completed with equal scores; Swiss only.
    pub draw: bool,
    /// Completed by withdrawal/disqualification rather than play.
    pub forfeit: bool,
    pub status: MatchStatus,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub reported_by: Option<String>,
    pub dispute_reason: Option<String>,
    /// Downstream slot the winner advances into.
    pub winner_to: Option<(MatchId, SlotIndex)>,
    /// Downstream slot the loser drops into (double elimination).
    pub loser_to: Option<(MatchId, SlotIndex)>,
}

impl Match {
    pub fn new(round: u32, number: u32, side: BracketSide) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            number,
            side,
            slots: [MatchSlot::Tbd, MatchSlot::Tbd],
            score: None,
            winner: None,
            loser: None,
            draw: false,
            forfeit: false,
            status: MatchStatus::Pending,
            scheduled_time: None,
            reported_by: None,
            dispute_reason: None,
            winner_to: None,
            loser_to: None,
        }
    }

    /// Real participants occupying this match, in slot order.
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.slots.iter().filter_map(|s| s.participant()).collect()
    }

    pub fn has_participant(&self, id: ParticipantId) -> bool {
        self.slots.contains(&MatchSlot::Taken(id))
    }

    pub fn slot_of(&self, id: ParticipantId) -> Option<SlotIndex> {
        self.slots.iter().position(|s| *s == MatchSlot::Taken(id))
    }

    /// A match is ready only when both slots hold real participants.
    pub fn both_slots_taken(&self) -> bool {
        self.slots
            .iter()
            .all(|s| matches!(s, MatchSlot::Taken(_)))
    }

    /// Recompute Pending/Ready from slot occupancy. Only meaningful before
    /// the match has a result; settled statuses are left alone.
    pub fn refresh_readiness(&mut self) {
        if matches!(self.status, MatchStatus::Pending | MatchStatus::Ready) {
            self.status = if self.both_slots_taken() {
                MatchStatus::Ready
            } else {
                MatchStatus::Pending
            };
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_requires_two_real_participants() {
        let mut m = Match::new(1, 1, BracketSide::Winners);
        assert_eq!(m.status, MatchStatus::Pending);

        m.slots[0] = MatchSlot::Taken(Uuid::new_v4());
        m.refresh_readiness();
        assert_eq!(m.status, MatchStatus::Pending);

        m.slots[1] = MatchSlot::Bye;
        m.refresh_readiness();
        assert_eq!(m.status, MatchStatus::Pending);

        m.slots[1] = MatchSlot::Taken(Uuid::new_v4());
        m.refresh_readiness();
        assert_eq!(m.status, MatchStatus::Ready);
    }

    #[test]
    fn slot_lookup() {
        let mut m = Match::new(2, 3, BracketSide::Losers);
        let p = Uuid::new_v4();
        m.slots[1] = MatchSlot::Taken(p);
        assert_eq!(m.slot_of(p), Some(1));
        assert!(m.has_participant(p));
        assert_eq!(m.participants(), vec![p]);
    }
}
