//! Participant and entrant data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Participant ID type
pub type ParticipantId = Uuid;

/// Seed position within a tournament (1-based)
pub type Seed = u32;

/// An entrant is whoever occupies a bracket slot: a single user or a team.
/// Bracket logic only ever needs the identifier and a display name; team
/// rollups happen in the stats aggregator.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entrant {
    Individual { user_id: Uuid, display_name: String },
    Team { team_id: Uuid, name: String },
}

impl Entrant {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Individual { user_id, .. } => *user_id,
            Self::Team { team_id, .. } => *team_id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Individual { display_name, .. } => display_name,
            Self::Team { name, .. } => name,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Self::Team { .. })
    }
}

/// Participant registration status
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Pending,
    PendingPayment,
    Confirmed,
    Rejected,
    Withdrawn,
    Disqualified,
}

impl ParticipantStatus {
    /// Statuses that hold a registration slot. At most one participant per
    /// (tournament, entrant) may be in one of these.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::PendingPayment | Self::Confirmed
        )
    }

    /// Statuses that trigger a forfeit when the participant holds an open
    /// match slot.
    pub fn is_forfeit(self) -> bool {
        matches!(self, Self::Withdrawn | Self::Disqualified)
    }
}

/// A confirmed or prospective tournament entrant.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub entrant: Entrant,
    pub status: ParticipantStatus,
    /// Unique within a tournament once assigned.
    pub seed: Option<Seed>,
    pub checked_in: bool,
    pub registered_at: DateTime<Utc>,
    /// Monotone counter assigned when the participant is confirmed; drives
    /// the registration-order seeding policy.
    pub confirmed_seq: Option<u64>,
    pub matches_played: u32,
    pub matches_won: u32,
}

impl Participant {
    pub fn new(entrant: Entrant) -> Self {
        Self {
            id: Uuid::new_v4(),
            entrant,
            status: ParticipantStatus::Pending,
            seed: None,
            checked_in: false,
            registered_at: Utc::now(),
            confirmed_seq: None,
            matches_played: 0,
            matches_won: 0,
        }
    }
}
