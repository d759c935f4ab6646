//! Tournament data models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Competition format
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
    Swiss,
    RoundRobin,
}

impl TournamentFormat {
    /// Only Swiss scores draws; everywhere else a tie is a validation error.
    pub fn allows_draws(self) -> bool {
        matches!(self, Self::Swiss)
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::SingleElimination => "single elimination",
            Self::DoubleElimination => "double elimination",
            Self::Swiss => "swiss",
            Self::RoundRobin => "round robin",
        };
        write!(f, "{repr}")
    }
}

/// Tournament lifecycle status
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Draft,
    Registration,
    CheckIn,
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Draft => "draft",
            Self::Registration => "registration",
            Self::CheckIn => "check_in",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{repr}")
    }
}

/// Tournament configuration. Format and participant bounds are immutable
/// once the tournament is in progress.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TournamentConfig {
    pub name: String,
    pub format: TournamentFormat,
    pub min_participants: usize,
    pub max_participants: usize,
    pub is_team_based: bool,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    /// Check-in window. When `None` the check-in phase is skipped and
    /// registration transitions straight to in-progress.
    pub check_in_start: Option<DateTime<Utc>>,
    pub check_in_end: Option<DateTime<Utc>>,
    pub scheduled_start: Option<DateTime<Utc>>,
    /// Swiss round count; defaults to `ceil(log2(N))` when unset.
    pub swiss_rounds: Option<u32>,
    /// Play the round-robin schedule twice (home/away).
    pub double_round_robin: bool,
}

impl TournamentConfig {
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            name: name.into(),
            format,
            min_participants: 2,
            max_participants: 256,
            is_team_based: false,
            registration_start: None,
            registration_end: None,
            check_in_start: None,
            check_in_end: None,
            scheduled_start: None,
            swiss_rounds: None,
            double_round_robin: false,
        }
    }

    pub fn with_participant_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_participants = min;
        self.max_participants = max;
        self
    }

    pub fn with_check_in_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.check_in_start = Some(start);
        self.check_in_end = Some(end);
        self
    }

    pub fn with_registration_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.registration_start = Some(start);
        self.registration_end = Some(end);
        self
    }

    pub fn with_swiss_rounds(mut self, rounds: u32) -> Self {
        self.swiss_rounds = Some(rounds);
        self
    }

    pub fn team_based(mut self) -> Self {
        self.is_team_based = true;
        self
    }

    pub fn has_check_in_phase(&self) -> bool {
        self.check_in_start.is_some() || self.check_in_end.is_some()
    }
}

/// A tournament in some lifecycle state. The participant set and bracket
/// live beside it in the engine record; this struct owns only lifecycle
/// data.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub status: TournamentStatus,
    /// Cached count of confirmed participants.
    pub total_registered: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            status: TournamentStatus::Draft,
            total_registered: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}
