//! Lifecycle facts emitted by the engine.
//!
//! Notification delivery and live-update transports subscribe to these
//! downstream; a delivery failure can never roll back bracket state, so
//! events are plain values handed back to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matches::models::MatchId;
use crate::participant::ParticipantId;
use crate::tournament::TournamentId;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum EngineEvent {
    TournamentStarted {
        tournament_id: TournamentId,
    },
    MatchCompleted {
        match_id: MatchId,
        participants: Vec<ParticipantId>,
        winner: Option<ParticipantId>,
        draw: bool,
        forfeit: bool,
    },
    MatchReopened {
        match_id: MatchId,
    },
    ParticipantEliminated {
        participant_id: ParticipantId,
        /// Final placement, when the format defines one at elimination time.
        placement: Option<u32>,
    },
    DisputeOpened {
        match_id: MatchId,
        reason: String,
    },
    DisputeResolved {
        match_id: MatchId,
    },
    BracketResetScheduled {
        match_id: MatchId,
    },
    TournamentCompleted {
        tournament_id: TournamentId,
        winner: Option<ParticipantId>,
    },
    TournamentCancelled {
        tournament_id: TournamentId,
    },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TournamentStarted { tournament_id } => {
                write!(f, "tournament {tournament_id} started")
            }
            Self::MatchCompleted {
                match_id,
                winner,
                draw,
                forfeit,
                ..
            } => match (winner, draw, forfeit) {
                (_, true, _) => write!(f, "match {match_id} drawn"),
                (Some(w), _, true) => write!(f, "match {match_id} won by {w} on forfeit"),
                (Some(w), _, false) => write!(f, "match {match_id} won by {w}"),
                (None, _, _) => write!(f, "match {match_id} completed with no winner"),
            },
            Self::MatchReopened { match_id } => write!(f, "match {match_id} reopened"),
            Self::ParticipantEliminated {
                participant_id,
                placement,
            } => match placement {
                Some(p) => write!(f, "{participant_id} eliminated in place {p}"),
                None => write!(f, "{participant_id} eliminated"),
            },
            Self::DisputeOpened { match_id, reason } => {
                write!(f, "match {match_id} disputed: {reason}")
            }
            Self::DisputeResolved { match_id } => {
                write!(f, "dispute on match {match_id} resolved")
            }
            Self::BracketResetScheduled { match_id } => {
                write!(f, "grand final bracket reset scheduled as match {match_id}")
            }
            Self::TournamentCompleted {
                tournament_id,
                winner,
            } => match winner {
                Some(w) => write!(f, "tournament {tournament_id} completed, won by {w}"),
                None => write!(f, "tournament {tournament_id} completed"),
            },
            Self::TournamentCancelled { tournament_id } => {
                write!(f, "tournament {tournament_id} cancelled")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn display_variants() {
        let id = Uuid::nil();
        let event = EngineEvent::MatchCompleted {
            match_id: id,
            participants: vec![],
            winner: None,
            draw: true,
            forfeit: false,
        };
        assert_eq!(
            event.to_string(),
            format!("match {id} drawn")
        );

        let event = EngineEvent::DisputeOpened {
            match_id: id,
            reason: "scores entered backwards".to_string(),
        };
        assert!(event.to_string().contains("scores entered backwards"));
    }
}
