//! Tournament lifecycle state machine.
//!
//! All status-gated logic funnels through [`validate_transition`] and
//! [`Tournament::transition`]; no other component branches on raw status
//! values. The engine performs the side effects of a transition (pruning
//! no-shows, seeding, bracket generation) between validation and commit so
//! a failed generation leaves the tournament in its prior state.

use chrono::{DateTime, Utc};
use log::info;
use thiserror::Error;

use super::models::{Tournament, TournamentStatus};

/// Lifecycle errors
#[derive(Debug, Error, Eq, PartialEq)]
pub enum TournamentError {
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },

    #[error("insufficient participants: need {needed}, have {confirmed}")]
    InsufficientParticipants { needed: usize, confirmed: usize },

    #[error("registration window is still open")]
    RegistrationStillOpen,

    #[error("tournament cancelled")]
    Cancelled,
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Context a transition is validated against.
#[derive(Clone, Copy, Debug)]
pub struct TransitionContext {
    /// Live count of confirmed participants.
    pub confirmed: usize,
    pub now: DateTime<Utc>,
    /// Organizer override for time-gated transitions (early close).
    pub force: bool,
}

impl TransitionContext {
    pub fn new(confirmed: usize) -> Self {
        Self {
            confirmed,
            now: Utc::now(),
            force: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Whether `from -> to` is an edge of the lifecycle graph at all,
/// ignoring preconditions. Cancellation is reachable from any
/// non-terminal state; everything else is monotonic.
fn is_edge(from: TournamentStatus, to: TournamentStatus) -> bool {
    use TournamentStatus::*;
    match (from, to) {
        (_, Cancelled) => !from.is_terminal(),
        (Draft, Registration) => true,
        (Registration, CheckIn) => true,
        (Registration, InProgress) => true,
        (CheckIn, InProgress) => true,
        (InProgress, Completed) => true,
        _ => false,
    }
}

/// Validate a transition against the lifecycle graph and its
/// preconditions, without committing it.
pub fn validate_transition(
    tournament: &Tournament,
    target: TournamentStatus,
    ctx: &TransitionContext,
) -> TournamentResult<()> {
    let from = tournament.status;
    if from == TournamentStatus::Cancelled {
        return Err(TournamentError::Cancelled);
    }
    if !is_edge(from, target) {
        return Err(TournamentError::InvalidTransition { from, to: target });
    }

    match target {
        // Closing registration (into check-in or straight to in-progress)
        // requires the window to have elapsed, or an organizer force, and
        // enough confirmed participants to run the event.
        TournamentStatus::CheckIn | TournamentStatus::InProgress
            if from == TournamentStatus::Registration =>
        {
            if !ctx.force {
                match tournament.config.registration_end {
                    Some(end) if ctx.now <= end => {
                        return Err(TournamentError::RegistrationStillOpen);
                    }
                    _ => {}
                }
            }
            if ctx.confirmed < tournament.config.min_participants {
                return Err(TournamentError::InsufficientParticipants {
                    needed: tournament.config.min_participants,
                    confirmed: ctx.confirmed,
                });
            }
        }
        _ => {}
    }

    Ok(())
}

impl Tournament {
    /// Validate and commit a lifecycle transition. Side effects that can
    /// fail (seeding, bracket generation) must run between
    /// [`validate_transition`] and this commit.
    pub fn transition(
        &mut self,
        target: TournamentStatus,
        ctx: &TransitionContext,
    ) -> TournamentResult<()> {
        validate_transition(self, target, ctx)?;
        info!("tournament {} status {} -> {}", self.id, self.status, target);
        self.status = target;
        match target {
            TournamentStatus::InProgress => self.started_at = Some(ctx.now),
            TournamentStatus::Completed | TournamentStatus::Cancelled => {
                self.completed_at = Some(ctx.now);
            }
            _ => {}
        }
        Ok(())
    }
}
