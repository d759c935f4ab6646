//! Tournament lifecycle: models and state machine.
//!
//! A tournament moves draft -> registration -> check_in -> in_progress ->
//! completed, with cancellation reachable from any non-terminal state.
//! Starting a tournament (the transition into in-progress) is what seeds
//! participants and generates the bracket; see [`crate::engine`].

pub mod models;
pub mod state_machine;

pub use models::{Tournament, TournamentConfig, TournamentFormat, TournamentId, TournamentStatus};
pub use state_machine::{
    TournamentError, TournamentResult, TransitionContext, validate_transition,
};
