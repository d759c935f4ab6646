//! # Bracket Engine
//!
//! A tournament bracket generation and match-progression engine built
//! around an explicit lifecycle state machine.
//!
//! Tournaments move through a fixed lifecycle (draft, registration,
//! optional check-in, in-progress, completed), with cancellation reachable
//! from any non-terminal state. Starting a tournament seeds the confirmed
//! field and generates a bracket in one of four formats:
//!
//! - **Single elimination**: one loss eliminates; byes pad the field to a
//!   power of two
//! - **Double elimination**: a losers bracket gives everyone a second
//!   life, ending in a grand final with a possible bracket reset
//! - **Swiss**: a fixed number of rounds paired on standings, one round at
//!   a time
//! - **Round robin**: everyone plays everyone, optionally twice
//!
//! ## Core Modules
//!
//! - [`engine`]: The operation surface; owns tournament records and
//!   serializes concurrent access
//! - [`tournament`]: Lifecycle models and the status state machine
//! - [`participant`]: Entrants, registration status, and the registry
//! - [`seeding`]: Seeding policies and standard bracket slot ordering
//! - [`bracket`]: Bracket generation for each format and the match arena
//! - [`matches`]: Score reporting, disputes, forfeits, and advancement
//! - [`stats`]: Win/loss counters and team rollups driven by engine events
//!
//! ## Example
//!
//! ```
//! use bracket_engine::{
//!     Entrant, SeedingPolicy, TournamentConfig, TournamentEngine, TournamentFormat,
//! };
//! use uuid::Uuid;
//!
//! let engine = TournamentEngine::new();
//! let id = engine.create_tournament(TournamentConfig::new(
//!     "Weekly Open",
//!     TournamentFormat::SingleElimination,
//! ));
//! engine.open_registration(id).unwrap();
//! for name in ["alice", "bob", "carol", "dave"] {
//!     let p = engine
//!         .register(
//!             id,
//!             Entrant::Individual {
//!                 user_id: Uuid::new_v4(),
//!                 display_name: name.to_string(),
//!             },
//!         )
//!         .unwrap();
//!     engine.confirm_participant(id, p).unwrap();
//! }
//! engine
//!     .start_tournament(id, SeedingPolicy::RegistrationOrder, true)
//!     .unwrap();
//! ```

/// The engine facade; owns tournament records and the operation surface.
pub mod engine;
pub use engine::{EngineError, EngineResult, TournamentEngine};

/// Lifecycle facts emitted by engine operations.
pub mod events;
pub use events::EngineEvent;

/// Tournament lifecycle models and state machine.
pub mod tournament;
pub use tournament::{
    Tournament, TournamentConfig, TournamentError, TournamentFormat, TournamentId,
    TournamentStatus,
};

/// Entrants, registration status, and the participant registry.
pub mod participant;
pub use participant::{
    Entrant, Participant, ParticipantId, ParticipantRegistry, ParticipantStatus, RegistryError,
    Seed,
};

/// Seeding policies and bracket slot ordering.
pub mod seeding;
pub use seeding::{SeedingError, SeedingPolicy};

/// Bracket generation and the match arena.
pub mod bracket;
pub use bracket::{Bracket, BracketError, BracketView, MatchView, StandingsEntry};

/// Match entities and the progression engine.
pub mod matches;
pub use matches::{BracketSide, Match, MatchError, MatchId, MatchSlot, MatchStatus};

/// Statistics aggregation over engine events.
pub mod stats;
pub use stats::{StatsAggregator, TeamStats};
