//! Participant registry and entrant models.
//!
//! Registration, payment gating and approval are external concerns; this
//! module only stores the entrants the bracket engine reads and enforces
//! the invariants it depends on (one active registration per entrant,
//! unique seeds, live confirmed count).

pub mod models;
pub mod registry;

pub use models::{Entrant, Participant, ParticipantId, ParticipantStatus, Seed};
pub use registry::{ParticipantRegistry, RegistryError, RegistryResult};
