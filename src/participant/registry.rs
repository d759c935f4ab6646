//! In-memory registry of tournament participants.
//!
//! Registration and payment gating live outside this crate; the registry
//! only enforces the invariants the bracket engine depends on: one active
//! registration per entrant, unique seeds, and a live confirmed count.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use super::models::{Entrant, Participant, ParticipantId, ParticipantStatus, Seed};

/// Errors raised by registry mutations
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    #[error("participant not found: {0}")]
    NotFound(ParticipantId),

    #[error("entrant {0} already holds an active registration")]
    AlreadyRegistered(Uuid),

    #[error("seed {0} is already assigned")]
    DuplicateSeed(Seed),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Clone, Debug, Default)]
pub struct ParticipantRegistry {
    participants: HashMap<ParticipantId, Participant>,
    /// Insertion order, for stable iteration.
    order: Vec<ParticipantId>,
    next_confirmed_seq: u64,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entrant. Fails if the entrant already holds an active
    /// (pending/pending-payment/confirmed) registration.
    pub fn register(&mut self, entrant: Entrant) -> RegistryResult<ParticipantId> {
        let entrant_id = entrant.id();
        let conflict = self
            .participants
            .values()
            .any(|p| p.entrant.id() == entrant_id && p.status.is_active());
        if conflict {
            return Err(RegistryError::AlreadyRegistered(entrant_id));
        }

        let participant = Participant::new(entrant);
        let id = participant.id;
        self.participants.insert(id, participant);
        self.order.push(id);
        Ok(id)
    }

    /// Change a participant's status, returning the previous one.
    /// Confirmation stamps the registration-order sequence number.
    pub fn set_status(
        &mut self,
        id: ParticipantId,
        status: ParticipantStatus,
    ) -> RegistryResult<ParticipantStatus> {
        let seq = self.next_confirmed_seq;
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        let previous = participant.status;
        participant.status = status;
        if status == ParticipantStatus::Confirmed && participant.confirmed_seq.is_none() {
            participant.confirmed_seq = Some(seq);
            self.next_confirmed_seq += 1;
        }
        Ok(previous)
    }

    /// Assign a seed, enforcing uniqueness among active registrations.
    /// Withdrawn and disqualified participants keep their old seed but
    /// no longer block it.
    pub fn set_seed(&mut self, id: ParticipantId, seed: Seed) -> RegistryResult<()> {
        let taken = self
            .participants
            .values()
            .any(|p| p.id != id && p.status.is_active() && p.seed == Some(seed));
        if taken {
            return Err(RegistryError::DuplicateSeed(seed));
        }
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        participant.seed = Some(seed);
        Ok(())
    }

    /// Restamp seeds `1..=N` from a final seeding order, clearing every
    /// other seed. Used once, when the bracket is generated.
    pub fn apply_seeding(&mut self, ordered: &[ParticipantId]) -> RegistryResult<()> {
        for id in ordered {
            if !self.participants.contains_key(id) {
                return Err(RegistryError::NotFound(*id));
            }
        }
        for participant in self.participants.values_mut() {
            participant.seed = None;
        }
        for (i, id) in ordered.iter().enumerate() {
            if let Some(participant) = self.participants.get_mut(id) {
                participant.seed = Some(i as Seed + 1);
            }
        }
        Ok(())
    }

    pub fn check_in(&mut self, id: ParticipantId) -> RegistryResult<()> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        participant.checked_in = true;
        Ok(())
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(&id)
    }

    /// Confirmed participants in registration order.
    pub fn confirmed(&self) -> Vec<&Participant> {
        self.order
            .iter()
            .filter_map(|id| self.participants.get(id))
            .filter(|p| p.status == ParticipantStatus::Confirmed)
            .collect()
    }

    /// Live count of confirmed participants. This is the value the
    /// tournament's `total_registered` must always equal.
    pub fn confirmed_count(&self) -> usize {
        self.participants
            .values()
            .filter(|p| p.status == ParticipantStatus::Confirmed)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.order.iter().filter_map(|id| self.participants.get(id))
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Mark confirmed participants who never checked in as withdrawn,
    /// returning the pruned ids.
    pub fn prune_no_shows(&mut self) -> Vec<ParticipantId> {
        let mut pruned = Vec::new();
        for participant in self.participants.values_mut() {
            if participant.status == ParticipantStatus::Confirmed && !participant.checked_in {
                participant.status = ParticipantStatus::Withdrawn;
                pruned.push(participant.id);
            }
        }
        pruned
    }
}
