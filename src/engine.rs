//! The tournament engine: owns every tournament record and serializes
//! concurrent operations against them.
//!
//! Each tournament lives behind its own mutex, so two simultaneous score
//! reports for the same match lock in some order and the loser fails with
//! [`MatchError::AlreadyCompleted`] instead of silently overwriting. A
//! global match index maps match ids back to their tournament so reporting
//! callers never need to carry the tournament id around.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log::info;
use thiserror::Error;
use uuid::Uuid;

use crate::bracket::{Bracket, BracketError, BracketView, MatchView, StandingsEntry};
use crate::events::EngineEvent;
use crate::matches::{MatchError, MatchId};
use crate::participant::{
    Entrant, Participant, ParticipantId, ParticipantRegistry, ParticipantStatus, RegistryError,
};
use crate::seeding::{SeedingError, SeedingPolicy, assign_seeds};
use crate::stats::{StatsAggregator, TeamStats};
use crate::tournament::{
    Tournament, TournamentConfig, TournamentError, TournamentId, TournamentStatus,
    TransitionContext, validate_transition,
};

/// Errors surfaced by engine operations
#[derive(Debug, Error, Eq, PartialEq)]
pub enum EngineError {
    #[error("tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("no tournament holds match {0}")]
    MatchNotFound(MatchId),

    #[error("registration is not open")]
    RegistrationClosed,

    #[error("tournament is full at {0} participants")]
    TournamentFull(usize),

    #[error("tournament expects {expected} entrants")]
    EntrantKindMismatch { expected: &'static str },

    #[error("tournament is not in progress")]
    NotInProgress,

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Seeding(#[from] SeedingError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Everything the engine holds for one tournament. Guarded by a single
/// mutex; every invariant between the lifecycle state, the registry, the
/// bracket and the stats holds under that lock.
#[derive(Debug)]
struct TournamentRecord {
    tournament: Tournament,
    registry: ParticipantRegistry,
    bracket: Option<Bracket>,
    stats: StatsAggregator,
    /// Append-only log of every event this tournament has emitted.
    history: Vec<EngineEvent>,
}

impl TournamentRecord {
    fn new(config: TournamentConfig) -> Self {
        Self {
            tournament: Tournament::new(config),
            registry: ParticipantRegistry::new(),
            bracket: None,
            stats: StatsAggregator::new(),
            history: Vec::new(),
        }
    }

    /// Record events against stats and history. Stats consume the events
    /// after any auto-completion has been appended, so a title placement
    /// is never missed.
    fn record_events(&mut self, events: &[EngineEvent]) {
        let registry = &mut self.registry;
        self.stats.apply_all(events, registry);
        self.history.extend(events.iter().cloned());
    }

    /// Close out the tournament once the bracket has no unfinished match
    /// left, appending the completion event.
    fn finish_if_decided(&mut self, events: &mut Vec<EngineEvent>) {
        let Some(bracket) = self.bracket.as_ref() else {
            return;
        };
        if self.tournament.status != TournamentStatus::InProgress
            || !bracket.all_matches_completed()
        {
            return;
        }
        let winner = bracket.champion();
        let ctx = TransitionContext::new(self.registry.confirmed_count());
        if self
            .tournament
            .transition(TournamentStatus::Completed, &ctx)
            .is_ok()
        {
            events.push(EngineEvent::TournamentCompleted {
                tournament_id: self.tournament.id,
                winner,
            });
        }
    }
}

type SharedRecord = Arc<Mutex<TournamentRecord>>;

#[derive(Debug, Default)]
pub struct TournamentEngine {
    tournaments: RwLock<HashMap<TournamentId, SharedRecord>>,
    /// Reverse lookup from match id to owning tournament.
    match_index: RwLock<HashMap<MatchId, TournamentId>>,
}

impl TournamentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_tournament(&self, config: TournamentConfig) -> TournamentId {
        let record = TournamentRecord::new(config);
        let id = record.tournament.id;
        info!("tournament {id} created: {}", record.tournament.config.name);
        self.tournaments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(record)));
        id
    }

    pub fn tournament_ids(&self) -> Vec<TournamentId> {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    // Lifecycle ----------------------------------------------------------

    pub fn open_registration(&self, tournament_id: TournamentId) -> EngineResult<()> {
        self.phase_transition(tournament_id, TournamentStatus::Registration, false)
    }

    /// Close registration into the check-in phase. `force` lets an
    /// organizer close before the registration window has elapsed.
    pub fn open_check_in(&self, tournament_id: TournamentId, force: bool) -> EngineResult<()> {
        self.phase_transition(tournament_id, TournamentStatus::CheckIn, force)
    }

    /// Start the tournament: prune no-shows (when a check-in phase ran),
    /// seed the confirmed field under `policy`, generate the bracket and
    /// commit the transition. A failure at any step leaves the tournament
    /// in its prior lifecycle state.
    pub fn start_tournament(
        &self,
        tournament_id: TournamentId,
        policy: SeedingPolicy,
        force: bool,
    ) -> EngineResult<Vec<EngineEvent>> {
        let shared = self.record(tournament_id)?;
        let mut guard = lock(&shared);
        let rec = &mut *guard;

        let mut ctx = TransitionContext::new(rec.registry.confirmed_count());
        if force {
            ctx = ctx.forced();
        }
        validate_transition(&rec.tournament, TournamentStatus::InProgress, &ctx)?;

        if rec.tournament.status == TournamentStatus::CheckIn {
            let pruned = rec.registry.prune_no_shows();
            if !pruned.is_empty() {
                info!(
                    "tournament {tournament_id}: {} no-shows withdrawn at start",
                    pruned.len()
                );
            }
        }

        let confirmed = rec.registry.confirmed();
        let field_size = confirmed.len();
        if field_size < rec.tournament.config.min_participants {
            return Err(TournamentError::InsufficientParticipants {
                needed: rec.tournament.config.min_participants,
                confirmed: field_size,
            }
            .into());
        }

        let seeds = assign_seeds(&confirmed, policy)?;
        rec.registry.apply_seeding(&seeds)?;
        let bracket = Bracket::generate(tournament_id, &rec.tournament.config, &seeds)?;

        ctx.confirmed = field_size;
        rec.tournament.transition(TournamentStatus::InProgress, &ctx)?;
        rec.tournament.total_registered = field_size;
        self.index_matches(tournament_id, &bracket);
        rec.bracket = Some(bracket);

        let events = vec![EngineEvent::TournamentStarted { tournament_id }];
        rec.record_events(&events);
        Ok(events)
    }

    pub fn cancel_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> EngineResult<Vec<EngineEvent>> {
        let shared = self.record(tournament_id)?;
        let mut rec = lock(&shared);
        let ctx = TransitionContext::new(rec.registry.confirmed_count());
        rec.tournament.transition(TournamentStatus::Cancelled, &ctx)?;
        let events = vec![EngineEvent::TournamentCancelled { tournament_id }];
        rec.record_events(&events);
        Ok(events)
    }

    // Registration -------------------------------------------------------

    /// Register an entrant. Open only during the registration phase, up to
    /// the configured maximum, and only for the entrant kind the
    /// tournament was configured for.
    pub fn register(
        &self,
        tournament_id: TournamentId,
        entrant: Entrant,
    ) -> EngineResult<ParticipantId> {
        let shared = self.record(tournament_id)?;
        let mut rec = lock(&shared);

        if rec.tournament.status != TournamentStatus::Registration {
            return Err(EngineError::RegistrationClosed);
        }
        let team_based = rec.tournament.config.is_team_based;
        if entrant.is_team() != team_based {
            return Err(EngineError::EntrantKindMismatch {
                expected: if team_based { "team" } else { "individual" },
            });
        }
        let active = rec.registry.iter().filter(|p| p.status.is_active()).count();
        let max = rec.tournament.config.max_participants;
        if active >= max {
            return Err(EngineError::TournamentFull(max));
        }

        let id = rec.registry.register(entrant)?;
        Ok(id)
    }

    pub fn confirm_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<Vec<EngineEvent>> {
        self.set_participant_status(tournament_id, participant_id, ParticipantStatus::Confirmed)
    }

    /// Change a participant's registration status. Moving a participant to
    /// withdrawn or disqualified while the tournament runs forfeits their
    /// open matches.
    pub fn set_participant_status(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        status: ParticipantStatus,
    ) -> EngineResult<Vec<EngineEvent>> {
        let shared = self.record(tournament_id)?;
        let mut guard = lock(&shared);
        let rec = &mut *guard;

        match rec.tournament.status {
            TournamentStatus::Cancelled => return Err(TournamentError::Cancelled.into()),
            TournamentStatus::Completed => return Err(EngineError::NotInProgress),
            _ => {}
        }

        rec.registry.set_status(participant_id, status)?;
        rec.tournament.total_registered = rec.registry.confirmed_count();

        let mut events = Vec::new();
        if rec.tournament.status == TournamentStatus::InProgress && status.is_forfeit() {
            if let Some(bracket) = rec.bracket.as_mut()
                && !bracket.is_eliminated(participant_id)
            {
                events = bracket.forfeit_participant(participant_id);
                self.index_matches(tournament_id, bracket);
            }
            rec.finish_if_decided(&mut events);
        }
        rec.record_events(&events);
        Ok(events)
    }

    pub fn check_in(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<()> {
        let shared = self.record(tournament_id)?;
        let mut rec = lock(&shared);
        match rec.tournament.status {
            TournamentStatus::Registration | TournamentStatus::CheckIn => {}
            _ => return Err(EngineError::RegistrationClosed),
        }
        rec.registry.check_in(participant_id)?;
        Ok(())
    }

    // Match progression ----------------------------------------------------

    /// Report a final score. Advancement, eliminations, any new matches
    /// (the next Swiss round, a grand-final reset) and tournament
    /// completion all happen atomically under the tournament lock.
    pub fn report_result(
        &self,
        match_id: MatchId,
        score_p1: u32,
        score_p2: u32,
        reported_by: Option<String>,
    ) -> EngineResult<Vec<EngineEvent>> {
        self.with_bracket(match_id, |engine, tournament_id, rec| {
            let bracket = rec.bracket.as_mut().ok_or(EngineError::NotInProgress)?;
            let mut events = bracket.report_result(match_id, score_p1, score_p2, reported_by)?;
            engine.index_matches(tournament_id, bracket);
            rec.finish_if_decided(&mut events);
            Ok(events)
        })
    }

    pub fn begin_match(&self, match_id: MatchId) -> EngineResult<()> {
        self.with_bracket(match_id, |_, _, rec| {
            let bracket = rec.bracket.as_mut().ok_or(EngineError::NotInProgress)?;
            bracket.begin_match(match_id)?;
            Ok(Vec::new())
        })
        .map(|_| ())
    }

    pub fn schedule_match(&self, match_id: MatchId, time: DateTime<Utc>) -> EngineResult<()> {
        self.with_bracket(match_id, |_, _, rec| {
            let bracket = rec.bracket.as_mut().ok_or(EngineError::NotInProgress)?;
            bracket.schedule_match(match_id, time)?;
            Ok(Vec::new())
        })
        .map(|_| ())
    }

    pub fn dispute_match(
        &self,
        match_id: MatchId,
        reason: impl Into<String>,
    ) -> EngineResult<Vec<EngineEvent>> {
        let reason = reason.into();
        self.with_bracket(match_id, |_, _, rec| {
            let bracket = rec.bracket.as_mut().ok_or(EngineError::NotInProgress)?;
            let event = bracket.dispute_match(match_id, reason)?;
            Ok(vec![event])
        })
    }

    /// Resolve a dispute with corrected scores. The contested result is
    /// reverted, the correction applied, and statistics recomputed from
    /// the new outcome.
    pub fn resolve_dispute(
        &self,
        match_id: MatchId,
        score_p1: u32,
        score_p2: u32,
    ) -> EngineResult<Vec<EngineEvent>> {
        self.with_bracket(match_id, |engine, tournament_id, rec| {
            let bracket = rec.bracket.as_mut().ok_or(EngineError::NotInProgress)?;
            let mut events = bracket.resolve_dispute(match_id, score_p1, score_p2)?;
            engine.index_matches(tournament_id, bracket);
            rec.finish_if_decided(&mut events);
            Ok(events)
        })
    }

    pub fn reopen_match(&self, match_id: MatchId) -> EngineResult<Vec<EngineEvent>> {
        self.with_bracket(match_id, |_, _, rec| {
            let bracket = rec.bracket.as_mut().ok_or(EngineError::NotInProgress)?;
            let events = bracket.reopen_match(match_id)?;
            Ok(events)
        })
    }

    // Queries --------------------------------------------------------------

    pub fn tournament(&self, tournament_id: TournamentId) -> EngineResult<Tournament> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        Ok(rec.tournament.clone())
    }

    pub fn participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<Participant> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        rec.registry
            .get(participant_id)
            .cloned()
            .ok_or(RegistryError::NotFound(participant_id).into())
    }

    pub fn participants(&self, tournament_id: TournamentId) -> EngineResult<Vec<Participant>> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        Ok(rec.registry.iter().cloned().collect())
    }

    pub fn bracket_view(&self, tournament_id: TournamentId) -> EngineResult<BracketView> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        rec.bracket
            .as_ref()
            .map(Bracket::view)
            .ok_or(EngineError::NotInProgress)
    }

    pub fn match_view(&self, match_id: MatchId) -> EngineResult<MatchView> {
        let tournament_id = self.tournament_for(match_id)?;
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        rec.bracket
            .as_ref()
            .and_then(|b| b.get(match_id))
            .map(MatchView::from)
            .ok_or(EngineError::MatchNotFound(match_id))
    }

    pub fn standings(&self, tournament_id: TournamentId) -> EngineResult<Vec<StandingsEntry>> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        rec.bracket
            .as_ref()
            .map(Bracket::standings)
            .ok_or(EngineError::NotInProgress)
    }

    pub fn team_stats(
        &self,
        tournament_id: TournamentId,
        team_id: Uuid,
    ) -> EngineResult<TeamStats> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        Ok(rec.stats.team_stats(team_id))
    }

    pub fn placement(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<Option<u32>> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        Ok(rec.stats.placement(participant_id))
    }

    pub fn history(&self, tournament_id: TournamentId) -> EngineResult<Vec<EngineEvent>> {
        let shared = self.record(tournament_id)?;
        let rec = lock(&shared);
        Ok(rec.history.clone())
    }

    // Internals --------------------------------------------------------------

    fn record(&self, tournament_id: TournamentId) -> EngineResult<SharedRecord> {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tournament_id)
            .cloned()
            .ok_or(EngineError::TournamentNotFound(tournament_id))
    }

    fn tournament_for(&self, match_id: MatchId) -> EngineResult<TournamentId> {
        self.match_index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&match_id)
            .copied()
            .ok_or(EngineError::MatchNotFound(match_id))
    }

    /// Index every match of a bracket. New matches appear after generation
    /// (Swiss rounds, grand-final resets), so this runs after any
    /// operation that can create them.
    fn index_matches(&self, tournament_id: TournamentId, bracket: &Bracket) {
        let mut index = self
            .match_index
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for id in bracket.match_ids() {
            index.entry(id).or_insert(tournament_id);
        }
    }

    fn phase_transition(
        &self,
        tournament_id: TournamentId,
        target: TournamentStatus,
        force: bool,
    ) -> EngineResult<()> {
        let shared = self.record(tournament_id)?;
        let mut rec = lock(&shared);
        let mut ctx = TransitionContext::new(rec.registry.confirmed_count());
        if force {
            ctx = ctx.forced();
        }
        rec.tournament.transition(target, &ctx)?;
        Ok(())
    }

    /// Run a match operation under its tournament's lock, then feed the
    /// resulting events through stats and history.
    fn with_bracket<F>(&self, match_id: MatchId, op: F) -> EngineResult<Vec<EngineEvent>>
    where
        F: FnOnce(&Self, TournamentId, &mut TournamentRecord) -> EngineResult<Vec<EngineEvent>>,
    {
        let tournament_id = self.tournament_for(match_id)?;
        let shared = self.record(tournament_id)?;
        let mut guard = lock(&shared);
        let rec = &mut *guard;

        match rec.tournament.status {
            TournamentStatus::InProgress => {}
            TournamentStatus::Cancelled => return Err(TournamentError::Cancelled.into()),
            _ => return Err(EngineError::NotInProgress),
        }

        let events = op(self, tournament_id, rec)?;
        rec.record_events(&events);
        Ok(events)
    }
}

fn lock(shared: &SharedRecord) -> MutexGuard<'_, TournamentRecord> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
