//! Bracket generation and the bracket match arena.
//!
//! A [`Bracket`] owns every match of a tournament in an id-keyed arena;
//! rounds hold ordered match ids and matches point forward to the slots
//! their winner (and, in double elimination, loser) feed. Generated exactly
//! once, at the transition into in-progress.

mod double_elimination;
mod round_robin;
mod single_elimination;
mod swiss;

pub use swiss::SwissState;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matches::models::{BracketSide, Match, MatchId, MatchSlot, MatchStatus, SlotIndex};
use crate::participant::ParticipantId;
use crate::seeding::SeedingError;
use crate::tournament::{TournamentConfig, TournamentFormat, TournamentId};

/// Bracket generation failures
#[derive(Debug, Error, Eq, PartialEq)]
pub enum BracketError {
    #[error("need at least 2 participants, have {0}")]
    InvalidParticipantCount(usize),

    #[error("unsupported format configuration: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Seeding(#[from] SeedingError),
}

pub type BracketResult<T> = Result<T, BracketError>;

/// The generated round/match structure for one tournament.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Bracket {
    pub tournament_id: TournamentId,
    /// Copied from the tournament at generation time; immutable after.
    pub format: TournamentFormat,
    pub generated_at: DateTime<Utc>,
    pub(crate) matches: HashMap<MatchId, Match>,
    /// Winners-side rounds (the only side for non-double-elimination),
    /// each holding match ids ordered by match number.
    pub(crate) rounds: Vec<Vec<MatchId>>,
    /// Losers-side rounds (double elimination only).
    pub(crate) losers_rounds: Vec<Vec<MatchId>>,
    pub(crate) grand_final: Option<MatchId>,
    pub(crate) grand_final_reset: Option<MatchId>,
    pub(crate) swiss: Option<SwissState>,
    /// Entrants in seed order.
    pub(crate) entrants: Vec<ParticipantId>,
    /// Participants knocked out of the competition.
    pub(crate) eliminated: HashSet<ParticipantId>,
}

impl Bracket {
    /// Generate the initial match set for a seeded participant list.
    /// `seeds[i]` is the participant seeded `i + 1`.
    pub fn generate(
        tournament_id: TournamentId,
        config: &TournamentConfig,
        seeds: &[ParticipantId],
    ) -> BracketResult<Self> {
        if seeds.len() < 2 {
            return Err(BracketError::InvalidParticipantCount(seeds.len()));
        }

        let mut bracket = Self {
            tournament_id,
            format: config.format,
            generated_at: Utc::now(),
            matches: HashMap::new(),
            rounds: Vec::new(),
            losers_rounds: Vec::new(),
            grand_final: None,
            grand_final_reset: None,
            swiss: None,
            entrants: seeds.to_vec(),
            eliminated: HashSet::new(),
        };

        match config.format {
            TournamentFormat::SingleElimination => {
                if config.double_round_robin {
                    return Err(BracketError::UnsupportedFormat(
                        "double_round_robin only applies to round robin".to_string(),
                    ));
                }
                single_elimination::generate(&mut bracket, seeds);
            }
            TournamentFormat::DoubleElimination => {
                double_elimination::generate(&mut bracket, seeds);
            }
            TournamentFormat::Swiss => {
                swiss::generate(&mut bracket, seeds, config.swiss_rounds);
            }
            TournamentFormat::RoundRobin => {
                round_robin::generate(&mut bracket, seeds, config.double_round_robin);
            }
        }

        info!(
            "generated {} bracket for tournament {}: {} matches, {} rounds",
            bracket.format,
            tournament_id,
            bracket.matches.len(),
            bracket.rounds.len(),
        );
        Ok(bracket)
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.get_mut(&id)
    }

    pub fn match_ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.matches.keys().copied()
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn round(&self, round: usize) -> Vec<&Match> {
        self.rounds
            .get(round)
            .map(|ids| ids.iter().filter_map(|id| self.matches.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn is_eliminated(&self, id: ParticipantId) -> bool {
        self.eliminated.contains(&id)
    }

    /// Register a freshly built match into the arena and a round list.
    pub(crate) fn insert(&mut self, m: Match, losers_side: bool) -> MatchId {
        let id = m.id;
        let round = m.round as usize - 1;
        let list = if losers_side {
            &mut self.losers_rounds
        } else {
            &mut self.rounds
        };
        while list.len() <= round {
            list.push(Vec::new());
        }
        list[round].push(id);
        self.matches.insert(id, m);
        id
    }

    /// Place an occupant into a downstream slot and refresh readiness.
    pub(crate) fn place(&mut self, target: (MatchId, SlotIndex), occupant: MatchSlot) {
        if let Some(m) = self.matches.get_mut(&target.0) {
            m.slots[target.1] = occupant;
            m.refresh_readiness();
        }
    }

    /// Settle every match decided by a bye and cascade the results
    /// downstream. A match with one real participant against a bye
    /// completes immediately with that participant as winner; a match
    /// between two byes completes with no winner and pushes a bye onward.
    /// Returns the ids of matches settled, in settlement order.
    pub(crate) fn settle_byes(&mut self) -> Vec<MatchId> {
        let mut settled = Vec::new();
        loop {
            let candidate = self.matches.values().find_map(|m| {
                if m.status != MatchStatus::Pending {
                    return None;
                }
                let byes = m.slots.iter().filter(|s| **s == MatchSlot::Bye).count();
                let taken = m.slots.iter().filter_map(|s| s.participant()).count();
                (byes > 0 && byes + taken == 2).then_some(m.id)
            });
            let Some(id) = candidate else { break };

            let (winner, winner_to, loser_to) = {
                let m = self.matches.get_mut(&id).expect("candidate exists");
                let winner = m.slots.iter().find_map(|s| s.participant());
                m.winner = winner;
                m.status = MatchStatus::Completed;
                (winner, m.winner_to, m.loser_to)
            };

            if let Some(target) = winner_to {
                let occupant = match winner {
                    Some(p) => MatchSlot::Taken(p),
                    None => MatchSlot::Bye,
                };
                self.place(target, occupant);
            }
            // A bye produces no loser; whatever slot expected one gets a bye.
            if let Some(target) = loser_to {
                self.place(target, MatchSlot::Bye);
            }
            settled.push(id);
        }
        settled
    }

    /// All matches completed (disputed and open matches both count as
    /// unfinished).
    pub(crate) fn all_matches_completed(&self) -> bool {
        self.matches.values().all(Match::is_completed)
    }

    /// The tournament champion, if the bracket has produced one.
    pub fn champion(&self) -> Option<ParticipantId> {
        match self.format {
            TournamentFormat::SingleElimination => {
                let final_id = self.rounds.last()?.first()?;
                let final_match = self.matches.get(final_id)?;
                final_match.is_completed().then_some(final_match.winner)?
            }
            TournamentFormat::DoubleElimination => {
                if let Some(reset_id) = self.grand_final_reset {
                    let reset = self.matches.get(&reset_id)?;
                    return reset.is_completed().then_some(reset.winner)?;
                }
                let gf = self.matches.get(&self.grand_final?)?;
                if !gf.is_completed() {
                    return None;
                }
                // A losers-bracket champion winning the first grand final
                // forces a reset; no champion until that match resolves.
                match (gf.winner, gf.slots[0].participant()) {
                    (Some(w), Some(wb_champ)) if w == wb_champ => Some(w),
                    _ => None,
                }
            }
            TournamentFormat::Swiss => {
                let total = self.swiss.as_ref()?.total_rounds as usize;
                (self.rounds.len() == total && self.all_matches_completed())
                    .then(|| self.standings().first().map(|e| e.participant))?
            }
            TournamentFormat::RoundRobin => self
                .all_matches_completed()
                .then(|| self.standings().first().map(|e| e.participant))?,
        }
    }

    /// Win/draw/loss standings derived from completed matches. Wins and
    /// byes score 2 points, draws 1. Sorted by points, then wins, then
    /// participant id for determinism.
    pub fn standings(&self) -> Vec<StandingsEntry> {
        let mut table: HashMap<ParticipantId, StandingsEntry> = HashMap::new();

        // Every participant that occupies any slot appears, even at 0 points.
        for m in self.matches.values() {
            for p in m.participants() {
                table.entry(p).or_insert_with(|| StandingsEntry::new(p));
            }
        }
        for m in self.matches.values().filter(|m| m.is_completed()) {
            let participants = m.participants();
            if m.draw {
                for p in participants {
                    let e = table.get_mut(&p).expect("seen above");
                    e.played += 1;
                    e.draws += 1;
                    e.points += 1;
                }
            } else if let Some(w) = m.winner {
                let bye = participants.len() < 2;
                for p in participants {
                    let e = table.get_mut(&p).expect("seen above");
                    e.played += 1;
                    if p == w {
                        e.wins += 1;
                        e.points += 2;
                        if bye {
                            e.byes += 1;
                        }
                    } else {
                        e.losses += 1;
                    }
                }
            }
        }

        let mut standings: Vec<StandingsEntry> = table.into_values().collect();
        standings.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.wins.cmp(&a.wins))
                .then(a.participant.cmp(&b.participant))
        });
        standings
    }

    /// Read-only projection of rounds and matches for rendering.
    pub fn view(&self) -> BracketView {
        let project = |ids: &Vec<MatchId>| -> Vec<MatchView> {
            let mut matches: Vec<&Match> =
                ids.iter().filter_map(|id| self.matches.get(id)).collect();
            matches.sort_by_key(|m| m.number);
            matches.iter().map(|m| MatchView::from(*m)).collect()
        };

        let mut rounds: Vec<RoundView> = Vec::new();
        for (i, ids) in self.rounds.iter().enumerate() {
            rounds.push(RoundView {
                number: i as u32 + 1,
                side: BracketSide::Winners,
                matches: project(ids),
            });
        }
        for (i, ids) in self.losers_rounds.iter().enumerate() {
            rounds.push(RoundView {
                number: i as u32 + 1,
                side: BracketSide::Losers,
                matches: project(ids),
            });
        }
        for (id, side) in [
            (self.grand_final, BracketSide::GrandFinal),
            (self.grand_final_reset, BracketSide::GrandFinalReset),
        ] {
            if let Some(id) = id
                && let Some(m) = self.matches.get(&id)
            {
                rounds.push(RoundView {
                    number: m.round,
                    side,
                    matches: vec![MatchView::from(m)],
                });
            }
        }

        BracketView {
            tournament_id: self.tournament_id,
            format: self.format,
            generated_at: self.generated_at,
            rounds,
        }
    }
}

/// One row of the win/loss table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StandingsEntry {
    pub participant: ParticipantId,
    pub points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
}

impl StandingsEntry {
    fn new(participant: ParticipantId) -> Self {
        Self {
            participant,
            points: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            byes: 0,
        }
    }
}

/// Serializable projection of a bracket for external renderers.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub format: TournamentFormat,
    pub generated_at: DateTime<Utc>,
    pub rounds: Vec<RoundView>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoundView {
    pub number: u32,
    pub side: BracketSide,
    pub matches: Vec<MatchView>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchView {
    pub id: MatchId,
    pub round: u32,
    pub number: u32,
    pub side: BracketSide,
    pub participant1: MatchSlot,
    pub participant2: MatchSlot,
    pub score: Option<(u32, u32)>,
    pub winner: Option<ParticipantId>,
    pub status: MatchStatus,
    pub scheduled_time: Option<DateTime<Utc>>,
}

impl From<&Match> for MatchView {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id,
            round: m.round,
            number: m.number,
            side: m.side,
            participant1: m.slots[0],
            participant2: m.slots[1],
            score: m.score,
            winner: m.winner,
            status: m.status,
            scheduled_time: m.scheduled_time,
        }
    }
}
