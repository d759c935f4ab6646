//! Match progression: score reporting, disputes, forfeits and advancement.
//!
//! All bracket mutation after generation happens through the entry points
//! here. Each reported result completes one match and pushes its winner
//! (and, in double elimination, its loser) through the forward pointers
//! wired at generation time; completed results are only ever corrected
//! through the explicit dispute/reopen protocol, never overwritten.

use chrono::{DateTime, Utc};
use log::{info, warn};
use thiserror::Error;

use crate::bracket::Bracket;
use crate::events::EngineEvent;
use crate::matches::models::{BracketSide, Match, MatchId, MatchSlot, MatchStatus};
use crate::participant::ParticipantId;
use crate::tournament::TournamentFormat;

/// Errors raised by score reporting and result correction
#[derive(Debug, Error, Eq, PartialEq)]
pub enum MatchError {
    #[error("match not found: {0}")]
    NotFound(MatchId),

    #[error("match is not ready for results")]
    NotReady,

    #[error("match already completed")]
    AlreadyCompleted,

    #[error("match is under dispute")]
    UnderDispute,

    #[error("match is not disputed")]
    NotDisputed,

    #[error("match has no reported result")]
    NoResult,

    #[error("draws are not allowed in this format")]
    DrawNotAllowed,

    #[error("a downstream match has already progressed; correct it first")]
    DownstreamProgressed,
}

pub type ProgressionResult<T> = Result<T, MatchError>;

/// Outcome of a completed match.
#[derive(Clone, Copy, Debug)]
enum Outcome {
    Decided {
        winner: ParticipantId,
        loser: ParticipantId,
    },
    Draw,
}

impl Bracket {
    /// Report a final score for a match. The winner advances through the
    /// bracket; the loser drops or is eliminated according to the format.
    /// Fails on matches that are pending, disputed or already completed.
    pub fn report_result(
        &mut self,
        match_id: MatchId,
        score_p1: u32,
        score_p2: u32,
        reported_by: Option<String>,
    ) -> ProgressionResult<Vec<EngineEvent>> {
        let m = self.get(match_id).ok_or(MatchError::NotFound(match_id))?;
        match m.status {
            MatchStatus::Ready | MatchStatus::InProgress => {}
            MatchStatus::Pending => return Err(MatchError::NotReady),
            MatchStatus::Completed => return Err(MatchError::AlreadyCompleted),
            MatchStatus::Disputed => return Err(MatchError::UnderDispute),
        }

        let outcome = self.decide(m, score_p1, score_p2)?;
        info!(
            "match {match_id}: result {score_p1}-{score_p2} reported{}",
            reported_by
                .as_deref()
                .map(|r| format!(" by {r}"))
                .unwrap_or_default()
        );
        Ok(self.apply_result(match_id, Some((score_p1, score_p2)), outcome, reported_by, false))
    }

    /// Mark a ready match as underway.
    pub fn begin_match(&mut self, match_id: MatchId) -> ProgressionResult<()> {
        let m = self
            .get_mut(match_id)
            .ok_or(MatchError::NotFound(match_id))?;
        match m.status {
            MatchStatus::Ready => {
                m.status = MatchStatus::InProgress;
                Ok(())
            }
            MatchStatus::Completed => Err(MatchError::AlreadyCompleted),
            _ => Err(MatchError::NotReady),
        }
    }

    /// Set a match's scheduled time.
    pub fn schedule_match(
        &mut self,
        match_id: MatchId,
        time: DateTime<Utc>,
    ) -> ProgressionResult<()> {
        let m = self
            .get_mut(match_id)
            .ok_or(MatchError::NotFound(match_id))?;
        m.scheduled_time = Some(time);
        Ok(())
    }

    /// Flag a completed result as contested. Only an organizer-level
    /// [`Bracket::resolve_dispute`] moves the match out of this state.
    pub fn dispute_match(
        &mut self,
        match_id: MatchId,
        reason: impl Into<String>,
    ) -> ProgressionResult<EngineEvent> {
        let m = self
            .get_mut(match_id)
            .ok_or(MatchError::NotFound(match_id))?;
        match m.status {
            MatchStatus::Completed if m.score.is_some() => {
                let reason = reason.into();
                m.status = MatchStatus::Disputed;
                m.dispute_reason = Some(reason.clone());
                warn!("match {match_id} disputed: {reason}");
                Ok(EngineEvent::DisputeOpened { match_id, reason })
            }
            // Byes and forfeits carry no reported score to contest.
            MatchStatus::Completed => Err(MatchError::NoResult),
            MatchStatus::Disputed => Err(MatchError::UnderDispute),
            _ => Err(MatchError::NoResult),
        }
    }

    /// Resolve a dispute with corrected scores, reverting the previously
    /// propagated advancement and re-running it. Fails if a downstream
    /// match already has its own result.
    pub fn resolve_dispute(
        &mut self,
        match_id: MatchId,
        score_p1: u32,
        score_p2: u32,
    ) -> ProgressionResult<Vec<EngineEvent>> {
        let m = self.get(match_id).ok_or(MatchError::NotFound(match_id))?;
        if m.status != MatchStatus::Disputed {
            return Err(MatchError::NotDisputed);
        }
        let outcome = self.decide(m, score_p1, score_p2)?;

        self.unapply_result(match_id)?;
        info!("match {match_id}: dispute resolved with {score_p1}-{score_p2}");
        let mut events = vec![EngineEvent::DisputeResolved { match_id }];
        events.extend(self.apply_result(
            match_id,
            Some((score_p1, score_p2)),
            outcome,
            None,
            false,
        ));
        Ok(events)
    }

    /// Reopen a completed match for re-reporting, reverting its
    /// advancement. The explicit alternative to silently overwriting a
    /// score.
    pub fn reopen_match(&mut self, match_id: MatchId) -> ProgressionResult<Vec<EngineEvent>> {
        let m = self.get(match_id).ok_or(MatchError::NotFound(match_id))?;
        if m.status != MatchStatus::Completed {
            return Err(MatchError::NotReady);
        }
        // Byes and forfeits carry no score to re-report; reverting one
        // would leave the match waiting on an empty slot forever.
        if m.score.is_none() {
            return Err(MatchError::NoResult);
        }
        self.unapply_result(match_id)?;
        info!("match {match_id} reopened");
        Ok(vec![EngineEvent::MatchReopened { match_id }])
    }

    /// Forfeit every open match held by a withdrawn or disqualified
    /// participant: the remaining opponent wins; unfilled slots become
    /// byes for whoever arrives later.
    pub fn forfeit_participant(&mut self, participant: ParticipantId) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        // Forfeiting can itself open a new match holding the participant
        // (a grand-final reset), so repeat until none remain.
        loop {
            let open: Vec<MatchId> = self
                .matches()
                .filter(|m| {
                    m.has_participant(participant)
                        && matches!(
                            m.status,
                            MatchStatus::Pending | MatchStatus::Ready | MatchStatus::InProgress
                        )
                })
                .map(|m| m.id)
                .collect();
            if open.is_empty() {
                break;
            }

            for id in open {
                let m = self.get(id).expect("collected above");
                let slot_idx = m.slot_of(participant).expect("collected above");
                match m.slots[1 - slot_idx] {
                    MatchSlot::Taken(opponent) => {
                        info!("match {id}: {participant} forfeits to {opponent}");
                        events.extend(self.apply_result(
                            id,
                            None,
                            Outcome::Decided {
                                winner: opponent,
                                loser: participant,
                            },
                            None,
                            true,
                        ));
                    }
                    // No opponent yet; the slot becomes a bye for whoever
                    // feeds in later.
                    _ => {
                        let m = self.get_mut(id).expect("collected above");
                        m.slots[slot_idx] = MatchSlot::Bye;
                        m.refresh_readiness();
                    }
                }
            }
        }

        self.eliminate(participant, &mut events);
        self.settle_byes();
        if self.swiss_round_pending() {
            self.pair_next_swiss_round();
        }
        events
    }

    /// Validate scores against the format and name the winner and loser.
    fn decide(&self, m: &Match, score_p1: u32, score_p2: u32) -> ProgressionResult<Outcome> {
        if score_p1 == score_p2 {
            if !self.format.allows_draws() {
                return Err(MatchError::DrawNotAllowed);
            }
            return Ok(Outcome::Draw);
        }
        let (Some(p1), Some(p2)) = (m.slots[0].participant(), m.slots[1].participant()) else {
            // Ready status guarantees both slots; pending is rejected above.
            return Err(MatchError::NotReady);
        };
        Ok(if score_p1 > score_p2 {
            Outcome::Decided {
                winner: p1,
                loser: p2,
            }
        } else {
            Outcome::Decided {
                winner: p2,
                loser: p1,
            }
        })
    }

    /// Complete a match and propagate the outcome. Infallible by
    /// construction: every precondition is checked before any write, so a
    /// result either lands in full (match, downstream slots, eliminations)
    /// or not at all.
    fn apply_result(
        &mut self,
        match_id: MatchId,
        score: Option<(u32, u32)>,
        outcome: Outcome,
        reported_by: Option<String>,
        forfeit: bool,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        let snapshot = {
            let m = self.get_mut(match_id).expect("validated by caller");
            m.score = score;
            m.reported_by = reported_by;
            m.forfeit = forfeit;
            m.status = MatchStatus::Completed;
            match outcome {
                Outcome::Draw => m.draw = true,
                Outcome::Decided { winner, loser } => {
                    m.winner = Some(winner);
                    m.loser = Some(loser);
                }
            }
            m.clone()
        };

        events.push(EngineEvent::MatchCompleted {
            match_id,
            participants: snapshot.participants(),
            winner: snapshot.winner,
            draw: snapshot.draw,
            forfeit,
        });

        if let Outcome::Decided { winner, loser } = outcome {
            if let Some(target) = snapshot.winner_to {
                self.place(target, MatchSlot::Taken(winner));
            }
            match snapshot.loser_to {
                Some(target) if forfeit => {
                    // A withdrawn loser does not continue in the losers
                    // bracket; their drop slot becomes a bye.
                    self.place(target, MatchSlot::Bye);
                    self.eliminate(loser, &mut events);
                }
                Some(target) => self.place(target, MatchSlot::Taken(loser)),
                None => self.drop_loser(&snapshot, winner, loser, &mut events),
            }
        }

        self.settle_byes();
        if self.swiss_round_pending() {
            self.pair_next_swiss_round();
        }
        events
    }

    /// Handle a loser with no drop slot: elimination in knockout formats,
    /// nothing in Swiss and round robin, and the grand-final reset rule in
    /// double elimination.
    fn drop_loser(
        &mut self,
        m: &Match,
        winner: ParticipantId,
        loser: ParticipantId,
        events: &mut Vec<EngineEvent>,
    ) {
        match self.format {
            TournamentFormat::SingleElimination => self.eliminate(loser, events),
            TournamentFormat::Swiss | TournamentFormat::RoundRobin => {}
            TournamentFormat::DoubleElimination => match m.side {
                BracketSide::Losers | BracketSide::GrandFinalReset => {
                    self.eliminate(loser, events);
                }
                BracketSide::GrandFinal => {
                    // The winners-bracket champion occupies slot 0 of the
                    // grand final. If they won, the losers-bracket entrant
                    // has taken their second loss and the title is decided.
                    // If they lost, both finalists sit on one loss and a
                    // bracket reset settles it.
                    if m.slots[0].participant() == Some(winner) {
                        self.eliminate(loser, events);
                    } else {
                        let mut reset = Match::new(2, 1, BracketSide::GrandFinalReset);
                        reset.slots = m.slots;
                        reset.status = MatchStatus::Ready;
                        let reset_id = reset.id;
                        self.matches.insert(reset_id, reset);
                        self.grand_final_reset = Some(reset_id);
                        info!("grand final lost by winners-bracket champion; bracket reset {reset_id} scheduled");
                        events.push(EngineEvent::BracketResetScheduled { match_id: reset_id });
                    }
                }
                // Winners-bracket matches always carry a drop slot.
                BracketSide::Winners => self.eliminate(loser, events),
            },
        }
    }

    /// Knock a participant out of the competition. Placement is defined
    /// for knockout formats only; Swiss and round robin rank by standings
    /// at the end.
    fn eliminate(&mut self, participant: ParticipantId, events: &mut Vec<EngineEvent>) {
        // A registrant who never entered the bracket holds no placement.
        if !self.entrants.contains(&participant) || !self.eliminated.insert(participant) {
            return;
        }
        let placement = match self.format {
            TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => {
                Some((self.entrants.len() - self.eliminated.len() + 1) as u32)
            }
            _ => None,
        };
        events.push(EngineEvent::ParticipantEliminated {
            participant_id: participant,
            placement,
        });
    }

    /// Revert a completed result: clear the match and pull its winner and
    /// loser back out of the downstream slots. Fails if any downstream
    /// match (or a scheduled bracket reset) has already progressed.
    fn unapply_result(&mut self, match_id: MatchId) -> ProgressionResult<()> {
        let snapshot = {
            let m = self.get(match_id).ok_or(MatchError::NotFound(match_id))?;
            if !matches!(m.status, MatchStatus::Completed | MatchStatus::Disputed) {
                return Err(MatchError::NoResult);
            }
            m.clone()
        };

        // A Swiss result that later rounds were paired from cannot be
        // reverted without invalidating those pairings.
        if self.swiss.is_some() && (snapshot.round as usize) < self.rounds.len() {
            return Err(MatchError::DownstreamProgressed);
        }

        let untouched = |status: MatchStatus| matches!(status, MatchStatus::Pending | MatchStatus::Ready);
        for target in [snapshot.winner_to, snapshot.loser_to].into_iter().flatten() {
            let downstream = self
                .get(target.0)
                .ok_or(MatchError::NotFound(target.0))?;
            if !untouched(downstream.status) {
                return Err(MatchError::DownstreamProgressed);
            }
        }
        let reset_after_gf = (self.grand_final == Some(match_id))
            .then_some(self.grand_final_reset)
            .flatten();
        if let Some(reset_id) = reset_after_gf {
            let reset = self.get(reset_id).ok_or(MatchError::NotFound(reset_id))?;
            if !untouched(reset.status) {
                return Err(MatchError::DownstreamProgressed);
            }
        }

        // All guards passed; now mutate.
        for target in [snapshot.winner_to, snapshot.loser_to].into_iter().flatten() {
            if let Some(downstream) = self.get_mut(target.0) {
                downstream.slots[target.1] = MatchSlot::Tbd;
                downstream.refresh_readiness();
            }
        }
        if let Some(reset_id) = reset_after_gf {
            self.matches.remove(&reset_id);
            self.grand_final_reset = None;
        }
        if let Some(loser) = snapshot.loser {
            self.eliminated.remove(&loser);
        }

        let m = self.get_mut(match_id).expect("checked above");
        m.score = None;
        m.winner = None;
        m.loser = None;
        m.draw = false;
        m.forfeit = false;
        m.reported_by = None;
        m.dispute_reason = None;
        m.status = MatchStatus::Ready;
        m.refresh_readiness();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{TournamentConfig, TournamentFormat};
    use uuid::Uuid;

    fn build(n: usize, format: TournamentFormat) -> (Bracket, Vec<ParticipantId>) {
        let mut seeds: Vec<ParticipantId> = (0..n).map(|_| Uuid::new_v4()).collect();
        seeds.sort();
        let cfg = TournamentConfig::new("t", format);
        let bracket = Bracket::generate(Uuid::new_v4(), &cfg, &seeds).unwrap();
        (bracket, seeds)
    }

    fn ready_ids(bracket: &Bracket) -> Vec<MatchId> {
        let mut ms: Vec<&Match> = bracket
            .matches()
            .filter(|m| m.status == MatchStatus::Ready)
            .collect();
        ms.sort_by_key(|m| (m.round, m.number));
        ms.iter().map(|m| m.id).collect()
    }

    /// Report a win for the lower-sorted participant of every ready match
    /// until nothing is ready.
    fn play_out(bracket: &mut Bracket) {
        loop {
            let ready = ready_ids(bracket);
            if ready.is_empty() {
                break;
            }
            for id in ready {
                let m = bracket.get(id).unwrap();
                if m.status != MatchStatus::Ready {
                    continue;
                }
                let ps = m.participants();
                let (s1, s2) = if ps[0] < ps[1] { (1, 0) } else { (0, 1) };
                bracket.report_result(id, s1, s2, None).unwrap();
            }
        }
    }

    #[test]
    fn winner_advances_to_the_next_round() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let first = ready_ids(&bracket)[0];
        let ps = bracket.get(first).unwrap().participants();
        bracket.report_result(first, 2, 1, None).unwrap();

        let m = bracket.get(first).unwrap();
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner, Some(ps[0]));
        assert_eq!(m.loser, Some(ps[1]));

        let (target, slot) = m.winner_to.unwrap();
        let downstream = bracket.get(target).unwrap();
        assert_eq!(downstream.slots[slot], MatchSlot::Taken(ps[0]));
        assert!(bracket.is_eliminated(ps[1]));
    }

    #[test]
    fn downstream_becomes_ready_only_when_both_slots_fill() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let round1 = ready_ids(&bracket);
        let final_id = bracket.rounds[1][0];

        bracket.report_result(round1[0], 1, 0, None).unwrap();
        assert_eq!(bracket.get(final_id).unwrap().status, MatchStatus::Pending);
        bracket.report_result(round1[1], 1, 0, None).unwrap();
        assert_eq!(bracket.get(final_id).unwrap().status, MatchStatus::Ready);
    }

    #[test]
    fn reporting_into_a_pending_match_is_a_state_conflict() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let final_id = bracket.rounds[1][0];
        assert_eq!(
            bracket.report_result(final_id, 1, 0, None),
            Err(MatchError::NotReady)
        );
    }

    #[test]
    fn double_report_is_rejected() {
        let (mut bracket, _) = build(2, TournamentFormat::SingleElimination);
        let id = ready_ids(&bracket)[0];
        bracket.report_result(id, 3, 1, None).unwrap();
        assert_eq!(
            bracket.report_result(id, 1, 3, None),
            Err(MatchError::AlreadyCompleted)
        );
    }

    #[test]
    fn ties_rejected_outside_swiss() {
        let (mut bracket, _) = build(2, TournamentFormat::SingleElimination);
        let id = ready_ids(&bracket)[0];
        assert_eq!(
            bracket.report_result(id, 2, 2, None),
            Err(MatchError::DrawNotAllowed)
        );
    }

    #[test]
    fn swiss_draw_scores_a_point_each() {
        let (mut bracket, seeds) = build(4, TournamentFormat::Swiss);
        let id = ready_ids(&bracket)[0];
        let ps = bracket.get(id).unwrap().participants();
        bracket.report_result(id, 1, 1, None).unwrap();
        let standings = bracket.standings();
        for p in ps {
            let entry = standings.iter().find(|e| e.participant == p).unwrap();
            assert_eq!(entry.points, 1);
            assert_eq!(entry.draws, 1);
        }
        let _ = seeds;
    }

    #[test]
    fn swiss_pairs_next_round_when_current_completes() {
        let (mut bracket, _) = build(4, TournamentFormat::Swiss);
        for id in ready_ids(&bracket) {
            bracket.report_result(id, 1, 0, None).unwrap();
        }
        assert_eq!(bracket.rounds.len(), 2);
        // Round-2 opponents must differ from round 1.
        for m in bracket.round(1) {
            let ps = m.participants();
            let repeat = bracket.round(0).iter().any(|prev| {
                prev.has_participant(ps[0]) && prev.has_participant(ps[1])
            });
            assert!(!repeat);
        }
    }

    #[test]
    fn single_elimination_plays_down_to_a_champion() {
        let (mut bracket, seeds) = build(8, TournamentFormat::SingleElimination);
        play_out(&mut bracket);
        // Lower participant id always wins, so the champion is the minimum.
        let champion = bracket.champion().unwrap();
        assert_eq!(champion, *seeds.iter().min().unwrap());
        assert_eq!(bracket.eliminated.len(), 7);
    }

    #[test]
    fn double_elimination_requires_two_losses() {
        let (mut bracket, _) = build(4, TournamentFormat::DoubleElimination);
        play_out(&mut bracket);
        // With a consistent winner, the grand final is won by the
        // winners-bracket champion; no reset occurs.
        assert!(bracket.grand_final_reset.is_none());
        assert!(bracket.champion().is_some());
        // Everyone but the champion took exactly two losses.
        let champion = bracket.champion().unwrap();
        for entrant in &bracket.entrants {
            let losses: usize = bracket
                .matches()
                .filter(|m| m.loser == Some(*entrant))
                .count();
            if *entrant == champion {
                assert_eq!(losses, 0);
            } else {
                assert_eq!(losses, 2);
            }
        }
    }

    #[test]
    fn grand_final_reset_when_losers_champion_wins() {
        let (mut bracket, _) = build(2, TournamentFormat::DoubleElimination);
        let w1 = ready_ids(&bracket)[0];
        let ps = bracket.get(w1).unwrap().participants();
        bracket.report_result(w1, 1, 0, None).unwrap();

        let gf = bracket.grand_final.unwrap();
        assert_eq!(bracket.get(gf).unwrap().status, MatchStatus::Ready);
        // The losers-bracket entrant (slot 1) wins the grand final.
        let events = bracket.report_result(gf, 0, 1, None).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::BracketResetScheduled { .. })));
        assert!(bracket.champion().is_none());

        let reset = bracket.grand_final_reset.unwrap();
        bracket.report_result(reset, 1, 0, None).unwrap();
        assert_eq!(bracket.champion(), Some(ps[0]));
    }

    #[test]
    fn dispute_and_resolve_with_changed_winner_unadvances() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let round1 = ready_ids(&bracket);
        let id = round1[0];
        let ps = bracket.get(id).unwrap().participants();
        bracket.report_result(id, 2, 0, None).unwrap();

        let (target, slot) = bracket.get(id).unwrap().winner_to.unwrap();
        assert_eq!(bracket.get(target).unwrap().slots[slot], MatchSlot::Taken(ps[0]));

        bracket.dispute_match(id, "scores entered backwards").unwrap();
        assert_eq!(bracket.get(id).unwrap().status, MatchStatus::Disputed);
        assert_eq!(
            bracket.report_result(id, 0, 2, None),
            Err(MatchError::UnderDispute)
        );

        let events = bracket.resolve_dispute(id, 0, 2).unwrap();
        assert!(matches!(events[0], EngineEvent::DisputeResolved { .. }));
        assert_eq!(bracket.get(target).unwrap().slots[slot], MatchSlot::Taken(ps[1]));
        assert!(bracket.is_eliminated(ps[0]));
        assert!(!bracket.is_eliminated(ps[1]));
    }

    #[test]
    fn resolve_fails_once_downstream_progressed() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let round1 = ready_ids(&bracket);
        bracket.report_result(round1[0], 1, 0, None).unwrap();
        bracket.report_result(round1[1], 1, 0, None).unwrap();
        let final_id = bracket.rounds[1][0];
        bracket.report_result(final_id, 1, 0, None).unwrap();

        bracket.dispute_match(round1[0], "wrong result").unwrap();
        assert_eq!(
            bracket.resolve_dispute(round1[0], 0, 1),
            Err(MatchError::DownstreamProgressed)
        );
    }

    #[test]
    fn reopen_is_the_only_path_to_rereport() {
        let (mut bracket, _) = build(2, TournamentFormat::SingleElimination);
        let id = ready_ids(&bracket)[0];
        let ps = bracket.get(id).unwrap().participants();
        bracket.report_result(id, 1, 0, None).unwrap();

        bracket.reopen_match(id).unwrap();
        let m = bracket.get(id).unwrap();
        assert_eq!(m.status, MatchStatus::Ready);
        assert_eq!(m.score, None);
        assert!(!bracket.is_eliminated(ps[1]));

        bracket.report_result(id, 0, 1, None).unwrap();
        assert_eq!(bracket.champion(), Some(ps[1]));
    }

    #[test]
    fn reopening_a_bye_completion_is_rejected() {
        let (mut bracket, _) = build(3, TournamentFormat::SingleElimination);
        let real = ready_ids(&bracket)[0];
        bracket.report_result(real, 1, 0, None).unwrap();

        let (bye_id, final_id) = {
            let bye = bracket
                .matches()
                .find(|m| m.is_completed() && m.score.is_none())
                .unwrap();
            (bye.id, bye.winner_to.unwrap().0)
        };
        assert_eq!(bracket.reopen_match(bye_id), Err(MatchError::NoResult));
        // The bye winner stays seated in the final.
        assert_eq!(bracket.get(final_id).unwrap().status, MatchStatus::Ready);
    }

    #[test]
    fn reopening_a_forfeit_completion_is_rejected() {
        let (mut bracket, _) = build(2, TournamentFormat::SingleElimination);
        let id = ready_ids(&bracket)[0];
        let ps = bracket.get(id).unwrap().participants();
        bracket.forfeit_participant(ps[0]);
        assert_eq!(bracket.reopen_match(id), Err(MatchError::NoResult));
    }

    #[test]
    fn forfeit_of_a_non_entrant_changes_nothing() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let outsider = Uuid::new_v4();
        let events = bracket.forfeit_participant(outsider);
        assert!(events.is_empty());
        assert!(!bracket.is_eliminated(outsider));
    }

    #[test]
    fn forfeit_hands_the_open_match_to_the_opponent() {
        let (mut bracket, _) = build(2, TournamentFormat::SingleElimination);
        let id = ready_ids(&bracket)[0];
        let ps = bracket.get(id).unwrap().participants();
        let events = bracket.forfeit_participant(ps[0]);

        let m = bracket.get(id).unwrap();
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner, Some(ps[1]));
        assert!(m.forfeit);
        assert!(bracket.is_eliminated(ps[0]));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::MatchCompleted { forfeit: true, .. }
        )));
    }

    #[test]
    fn forfeit_before_opponent_known_leaves_a_bye() {
        let (mut bracket, _) = build(4, TournamentFormat::SingleElimination);
        let round1 = ready_ids(&bracket);
        let first = bracket.get(round1[0]).unwrap().clone();
        let ps = first.participants();

        // ps[0] wins round 1, then withdraws before the final fills.
        bracket.report_result(first.id, 1, 0, None).unwrap();
        bracket.forfeit_participant(ps[0]);

        // The other semifinal resolves; its winner takes the final on a bye.
        let other = round1[1];
        let other_ps = bracket.get(other).unwrap().participants();
        bracket.report_result(other, 1, 0, None).unwrap();

        assert_eq!(bracket.champion(), Some(other_ps[0]));
    }

    #[test]
    fn forfeited_loser_leaves_a_bye_in_the_losers_bracket() {
        let (mut bracket, _) = build(4, TournamentFormat::DoubleElimination);
        let round1 = ready_ids(&bracket);
        let id = round1[0];
        let ps = bracket.get(id).unwrap().participants();
        bracket.forfeit_participant(ps[1]);

        let m = bracket.get(id).unwrap();
        let (drop_id, drop_slot) = m.loser_to.unwrap();
        assert_eq!(bracket.get(drop_id).unwrap().slots[drop_slot], MatchSlot::Bye);
        assert!(bracket.is_eliminated(ps[1]));
    }
}
