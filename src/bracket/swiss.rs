//! Swiss pairing.
//!
//! Swiss rounds are generated one at a time: each round pairs participants
//! on similar standings while avoiding repeat opponents, so only the next
//! round ever exists before its predecessors complete.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::matches::models::{BracketSide, Match, MatchId, MatchSlot, MatchStatus};
use crate::participant::ParticipantId;
use crate::seeding::next_pow2;

use super::Bracket;

/// Swiss-specific bracket state.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SwissState {
    /// Configured round count; the tournament completes when this many
    /// rounds have been played.
    pub total_rounds: u32,
}

pub(super) fn generate(bracket: &mut Bracket, seeds: &[ParticipantId], rounds: Option<u32>) {
    let default_rounds = next_pow2(seeds.len()).trailing_zeros();
    let total_rounds = rounds.unwrap_or(default_rounds).max(1);
    bracket.swiss = Some(SwissState { total_rounds });
    bracket.pair_next_swiss_round();
}

impl Bracket {
    /// Pair and instantiate the next Swiss round from current standings.
    /// Participants in the same score group are paired top-down, skipping
    /// opponents already faced when an alternative exists; with an odd
    /// field the lowest-ranked participant without a prior bye sits out
    /// and scores a free win.
    pub(crate) fn pair_next_swiss_round(&mut self) -> Vec<MatchId> {
        debug_assert!(self.swiss.is_some());
        let round = self.rounds.len() as u32 + 1;

        // Rank active entrants by points, wins, then seed order.
        let standings: HashMap<ParticipantId, (u32, u32, u32)> = self
            .standings()
            .into_iter()
            .map(|e| (e.participant, (e.points, e.wins, e.byes)))
            .collect();
        let seed_order = self.entrants.clone();
        let mut ranked: Vec<ParticipantId> = seed_order
            .iter()
            .copied()
            .filter(|p| !self.eliminated.contains(p))
            .collect();
        ranked.sort_by_key(|p| {
            let (points, wins, _) = standings.get(p).copied().unwrap_or_default();
            let seed_pos = seed_order
                .iter()
                .position(|e| e == p)
                .unwrap_or(usize::MAX);
            (std::cmp::Reverse(points), std::cmp::Reverse(wins), seed_pos)
        });

        // Opponents already faced, across every round so far.
        let mut played: HashSet<(ParticipantId, ParticipantId)> = HashSet::new();
        for m in self.matches.values() {
            if let [a, b] = m.participants()[..] {
                played.insert((a, b));
                played.insert((b, a));
            }
        }

        let mut created = Vec::new();
        let mut number = 1u32;

        // Odd field: lowest-ranked participant without a prior bye sits out.
        if ranked.len() % 2 == 1 {
            let idx = ranked
                .iter()
                .rposition(|p| standings.get(p).is_none_or(|(_, _, byes)| *byes == 0))
                .unwrap_or(ranked.len() - 1);
            let recipient = ranked.remove(idx);
            let mut bye = Match::new(round, number, BracketSide::Winners);
            bye.slots = [MatchSlot::Taken(recipient), MatchSlot::Bye];
            bye.winner = Some(recipient);
            bye.status = MatchStatus::Completed;
            debug!("swiss round {round}: bye to {recipient}");
            created.push(self.insert(bye, false));
            number += 1;
        }

        let mut unpaired: Vec<ParticipantId> = ranked;
        while !unpaired.is_empty() {
            let p = unpaired.remove(0);
            let pick = unpaired
                .iter()
                .position(|q| !played.contains(&(p, *q)))
                // Every remaining candidate is a rematch; take the nearest.
                .unwrap_or(0);
            let q = unpaired.remove(pick);

            let mut m = Match::new(round, number, BracketSide::Winners);
            m.slots = [MatchSlot::Taken(p), MatchSlot::Taken(q)];
            m.status = MatchStatus::Ready;
            created.push(self.insert(m, false));
            number += 1;
        }

        debug!(
            "swiss round {round}: {} matches paired for tournament {}",
            created.len(),
            self.tournament_id
        );
        created
    }

    /// Whether the just-finished state calls for another Swiss round.
    pub(crate) fn swiss_round_pending(&self) -> bool {
        let Some(swiss) = &self.swiss else {
            return false;
        };
        self.rounds.len() < swiss.total_rounds as usize && self.all_matches_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{TournamentConfig, TournamentFormat};
    use uuid::Uuid;

    fn build(n: usize, rounds: Option<u32>) -> (Bracket, Vec<ParticipantId>) {
        let mut seeds: Vec<ParticipantId> = (0..n).map(|_| Uuid::new_v4()).collect();
        seeds.sort();
        let mut cfg = TournamentConfig::new("t", TournamentFormat::Swiss);
        cfg.swiss_rounds = rounds;
        let bracket = Bracket::generate(Uuid::new_v4(), &cfg, &seeds).unwrap();
        (bracket, seeds)
    }

    #[test]
    fn round_one_pairs_adjacent_seeds() {
        let (bracket, seeds) = build(6, None);
        assert_eq!(bracket.rounds.len(), 1);
        let round1 = bracket.round(0);
        assert_eq!(round1.len(), 3);
        for (i, pair) in seeds.chunks(2).enumerate() {
            let m = round1.iter().find(|m| m.number == i as u32 + 1).unwrap();
            assert!(m.has_participant(pair[0]) && m.has_participant(pair[1]));
        }
    }

    #[test]
    fn default_round_count_is_ceil_log2() {
        let (bracket, _) = build(6, None);
        assert_eq!(bracket.swiss.as_ref().unwrap().total_rounds, 3);
        let (bracket, _) = build(8, None);
        assert_eq!(bracket.swiss.as_ref().unwrap().total_rounds, 3);
        let (bracket, _) = build(9, None);
        assert_eq!(bracket.swiss.as_ref().unwrap().total_rounds, 4);
    }

    #[test]
    fn odd_field_gives_lowest_seed_a_bye() {
        let (bracket, seeds) = build(5, None);
        let round1 = bracket.round(0);
        let bye = round1
            .iter()
            .find(|m| m.slots.contains(&MatchSlot::Bye))
            .expect("one bye match");
        assert_eq!(bye.winner, Some(seeds[4]));
        assert_eq!(bye.status, MatchStatus::Completed);
    }

    #[test]
    fn bye_recipient_rotates() {
        let (mut bracket, seeds) = build(3, Some(3));
        // Round 1 bye goes to the lowest seed.
        let first_bye = bracket
            .round(0)
            .iter()
            .find(|m| m.slots.contains(&MatchSlot::Bye))
            .and_then(|m| m.winner)
            .unwrap();
        assert_eq!(first_bye, seeds[2]);

        // Complete the real match and pair round 2: the bye must go to
        // someone else.
        let open: Vec<MatchId> = bracket
            .matches()
            .filter(|m| m.status == MatchStatus::Ready)
            .map(|m| m.id)
            .collect();
        for id in open {
            let m = bracket.get_mut(id).unwrap();
            let ps = m.participants();
            m.winner = Some(ps[0]);
            m.loser = Some(ps[1]);
            m.score = Some((1, 0));
            m.status = MatchStatus::Completed;
        }
        bracket.pair_next_swiss_round();
        let second_bye = bracket
            .round(1)
            .iter()
            .find(|m| m.slots.contains(&MatchSlot::Bye))
            .and_then(|m| m.winner)
            .unwrap();
        assert_ne!(second_bye, first_bye);
    }
}
