//! Double elimination bracket generation.
//!
//! A winners bracket identical to single elimination, plus a losers
//! bracket absorbing one loser per winners match. Losers rounds come in
//! pairs: an internal round pairing losers-bracket survivors, then a drop
//! round where they meet the next wave of winners-bracket losers. The
//! drop order alternates direction between waves so two participants who
//! just met in the winners bracket are not immediately re-paired.
//!
//! The losers-bracket champion meets the winners-bracket champion in a
//! grand final. If the losers-bracket champion wins it, the winners-bracket
//! champion has only one loss, so a bracket-reset match decides the title;
//! the progression engine creates that match when the case arises.

use crate::matches::models::{BracketSide, Match, MatchId};
use crate::participant::ParticipantId;
use crate::seeding::next_pow2;

use super::{Bracket, single_elimination};

pub(super) fn generate(bracket: &mut Bracket, seeds: &[ParticipantId]) {
    let size = next_pow2(seeds.len());
    let k = size.trailing_zeros() as usize;

    let winners = single_elimination::build_rounds(bracket, seeds);

    // Grand final sits outside the round lists; both brackets feed it.
    let grand_final = Match::new(1, 1, BracketSide::GrandFinal);
    let gf_id = grand_final.id;
    bracket.matches.insert(gf_id, grand_final);
    bracket.grand_final = Some(gf_id);

    let winners_final = *winners[k - 1]
        .first()
        .expect("winners bracket has a final");
    bracket
        .get_mut(winners_final)
        .expect("winners final exists")
        .winner_to = Some((gf_id, 0));

    if k == 1 {
        // Two-entrant field: the loser of the only winners match is the
        // losers-bracket champion by default.
        bracket
            .get_mut(winners_final)
            .expect("winners final exists")
            .loser_to = Some((gf_id, 1));
        bracket.settle_byes();
        return;
    }

    // Losers rounds 1..=2(k-1). Round 2j-1 pairs survivors; round 2j drops
    // in the losers of winners round j+1.
    let mut losers: Vec<Vec<MatchId>> = Vec::with_capacity(2 * (k - 1));
    for j in 1..=(k - 1) {
        let count = size >> (j + 1);
        for half in 0..2 {
            let round = (2 * j - 1 + half) as u32;
            let mut ids = Vec::with_capacity(count);
            for number in 1..=count {
                let m = Match::new(round, number as u32, BracketSide::Losers);
                ids.push(bracket.insert(m, true));
            }
            losers.push(ids);
        }
    }

    // Winners round 1 losers fill both slots of losers round 1.
    for (i, id) in winners[0].iter().enumerate() {
        let target = losers[0][i / 2];
        bracket.get_mut(*id).expect("exists").loser_to = Some((target, i % 2));
    }

    // Winners round j+1 losers drop into slot 1 of losers round 2j,
    // reversing order on odd waves to defer rematches.
    for j in 1..=(k - 1) {
        let drop_round = &losers[2 * j - 1];
        let count = drop_round.len();
        for (i, id) in winners[j].iter().enumerate() {
            let target = if j % 2 == 1 {
                drop_round[count - 1 - i]
            } else {
                drop_round[i]
            };
            bracket.get_mut(*id).expect("exists").loser_to = Some((target, 1));
        }
    }

    // Internal wiring of the losers bracket.
    for j in 1..=(k - 1) {
        // Pairing round 2j-1 feeds slot 0 of drop round 2j.
        for (i, id) in losers[2 * j - 2].iter().enumerate() {
            let target = losers[2 * j - 1][i];
            bracket.get_mut(*id).expect("exists").winner_to = Some((target, 0));
        }
        // Drop round 2j feeds the next pairing round, or the grand final.
        for (i, id) in losers[2 * j - 1].iter().enumerate() {
            let m = bracket.get_mut(*id).expect("exists");
            m.winner_to = if j < k - 1 {
                Some((losers[2 * j][i / 2], i % 2))
            } else {
                Some((gf_id, 1))
            };
        }
    }

    bracket.settle_byes();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::models::MatchStatus;
    use crate::tournament::{TournamentConfig, TournamentFormat};
    use uuid::Uuid;

    fn build(n: usize) -> (Bracket, Vec<ParticipantId>) {
        let mut seeds: Vec<ParticipantId> = (0..n).map(|_| Uuid::new_v4()).collect();
        seeds.sort();
        let cfg = TournamentConfig::new("t", TournamentFormat::DoubleElimination);
        let bracket = Bracket::generate(Uuid::new_v4(), &cfg, &seeds).unwrap();
        (bracket, seeds)
    }

    #[test]
    fn four_entrants_have_two_losers_rounds_and_a_grand_final() {
        let (bracket, _) = build(4);
        assert_eq!(bracket.rounds.len(), 2);
        assert_eq!(bracket.losers_rounds.len(), 2);
        assert!(bracket.grand_final.is_some());
        assert!(bracket.grand_final_reset.is_none());
        // 3 winners + 2 losers + grand final
        assert_eq!(bracket.matches.len(), 6);
    }

    #[test]
    fn winners_round_one_losers_feed_losers_round_one() {
        let (bracket, _) = build(8);
        for m in bracket.round(0) {
            let (target, _) = m.loser_to.expect("round 1 drops to losers bracket");
            let downstream = bracket.get(target).unwrap();
            assert_eq!(downstream.side, BracketSide::Losers);
            assert_eq!(downstream.round, 1);
        }
    }

    #[test]
    fn losers_final_feeds_grand_final() {
        let (bracket, _) = build(8);
        let last = bracket.losers_rounds.last().unwrap();
        assert_eq!(last.len(), 1);
        let m = bracket.get(last[0]).unwrap();
        assert_eq!(m.winner_to, Some((bracket.grand_final.unwrap(), 1)));
    }

    #[test]
    fn two_entrants_rematch_in_grand_final() {
        let (bracket, seeds) = build(2);
        assert!(bracket.losers_rounds.is_empty());
        let w1 = bracket.round(0)[0];
        let gf = bracket.grand_final.unwrap();
        assert_eq!(w1.winner_to, Some((gf, 0)));
        assert_eq!(w1.loser_to, Some((gf, 1)));
        assert!(w1.has_participant(seeds[0]) && w1.has_participant(seeds[1]));
    }

    #[test]
    fn byes_cascade_into_losers_bracket() {
        let (bracket, _) = build(5);
        // Winners round 1 has three byes; the double-bye losers match must
        // have settled with no winner.
        let double_bye = bracket
            .losers_rounds[0]
            .iter()
            .map(|id| bracket.get(*id).unwrap())
            .find(|m| m.participants().is_empty() && m.status == MatchStatus::Completed);
        assert!(double_bye.is_some());
        assert!(double_bye.unwrap().winner.is_none());
    }
}
