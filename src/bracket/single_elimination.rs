//! Single elimination bracket generation.

use crate::matches::models::{BracketSide, Match, MatchSlot};
use crate::participant::ParticipantId;
use crate::seeding::{bracket_slot_order, next_pow2};

use super::Bracket;

/// Build `ceil(log2(N))` rounds over a `next_pow2(N)` field. Round 1 is
/// fully instantiated from the balanced slot order; seeds past N are byes
/// and settle immediately as synthetic completed matches so round
/// progression stays uniform. Later rounds start with TBD slots.
pub(super) fn generate(bracket: &mut Bracket, seeds: &[ParticipantId]) {
    build_rounds(bracket, seeds);
    bracket.settle_byes();
}

/// Create the elimination rounds, wire winner pointers and fill round 1,
/// without settling byes. Double elimination reuses this for its winners
/// bracket and settles only after loser pointers are wired.
pub(super) fn build_rounds(
    bracket: &mut Bracket,
    seeds: &[ParticipantId],
) -> Vec<Vec<crate::matches::models::MatchId>> {
    let n = seeds.len();
    let size = next_pow2(n);
    let num_rounds = size.trailing_zeros();

    // Create every round's matches up front.
    let mut round_ids: Vec<Vec<crate::matches::models::MatchId>> = Vec::new();
    for round in 1..=num_rounds {
        let count = size >> round;
        let mut ids = Vec::with_capacity(count);
        for number in 1..=count {
            let m = Match::new(round, number as u32, BracketSide::Winners);
            ids.push(bracket.insert(m, false));
        }
        round_ids.push(ids);
    }

    // Wire forward pointers: match i of round r feeds slot i % 2 of
    // match i / 2 in round r + 1.
    for r in 0..round_ids.len().saturating_sub(1) {
        for (i, id) in round_ids[r].iter().enumerate() {
            let target = round_ids[r + 1][i / 2];
            let m = bracket.get_mut(*id).expect("just inserted");
            m.winner_to = Some((target, i % 2));
        }
    }

    // Fill round 1 from the balanced slot order; seeds beyond N are byes.
    let order = bracket_slot_order(size);
    for (slot_idx, seed) in order.iter().enumerate() {
        let occupant = seeds
            .get(*seed as usize - 1)
            .map(|p| MatchSlot::Taken(*p))
            .unwrap_or(MatchSlot::Bye);
        let match_id = round_ids[0][slot_idx / 2];
        bracket.place((match_id, slot_idx % 2), occupant);
    }

    round_ids
}
