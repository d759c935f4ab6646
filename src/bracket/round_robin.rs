//! Round robin scheduling via the circle method.
//!
//! One participant stays fixed while the rest rotate around a circle each
//! round; an odd field adds a phantom slot whose pairing is a sit-out.
//! Every match is known up front, so all are created ready.

use crate::matches::models::{BracketSide, Match, MatchSlot, MatchStatus};
use crate::participant::ParticipantId;

use super::Bracket;

pub(super) fn generate(bracket: &mut Bracket, seeds: &[ParticipantId], double: bool) {
    let mut circle: Vec<Option<ParticipantId>> = seeds.iter().copied().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }
    let m = circle.len();
    let rounds_per_cycle = m - 1;
    let cycles = if double { 2 } else { 1 };

    for cycle in 0..cycles {
        for r in 0..rounds_per_cycle {
            let round = (cycle * rounds_per_cycle + r) as u32 + 1;
            let mut number = 1u32;
            for i in 0..m / 2 {
                let home = circle[i];
                let away = circle[m - 1 - i];
                let (Some(home), Some(away)) = (home, away) else {
                    // Phantom pairing: this participant sits out the round.
                    continue;
                };
                let mut match_ = Match::new(round, number, BracketSide::Winners);
                // The return leg swaps home and away.
                match_.slots = if cycle == 0 {
                    [MatchSlot::Taken(home), MatchSlot::Taken(away)]
                } else {
                    [MatchSlot::Taken(away), MatchSlot::Taken(home)]
                };
                match_.status = MatchStatus::Ready;
                bracket.insert(match_, false);
                number += 1;
            }
            // Rotate everyone but the first position.
            circle[1..].rotate_right(1);
        }
    }
}
