//! Statistics aggregation over engine facts.
//!
//! The aggregator is the single writer of participant win/loss counters
//! and the team-level rollups for team tournaments. Facts carry their
//! match id and are deduplicated, so replaying a completed-match fact
//! (a retry, a re-delivered event) never double-counts; reopening a
//! match retracts exactly what its completion added.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::EngineEvent;
use crate::matches::MatchId;
use crate::participant::{ParticipantId, ParticipantRegistry};

/// Rolled-up counters for one team.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TeamStats {
    pub matches_played: u32,
    pub matches_won: u32,
    pub draws: u32,
}

/// What a processed completed-match fact added, kept so a reopen can
/// retract it.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct AppliedFact {
    participants: Vec<ParticipantId>,
    winner: Option<ParticipantId>,
    draw: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StatsAggregator {
    processed: HashMap<MatchId, AppliedFact>,
    team_totals: HashMap<Uuid, TeamStats>,
    placements: HashMap<ParticipantId, u32>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_all(&mut self, events: &[EngineEvent], registry: &mut ParticipantRegistry) {
        for event in events {
            self.apply(event, registry);
        }
    }

    pub fn apply(&mut self, event: &EngineEvent, registry: &mut ParticipantRegistry) {
        match event {
            EngineEvent::MatchCompleted {
                match_id,
                participants,
                winner,
                draw,
                ..
            } => {
                if self.processed.contains_key(match_id) {
                    return;
                }
                for p in participants {
                    self.bump(*p, *winner == Some(*p), *draw, registry, 1);
                }
                self.processed.insert(
                    *match_id,
                    AppliedFact {
                        participants: participants.clone(),
                        winner: *winner,
                        draw: *draw,
                    },
                );
            }
            // A resolved dispute re-emits a completed-match fact for the
            // same id; retract the contested one so the correction counts.
            EngineEvent::MatchReopened { match_id }
            | EngineEvent::DisputeResolved { match_id } => {
                if let Some(fact) = self.processed.remove(match_id) {
                    for p in &fact.participants {
                        self.bump(*p, fact.winner == Some(*p), fact.draw, registry, -1);
                    }
                }
            }
            EngineEvent::ParticipantEliminated {
                participant_id,
                placement: Some(placement),
            } => {
                self.placements.insert(*participant_id, *placement);
            }
            EngineEvent::TournamentCompleted {
                winner: Some(winner),
                ..
            } => {
                self.placements.insert(*winner, 1);
            }
            _ => {}
        }
    }

    pub fn team_stats(&self, team_id: Uuid) -> TeamStats {
        self.team_totals.get(&team_id).copied().unwrap_or_default()
    }

    pub fn placement(&self, participant: ParticipantId) -> Option<u32> {
        self.placements.get(&participant).copied()
    }

    fn bump(
        &mut self,
        participant: ParticipantId,
        won: bool,
        draw: bool,
        registry: &mut ParticipantRegistry,
        sign: i64,
    ) {
        let adjust = |counter: &mut u32| {
            *counter = counter.saturating_add_signed(sign as i32);
        };
        let Some(p) = registry.get_mut(participant) else {
            return;
        };
        adjust(&mut p.matches_played);
        if won {
            adjust(&mut p.matches_won);
        }
        if p.entrant.is_team() {
            let totals = self.team_totals.entry(p.entrant.id()).or_default();
            adjust(&mut totals.matches_played);
            if won {
                adjust(&mut totals.matches_won);
            }
            if draw {
                adjust(&mut totals.draws);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Entrant;

    fn team_registry() -> (ParticipantRegistry, ParticipantId, ParticipantId, Uuid, Uuid) {
        let mut registry = ParticipantRegistry::new();
        let team_a = Uuid::new_v4();
        let team_b = Uuid::new_v4();
        let a = registry
            .register(Entrant::Team {
                team_id: team_a,
                name: "Alphas".to_string(),
            })
            .unwrap();
        let b = registry
            .register(Entrant::Team {
                team_id: team_b,
                name: "Bravos".to_string(),
            })
            .unwrap();
        (registry, a, b, team_a, team_b)
    }

    fn completed(match_id: MatchId, a: ParticipantId, b: ParticipantId) -> EngineEvent {
        EngineEvent::MatchCompleted {
            match_id,
            participants: vec![a, b],
            winner: Some(a),
            draw: false,
            forfeit: false,
        }
    }

    #[test]
    fn counters_update_once_per_match() {
        let (mut registry, a, b, team_a, _) = team_registry();
        let mut stats = StatsAggregator::new();
        let match_id = Uuid::new_v4();
        let event = completed(match_id, a, b);

        stats.apply(&event, &mut registry);
        // Replay of the same fact must not double-count.
        stats.apply(&event, &mut registry);

        assert_eq!(registry.get(a).unwrap().matches_played, 1);
        assert_eq!(registry.get(a).unwrap().matches_won, 1);
        assert_eq!(registry.get(b).unwrap().matches_played, 1);
        assert_eq!(registry.get(b).unwrap().matches_won, 0);
        assert_eq!(stats.team_stats(team_a).matches_won, 1);
    }

    #[test]
    fn reopen_retracts_exactly_what_was_counted() {
        let (mut registry, a, b, team_a, team_b) = team_registry();
        let mut stats = StatsAggregator::new();
        let match_id = Uuid::new_v4();

        stats.apply(&completed(match_id, a, b), &mut registry);
        stats.apply(&EngineEvent::MatchReopened { match_id }, &mut registry);

        assert_eq!(registry.get(a).unwrap().matches_played, 0);
        assert_eq!(registry.get(a).unwrap().matches_won, 0);
        assert_eq!(stats.team_stats(team_a), TeamStats::default());
        assert_eq!(stats.team_stats(team_b), TeamStats::default());

        // Reopen of an unknown match is a no-op.
        stats.apply(
            &EngineEvent::MatchReopened {
                match_id: Uuid::new_v4(),
            },
            &mut registry,
        );
        assert_eq!(registry.get(b).unwrap().matches_played, 0);
    }

    #[test]
    fn dispute_resolution_recounts_corrected_winner() {
        let (mut registry, a, b, team_a, team_b) = team_registry();
        let mut stats = StatsAggregator::new();
        let match_id = Uuid::new_v4();

        stats.apply(&completed(match_id, a, b), &mut registry);
        stats.apply(&EngineEvent::DisputeResolved { match_id }, &mut registry);
        stats.apply(&completed(match_id, b, a), &mut registry);

        assert_eq!(registry.get(a).unwrap().matches_played, 1);
        assert_eq!(registry.get(a).unwrap().matches_won, 0);
        assert_eq!(registry.get(b).unwrap().matches_won, 1);
        assert_eq!(stats.team_stats(team_a).matches_won, 0);
        assert_eq!(stats.team_stats(team_b).matches_won, 1);
    }

    #[test]
    fn placements_track_elimination_and_title() {
        let (mut registry, a, b, _, _) = team_registry();
        let mut stats = StatsAggregator::new();
        stats.apply(
            &EngineEvent::ParticipantEliminated {
                participant_id: b,
                placement: Some(2),
            },
            &mut registry,
        );
        stats.apply(
            &EngineEvent::TournamentCompleted {
                tournament_id: Uuid::new_v4(),
                winner: Some(a),
            },
            &mut registry,
        );
        assert_eq!(stats.placement(b), Some(2));
        assert_eq!(stats.placement(a), Some(1));
    }
}
