// Substitution diff: which bench players should have started, and for whom.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::solver::{check_deployments, rank_order, OptimalAssignment};
use crate::error::{ResolveError, ResolveResult};
use crate::lineup::schema::SlotSchema;
use crate::lineup::snapshot::{Player, PlayerId, RosterSnapshot};

/// The player on one side of a substitution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPlayer {
    pub id: PlayerId,
    pub name: String,
    pub points: f64,
}

impl RecordPlayer {
    /// Id carried by the sentinel that stands in for an empty slot.
    pub const EMPTY_ID: PlayerId = PlayerId(i64::MIN);

    /// Sentinel for "nobody started here": zero points, so deltas stay
    /// plain arithmetic.
    pub fn empty() -> Self {
        RecordPlayer {
            id: Self::EMPTY_ID,
            name: "EMPTY".to_string(),
            points: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == Self::EMPTY_ID
    }
}

impl From<&Player> for RecordPlayer {
    fn from(player: &Player) -> Self {
        RecordPlayer {
            id: player.id,
            name: player.name.clone(),
            points: player.points,
        }
    }
}

/// "Should have started `incoming` at `slot_label` instead of `outgoing`."
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionRecord {
    pub incoming: RecordPlayer,
    pub outgoing: RecordPlayer,
    pub slot_label: String,
    /// `incoming.points - outgoing.points`; always positive.
    pub points_delta: f64,
}

/// Per-instance view used while diffing.
#[derive(Debug)]
struct InstanceState {
    label: String,
    optimal: Option<PlayerId>,
    actual: Option<PlayerId>,
}

/// Derive the bench-for-starter swaps that turn the actual lineup into the
/// optimal one.
///
/// Actual starters are first aligned to slot instances: a player who holds
/// the same label in both lineups keeps its instance, and the remaining
/// actual occupants of a label take the remaining instances by rank. Then,
/// walking instances in fill order, every optimal player who did not
/// actually start is paired with the starter it displaces. When the
/// displaced occupant is still an optimal starter (it only moved slots), the
/// displacement is followed to the instance it moved into, until it reaches
/// a starter who is benched in the optimal lineup or an instance that was
/// empty. Only swaps that gain points are reported.
pub fn substitutions(
    snapshot: &RosterSnapshot,
    schema: &SlotSchema,
    optimal: &OptimalAssignment,
) -> ResolveResult<Vec<SubstitutionRecord>> {
    // Ineligible starters are logged by `solve`.
    check_deployments(snapshot, schema)?;

    let mut instances: Vec<InstanceState> = Vec::with_capacity(optimal.slots().len());
    let mut optimal_index: HashMap<PlayerId, usize> = HashMap::new();
    for (idx, assignment) in optimal.slots().iter().enumerate() {
        if let Some(id) = assignment.player {
            lookup(snapshot, id)?;
            if optimal_index.insert(id, idx).is_some() {
                return Err(ResolveError::InternalConsistency(format!(
                    "player {id} assigned to more than one slot"
                )));
            }
        }
        instances.push(InstanceState {
            label: assignment.slot.label.clone(),
            optimal: assignment.player,
            actual: None,
        });
    }

    align_actual(snapshot, schema, &mut instances, &optimal_index)?;

    let mut records = Vec::new();
    for (idx, instance) in instances.iter().enumerate() {
        let Some(incoming_id) = instance.optimal else {
            continue;
        };
        let incoming = lookup(snapshot, incoming_id)?;
        if incoming.is_starter() {
            continue;
        }

        let outgoing = displaced_starter(snapshot, &instances, &optimal_index, idx)?;
        let points_delta = incoming.points - outgoing.points;
        if points_delta > 0.0 {
            records.push(SubstitutionRecord {
                incoming: RecordPlayer::from(incoming),
                outgoing,
                slot_label: instance.label.clone(),
                points_delta,
            });
        }
    }

    Ok(records)
}

/// Place each actual starter on one instance of its label.
fn align_actual(
    snapshot: &RosterSnapshot,
    schema: &SlotSchema,
    instances: &mut [InstanceState],
    optimal_index: &HashMap<PlayerId, usize>,
) -> ResolveResult<()> {
    for req in schema.fill_order() {
        let label_instances: Vec<usize> = instances
            .iter()
            .enumerate()
            .filter(|(_, inst)| inst.label == req.label)
            .map(|(idx, _)| idx)
            .collect();

        let mut occupants: Vec<&Player> = snapshot.starters_in(&req.label).collect();
        occupants.sort_by(|a, b| rank_order(b, a));

        let mut placed: HashSet<PlayerId> = HashSet::new();
        for player in &occupants {
            if let Some(&idx) = optimal_index.get(&player.id) {
                if label_instances.contains(&idx) {
                    instances[idx].actual = Some(player.id);
                    placed.insert(player.id);
                }
            }
        }

        let free: Vec<usize> = label_instances
            .iter()
            .copied()
            .filter(|&idx| instances[idx].actual.is_none())
            .collect();
        let mut free = free.into_iter();
        for player in occupants.iter().filter(|p| !placed.contains(&p.id)) {
            let Some(idx) = free.next() else {
                return Err(ResolveError::InternalConsistency(format!(
                    "assignment has fewer `{}` instances than actual starters",
                    req.label
                )));
            };
            instances[idx].actual = Some(player.id);
        }
    }
    Ok(())
}

/// Follow the displacement chain starting at `start` and return the starter
/// who ends up benched, or the empty sentinel.
fn displaced_starter(
    snapshot: &RosterSnapshot,
    instances: &[InstanceState],
    optimal_index: &HashMap<PlayerId, usize>,
    start: usize,
) -> ResolveResult<RecordPlayer> {
    let mut current = start;
    // Each step lands on a distinct instance, so the chain is bounded.
    for _ in 0..=instances.len() {
        match instances[current].actual {
            None => return Ok(RecordPlayer::empty()),
            Some(id) => match optimal_index.get(&id) {
                None => return Ok(RecordPlayer::from(lookup(snapshot, id)?)),
                Some(&next) => current = next,
            },
        }
    }
    Err(ResolveError::InternalConsistency(format!(
        "displacement chain from `{}` did not terminate",
        instances[start].label
    )))
}

fn lookup(snapshot: &RosterSnapshot, id: PlayerId) -> ResolveResult<&Player> {
    snapshot.get(id).ok_or_else(|| {
        ResolveError::InternalConsistency(format!("player {id} is not in the snapshot"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::position::{ActualSlot, Position};
    use crate::lineup::schema::SlotRequirement;
    use crate::resolve::solver::{solve, SlotAssignment, SlotInstance};

    fn p(id: i64, pos: Position, points: f64, slot: &str) -> Player {
        Player::new(id, format!("P{id}"), pos, points, ActualSlot::parse(slot))
    }

    fn diff(players: Vec<Player>, schema: &SlotSchema) -> Vec<SubstitutionRecord> {
        let snap = RosterSnapshot::new("team_1", 1, players).unwrap();
        let optimal = solve(&snap, schema).unwrap();
        substitutions(&snap, schema, &optimal).unwrap()
    }

    fn rb_flex_schema() -> SlotSchema {
        use Position::*;
        SlotSchema::new(vec![
            SlotRequirement::new("RB", &[RunningBack], 2),
            SlotRequirement::new("WR", &[WideReceiver], 1),
            SlotRequirement::new("FLEX", &[RunningBack, WideReceiver, TightEnd], 1),
        ])
    }

    #[test]
    fn simple_swap_at_single_slot() {
        let schema = SlotSchema::new(vec![SlotRequirement::new("QB", &[Position::Quarterback], 1)]);
        let records = diff(
            vec![
                p(1, Position::Quarterback, 10.0, "QB"),
                p(2, Position::Quarterback, 18.0, "BE"),
            ],
            &schema,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].incoming.id, PlayerId(2));
        assert_eq!(records[0].outgoing.id, PlayerId(1));
        assert_eq!(records[0].slot_label, "QB");
        assert!((records[0].points_delta - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reshuffled_starters_are_not_reported() {
        // RB3 moves from FLEX to RB, the bench WR takes FLEX, RB2 sits.
        // One swap: WR in for RB2.
        let records = diff(
            vec![
                p(1, Position::RunningBack, 20.0, "RB"),
                p(2, Position::RunningBack, 5.0, "RB"),
                p(3, Position::RunningBack, 15.0, "FLEX"),
                p(4, Position::WideReceiver, 30.0, "WR"),
                p(5, Position::WideReceiver, 12.0, "BE"),
            ],
            &rb_flex_schema(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].incoming.id, PlayerId(5));
        assert_eq!(records[0].outgoing.id, PlayerId(2));
        assert_eq!(records[0].slot_label, "FLEX");
        assert!((records[0].points_delta - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bench_upgrade_at_multi_instance_slot_replaces_weakest() {
        let records = diff(
            vec![
                p(1, Position::RunningBack, 20.0, "RB"),
                p(2, Position::RunningBack, 6.0, "RB"),
                p(3, Position::RunningBack, 16.0, "BE"),
                p(4, Position::WideReceiver, 30.0, "WR"),
                p(5, Position::TightEnd, 1.0, "FLEX"),
            ],
            &rb_flex_schema(),
        );
        // RB3 replaces RB2 at RB; RB2 (6) then beats the TE (1) for FLEX,
        // so the net lineup change is RB3 in, TE out.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].incoming.id, PlayerId(3));
        assert_eq!(records[0].outgoing.id, PlayerId(5));
        assert_eq!(records[0].slot_label, "RB");
        assert!((records[0].points_delta - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_actual_slot_uses_sentinel() {
        let schema = SlotSchema::new(vec![SlotRequirement::new("K", &[Position::Kicker], 1)]);
        let records = diff(vec![p(1, Position::Kicker, 9.0, "BE")], &schema);
        assert_eq!(records.len(), 1);
        assert!(records[0].outgoing.is_empty());
        assert_eq!(records[0].outgoing.name, "EMPTY");
        assert!((records[0].points_delta - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_delta_swaps_are_not_reported() {
        let schema = SlotSchema::new(vec![SlotRequirement::new("QB", &[Position::Quarterback], 1)]);
        let records = diff(
            vec![
                p(5, Position::Quarterback, 12.0, "QB"),
                p(2, Position::Quarterback, 12.0, "BE"),
            ],
            &schema,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn records_follow_fill_order() {
        let records = diff(
            vec![
                p(1, Position::Quarterback, 10.0, "QB"),
                p(2, Position::Quarterback, 18.0, "BE"),
                p(3, Position::RunningBack, 1.0, "RB/WR/TE"),
                p(4, Position::WideReceiver, 9.0, "BE"),
                p(5, Position::Kicker, 2.0, "K"),
                p(6, Position::Kicker, 11.0, "BE"),
            ],
            &SlotSchema::standard(),
        );
        let labels: Vec<&str> = records.iter().map(|r| r.slot_label.as_str()).collect();
        assert_eq!(labels, vec!["QB", "WR", "K"]);
    }

    #[test]
    fn unknown_player_in_assignment_is_internal_error() {
        let schema = SlotSchema::new(vec![SlotRequirement::new("QB", &[Position::Quarterback], 1)]);
        let snap =
            RosterSnapshot::new("team_1", 1, vec![p(1, Position::Quarterback, 10.0, "QB")]).unwrap();
        let bogus = OptimalAssignment::from_slots(
            vec![SlotAssignment {
                slot: SlotInstance {
                    label: "QB".into(),
                    ordinal: 1,
                },
                player: Some(PlayerId(99)),
            }],
            30.0,
        );
        let err = substitutions(&snap, &schema, &bogus).unwrap_err();
        assert!(matches!(err, ResolveError::InternalConsistency(_)));
    }

    #[test]
    fn duplicate_player_in_assignment_is_internal_error() {
        let schema = SlotSchema::new(vec![SlotRequirement::new("RB", &[Position::RunningBack], 2)]);
        let snap =
            RosterSnapshot::new("team_1", 1, vec![p(1, Position::RunningBack, 10.0, "RB")]).unwrap();
        let slot = |ordinal| SlotInstance {
            label: "RB".into(),
            ordinal,
        };
        let bogus = OptimalAssignment::from_slots(
            vec![
                SlotAssignment {
                    slot: slot(1),
                    player: Some(PlayerId(1)),
                },
                SlotAssignment {
                    slot: slot(2),
                    player: Some(PlayerId(1)),
                },
            ],
            20.0,
        );
        let err = substitutions(&snap, &schema, &bogus).unwrap_err();
        assert!(matches!(err, ResolveError::InternalConsistency(_)));
    }
}
