// Optimal lineup assignment: greedy fill from most to least constrained slot.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ResolveError, ResolveResult};
use crate::lineup::schema::SlotSchema;
use crate::lineup::snapshot::{Player, PlayerId, RosterSnapshot};

// ---------------------------------------------------------------------------
// Assignment types
// ---------------------------------------------------------------------------

/// One instance of a slot label. Ordinals start at 1, so a two-RB lineup has
/// `RB#1` and `RB#2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SlotInstance {
    pub label: String,
    pub ordinal: usize,
}

impl fmt::Display for SlotInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.ordinal)
    }
}

/// A slot instance and the player the solver placed there, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAssignment {
    pub slot: SlotInstance,
    pub player: Option<PlayerId>,
}

/// The points-maximizing starting lineup for one snapshot.
///
/// Slots are listed in fill order. Players not listed are the optimal bench.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalAssignment {
    slots: Vec<SlotAssignment>,
    total_points: f64,
}

impl OptimalAssignment {
    /// Assemble an assignment directly, bypassing [`solve`].
    #[cfg(test)]
    pub(crate) fn from_slots(slots: Vec<SlotAssignment>, total_points: f64) -> Self {
        OptimalAssignment {
            slots,
            total_points,
        }
    }

    pub fn slots(&self) -> &[SlotAssignment] {
        &self.slots
    }

    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    /// Ids of every assigned starter, in fill order.
    pub fn starters(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.slots.iter().filter_map(|s| s.player)
    }

    pub fn is_starter(&self, id: PlayerId) -> bool {
        self.starters().any(|p| p == id)
    }

    /// The slot instance a player was assigned to.
    pub fn slot_of(&self, id: PlayerId) -> Option<&SlotInstance> {
        self.slots
            .iter()
            .find(|s| s.player == Some(id))
            .map(|s| &s.slot)
    }

    /// Slot instances that were left empty.
    pub fn empty_slots(&self) -> impl Iterator<Item = &SlotInstance> {
        self.slots
            .iter()
            .filter(|s| s.player.is_none())
            .map(|s| &s.slot)
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Compute the points-maximizing legal lineup for a snapshot.
///
/// Slots are filled in the schema's fill order. Each instance takes the
/// highest-scoring unassigned eligible player, with the lower id winning
/// ties. Players with negative points are never started: an empty slot
/// scores zero. Instances with no candidate stay empty.
pub fn solve(snapshot: &RosterSnapshot, schema: &SlotSchema) -> ResolveResult<OptimalAssignment> {
    if snapshot.is_empty() {
        return Err(ResolveError::EmptyRoster {
            team_id: snapshot.team_id().to_string(),
            week: snapshot.week(),
        });
    }
    for player in check_deployments(snapshot, schema)? {
        warn!(
            "team {} week {}: {} ({}) started at ineligible slot `{}`",
            snapshot.team_id(),
            snapshot.week(),
            player.name,
            player.position,
            player.actual_slot.starting_label().unwrap_or_default()
        );
    }

    let mut assigned: HashSet<PlayerId> = HashSet::new();
    let mut slots = Vec::with_capacity(schema.starter_count());
    let mut total_points = 0.0;

    for req in schema.fill_order() {
        for ordinal in 1..=req.count {
            let pick = snapshot
                .players()
                .iter()
                .filter(|p| req.accepts(p.position) && p.points >= 0.0 && !assigned.contains(&p.id))
                .max_by(|a, b| rank_order(a, b));

            let slot = SlotInstance {
                label: req.label.clone(),
                ordinal,
            };
            match pick {
                Some(player) => {
                    debug!(
                        "team {} week {}: {} <- {} ({:.2})",
                        snapshot.team_id(),
                        snapshot.week(),
                        slot,
                        player.name,
                        player.points
                    );
                    assigned.insert(player.id);
                    total_points += player.points;
                    slots.push(SlotAssignment {
                        slot,
                        player: Some(player.id),
                    });
                }
                None => {
                    debug!(
                        "team {} week {}: {} left empty",
                        snapshot.team_id(),
                        snapshot.week(),
                        slot
                    );
                    slots.push(SlotAssignment { slot, player: None });
                }
            }
        }
    }

    Ok(OptimalAssignment {
        slots,
        total_points,
    })
}

/// Ordering used everywhere a "best player" is chosen: more points first,
/// then lower id. `max_by` with this ordering yields the preferred player.
pub(crate) fn rank_order(a: &Player, b: &Player) -> std::cmp::Ordering {
    a.points
        .total_cmp(&b.points)
        .then_with(|| b.id.cmp(&a.id))
}

/// Verify the actual lineup fits the schema.
///
/// A starter must sit in a known slot label, its position must have some
/// starting home, and no label may hold more starters than its count.
/// Starters in a slot their position is not eligible for are tolerated
/// (platforms occasionally allow it) and returned so the caller can log them.
pub(crate) fn check_deployments<'a>(
    snapshot: &'a RosterSnapshot,
    schema: &SlotSchema,
) -> ResolveResult<Vec<&'a Player>> {
    let mut ineligible = Vec::new();
    for player in snapshot.starters() {
        let label = player.actual_slot.starting_label().unwrap_or_default();
        let Some(req) = schema.requirement(label) else {
            return Err(mismatch(player, format!("deployed in unknown slot `{label}`")));
        };
        if !schema.has_home(player.position) {
            return Err(mismatch(
                player,
                format!("started at `{label}` but no starting slot accepts {}", player.position),
            ));
        }
        if !req.accepts(player.position) {
            ineligible.push(player);
        }
    }

    for req in schema.requirements() {
        let mut occupants: Vec<&Player> = snapshot.starters_in(&req.label).collect();
        if occupants.len() > req.count {
            occupants.sort_by(|a, b| rank_order(b, a));
            let extra = occupants[req.count];
            return Err(mismatch(
                extra,
                format!(
                    "slot `{}` holds {} starters but the schema allows {}",
                    req.label,
                    occupants.len(),
                    req.count
                ),
            ));
        }
    }

    Ok(ineligible)
}

fn mismatch(player: &Player, message: String) -> ResolveError {
    ResolveError::SchemaMismatch {
        player_id: player.id,
        player_name: player.name.clone(),
        message,
    }
}
