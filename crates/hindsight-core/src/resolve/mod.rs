// Lineup resolution: optimal assignment plus the substitutions that reach it.

pub mod diff;
pub mod solver;

use serde::Serialize;

use crate::error::ResolveResult;
use crate::lineup::schema::SlotSchema;
use crate::lineup::snapshot::RosterSnapshot;

use self::diff::{substitutions, SubstitutionRecord};
use self::solver::{solve, OptimalAssignment};

/// Everything learned from one (team, week) snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupResolution {
    pub team_id: String,
    pub week: u32,
    pub optimal: OptimalAssignment,
    pub substitutions: Vec<SubstitutionRecord>,
    /// Points scored by the lineup that was actually started.
    pub actual_points: f64,
    /// Points the optimal lineup would have scored.
    pub optimal_points: f64,
}

impl LineupResolution {
    /// Sum of the reported substitution deltas.
    pub fn points_left_on_bench(&self) -> f64 {
        self.substitutions.iter().map(|s| s.points_delta).sum()
    }

    /// Optimal minus actual. Never negative when every starter was deployed
    /// in a slot its position is eligible for.
    pub fn optimal_gap(&self) -> f64 {
        self.optimal_points - self.actual_points
    }
}

/// Solve and diff one snapshot.
pub fn resolve(snapshot: &RosterSnapshot, schema: &SlotSchema) -> ResolveResult<LineupResolution> {
    let optimal = solve(snapshot, schema)?;
    let substitutions = substitutions(snapshot, schema, &optimal)?;
    Ok(LineupResolution {
        team_id: snapshot.team_id().to_string(),
        week: snapshot.week(),
        actual_points: snapshot.actual_points(),
        optimal_points: optimal.total_points(),
        optimal,
        substitutions,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Level, Metadata, Subscriber};

    use super::*;
    use crate::lineup::position::{ActualSlot, Position};
    use crate::lineup::schema::SlotRequirement;
    use crate::lineup::snapshot::Player;

    /// Counts WARN events emitted while it is the thread's default.
    struct WarnCounter(Arc<AtomicUsize>);

    impl Subscriber for WarnCounter {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }
        fn record(&self, _: &Id, _: &Record<'_>) {}
        fn record_follows_from(&self, _: &Id, _: &Id) {}
        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &Id) {}
        fn exit(&self, _: &Id) {}
    }

    #[test]
    fn ineligible_starter_warned_once_per_resolve() {
        let schema = SlotSchema::new(vec![
            SlotRequirement::new("QB", &[Position::Quarterback], 1),
            SlotRequirement::new("TE", &[Position::TightEnd], 1),
        ]);
        let players = vec![
            Player::new(1, "Starter", Position::Quarterback, 20.0, ActualSlot::parse("QB")),
            Player::new(2, "Backup", Position::Quarterback, 9.0, ActualSlot::parse("TE")),
            Player::new(3, "Tight End", Position::TightEnd, 5.0, ActualSlot::parse("BE")),
        ];
        let snap = RosterSnapshot::new("1", 1, players).unwrap();

        let warnings = Arc::new(AtomicUsize::new(0));
        let resolution = tracing::subscriber::with_default(WarnCounter(warnings.clone()), || {
            resolve(&snap, &schema).unwrap()
        });

        assert_eq!(warnings.load(Ordering::SeqCst), 1);
        assert_eq!(resolution.optimal_points, 25.0);
    }
}
