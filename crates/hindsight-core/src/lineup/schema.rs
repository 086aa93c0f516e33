// Slot schema: which starting slots a league uses and who may fill them.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::warn;

use super::position::{is_bench_label, is_reserve_label, Position};
use crate::config::{ConfigError, LeagueConfig, SlotConfig};

/// One starting slot label, the positions it accepts and how many instances
/// a lineup has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRequirement {
    pub label: String,
    pub eligible: BTreeSet<Position>,
    pub count: usize,
}

impl SlotRequirement {
    pub fn new(label: impl Into<String>, eligible: &[Position], count: usize) -> Self {
        SlotRequirement {
            label: label.into(),
            eligible: eligible.iter().copied().collect(),
            count,
        }
    }

    /// Whether a player at `pos` may fill this slot.
    pub fn accepts(&self, pos: Position) -> bool {
        self.eligible.contains(&pos)
    }

    /// Whether this slot accepts more than one base position.
    pub fn is_flex(&self) -> bool {
        self.eligible.len() > 1
    }
}

/// Ordered starting-slot requirements for a league.
///
/// Bench and reserve are not listed: they accept any position in any number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSchema {
    requirements: Vec<SlotRequirement>,
    /// Indices into `requirements`, most constrained first.
    #[serde(skip)]
    fill_order: Vec<usize>,
}

impl SlotSchema {
    /// Build a schema from requirements in declaration order. Labels must be
    /// unique: lookups by label only ever see the first match. Beyond a debug
    /// assertion on that, no validation is performed here; use
    /// [`requirements_for`] for config input.
    pub fn new(requirements: Vec<SlotRequirement>) -> Self {
        debug_assert!(
            {
                let mut labels = HashSet::new();
                requirements.iter().all(|r| labels.insert(r.label.as_str()))
            },
            "duplicate slot label"
        );
        let mut fill_order: Vec<usize> = (0..requirements.len()).collect();
        // Stable sort keeps declaration order among equally specific slots.
        fill_order.sort_by_key(|&i| requirements[i].eligible.len());
        SlotSchema {
            requirements,
            fill_order,
        }
    }

    /// The common 1 QB / 2 RB / 2 WR / 1 TE / 1 FLEX / 1 D/ST / 1 K lineup.
    pub fn standard() -> Self {
        use Position::*;
        SlotSchema::new(vec![
            SlotRequirement::new("QB", &[Quarterback], 1),
            SlotRequirement::new("RB", &[RunningBack], 2),
            SlotRequirement::new("WR", &[WideReceiver], 2),
            SlotRequirement::new("TE", &[TightEnd], 1),
            SlotRequirement::new("RB/WR/TE", &[RunningBack, WideReceiver, TightEnd], 1),
            SlotRequirement::new("D/ST", &[Defense], 1),
            SlotRequirement::new("K", &[Kicker], 1),
        ])
    }

    /// Requirements in declaration order.
    pub fn requirements(&self) -> &[SlotRequirement] {
        &self.requirements
    }

    /// Requirements from most to least constrained: single-position slots
    /// first, then flex slots by eligible-set size, ties in declaration order.
    pub fn fill_order(&self) -> impl Iterator<Item = &SlotRequirement> {
        self.fill_order.iter().map(|&i| &self.requirements[i])
    }

    pub fn requirement(&self, label: &str) -> Option<&SlotRequirement> {
        self.requirements.iter().find(|r| r.label == label)
    }

    /// Total number of starting slot instances.
    pub fn starter_count(&self) -> usize {
        self.requirements.iter().map(|r| r.count).sum()
    }

    /// Whether some starting slot instance accepts `pos`.
    pub fn has_home(&self, pos: Position) -> bool {
        self.requirements
            .iter()
            .any(|r| r.count > 0 && r.accepts(pos))
    }

    /// Whether every pair of eligible sets is either disjoint or nested.
    ///
    /// Greedy fill-by-specificity is only guaranteed optimal for nested
    /// families; two flex slots with partially overlapping sets (say
    /// RB/WR and WR/TE) can strand a player.
    pub fn is_nested(&self) -> bool {
        let active: Vec<&SlotRequirement> =
            self.requirements.iter().filter(|r| r.count > 0).collect();
        for (i, a) in active.iter().enumerate() {
            for b in &active[i + 1..] {
                let disjoint = a.eligible.is_disjoint(&b.eligible);
                let nested = a.eligible.is_subset(&b.eligible) || b.eligible.is_subset(&a.eligible);
                if !disjoint && !nested {
                    return false;
                }
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Construction from config
// ---------------------------------------------------------------------------

/// Build and validate the slot schema for a league.
pub fn requirements_for(league: &LeagueConfig) -> Result<SlotSchema, ConfigError> {
    let mut seen_labels = HashSet::new();
    let mut requirements = Vec::with_capacity(league.slots.len());

    for (idx, slot) in league.slots.iter().enumerate() {
        let label = slot.label.trim();
        let field = format!("league.slots[{idx}].label");

        if label.is_empty() {
            return Err(ConfigError::ValidationError {
                field,
                message: "must not be empty".into(),
            });
        }
        if is_bench_label(label) || is_reserve_label(label) {
            return Err(ConfigError::ValidationError {
                field,
                message: format!("`{label}` is reserved for bench/reserve and cannot be a starting slot"),
            });
        }
        if !seen_labels.insert(label.to_string()) {
            return Err(ConfigError::ValidationError {
                field,
                message: format!("duplicate slot label `{label}`"),
            });
        }
        if slot.count < 0 {
            return Err(ConfigError::NegativeCount {
                label: label.to_string(),
                count: slot.count,
            });
        }

        let eligible = eligible_positions(label, slot)?;
        if eligible.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("league.slots[{idx}].eligible"),
                message: "must list at least one position".into(),
            });
        }

        requirements.push(SlotRequirement {
            label: label.to_string(),
            eligible,
            count: slot.count as usize,
        });
    }

    let schema = SlotSchema::new(requirements);
    if !schema.is_nested() {
        warn!(
            "league '{}' has partially overlapping flex slots; greedy lineup resolution may be suboptimal",
            league.name
        );
    }
    Ok(schema)
}

/// Resolve a slot's eligible positions, either from its explicit list or by
/// reading the label itself ("QB", "D/ST", "RB/WR/TE").
fn eligible_positions(label: &str, slot: &SlotConfig) -> Result<BTreeSet<Position>, ConfigError> {
    let unknown = |position: &str| ConfigError::UnknownPosition {
        label: label.to_string(),
        position: position.to_string(),
    };

    if let Some(explicit) = &slot.eligible {
        return explicit
            .iter()
            .map(|s| Position::from_str_pos(s).ok_or_else(|| unknown(s.as_str())))
            .collect();
    }

    if let Some(pos) = Position::from_str_pos(label) {
        return Ok(BTreeSet::from([pos]));
    }

    label
        .split('/')
        .map(|part| Position::from_str_pos(part).ok_or_else(|| unknown(part)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "duplicate slot label")]
    fn duplicate_labels_rejected_in_debug_builds() {
        SlotSchema::new(vec![
            SlotRequirement::new("QB", &[Position::Quarterback], 1),
            SlotRequirement::new("QB", &[Position::Quarterback], 1),
        ]);
    }

    fn slot(label: &str, count: i64, eligible: Option<&[&str]>) -> SlotConfig {
        SlotConfig {
            label: label.into(),
            count,
            eligible: eligible.map(|e| e.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn league(slots: Vec<SlotConfig>) -> LeagueConfig {
        LeagueConfig {
            name: "Test League".into(),
            season: 2022,
            teams: HashMap::new(),
            slots,
        }
    }

    fn labels_in_fill_order(schema: &SlotSchema) -> Vec<&str> {
        schema.fill_order().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn derives_eligibility_from_labels() {
        let schema = requirements_for(&league(vec![
            slot("QB", 1, None),
            slot("D/ST", 1, None),
            slot("RB/WR/TE", 1, None),
        ]))
        .unwrap();

        let qb = schema.requirement("QB").unwrap();
        assert_eq!(qb.eligible, BTreeSet::from([Position::Quarterback]));
        assert!(!qb.is_flex());

        let dst = schema.requirement("D/ST").unwrap();
        assert_eq!(dst.eligible, BTreeSet::from([Position::Defense]));

        let flex = schema.requirement("RB/WR/TE").unwrap();
        assert!(flex.is_flex());
        assert!(flex.accepts(Position::TightEnd));
        assert!(!flex.accepts(Position::Quarterback));
    }

    #[test]
    fn explicit_eligibility_overrides_label() {
        let schema = requirements_for(&league(vec![slot(
            "OP",
            1,
            Some(&["QB", "RB", "WR", "TE"]),
        )]))
        .unwrap();
        assert_eq!(schema.requirement("OP").unwrap().eligible.len(), 4);
    }

    #[test]
    fn fill_order_is_most_constrained_first() {
        let schema = requirements_for(&league(vec![
            slot("OP", 1, Some(&["QB", "RB", "WR", "TE"])),
            slot("FLEX", 1, Some(&["RB", "WR", "TE"])),
            slot("QB", 1, None),
            slot("WR/TE", 1, None),
            slot("RB/WR", 1, None),
            slot("K", 1, None),
        ]))
        .unwrap();
        assert_eq!(
            labels_in_fill_order(&schema),
            vec!["QB", "K", "WR/TE", "RB/WR", "FLEX", "OP"]
        );
    }

    #[test]
    fn standard_schema_shape() {
        let schema = SlotSchema::standard();
        assert_eq!(schema.starter_count(), 9);
        assert_eq!(
            labels_in_fill_order(&schema),
            vec!["QB", "RB", "WR", "TE", "D/ST", "K", "RB/WR/TE"]
        );
        assert!(schema.is_nested());
        assert!(schema.has_home(Position::Kicker));
        assert!(!schema.has_home(Position::Linebacker));
    }

    #[test]
    fn rejects_unknown_position() {
        let err = requirements_for(&league(vec![slot("OP", 1, None)])).unwrap_err();
        match err {
            ConfigError::UnknownPosition { label, position } => {
                assert_eq!(label, "OP");
                assert_eq!(position, "OP");
            }
            other => panic!("expected UnknownPosition, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_explicit_position() {
        let err =
            requirements_for(&league(vec![slot("FLEX", 1, Some(&["RB", "XX"]))])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPosition { position, .. } if position == "XX"));
    }

    #[test]
    fn rejects_negative_count() {
        let err = requirements_for(&league(vec![slot("QB", -1, None)])).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeCount { count: -1, .. }));
    }

    #[test]
    fn zero_count_is_allowed() {
        let schema = requirements_for(&league(vec![slot("K", 0, None)])).unwrap();
        assert_eq!(schema.starter_count(), 0);
        assert!(!schema.has_home(Position::Kicker));
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err =
            requirements_for(&league(vec![slot("QB", 1, None), slot("QB", 1, None)])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn rejects_bench_label_as_starting_slot() {
        let err = requirements_for(&league(vec![slot("BE", 6, None)])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn rejects_empty_eligible_list() {
        let err = requirements_for(&league(vec![slot("FLEX", 1, Some(&[]))])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn overlapping_flex_slots_are_not_nested() {
        let schema = requirements_for(&league(vec![
            slot("RB/WR", 1, None),
            slot("WR/TE", 1, None),
        ]))
        .unwrap();
        assert!(!schema.is_nested());
    }

    #[test]
    fn superflex_over_flex_is_nested() {
        let schema = requirements_for(&league(vec![
            slot("QB", 1, None),
            slot("RB", 2, None),
            slot("RB/WR/TE", 1, None),
            slot("OP", 1, Some(&["QB", "RB", "WR", "TE"])),
        ]))
        .unwrap();
        assert!(schema.is_nested());
    }
}
