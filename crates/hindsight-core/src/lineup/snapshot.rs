// One team's players and scores for one week.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::position::{ActualSlot, Position};
use crate::error::{ResolveError, ResolveResult};

/// Platform player identifier. Signed because team defenses carry negative
/// ids on some platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rostered player and what they did in a single week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub points: f64,
    pub actual_slot: ActualSlot,
}

impl Player {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        position: Position,
        points: f64,
        actual_slot: ActualSlot,
    ) -> Self {
        Player {
            id: PlayerId(id),
            name: name.into(),
            position,
            points,
            actual_slot,
        }
    }

    pub fn is_starter(&self) -> bool {
        self.actual_slot.is_starting()
    }
}

/// The players on one team for one week.
///
/// Construction validates the snapshot invariants: ids are unique and every
/// score is finite. Player order is preserved as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSnapshot {
    team_id: String,
    week: u32,
    players: Vec<Player>,
}

impl RosterSnapshot {
    pub fn new(team_id: impl Into<String>, week: u32, players: Vec<Player>) -> ResolveResult<Self> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player.id) {
                return Err(ResolveError::DuplicatePlayer {
                    player_id: player.id,
                });
            }
            if !player.points.is_finite() {
                return Err(ResolveError::NonFinitePoints {
                    player_id: player.id,
                });
            }
        }
        Ok(RosterSnapshot {
            team_id: team_id.into(),
            week,
            players,
        })
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Look up a player by id.
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players deployed in any starting slot.
    pub fn starters(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_starter())
    }

    /// Players deployed in the starting slot with the given label.
    pub fn starters_in<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Player> + 'a {
        self.players
            .iter()
            .filter(move |p| p.actual_slot.starting_label() == Some(label))
    }

    /// Points actually scored by the starting lineup.
    pub fn actual_points(&self) -> f64 {
        self.starters().map(|p| p.points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starter(id: i64, pos: Position, points: f64, slot: &str) -> Player {
        Player::new(id, format!("P{id}"), pos, points, ActualSlot::parse(slot))
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let players = vec![
            starter(1, Position::Quarterback, 10.0, "QB"),
            starter(1, Position::Quarterback, 12.0, "BE"),
        ];
        let err = RosterSnapshot::new("t1", 1, players).unwrap_err();
        assert_eq!(
            err,
            ResolveError::DuplicatePlayer {
                player_id: PlayerId(1)
            }
        );
    }

    #[test]
    fn new_rejects_nan_points() {
        let players = vec![starter(7, Position::Kicker, f64::NAN, "K")];
        let err = RosterSnapshot::new("t1", 1, players).unwrap_err();
        assert!(matches!(err, ResolveError::NonFinitePoints { .. }));
    }

    #[test]
    fn empty_snapshot_is_constructible() {
        // Emptiness is a resolution error, not a construction error.
        let snap = RosterSnapshot::new("t1", 3, vec![]).unwrap();
        assert!(snap.is_empty());
        assert_eq!(snap.week(), 3);
    }

    #[test]
    fn actual_points_counts_only_starters() {
        let players = vec![
            starter(1, Position::Quarterback, 10.0, "QB"),
            starter(2, Position::Quarterback, 18.0, "BE"),
            starter(3, Position::RunningBack, 7.5, "RB"),
            starter(4, Position::RunningBack, 30.0, "IR"),
        ];
        let snap = RosterSnapshot::new("t1", 1, players).unwrap();
        assert!((snap.actual_points() - 17.5).abs() < f64::EPSILON);
        assert_eq!(snap.starters().count(), 2);
    }

    #[test]
    fn starters_in_filters_by_label() {
        let players = vec![
            starter(1, Position::RunningBack, 10.0, "RB"),
            starter(2, Position::RunningBack, 8.0, "RB"),
            starter(3, Position::WideReceiver, 9.0, "RB/WR/TE"),
        ];
        let snap = RosterSnapshot::new("t1", 1, players).unwrap();
        assert_eq!(snap.starters_in("RB").count(), 2);
        assert_eq!(snap.starters_in("RB/WR/TE").count(), 1);
        assert_eq!(snap.starters_in("WR").count(), 0);
    }

    #[test]
    fn negative_defense_ids_are_allowed() {
        let players = vec![starter(-16001, Position::Defense, 4.0, "D/ST")];
        let snap = RosterSnapshot::new("t1", 1, players).unwrap();
        assert!(snap.get(PlayerId(-16001)).is_some());
    }
}
