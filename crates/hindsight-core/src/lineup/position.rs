// Player positions and deployed lineup slots.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Base positions
// ---------------------------------------------------------------------------

/// Football base positions used for slot eligibility.
///
/// The first six are the standard offensive/team positions; the rest are
/// extensions some leagues enable (individual defensive players, punters,
/// head coaches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Defense,
    Kicker,
    DefensiveLineman,
    Linebacker,
    DefensiveBack,
    Punter,
    HeadCoach,
}

impl Position {
    /// Parse a position abbreviation into a Position.
    ///
    /// Accepts platform-style spellings: "D/ST", "DST" and "DEF" all map to
    /// `Defense`; "DE"/"DT" collapse into `DefensiveLineman` and "CB"/"S" into
    /// `DefensiveBack`.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "D/ST" | "DST" | "DEF" => Some(Position::Defense),
            "K" => Some(Position::Kicker),
            "DL" | "DE" | "DT" => Some(Position::DefensiveLineman),
            "LB" => Some(Position::Linebacker),
            "DB" | "CB" | "S" => Some(Position::DefensiveBack),
            "P" => Some(Position::Punter),
            "HC" => Some(Position::HeadCoach),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Defense => "D/ST",
            Position::Kicker => "K",
            Position::DefensiveLineman => "DL",
            Position::Linebacker => "LB",
            Position::DefensiveBack => "DB",
            Position::Punter => "P",
            Position::HeadCoach => "HC",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Deployed slot
// ---------------------------------------------------------------------------

/// Where a player was actually deployed in a given week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActualSlot {
    /// A starting slot, identified by its schema label (e.g. "QB", "RB/WR/TE").
    Starting(String),
    Bench,
    /// Injured reserve.
    Reserve,
}

impl ActualSlot {
    /// Parse a platform slot label. Bench and reserve spellings are
    /// recognized case-insensitively; anything else is a starting label and
    /// keeps its original spelling (trimmed).
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if is_bench_label(trimmed) {
            ActualSlot::Bench
        } else if is_reserve_label(trimmed) {
            ActualSlot::Reserve
        } else {
            ActualSlot::Starting(trimmed.to_string())
        }
    }

    /// Whether this deployment counts toward the team's score.
    pub fn is_starting(&self) -> bool {
        matches!(self, ActualSlot::Starting(_))
    }

    /// The starting label, if any.
    pub fn starting_label(&self) -> Option<&str> {
        match self {
            ActualSlot::Starting(label) => Some(label),
            ActualSlot::Bench | ActualSlot::Reserve => None,
        }
    }
}

impl fmt::Display for ActualSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActualSlot::Starting(label) => write!(f, "{label}"),
            ActualSlot::Bench => write!(f, "BENCH"),
            ActualSlot::Reserve => write!(f, "RESERVE"),
        }
    }
}

/// Whether a label names the bench.
pub fn is_bench_label(label: &str) -> bool {
    matches!(label.to_uppercase().as_str(), "BE" | "BN" | "BENCH")
}

/// Whether a label names injured reserve.
pub fn is_reserve_label(label: &str) -> bool {
    matches!(label.to_uppercase().as_str(), "IR" | "IL" | "RESERVE")
}
