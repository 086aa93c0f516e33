// Errors raised while resolving a single (team, week) roster snapshot.

use thiserror::Error;

use crate::lineup::snapshot::PlayerId;

/// Failure of one resolution unit. These are deterministic data errors;
/// retrying the same snapshot produces the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A player's deployment has no home in the slot schema.
    #[error("schema mismatch for player {player_id} ({player_name}): {message}")]
    SchemaMismatch {
        player_id: PlayerId,
        player_name: String,
        message: String,
    },

    #[error("roster for team {team_id} in week {week} has no players")]
    EmptyRoster { team_id: String, week: u32 },

    #[error("player id {player_id} appears more than once in the snapshot")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("player {player_id} has non-finite points")]
    NonFinitePoints { player_id: PlayerId },

    /// Solver and diff disagree about the snapshot. Never expected in
    /// correct operation.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
