// Hindsight core: optimal lineups, missed substitutions, and season rollups.

pub mod config;
pub mod error;
pub mod lineup;
pub mod records;
pub mod resolve;
pub mod season;
