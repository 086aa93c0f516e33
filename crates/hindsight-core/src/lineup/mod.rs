// Lineup data: positions, slot schema, roster snapshots.

pub mod position;
pub mod schema;
pub mod snapshot;
