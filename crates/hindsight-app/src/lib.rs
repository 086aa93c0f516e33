// Hindsight application: CSV input, season run, and report output.

pub mod app;
pub mod input;
pub mod report;
