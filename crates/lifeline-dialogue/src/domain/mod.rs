//! Domain model and rules for the Dialogue context.

pub mod clues;
pub mod coach;
pub mod gate;
pub mod graph;
pub mod scenario;
pub mod trust;
