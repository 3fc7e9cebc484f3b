//! Lifeline — Progression bounded context.
//!
//! Tracks which scenarios the player has completed and decides which ones
//! are unlocked.

pub mod application;
pub mod domain;
