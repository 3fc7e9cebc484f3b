//! Lifeline — Content bounded context.
//!
//! Loads the versioned scenario asset, checks it for authoring gaps and
//! exposes it as an immutable, ordered catalog.

pub mod application;
pub mod domain;
