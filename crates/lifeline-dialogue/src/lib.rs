//! Lifeline — Dialogue bounded context.
//!
//! Holds the immutable scenario graph model and the pure rules that act on
//! it: node resolution with fallback synthesis, clue-filtered option offers,
//! trust bookkeeping, resource gating and coach feedback.

pub mod domain;
