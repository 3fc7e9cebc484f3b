//! Lifeline — HTTP host.
//!
//! Owns the session engine behind a mutex, drives its virtual clock from a
//! wall-clock ticker, persists progress and settings to JSON files and
//! exposes the engine over a small JSON API.

pub mod config;
pub mod driver;
pub mod error;
pub mod persistence;
pub mod presentation;
pub mod routes;
pub mod state;
