//! Lifeline Core — shared domain abstractions.
//!
//! This crate defines the identifiers, traits and error types that every
//! bounded context depends on. It contains no infrastructure code: the
//! narrator, audio and persistence seams are traits implemented elsewhere.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
pub mod presentation;
pub mod repository;
pub mod rng;
pub mod settings;
