//! Domain model for the Content context.

pub mod catalog;
pub mod validation;
