//! Domain model for the Progression context.

pub mod ledger;
pub mod locks;
