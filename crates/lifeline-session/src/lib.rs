//! Lifeline — Session bounded context.
//!
//! Runs one playthrough: walking up to the character, the branching
//! conversation, the referral hand-off and dial pad, the call cutscene and
//! the end screen. All delays run on a virtual timeline advanced by the host.

pub mod application;
pub mod domain;
