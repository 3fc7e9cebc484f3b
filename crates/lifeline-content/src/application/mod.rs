//! Application services for the Content context.

pub mod command_handlers;
