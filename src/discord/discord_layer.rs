// Discord layer - commands and outbound reply adapters.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "drive/reply_sink.rs"]
pub mod reply_sink;

// Re-export command types for convenience
pub use commands::drive::{Data, Error};
