//! Presentation layer for campus-chat
//!
//! This crate contains the CLI definition, the console view that prints
//! replies as they stream, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, run_turn};
pub use cli::commands::Cli;
pub use output::console::{ConsoleFormatter, ConsoleProjector};
