//! Interactive chat module
//!
//! Runs one streamed reply at a time in the terminal, either as a single
//! turn or as a line-based REPL.

mod repl;
mod turn;

pub use repl::ChatRepl;
pub use turn::run_turn;
