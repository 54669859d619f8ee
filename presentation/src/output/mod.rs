//! Console output: live reply view and status formatting.

pub mod console;
