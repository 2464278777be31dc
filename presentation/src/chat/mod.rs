//! Interactive chat module
//!
//! Provides a reedline-based interactive chat interface.

mod repl;

pub use repl::{ChatRepl, ReplCommand, record_outcome};
