//! Output formatting for run outcomes

pub mod console;
