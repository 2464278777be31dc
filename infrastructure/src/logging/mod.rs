//! Run transcripts.
//!
//! Provides [`JsonlTranscriptLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](thinker_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlTranscriptLogger;
