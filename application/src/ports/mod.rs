//! Port definitions (interfaces for external adapters)

pub mod agents;
pub mod collaborators;
pub mod completion_gateway;
pub mod conversation_logger;
pub mod page_cache;
pub mod progress;
