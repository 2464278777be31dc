//! Task domain
//!
//! Tasks are the units of work the orchestrator queues and dispatches.
//! The queue is owned by the orchestrator; agents only return results that
//! the orchestrator applies.

mod entities;
mod payload;
mod queue;
mod value_objects;

pub use entities::{Task, TaskOutput};
pub use payload::TaskPayload;
pub use queue::TaskQueue;
pub use value_objects::{TaskId, TaskKind, TaskOrigin, TaskStatus};
