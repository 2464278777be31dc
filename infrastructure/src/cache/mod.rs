//! Page cache adapters.

mod file;
mod memory;

pub use file::FilePageCache;
pub use memory::InMemoryPageCache;
