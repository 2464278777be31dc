//! Configuration file loading for agent-thinker
//!
//! The priority order (highest to lowest):
//!
//! 1. `THINKER_*` environment variables (`THINKER_ORCHESTRATOR__MAX_ROUNDS=2`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./thinker.toml` or `./.thinker.toml`
//! 4. Global: `<config dir>/agent-thinker/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    CacheBackend, DEFAULT_SCRAPE_URL, DEFAULT_SEARCH_URL, FileCacheConfig, FileConfig,
    FileLoggingConfig, FileOrchestratorConfig, FileProviderConfig, FileRetryConfig,
    FileServicesConfig,
};
pub use loader::ConfigLoader;
