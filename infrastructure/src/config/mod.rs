//! Configuration file loading for council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileDebateConfig, FileOutputConfig, FileOutputFormat, FileParticipantConfig,
    FileSummarizerConfig,
};
pub use loader::{ConfigError, ConfigLoader};
