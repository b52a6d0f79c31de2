//! Infrastructure layer for council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod command;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use command::{CommandError, CommandParticipant, CommandSpec, CommandSummarizer};
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileDebateConfig, FileOutputConfig, FileOutputFormat,
    FileParticipantConfig, FileSummarizerConfig,
};
pub use logging::{JsonlEventSink, JsonlLiveLog};
