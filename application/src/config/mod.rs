//! Application-level configuration.
//!
//! - [`ExecutionParams`]: how much context the use case hands out per call

pub mod execution_params;

pub use execution_params::ExecutionParams;
