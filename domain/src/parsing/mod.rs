//! Lenient extraction of structured data from model output.

pub mod robust_json;

pub use robust_json::{ParseFailure, RobustTextParser};
