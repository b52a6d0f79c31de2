//! Structured results: contradiction resolutions, edge cases and the
//! consensus report.

pub mod contradiction;
pub mod outcome;
pub mod report;
pub mod scenario;

pub use contradiction::{Contradiction, Resolution, ResolutionAction, ResolutionOutcome};
pub use outcome::DebateOutcome;
pub use report::{ConsensusReport, QuantifiedAssessment};
pub use scenario::EdgeCaseScenario;
