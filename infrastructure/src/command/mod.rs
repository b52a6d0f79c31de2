//! Command-backed adapters
//!
//! Participants and the summarizer are local programs: the prompt goes to
//! stdin, the answer comes back on stdout. Any CLI wrapping a language
//! model (or a shell script) can take part in a debate this way.

mod participant;
mod runner;
mod summarizer;

pub use participant::CommandParticipant;
pub use runner::{CommandError, CommandSpec};
pub use summarizer::CommandSummarizer;
