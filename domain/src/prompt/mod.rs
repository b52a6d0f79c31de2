//! Prompt domain
//!
//! Text the moderator writes into the transcript, and prompts sent to
//! participants and the summarizer.

mod template;

pub use template::{ConsensusPromptInput, DebatePromptTemplate};
