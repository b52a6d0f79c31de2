//! What a participant can do in a debate.

pub mod capability;

pub use capability::{Capability, CapabilitySet, ParticipantArchetype, RiskMode};
