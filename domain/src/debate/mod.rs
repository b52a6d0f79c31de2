//! Debate mechanics: phases, turns, budgets and the session they run in.

pub mod budget;
pub mod context;
pub mod phase;
pub mod policy;
pub mod rotation;
pub mod session;
pub mod state_machine;
pub mod tier;
pub mod turn;

pub use budget::TurnBudgetScheduler;
pub use context::TurnContext;
pub use phase::{DebatePhase, PhaseRecord, PhaseStatus};
pub use policy::DebatePolicy;
pub use rotation::ParticipantRotationManager;
pub use session::DebateSession;
pub use state_machine::{PhaseStateMachine, TransitionRecord, is_legal_transition};
pub use tier::{BudgetTable, Classification, ComplexityClassifier, ComplexityTier, DepthOverride};
pub use turn::{MODERATOR, Speaker, Turn, TurnType};
