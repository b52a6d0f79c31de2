//! Execution parameters: use case context control.
//!
//! [`ExecutionParams`] groups the static parameters that shape the requests
//! [`ConductDebateUseCase`](crate::use_cases::conduct_debate::ConductDebateUseCase)
//! sends out. Heuristic thresholds live in the domain's `DebatePolicy`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Recent turns included in every participant request.
    pub context_turns: usize,
    /// Turns summarized for edge-case generation and consensus highlights.
    pub digest_turns: usize,
    /// Run the scripted challenge/response between the first two capable
    /// participants at the end of OPENING.
    pub opening_exchange: bool,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            context_turns: 6,
            digest_turns: 12,
            opening_exchange: true,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_context_turns(mut self, turns: usize) -> Self {
        self.context_turns = turns;
        self
    }

    pub fn with_digest_turns(mut self, turns: usize) -> Self {
        self.digest_turns = turns;
        self
    }

    pub fn with_opening_exchange(mut self, enabled: bool) -> Self {
        self.opening_exchange = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.context_turns, 6);
        assert_eq!(params.digest_turns, 12);
        assert!(params.opening_exchange);
    }

    #[test]
    fn test_builders() {
        let params = ExecutionParams::default()
            .with_context_turns(2)
            .with_digest_turns(4)
            .with_opening_exchange(false);
        assert_eq!(params.context_turns, 2);
        assert_eq!(params.digest_turns, 4);
        assert!(!params.opening_exchange);
    }
}
