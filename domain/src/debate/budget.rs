//! Turn budget accounting.
//!
//! [`TurnBudgetScheduler`] enforces both the session-wide cap and the
//! per-phase ceilings. A turn may only be appended after
//! [`TurnBudgetScheduler::try_record`] accepted it.

use super::phase::DebatePhase;
use super::tier::BudgetTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnBudgetScheduler {
    total_budget: usize,
    total_consumed: usize,
    allocations: BTreeMap<DebatePhase, usize>,
    consumed: BTreeMap<DebatePhase, usize>,
}

impl TurnBudgetScheduler {
    pub fn new(table: &BudgetTable) -> Self {
        Self {
            total_budget: table.total,
            total_consumed: 0,
            allocations: table.allocations.clone(),
            consumed: BTreeMap::new(),
        }
    }

    /// True iff both the session total and the phase ceiling have room
    pub fn can_emit(&self, phase: DebatePhase) -> bool {
        self.total_consumed < self.total_budget
            && self.phase_consumed(phase) < self.allocation(phase)
    }

    /// Charge one turn to `phase`; refuses (and changes nothing) when
    /// [`can_emit`](Self::can_emit) is false.
    pub fn try_record(&mut self, phase: DebatePhase) -> bool {
        if !self.can_emit(phase) {
            return false;
        }
        self.total_consumed += 1;
        *self.consumed.entry(phase).or_insert(0) += 1;
        true
    }

    /// `total_consumed >= fraction * total_budget`
    pub fn near_exhaustion(&self, fraction: f64) -> bool {
        self.total_consumed as f64 >= fraction * self.total_budget as f64
    }

    pub fn consumed_fraction(&self) -> f64 {
        if self.total_budget == 0 {
            return 1.0;
        }
        self.total_consumed as f64 / self.total_budget as f64
    }

    pub fn remaining(&self) -> usize {
        self.total_budget.saturating_sub(self.total_consumed)
    }

    pub fn phase_remaining(&self, phase: DebatePhase) -> usize {
        self.allocation(phase)
            .saturating_sub(self.phase_consumed(phase))
            .min(self.remaining())
    }

    pub fn total_budget(&self) -> usize {
        self.total_budget
    }

    pub fn total_consumed(&self) -> usize {
        self.total_consumed
    }

    pub fn allocation(&self, phase: DebatePhase) -> usize {
        self.allocations.get(&phase).copied().unwrap_or(0)
    }

    pub fn phase_consumed(&self, phase: DebatePhase) -> usize {
        self.consumed.get(&phase).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::tier::ComplexityTier;

    fn scheduler(tier: ComplexityTier, total: Option<usize>) -> TurnBudgetScheduler {
        let mut table = BudgetTable::for_tier(tier);
        if let Some(total) = total {
            table = table.with_total(total);
        }
        TurnBudgetScheduler::new(&table)
    }

    #[test]
    fn test_fourth_turn_rejected_with_total_of_three() {
        let mut budget = scheduler(ComplexityTier::Simple, Some(3));
        for _ in 0..3 {
            assert!(budget.try_record(DebatePhase::Opening));
        }
        assert!(!budget.can_emit(DebatePhase::Opening));
        assert!(!budget.try_record(DebatePhase::Opening));
        assert_eq!(budget.total_consumed(), 3);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_phase_ceiling_enforced() {
        let mut budget = scheduler(ComplexityTier::Simple, None);
        let opening = budget.allocation(DebatePhase::Opening);
        for _ in 0..opening {
            assert!(budget.try_record(DebatePhase::Opening));
        }
        assert!(!budget.can_emit(DebatePhase::Opening));
        assert!(budget.can_emit(DebatePhase::ChallengeDefense));
        assert_eq!(budget.phase_consumed(DebatePhase::Opening), opening);
    }

    #[test]
    fn test_phase_remaining_capped_by_total() {
        let mut budget = scheduler(ComplexityTier::Simple, None);
        let edge = budget.allocation(DebatePhase::EdgeCase);
        budget.try_record(DebatePhase::EdgeCase);
        assert_eq!(budget.phase_remaining(DebatePhase::EdgeCase), edge - 1);

        let mut budget = scheduler(ComplexityTier::Simple, Some(4));
        for _ in 0..3 {
            budget.try_record(DebatePhase::Opening);
        }
        assert_eq!(budget.phase_remaining(DebatePhase::EdgeCase), 1);
        assert_eq!(budget.phase_remaining(DebatePhase::Advocacy), 0);
    }

    #[test]
    fn test_phase_without_allocation_never_emits() {
        let budget = scheduler(ComplexityTier::Simple, None);
        assert!(!budget.can_emit(DebatePhase::Advocacy));
        assert!(!budget.can_emit(DebatePhase::Done));
    }

    #[test]
    fn test_near_exhaustion() {
        let mut budget = scheduler(ComplexityTier::Simple, Some(10));
        for _ in 0..6 {
            budget.try_record(DebatePhase::ChallengeDefense);
        }
        assert!(!budget.near_exhaustion(0.9));
        for _ in 0..3 {
            budget.try_record(DebatePhase::ChallengeDefense);
        }
        assert!(budget.near_exhaustion(0.9));
        assert!((budget.consumed_fraction() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invariants_hold_under_saturation() {
        for tier in [
            ComplexityTier::Simple,
            ComplexityTier::Standard,
            ComplexityTier::Complex,
            ComplexityTier::Comparative,
        ] {
            let table = BudgetTable::for_tier(tier);
            let mut budget = TurnBudgetScheduler::new(&table);
            for phase in table.phase_sequence() {
                while budget.try_record(phase) {}
                assert!(budget.phase_consumed(phase) <= table.allocation(phase));
            }
            assert!(budget.total_consumed() <= table.total);
            assert_eq!(budget.total_consumed(), table.total);
        }
    }
}
