//! Fairness ordering of participants.

use std::collections::HashMap;

/// Orders speakers for one CHALLENGE_DEFENSE round.
pub struct ParticipantRotationManager;

impl ParticipantRotationManager {
    /// Ascending by turn count; ties keep registration order (stable sort).
    pub fn order(active: &[String], counts: &HashMap<String, usize>) -> Vec<String> {
        let mut ordered: Vec<String> = active.to_vec();
        ordered.sort_by_key(|name| counts.get(name).copied().unwrap_or(0));
        ordered
    }

    /// Speakers for one round.
    ///
    /// Participants more than one turn ahead of the least-spoken participant
    /// sit the round out, so the spread shrinks back to at most one.
    pub fn round(active: &[String], counts: &HashMap<String, usize>) -> Vec<String> {
        let count_of = |name: &String| counts.get(name).copied().unwrap_or(0);
        let Some(min) = active.iter().map(count_of).min() else {
            return Vec::new();
        };
        Self::order(active, counts)
            .into_iter()
            .filter(|name| count_of(name) <= min + 1)
            .collect()
    }

    /// Difference between the most- and least-spoken participant
    pub fn spread(active: &[String], counts: &HashMap<String, usize>) -> usize {
        let values: Vec<usize> = active
            .iter()
            .map(|name| counts.get(name).copied().unwrap_or(0))
            .collect();
        match (values.iter().max(), values.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_order_ascending_with_stable_ties() {
        let active = names(&["a", "b", "c", "d"]);
        let counts: HashMap<String, usize> =
            [("a", 3), ("b", 1), ("c", 3), ("d", 1)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
        assert_eq!(
            ParticipantRotationManager::order(&active, &counts),
            names(&["b", "d", "a", "c"])
        );
    }

    #[test]
    fn test_unknown_participants_count_as_zero() {
        let active = names(&["a", "b"]);
        let counts: HashMap<String, usize> = [("a".to_string(), 2)].into_iter().collect();
        assert_eq!(
            ParticipantRotationManager::order(&active, &counts),
            names(&["b", "a"])
        );
    }

    #[test]
    fn test_complete_rounds_keep_spread_at_most_one() {
        for n in 1..=6 {
            let active: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let mut counts: HashMap<String, usize> = HashMap::new();
            // A micro-exchange puts the first two participants one turn ahead.
            for name in active.iter().take(2) {
                counts.insert(name.clone(), 1);
            }
            for _ in 0..20 {
                for speaker in ParticipantRotationManager::round(&active, &counts) {
                    *counts.entry(speaker).or_insert(0) += 1;
                }
                assert!(ParticipantRotationManager::spread(&active, &counts) <= 1);
            }
        }
    }

    #[test]
    fn test_large_spread_converges() {
        let active = names(&["a", "b", "c"]);
        let mut counts: HashMap<String, usize> = [("a", 10), ("b", 10), ("c", 0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        for _ in 0..12 {
            for speaker in ParticipantRotationManager::round(&active, &counts) {
                *counts.entry(speaker).or_insert(0) += 1;
            }
        }
        assert!(ParticipantRotationManager::spread(&active, &counts) <= 1);
    }
}
