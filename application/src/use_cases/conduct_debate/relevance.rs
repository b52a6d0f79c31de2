//! Keyword relevance selection of participants for scenarios and risks.

use council_domain::heuristics::{extract_key_terms, term_hits};

/// Key terms describing one participant
#[derive(Debug, Clone)]
pub(crate) struct ParticipantProfile {
    pub name: String,
    terms: Vec<String>,
}

impl ParticipantProfile {
    /// Built from the participant's name, focus terms and prior report
    pub fn new(name: &str, focus_terms: &[String], prior_report: Option<&str>) -> Self {
        let mut source = format!("{} {}", name.replace(['_', '-'], " "), focus_terms.join(" "));
        if let Some(report) = prior_report {
            source.push(' ');
            source.push_str(report);
        }
        Self {
            name: name.to_string(),
            terms: extract_key_terms(&source),
        }
    }

    fn score(&self, topic: &str) -> usize {
        term_hits(topic, &self.terms)
    }
}

/// Pick up to `k` profiles for `topic`.
///
/// Names in `preferred` come first, then descending key-term overlap; ties
/// keep the order of `candidates`.
pub(crate) fn select_relevant(
    candidates: &[&ParticipantProfile],
    topic: &str,
    preferred: &[String],
    k: usize,
) -> Vec<String> {
    let mut scored: Vec<(bool, usize, &ParticipantProfile)> = candidates
        .iter()
        .map(|p| {
            let is_preferred = preferred.iter().any(|n| n.eq_ignore_ascii_case(&p.name));
            (is_preferred, p.score(topic), *p)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    scored
        .into_iter()
        .take(k)
        .map(|(_, _, p)| p.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Vec<ParticipantProfile> {
        vec![
            ParticipantProfile::new("finance", &["budget".to_string(), "revenue".to_string()], None),
            ParticipantProfile::new("legal", &["regulation".to_string(), "compliance".to_string()], None),
            ParticipantProfile::new(
                "operations",
                &[],
                Some("Supply chain and logistics capacity are the binding constraint."),
            ),
        ]
    }

    #[test]
    fn test_overlap_ranks_candidates() {
        let p = profiles();
        let refs: Vec<&ParticipantProfile> = p.iter().collect();
        let picked = select_relevant(&refs, "New regulation raises compliance costs", &[], 2);
        assert_eq!(picked[0], "legal");
        let picked = select_relevant(&refs, "Logistics partner fails; supply halts", &[], 1);
        assert_eq!(picked, vec!["operations".to_string()]);
    }

    #[test]
    fn test_preferred_first_and_stable_ties() {
        let p = profiles();
        let refs: Vec<&ParticipantProfile> = p.iter().collect();
        let picked = select_relevant(&refs, "weather", &["Operations".to_string()], 3);
        assert_eq!(picked, vec!["operations", "finance", "legal"]);
    }
}
