//! Progress counts and percentages for the status banner.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::hypothesis::{Category, Hypothesis, HypothesisKind, Outcome, Status};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupProgress {
    pub total: usize,
    pub validated: usize,
    pub invalidated: usize,
    pub decided: usize,
}

impl GroupProgress {
    fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Validated => self.validated += 1,
            Outcome::Invalidated => self.invalidated += 1,
            _ => {}
        }
        if outcome.is_decided() {
            self.decided += 1;
        }
    }

    pub fn decided_pct(&self) -> u8 {
        percent(self.decided, self.total)
    }

    pub fn validated_pct(&self) -> u8 {
        percent(self.validated, self.total)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub by_outcome: BTreeMap<&'static str, usize>,
    pub by_status: BTreeMap<&'static str, usize>,
    pub kill_criteria: GroupProgress,
    pub weighted: GroupProgress,
    pub by_category: BTreeMap<&'static str, GroupProgress>,
    pub decided_pct: u8,
    pub validated_pct: u8,
}

impl ValidationSummary {
    pub fn from_hypotheses(hypotheses: &[Hypothesis]) -> Self {
        let mut by_outcome: BTreeMap<&'static str, usize> =
            Outcome::ALL.iter().map(|o| (o.as_str(), 0)).collect();
        let mut by_status: BTreeMap<&'static str, usize> =
            Status::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        let mut by_category: BTreeMap<&'static str, GroupProgress> = Category::ALL
            .iter()
            .map(|c| (c.as_str(), GroupProgress::default()))
            .collect();
        let mut overall = GroupProgress::default();
        let mut kill_criteria = GroupProgress::default();
        let mut weighted = GroupProgress::default();

        for h in hypotheses {
            *by_outcome.entry(h.outcome.as_str()).or_default() += 1;
            *by_status.entry(h.status.as_str()).or_default() += 1;
            by_category
                .entry(h.category.as_str())
                .or_default()
                .record(h.outcome);
            overall.record(h.outcome);
            match h.kind {
                HypothesisKind::KillCriteria => kill_criteria.record(h.outcome),
                HypothesisKind::Weighted => weighted.record(h.outcome),
            }
        }

        Self {
            total: overall.total,
            by_outcome,
            by_status,
            kill_criteria,
            weighted,
            by_category,
            decided_pct: overall.decided_pct(),
            validated_pct: overall.validated_pct(),
        }
    }
}

/// Whole percent, rounded half up; 0 for an empty group.
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (part.min(total) * 200 + total) / (total * 2);
    pct as u8
}
