//! Go/No-Go verdict derived from hypothesis outcomes.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. any kill criterion invalidated -> `NO_GO`
//! 2. every hypothesis validated -> `GO`
//! 3. every kill criterion validated -> `CONDITIONAL_NO_GO` if a weighted
//!    hypothesis is invalidated, otherwise `CONDITIONAL_GO`
//! 4. some kill criterion validated, none invalidated -> `CONDITIONAL_PHASED_GO`
//! 5. otherwise `PENDING_VALIDATION`
//!
//! An empty kill-criteria set never satisfies rule 3.

use serde::{Deserialize, Serialize};

use crate::hypothesis::{Hypothesis, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Go,
    NoGo,
    ConditionalGo,
    ConditionalNoGo,
    ConditionalPhasedGo,
    PendingValidation,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Go => "GO",
            Self::NoGo => "NO_GO",
            Self::ConditionalGo => "CONDITIONAL_GO",
            Self::ConditionalNoGo => "CONDITIONAL_NO_GO",
            Self::ConditionalPhasedGo => "CONDITIONAL_PHASED_GO",
            Self::PendingValidation => "PENDING_VALIDATION",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Go => "all validation criteria passed",
            Self::NoGo => "kill criteria failed",
            Self::ConditionalGo => "all kill criteria passed; weighted hypotheses still open",
            Self::ConditionalNoGo => "all kill criteria passed but weighted hypotheses failed",
            Self::ConditionalPhasedGo => {
                "some kill criteria validated and none failed; proceed in phases"
            }
            Self::PendingValidation => "validation in progress",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict plus the hypothesis ids that drove it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictReport {
    pub verdict: Verdict,
    pub reason: String,
    pub failed_kill_criteria: Vec<String>,
    pub failed_weighted: Vec<String>,
    pub open_kill_criteria: Vec<String>,
}

/// Pure and total: every collection maps to exactly one verdict.
pub fn evaluate(hypotheses: &[Hypothesis]) -> VerdictReport {
    let (kill, weighted): (Vec<&Hypothesis>, Vec<&Hypothesis>) =
        hypotheses.iter().partition(|h| h.is_kill_criterion());

    let ids_with = |set: &[&Hypothesis], outcome: Outcome| -> Vec<String> {
        set.iter()
            .filter(|h| h.outcome == outcome)
            .map(|h| h.id.clone())
            .collect()
    };

    let failed_kill_criteria = ids_with(&kill, Outcome::Invalidated);
    let failed_weighted = ids_with(&weighted, Outcome::Invalidated);
    let open_kill_criteria: Vec<String> = kill
        .iter()
        .filter(|h| h.outcome != Outcome::Validated)
        .map(|h| h.id.clone())
        .collect();

    let all_validated = hypotheses.iter().all(|h| h.outcome == Outcome::Validated);
    let kill_all_validated = !kill.is_empty() && open_kill_criteria.is_empty();
    let kill_any_validated = kill.iter().any(|h| h.outcome == Outcome::Validated);

    let verdict = if !failed_kill_criteria.is_empty() {
        Verdict::NoGo
    } else if all_validated {
        Verdict::Go
    } else if kill_all_validated {
        if failed_weighted.is_empty() {
            Verdict::ConditionalGo
        } else {
            Verdict::ConditionalNoGo
        }
    } else if kill_any_validated {
        Verdict::ConditionalPhasedGo
    } else {
        Verdict::PendingValidation
    };

    VerdictReport {
        verdict,
        reason: verdict.reason().to_string(),
        failed_kill_criteria,
        failed_weighted,
        open_kill_criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::{Category, HypothesisKind, Status};

    fn h(id: &str, kind: HypothesisKind, outcome: Outcome) -> Hypothesis {
        Hypothesis {
            id: id.into(),
            category: Category::Market,
            kind,
            title: String::new(),
            description: String::new(),
            success_criteria: String::new(),
            status: Status::NotStarted,
            outcome,
            owner: String::new(),
            due_date: None,
            notes: String::new(),
            last_modified: None,
        }
    }

    fn collection(kill: &[Outcome], weighted: &[Outcome]) -> Vec<Hypothesis> {
        let mut out = Vec::new();
        for (i, o) in kill.iter().enumerate() {
            out.push(h(&format!("K{}", i + 1), HypothesisKind::KillCriteria, *o));
        }
        for (i, o) in weighted.iter().enumerate() {
            out.push(h(&format!("W{}", i + 1), HypothesisKind::Weighted, *o));
        }
        out
    }

    use Outcome::*;

    #[test]
    fn kill_failure_wins_over_everything() {
        let c = collection(&[Validated, Invalidated, Validated], &[Validated; 5]);
        let report = evaluate(&c);
        assert_eq!(report.verdict, Verdict::NoGo);
        assert_eq!(report.reason, "kill criteria failed");
        assert_eq!(report.failed_kill_criteria, vec!["K2".to_string()]);
    }

    #[test]
    fn all_validated_is_go() {
        let c = collection(&[Validated; 3], &[Validated; 5]);
        assert_eq!(evaluate(&c).verdict, Verdict::Go);
    }

    #[test]
    fn weighted_failure_after_kills_pass_is_conditional_no_go() {
        let c = collection(
            &[Validated; 3],
            &[Invalidated, Pending, Pending, Pending, Pending],
        );
        let report = evaluate(&c);
        assert_eq!(report.verdict, Verdict::ConditionalNoGo);
        assert_eq!(report.failed_weighted, vec!["W1".to_string()]);
    }

    #[test]
    fn kills_pass_with_open_weighted_is_conditional_go() {
        let c = collection(&[Validated; 3], &[Partial, Inconclusive, Validated]);
        assert_eq!(evaluate(&c).verdict, Verdict::ConditionalGo);
    }

    #[test]
    fn partial_kill_progress_is_phased_go() {
        let c = collection(&[Pending, Validated, Validated], &[Invalidated, Pending]);
        let report = evaluate(&c);
        assert_eq!(report.verdict, Verdict::ConditionalPhasedGo);
        assert_eq!(report.open_kill_criteria, vec!["K1".to_string()]);
    }

    #[test]
    fn all_pending_is_pending_validation() {
        let c = collection(&[Pending; 3], &[Pending; 5]);
        assert_eq!(evaluate(&c).verdict, Verdict::PendingValidation);
    }

    #[test]
    fn partial_and_inconclusive_kills_do_not_count() {
        let c = collection(&[Partial, Inconclusive], &[Validated]);
        assert_eq!(evaluate(&c).verdict, Verdict::PendingValidation);
    }

    #[test]
    fn empty_kill_set_never_reaches_conditional_rules() {
        let c = collection(&[], &[Validated, Invalidated]);
        assert_eq!(evaluate(&c).verdict, Verdict::PendingValidation);

        let c = collection(&[], &[Validated, Validated]);
        assert_eq!(evaluate(&c).verdict, Verdict::Go);
    }

    #[test]
    fn labels_serialize_screaming_snake() {
        let json = serde_json::to_string(&Verdict::ConditionalPhasedGo).unwrap();
        assert_eq!(json, "\"CONDITIONAL_PHASED_GO\"");
        assert_eq!(Verdict::NoGo.to_string(), "NO_GO");
    }
}
