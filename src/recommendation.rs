//! LLM-backed recommendation layered on top of the deterministic verdict.
//!
//! A request captures a snapshot of hypothesis states when it is prepared.
//! The reply may land after further edits; it is kept as-is and flagged stale
//! by comparing that snapshot to the live collection.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clients::{Advisor, AdvisorRequest, ChatMessage};
use crate::error::Result;
use crate::hypothesis::{Hypothesis, Outcome, Status};
use crate::memo::InvestmentMemo;
use crate::verdict::{self, Verdict, VerdictReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub status: Status,
    pub outcome: Outcome,
}

/// id -> (status, outcome) at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot(pub BTreeMap<String, SnapshotEntry>);

impl StateSnapshot {
    pub fn capture(hypotheses: &[Hypothesis]) -> Self {
        Self(
            hypotheses
                .iter()
                .map(|h| {
                    (
                        h.id.clone(),
                        SnapshotEntry {
                            status: h.status,
                            outcome: h.outcome,
                        },
                    )
                })
                .collect(),
        )
    }

    /// Ids whose status or outcome differ from `hypotheses`.
    pub fn changed_ids(&self, hypotheses: &[Hypothesis]) -> Vec<String> {
        let current = Self::capture(hypotheses);
        let mut changed: Vec<String> = current
            .0
            .iter()
            .filter(|(id, entry)| self.0.get(*id) != Some(*entry))
            .map(|(id, _)| id.clone())
            .collect();
        changed.extend(
            self.0
                .keys()
                .filter(|id| !current.0.contains_key(*id))
                .cloned(),
        );
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub text: String,
    pub verdict: Verdict,
    pub snapshot: StateSnapshot,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn is_stale(&self, hypotheses: &[Hypothesis]) -> bool {
        !self.snapshot.changed_ids(hypotheses).is_empty()
    }
}

/// Hypotheses as descriptive text for the model.
pub fn describe_hypotheses(hypotheses: &[Hypothesis]) -> String {
    let mut out = String::new();
    for h in hypotheses {
        let _ = writeln!(
            out,
            "- [{}] {} ({}, {}) status={} outcome={}",
            h.id,
            h.title,
            h.kind.as_str(),
            h.category.as_str(),
            h.status,
            h.outcome
        );
        let _ = writeln!(out, "  criteria: {}", h.success_criteria);
        if !h.owner.is_empty() {
            let _ = writeln!(out, "  owner: {}", h.owner);
        }
        if let Some(due) = h.due_date {
            let _ = writeln!(out, "  due: {}", due);
        }
        if !h.notes.trim().is_empty() {
            let _ = writeln!(out, "  notes: {}", h.notes.trim());
        }
    }
    out
}

/// System context shared by recommendations and chat: memo, hypotheses, verdict.
pub fn dataset_context(
    memo: &InvestmentMemo,
    hypotheses: &[Hypothesis],
    report: &VerdictReport,
) -> String {
    let mut out = String::from(
        "You are an investment analyst reviewing the memo below. Answer using only this data; \
         say so when the data does not cover a question.\n\n",
    );
    out.push_str(&memo.to_context_text());
    let _ = writeln!(out, "\n## Validation hypotheses");
    out.push_str(&describe_hypotheses(hypotheses));
    let _ = writeln!(
        out,
        "\n## Deterministic verdict\n{} ({})",
        report.verdict, report.reason
    );
    out
}

const RECOMMENDATION_PROMPT: &str = "Given the current hypothesis validation state, write a short \
recommendation for the investment committee: the key open risks, which hypotheses to validate \
next and why, and whether you agree with the deterministic verdict. Keep it under 250 words.";

/// A prepared recommendation request owning its snapshot; edits made while
/// it is in flight do not affect it.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    snapshot: StateSnapshot,
    verdict: Verdict,
    request: AdvisorRequest,
}

impl RecommendationRequest {
    pub fn prepare(memo: &InvestmentMemo, hypotheses: &[Hypothesis]) -> Self {
        let report = verdict::evaluate(hypotheses);
        Self {
            snapshot: StateSnapshot::capture(hypotheses),
            verdict: report.verdict,
            request: AdvisorRequest {
                system: dataset_context(memo, hypotheses, &report),
                messages: vec![ChatMessage::user(RECOMMENDATION_PROMPT)],
            },
        }
    }

    pub fn advisor_request(&self) -> &AdvisorRequest {
        &self.request
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }

    pub async fn send(self, advisor: &dyn Advisor) -> Result<Recommendation> {
        let reply = advisor.complete(&self.request).await.map_err(|e| {
            tracing::warn!(provider = advisor.provider(), "recommendation request failed: {}", e);
            e
        })?;
        tracing::info!(provider = %reply.provider, model = %reply.model, "recommendation received");
        Ok(Recommendation {
            id: Uuid::new_v4(),
            text: reply.text,
            verdict: self.verdict,
            snapshot: self.snapshot,
            provider: reply.provider,
            model: reply.model,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::investment_memo;
    use crate::template::template;

    #[test]
    fn snapshot_detects_outcome_and_status_changes() {
        let mut hs = template();
        let snap = StateSnapshot::capture(&hs);
        assert!(snap.changed_ids(&hs).is_empty());

        hs[1].notes = "notes do not matter".into();
        assert!(snap.changed_ids(&hs).is_empty());

        hs[1].outcome = Outcome::Validated;
        hs[4].status = Status::Blocked;
        assert_eq!(snap.changed_ids(&hs), vec!["H2".to_string(), "H5".to_string()]);
    }

    #[test]
    fn description_includes_annotations() {
        let mut hs = template();
        hs[0].owner = "dana".into();
        hs[0].notes = "  interviews booked ".into();
        let text = describe_hypotheses(&hs[..1]);
        assert!(text.contains("[H1]"));
        assert!(text.contains("kill_criteria"));
        assert!(text.contains("owner: dana"));
        assert!(text.contains("notes: interviews booked"));
        assert!(!text.contains("due:"));
    }

    #[test]
    fn prepared_request_carries_dataset_and_verdict() {
        let hs = template();
        let req = RecommendationRequest::prepare(investment_memo(), &hs);
        let system = &req.advisor_request().system;
        assert!(system.contains("Northwind Sensorics"));
        assert!(system.contains("PENDING_VALIDATION"));
        assert_eq!(req.snapshot().0.len(), hs.len());
        assert_eq!(req.advisor_request().messages.len(), 1);
    }
}
