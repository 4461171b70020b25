//! Recommendation requests against an in-process advisor

use std::sync::Mutex;

use async_trait::async_trait;
use memo_board::clients::{Advisor, AdvisorError, AdvisorReply, AdvisorRequest};
use memo_board::storage::{FileStorage, MemoryStorage};
use memo_board::{Dashboard, HypothesisPatch, MemoBoardError, Outcome, Verdict};

#[derive(Default)]
struct ScriptedAdvisor {
    seen: Mutex<Vec<AdvisorRequest>>,
    fail: bool,
}

#[async_trait]
impl Advisor for ScriptedAdvisor {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &AdvisorRequest) -> Result<AdvisorReply, AdvisorError> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(AdvisorError::RateLimited("HTTP 429".into()));
        }
        Ok(AdvisorReply {
            text: "Validate H2 next; pilots look promising.".into(),
            provider: "scripted".into(),
            model: "scripted-1".into(),
        })
    }
}

#[tokio::test]
async fn fresh_recommendation_is_not_stale() {
    let mut dash = Dashboard::open(Box::new(MemoryStorage::new()), "1").unwrap();
    let advisor = ScriptedAdvisor::default();

    let rec = dash.prepare_recommendation().send(&advisor).await.unwrap();
    assert_eq!(rec.verdict, Verdict::PendingValidation);
    dash.store_recommendation(rec).unwrap();

    assert_eq!(dash.recommendation_is_stale(), Some(false));
    let seen = advisor.seen.lock().unwrap();
    assert!(seen[0].system.contains("[H15]"));
    assert!(seen[0].system.contains("Financial projections"));
}

#[tokio::test]
async fn edits_during_flight_mark_reply_stale() {
    let mut dash = Dashboard::open(Box::new(MemoryStorage::new()), "1").unwrap();
    let advisor = ScriptedAdvisor::default();

    let request = dash.prepare_recommendation();
    dash.update("H3", &HypothesisPatch::default().outcome(Outcome::Validated))
        .unwrap();
    let rec = request.send(&advisor).await.unwrap();

    // Verdict reflects the state at request time, not the edit.
    assert_eq!(rec.verdict, Verdict::PendingValidation);
    dash.store_recommendation(rec).unwrap();
    assert_eq!(dash.recommendation_is_stale(), Some(true));
    assert_eq!(dash.verdict().verdict, Verdict::ConditionalPhasedGo);
}

#[tokio::test]
async fn notes_only_edit_does_not_stale() {
    let mut dash = Dashboard::open(Box::new(MemoryStorage::new()), "1").unwrap();
    let rec = dash
        .prepare_recommendation()
        .send(&ScriptedAdvisor::default())
        .await
        .unwrap();
    dash.store_recommendation(rec).unwrap();

    dash.update("H1", &HypothesisPatch::default().notes("call back Tuesday"))
        .unwrap();
    assert_eq!(dash.recommendation_is_stale(), Some(false));
}

#[tokio::test]
async fn advisor_failure_keeps_verdict_available() {
    let mut dash = Dashboard::open(Box::new(MemoryStorage::new()), "1").unwrap();
    dash.update("H5", &HypothesisPatch::default().outcome(Outcome::Invalidated))
        .unwrap();

    let advisor = ScriptedAdvisor {
        fail: true,
        ..Default::default()
    };
    let err = dash
        .prepare_recommendation()
        .send(&advisor)
        .await
        .unwrap_err();
    assert!(matches!(err, MemoBoardError::Provider { .. }));
    assert!(err.is_advisor_failure());
    assert!(dash.recommendation().is_none());
    assert_eq!(dash.verdict().verdict, Verdict::NoGo);
}

#[tokio::test]
async fn recommendation_persists_and_reset_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    {
        let storage = FileStorage::open(dir.path()).unwrap();
        let mut dash = Dashboard::open(Box::new(storage), "1").unwrap();
        let rec = dash
            .prepare_recommendation()
            .send(&ScriptedAdvisor::default())
            .await
            .unwrap();
        dash.store_recommendation(rec).unwrap();
    }

    let storage = FileStorage::open(dir.path()).unwrap();
    let mut dash = Dashboard::open(Box::new(storage), "1").unwrap();
    let rec = dash.recommendation().expect("recommendation reloaded");
    assert_eq!(rec.text, "Validate H2 next; pilots look promising.");
    assert_eq!(rec.model, "scripted-1");

    dash.reset().unwrap();
    assert!(dash.recommendation().is_none());
    assert!(!dir.path().join("recommendation.json").exists());
}
