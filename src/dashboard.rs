//! Application root: owns the hypothesis store, the state storage handle and
//! the last recommendation. Every mutation is followed by an explicit save.

use crate::error::Result;
use crate::hypothesis::{Hypothesis, HypothesisPatch};
use crate::memo::{InvestmentMemo, investment_memo};
use crate::recommendation::{Recommendation, RecommendationRequest};
use crate::storage::{RECOMMENDATION_KEY, StateStorage};
use crate::store::{HypothesisStore, LoadSource};
use crate::summary::ValidationSummary;
use crate::verdict::VerdictReport;

pub struct Dashboard {
    store: HypothesisStore,
    storage: Box<dyn StateStorage>,
    state_version: String,
    recommendation: Option<Recommendation>,
    load_source: LoadSource,
}

impl Dashboard {
    /// Initialize from storage. A reseed also discards any stored
    /// recommendation and writes the fresh template with the current marker.
    /// Write failures during the reseed are logged; the template still loads.
    pub fn open(storage: Box<dyn StateStorage>, state_version: impl Into<String>) -> Result<Self> {
        let state_version = state_version.into();
        let (store, load_source) = HypothesisStore::initialize(storage.as_ref(), &state_version);

        let mut dashboard = Self {
            store,
            storage,
            state_version,
            recommendation: None,
            load_source,
        };

        if dashboard.load_source.is_seeded() {
            if let Err(e) = dashboard.storage.remove(RECOMMENDATION_KEY) {
                tracing::warn!("could not clear stored recommendation: {}", e);
            }
            if let Err(e) = dashboard.save() {
                tracing::warn!("could not persist seeded hypotheses: {}", e);
            }
        } else {
            dashboard.recommendation = dashboard.load_recommendation();
        }
        Ok(dashboard)
    }

    fn load_recommendation(&self) -> Option<Recommendation> {
        let raw = match self.storage.get(RECOMMENDATION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("could not read stored recommendation: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(rec) => Some(rec),
            Err(e) => {
                tracing::warn!("discarding malformed stored recommendation: {}", e);
                None
            }
        }
    }

    fn save(&mut self) -> Result<()> {
        self.store.save(self.storage.as_mut(), &self.state_version)
    }

    pub fn load_source(&self) -> &LoadSource {
        &self.load_source
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        self.store.hypotheses()
    }

    pub fn hypothesis(&self, id: &str) -> Option<&Hypothesis> {
        self.store.get(id)
    }

    pub fn memo(&self) -> &'static InvestmentMemo {
        investment_memo()
    }

    pub fn verdict(&self) -> VerdictReport {
        self.store.verdict()
    }

    pub fn summary(&self) -> ValidationSummary {
        self.store.summary()
    }

    /// Apply a field update and persist the full collection. Returns false
    /// (and writes nothing) when `id` is unknown.
    pub fn update(&mut self, id: &str, patch: &HypothesisPatch) -> Result<bool> {
        if !self.store.update(id, patch) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Restore the template, drop the recommendation, persist immediately.
    pub fn reset(&mut self) -> Result<()> {
        self.store.reset();
        self.recommendation = None;
        self.storage.remove(RECOMMENDATION_KEY)?;
        self.save()
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendation.as_ref()
    }

    pub fn recommendation_is_stale(&self) -> Option<bool> {
        self.recommendation
            .as_ref()
            .map(|r| r.is_stale(self.store.hypotheses()))
    }

    /// Snapshot the current state into a request that can be sent later.
    pub fn prepare_recommendation(&self) -> RecommendationRequest {
        RecommendationRequest::prepare(self.memo(), self.store.hypotheses())
    }

    /// Keep a recommendation as delivered, even if edits happened meanwhile.
    pub fn store_recommendation(&mut self, recommendation: Recommendation) -> Result<()> {
        let json = serde_json::to_string(&recommendation)?;
        self.storage.set(RECOMMENDATION_KEY, &json)?;
        if recommendation.is_stale(self.store.hypotheses()) {
            tracing::info!("recommendation {} arrived stale", recommendation.id);
        }
        self.recommendation = Some(recommendation);
        Ok(())
    }
}
