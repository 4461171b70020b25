//! Authoritative in-memory hypothesis collection.
//!
//! Mutations here are pure; persisting is a separate [`HypothesisStore::save`]
//! step the owner runs after every `update`/`reset`.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::hypothesis::{Hypothesis, HypothesisPatch};
use crate::storage::{HYPOTHESES_KEY, StateStorage, VERSION_KEY};
use crate::summary::ValidationSummary;
use crate::template;
use crate::verdict::{self, VerdictReport};

/// Why the template was used instead of persisted state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    Missing,
    VersionMismatch { found: Option<String> },
    Malformed(String),
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Seeded(SeedReason),
}

impl LoadSource {
    pub fn is_seeded(&self) -> bool {
        matches!(self, LoadSource::Seeded(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisStore {
    hypotheses: Vec<Hypothesis>,
}

impl Default for HypothesisStore {
    fn default() -> Self {
        Self::from_template()
    }
}

impl HypothesisStore {
    pub fn from_template() -> Self {
        Self {
            hypotheses: template::template(),
        }
    }

    /// Load persisted state when present, version-matched and well-formed;
    /// otherwise seed from the template. Never merges the two.
    pub fn initialize(storage: &dyn StateStorage, state_version: &str) -> (Self, LoadSource) {
        match Self::load_persisted(storage, state_version) {
            Ok(hypotheses) => {
                tracing::info!("loaded {} persisted hypotheses", hypotheses.len());
                (Self { hypotheses }, LoadSource::Persisted)
            }
            Err(reason) => {
                match &reason {
                    SeedReason::Missing => {
                        tracing::info!("no persisted hypotheses, seeding template")
                    }
                    SeedReason::VersionMismatch { found } => tracing::warn!(
                        "state version {:?} does not match {}, reseeding template",
                        found,
                        state_version
                    ),
                    SeedReason::Malformed(msg) | SeedReason::Unreadable(msg) => {
                        tracing::warn!("discarding persisted hypotheses: {}", msg)
                    }
                }
                (Self::from_template(), LoadSource::Seeded(reason))
            }
        }
    }

    fn load_persisted(
        storage: &dyn StateStorage,
        state_version: &str,
    ) -> std::result::Result<Vec<Hypothesis>, SeedReason> {
        let stored_version = storage
            .get(VERSION_KEY)
            .map_err(|e| SeedReason::Unreadable(e.to_string()))?;
        let raw = storage
            .get(HYPOTHESES_KEY)
            .map_err(|e| SeedReason::Unreadable(e.to_string()))?;

        let Some(raw) = raw else {
            return Err(SeedReason::Missing);
        };
        if stored_version.as_deref().map(str::trim) != Some(state_version) {
            return Err(SeedReason::VersionMismatch {
                found: stored_version,
            });
        }

        let hypotheses: Vec<Hypothesis> =
            serde_json::from_str(&raw).map_err(|e| SeedReason::Malformed(e.to_string()))?;

        // Membership is fixed: same ids, same order as the template.
        let seeds = template::template();
        let same_members = hypotheses.len() == seeds.len()
            && hypotheses.iter().zip(&seeds).all(|(h, t)| h.id == t.id);
        if !same_members {
            return Err(SeedReason::Malformed(
                "persisted ids do not match the hypothesis template".to_string(),
            ));
        }
        // Type and category are template-owned; the verdict depends on them.
        if let Some((h, _)) = hypotheses
            .iter()
            .zip(&seeds)
            .find(|(h, t)| h.kind != t.kind || h.category != t.category)
        {
            return Err(SeedReason::Malformed(format!(
                "persisted hypothesis {} changed its type or category",
                h.id
            )));
        }
        Ok(hypotheses)
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    pub fn get(&self, id: &str) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.id == id)
    }

    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    /// Apply `patch` to the hypothesis `id`. Unknown ids are a logged no-op.
    /// Returns whether a record was found and stamped.
    pub fn update(&mut self, id: &str, patch: &HypothesisPatch) -> bool {
        self.update_at(id, patch, Utc::now())
    }

    pub fn update_at(&mut self, id: &str, patch: &HypothesisPatch, now: DateTime<Utc>) -> bool {
        let Some(hypothesis) = self.hypotheses.iter_mut().find(|h| h.id == id) else {
            tracing::warn!("update ignored: unknown hypothesis id '{}'", id);
            return false;
        };
        let changed = hypothesis.apply(patch);
        hypothesis.last_modified = Some(now);
        tracing::debug!("updated hypothesis {} (changed={})", id, changed);
        true
    }

    /// Restore every record to its template values.
    pub fn reset(&mut self) {
        self.hypotheses = template::template();
        tracing::info!("hypotheses reset to template");
    }

    /// Serialize the full collection plus the version marker.
    pub fn save(&self, storage: &mut dyn StateStorage, state_version: &str) -> Result<()> {
        let json = serde_json::to_string(&self.hypotheses)?;
        storage.set(HYPOTHESES_KEY, &json)?;
        storage.set(VERSION_KEY, state_version)?;
        Ok(())
    }

    pub fn verdict(&self) -> VerdictReport {
        verdict::evaluate(&self.hypotheses)
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary::from_hypotheses(&self.hypotheses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::{HypothesisKind, Outcome, Status};
    use crate::storage::MemoryStorage;

    const V: &str = "1";

    #[test]
    fn update_unknown_id_is_noop() {
        let mut store = HypothesisStore::from_template();
        let before = store.clone();
        assert!(!store.update("nope", &HypothesisPatch::default().outcome(Outcome::Validated)));
        assert_eq!(store, before);
    }

    #[test]
    fn update_stamps_last_modified() {
        let mut store = HypothesisStore::from_template();
        let now = Utc::now();
        let patch = HypothesisPatch::default()
            .status(Status::InProgress)
            .owner("  dana ");
        assert!(store.update_at("H2", &patch, now));

        let h = store.get("H2").unwrap();
        assert_eq!(h.status, Status::InProgress);
        assert_eq!(h.owner, "dana");
        assert_eq!(h.last_modified, Some(now));
        assert!(store.get("H1").unwrap().last_modified.is_none());
    }

    #[test]
    fn reset_restores_template() {
        let mut store = HypothesisStore::from_template();
        store.update("H1", &HypothesisPatch::default().outcome(Outcome::Invalidated).notes("x"));
        store.reset();
        assert_eq!(store.hypotheses(), template::template().as_slice());
    }

    #[test]
    fn initialize_prefers_persisted_state() {
        let mut storage = MemoryStorage::new();
        let mut store = HypothesisStore::from_template();
        store.update("H3", &HypothesisPatch::default().outcome(Outcome::Validated));
        store.save(&mut storage, V).unwrap();

        let (loaded, source) = HypothesisStore::initialize(&storage, V);
        assert_eq!(source, LoadSource::Persisted);
        assert_eq!(loaded.get("H3").unwrap().outcome, Outcome::Validated);
    }

    #[test]
    fn initialize_reseeds_on_garbage() {
        let mut storage = MemoryStorage::new();
        storage.set(VERSION_KEY, V).unwrap();
        storage.set(HYPOTHESES_KEY, "{not json").unwrap();

        let (loaded, source) = HypothesisStore::initialize(&storage, V);
        assert!(matches!(source, LoadSource::Seeded(SeedReason::Malformed(_))));
        assert_eq!(loaded, HypothesisStore::from_template());
    }

    #[test]
    fn initialize_reseeds_on_foreign_membership() {
        let mut storage = MemoryStorage::new();
        let mut hs = template::template();
        hs.pop();
        storage.set(VERSION_KEY, V).unwrap();
        storage
            .set(HYPOTHESES_KEY, &serde_json::to_string(&hs).unwrap())
            .unwrap();

        let (_, source) = HypothesisStore::initialize(&storage, V);
        assert!(matches!(source, LoadSource::Seeded(SeedReason::Malformed(_))));
    }

    #[test]
    fn initialize_reseeds_when_kill_criterion_is_retyped() {
        let mut storage = MemoryStorage::new();
        let mut hs = template::template();
        hs[0].kind = HypothesisKind::Weighted;
        hs[0].outcome = Outcome::Invalidated;
        storage.set(VERSION_KEY, V).unwrap();
        storage
            .set(HYPOTHESES_KEY, &serde_json::to_string(&hs).unwrap())
            .unwrap();

        let (loaded, source) = HypothesisStore::initialize(&storage, V);
        assert!(matches!(source, LoadSource::Seeded(SeedReason::Malformed(_))));
        assert!(loaded.get("H1").unwrap().is_kill_criterion());
        assert_eq!(loaded.get("H1").unwrap().outcome, Outcome::Pending);
    }

    #[test]
    fn initialize_reseeds_on_version_mismatch() {
        let mut storage = MemoryStorage::new();
        let mut store = HypothesisStore::from_template();
        store.update("H1", &HypothesisPatch::default().outcome(Outcome::Validated));
        store.save(&mut storage, "0").unwrap();

        let (loaded, source) = HypothesisStore::initialize(&storage, V);
        assert_eq!(
            source,
            LoadSource::Seeded(SeedReason::VersionMismatch {
                found: Some("0".to_string())
            })
        );
        assert_eq!(loaded.get("H1").unwrap().outcome, Outcome::Pending);
    }
}
