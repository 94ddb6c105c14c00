//! Typed, never-failing access to the persisted progress layout.
//!
//! Reads treat missing, unreadable and malformed entries alike as absent.
//! Writes are best-effort: a failure is logged and reported as `false`, and
//! the caller's in-memory state stays authoritative. A malformed entry is
//! left in place until the next successful write replaces it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use tutorial_core::model::{
    OsPreference, PhaseKey, Preferences, ProgressRecord, StepKey, ThemePreference,
};

use crate::keys::StorageKey;
use crate::repository::{StateStore, StorageError};

#[derive(Clone)]
pub struct ProgressStore {
    inner: Arc<dyn StateStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(inner: Arc<dyn StateStore>) -> Self {
        Self { inner }
    }

    /// Load and decode a JSON entry. Never fails.
    pub async fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.load_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, error = %err, "discarding malformed persisted entry");
                None
            }
        }
    }

    /// Encode and store a JSON entry. Returns whether the write landed.
    pub async fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to encode persisted entry");
                return false;
            }
        };
        self.save_raw(key, &encoded).await
    }

    /// Remove an entry. Returns whether the removal landed.
    pub async fn clear(&self, key: StorageKey) -> bool {
        match self.inner.remove(key.as_str()).await {
            Ok(()) => true,
            Err(err) => {
                log_write_failure(key, &err);
                false
            }
        }
    }

    /// Both completed-key sets; duplicates collapse, bad entries read as empty.
    pub async fn load_record(&self) -> ProgressRecord {
        let steps: Vec<StepKey> = self
            .load(StorageKey::CompletedSteps)
            .await
            .unwrap_or_default();
        let phases: Vec<PhaseKey> = self
            .load(StorageKey::CompletedPhases)
            .await
            .unwrap_or_default();
        ProgressRecord {
            completed_steps: steps.into_iter().collect(),
            completed_phases: phases.into_iter().collect(),
        }
    }

    pub async fn save_completed_steps(&self, steps: &BTreeSet<StepKey>) -> bool {
        self.save(StorageKey::CompletedSteps, steps).await
    }

    pub async fn save_completed_phases(&self, phases: &BTreeSet<PhaseKey>) -> bool {
        self.save(StorageKey::CompletedPhases, phases).await
    }

    /// Stored display preferences; unknown tokens fall back to defaults.
    pub async fn load_preferences(&self) -> Preferences {
        let defaults = Preferences::default();
        let os = self
            .load_token(StorageKey::Os)
            .await
            .and_then(|token| token.parse::<OsPreference>().ok())
            .unwrap_or(defaults.os);
        let theme = self
            .load_token(StorageKey::Theme)
            .await
            .and_then(|token| token.parse::<ThemePreference>().ok())
            .unwrap_or(defaults.theme);
        Preferences { os, theme }
    }

    pub async fn save_os(&self, os: OsPreference) -> bool {
        self.save_raw(StorageKey::Os, os.token()).await
    }

    pub async fn save_theme(&self, theme: ThemePreference) -> bool {
        self.save_raw(StorageKey::Theme, theme.token()).await
    }

    /// Whether a theme was ever chosen explicitly.
    pub async fn has_theme(&self) -> bool {
        self.load_token(StorageKey::Theme)
            .await
            .is_some_and(|token| token.parse::<ThemePreference>().is_ok())
    }

    async fn load_token(&self, key: StorageKey) -> Option<String> {
        self.load_raw(key).await.map(|raw| raw.trim().to_owned())
    }

    async fn load_raw(&self, key: StorageKey) -> Option<String> {
        match self.inner.get(key.as_str()).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read persisted entry");
                None
            }
        }
    }

    async fn save_raw(&self, key: StorageKey, value: &str) -> bool {
        match self.inner.put(key.as_str(), value).await {
            Ok(()) => {
                debug!(key = %key, bytes = value.len(), "persisted entry");
                true
            }
            Err(err) => {
                log_write_failure(key, &err);
                false
            }
        }
    }
}

fn log_write_failure(key: StorageKey, err: &StorageError) {
    warn!(key = %key, error = %err, "persistence failed; keeping in-memory state");
}
