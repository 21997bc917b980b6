//! JSON file store.
//!
//! One pretty-printed JSON document holding the entire record, like the
//! rest of the product persists its settings. An unreadable or corrupt file
//! is treated the same as an absent one so the coordinator can always start
//! from defaults.

use async_trait::async_trait;
use clarify_core::types::AccessibilityState;
use clarify_core::{ClarifyError, ClarifyResult};
use std::path::{Path, PathBuf};

use crate::StateStore;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional location under a data directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("accessibility_state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> ClarifyResult<Option<AccessibilityState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                log::warn!("Invalid accessibility record, starting fresh: {}", err);
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &AccessibilityState) -> ClarifyResult<()> {
        let data = serde_json::to_string_pretty(state).map_err(|e| {
            ClarifyError::storage(format!("Failed to serialize accessibility record: {}", e))
        })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarify_core::types::Feature;

    #[tokio::test]
    async fn test_absent_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        let mut state = AccessibilityState::default();
        state.toggle(Feature::TextScaling, true);
        state.set_text_scaling_value(140);
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_keys_survive_storage() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        std::fs::write(
            store.path(),
            r#"{"highContrast":true,"focusHighlight":{"enabled":true}}"#,
        )
        .unwrap();

        let mut state = store.load().await.unwrap().unwrap();
        state.toggle(Feature::DyslexiaFont, true);
        store.save(&state).await.unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("focusHighlight"));
    }
}
