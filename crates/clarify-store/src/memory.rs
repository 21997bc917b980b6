//! In-memory store for tests and ephemeral sessions.

use async_trait::async_trait;
use clarify_core::types::AccessibilityState;
use clarify_core::{ClarifyError, ClarifyResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::StateStore;

/// Volatile whole-record store.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<AccessibilityState>>,
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the record, as if a previous session had persisted it.
    pub fn with_record(state: AccessibilityState) -> Self {
        Self {
            record: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// How many writes have landed.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail, for error-path tests.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> ClarifyResult<Option<AccessibilityState>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, state: &AccessibilityState) -> ClarifyResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClarifyError::storage("write rejected"));
        }
        *self.record.lock().await = Some(state.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarify_core::types::Feature;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        let mut state = AccessibilityState::default();
        state.toggle(Feature::HighContrast, true);
        store.save(&state).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(state));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = store.save(&AccessibilityState::default()).await;
        assert!(err.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
