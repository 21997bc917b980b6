//! Persisted storage for the canonical accessibility record.
//!
//! The store holds the whole record under one key; writes are
//! read-modify-write of the full object with last-write-wins semantics.
//! Everything here is a cache of the coordinator's in-memory copy, never
//! the other way around.

use async_trait::async_trait;
use clarify_core::types::AccessibilityState;
use clarify_core::ClarifyResult;

pub mod file;
pub mod memory;
pub mod throttle;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use throttle::ThrottledStore;

/// Durable key-value backing for the accessibility record.
///
/// `load` returns `None` when nothing was ever persisted; callers merge the
/// record over defaults either way. `save` replaces the whole record.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> ClarifyResult<Option<AccessibilityState>>;
    async fn save(&self, state: &AccessibilityState) -> ClarifyResult<()>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn load(&self) -> ClarifyResult<Option<AccessibilityState>> {
        (**self).load().await
    }

    async fn save(&self, state: &AccessibilityState) -> ClarifyResult<()> {
        (**self).save(state).await
    }
}
