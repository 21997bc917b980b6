//! The browser surface the coordinator drives.
//!
//! Everything the coordinator knows about tabs goes through this trait:
//! enumeration, message delivery to a tab's agent, and agent injection.
//! Delivery is fallible in the ordinary course of business; a missing
//! listener is the expected state of a freshly opened tab.

use async_trait::async_trait;
use clarify_core::protocol::{AgentAck, DeliveryError, EffectMessage};
use clarify_core::types::{TabDescriptor, TabId};
use clarify_core::ClarifyResult;

#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Snapshot of the currently open tabs.
    async fn list_tabs(&self) -> Vec<TabDescriptor>;

    /// Deliver one effect message to the agent in `tab`.
    async fn deliver(&self, tab: TabId, msg: EffectMessage) -> Result<AgentAck, DeliveryError>;

    /// Inject (or re-inject) the agent into `tab`. Idempotent from the
    /// coordinator's point of view; injecting over a live agent replaces it.
    async fn inject_agent(&self, tab: TabId) -> ClarifyResult<()>;
}

#[async_trait]
impl<T: BrowserHost + ?Sized> BrowserHost for std::sync::Arc<T> {
    async fn list_tabs(&self) -> Vec<TabDescriptor> {
        (**self).list_tabs().await
    }

    async fn deliver(&self, tab: TabId, msg: EffectMessage) -> Result<AgentAck, DeliveryError> {
        (**self).deliver(tab, msg).await
    }

    async fn inject_agent(&self, tab: TabId) -> ClarifyResult<()> {
        (**self).inject_agent(tab).await
    }
}
