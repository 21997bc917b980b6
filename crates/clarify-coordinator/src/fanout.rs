//! Tab fan-out: broadcast one effect message to every open tab.
//!
//! Tabs are updated independently with bounded concurrency; there is no
//! ordering between tabs and no atomicity across them. A tab whose agent is
//! missing gets the agent injected and one redelivery after a fixed delay;
//! after that the tab stays unsynced until its next lifecycle event.

use clarify_core::config::CoordinatorConfig;
use clarify_core::protocol::{DeliveryError, EffectMessage};
use clarify_core::types::{TabDescriptor, TabId};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::host::BrowserHost;

/// How delivery to one tab ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The agent acknowledged on the first attempt.
    Delivered,
    /// The agent acknowledged after injection and redelivery.
    DeliveredAfterInject,
    /// The tab is not addressable (browser-internal scheme).
    Skipped,
    /// Delivery failed past the retry; the tab is out of sync.
    Failed(DeliveryError),
}

/// Per-tab result of one fan-out.
#[derive(Debug, Clone)]
pub struct TabDelivery {
    pub tab: TabId,
    pub outcome: DeliveryOutcome,
}

impl TabDelivery {
    pub fn succeeded(&self) -> bool {
        matches!(
            self.outcome,
            DeliveryOutcome::Delivered | DeliveryOutcome::DeliveredAfterInject
        )
    }
}

/// Broadcast `msg` to every open tab. Never fails as a whole; the caller
/// gets one result per tab for logging.
pub async fn fan_out<H: BrowserHost + ?Sized>(
    host: &H,
    config: &CoordinatorConfig,
    msg: &EffectMessage,
) -> Vec<TabDelivery> {
    let tabs = host.list_tabs().await;
    stream::iter(tabs)
        .map(|tab| deliver_to_tab(host, config, tab, msg))
        .buffer_unordered(config.fanout_concurrency.max(1))
        .collect()
        .await
}

/// Deliver one message to one tab, injecting the agent and retrying per the
/// configured policy when no listener is registered.
pub async fn deliver_to_tab<H: BrowserHost + ?Sized>(
    host: &H,
    config: &CoordinatorConfig,
    tab: TabDescriptor,
    msg: &EffectMessage,
) -> TabDelivery {
    if !tab.is_scriptable() {
        debug!(tab = %tab.id, url = %tab.url, "Tab not addressable, skipping");
        return TabDelivery {
            tab: tab.id,
            outcome: DeliveryOutcome::Skipped,
        };
    }

    let mut attempt = 1;
    loop {
        match host.deliver(tab.id, msg.clone()).await {
            Ok(_) => {
                let outcome = if attempt == 1 {
                    DeliveryOutcome::Delivered
                } else {
                    DeliveryOutcome::DeliveredAfterInject
                };
                return TabDelivery {
                    tab: tab.id,
                    outcome,
                };
            }
            Err(DeliveryError::NoListener) if config.delivery.allows_retry(attempt) => {
                debug!(tab = %tab.id, "No agent listening, injecting and retrying");
                if let Err(err) = host.inject_agent(tab.id).await {
                    warn!(tab = %tab.id, error = %err, "Agent injection failed");
                    return TabDelivery {
                        tab: tab.id,
                        outcome: DeliveryOutcome::Failed(DeliveryError::NoListener),
                    };
                }
                attempt += 1;
                // Bridges the race between the injected script starting and
                // its listener registering.
                tokio::time::sleep(config.delivery.delay_for_attempt(attempt)).await;
            }
            Err(err) => {
                warn!(tab = %tab.id, error = %err, "Effect delivery failed, tab stays unsynced");
                return TabDelivery {
                    tab: tab.id,
                    outcome: DeliveryOutcome::Failed(err),
                };
            }
        }
    }
}
