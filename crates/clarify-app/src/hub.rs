//! In-process tab hub.
//!
//! Plays the browser's part: it owns the open tabs, spawns a tab agent task
//! per injection, and routes effect messages from the coordinator into the
//! right agent's inbox. A tab has no listener until an agent is injected,
//! and navigation wipes both the document and the agent, exactly the
//! situations the coordinator's retry and reconciliation paths exist for.

use async_trait::async_trait;
use clarify_agent::{LocalEcho, PageDocument, TabAgent};
use clarify_core::protocol::{AgentAck, DeliveryError, EffectMessage, StateReport};
use clarify_core::types::{TabDescriptor, TabId};
use clarify_core::{ClarifyError, ClarifyResult};
use clarify_coordinator::BrowserHost;
use clarify_store::StateStore;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use url::Url;

enum AgentRequest {
    Effect {
        msg: EffectMessage,
        ack: oneshot::Sender<AgentAck>,
    },
    Visibility {
        visible: bool,
    },
}

struct HubTab {
    descriptor: TabDescriptor,
    document: Arc<Mutex<PageDocument>>,
    /// Survives navigation, like web storage does for one origin.
    local: Arc<Mutex<LocalEcho>>,
    /// The agent's inbox; `None` until injection, dropped on navigation.
    agent: Option<mpsc::UnboundedSender<AgentRequest>>,
}

pub struct TabHub {
    store: Arc<dyn StateStore>,
    report_tx: mpsc::UnboundedSender<StateReport>,
    tabs: Mutex<Vec<HubTab>>,
}

impl TabHub {
    pub fn new(
        store: Arc<dyn StateStore>,
        report_tx: mpsc::UnboundedSender<StateReport>,
    ) -> Self {
        Self {
            store,
            report_tx,
            tabs: Mutex::new(Vec::new()),
        }
    }

    /// Open a tab on a finished page load. No agent is attached yet; the
    /// page loaded before the extension looked at it.
    pub fn open_tab(&self, url: &str) -> ClarifyResult<TabId> {
        let url = Url::parse(url)?;
        let id = TabId::new();
        debug!(tab = %id, url = %url, "Tab opened");
        self.tabs.lock().unwrap().push(HubTab {
            descriptor: TabDescriptor {
                id,
                url,
                active: false,
            },
            document: Arc::new(Mutex::new(PageDocument::interactive())),
            local: Arc::new(Mutex::new(LocalEcho::new())),
            agent: None,
        });
        Ok(id)
    }

    /// Navigate a tab: the old document and its agent are gone, the fresh
    /// document carries no effects.
    pub fn navigate(&self, tab: TabId, url: &str) -> ClarifyResult<()> {
        let url = Url::parse(url)?;
        let mut tabs = self.tabs.lock().unwrap();
        let hub_tab = tabs
            .iter_mut()
            .find(|t| t.descriptor.id == tab)
            .ok_or_else(|| ClarifyError::NotFound(format!("{}", tab)))?;
        debug!(tab = %tab, url = %url, "Tab navigated");
        hub_tab.descriptor.url = url;
        hub_tab.document = Arc::new(Mutex::new(PageDocument::interactive()));
        hub_tab.agent = None;
        Ok(())
    }

    /// Mark one tab active and every other tab inactive.
    pub fn activate(&self, tab: TabId) {
        for hub_tab in self.tabs.lock().unwrap().iter_mut() {
            hub_tab.descriptor.active = hub_tab.descriptor.id == tab;
        }
    }

    /// The tab's document, for inspection.
    pub fn document(&self, tab: TabId) -> Option<Arc<Mutex<PageDocument>>> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.descriptor.id == tab)
            .map(|t| Arc::clone(&t.document))
    }

    /// The tab's per-page fallback store, for inspection.
    pub fn local_echo(&self, tab: TabId) -> Option<Arc<Mutex<LocalEcho>>> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.descriptor.id == tab)
            .map(|t| Arc::clone(&t.local))
    }

    /// Forward a visibility change into the tab's agent, if one is attached.
    pub fn set_tab_visibility(&self, tab: TabId, visible: bool) {
        let sender = self
            .tabs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.descriptor.id == tab)
            .and_then(|t| t.agent.clone());
        if let Some(sender) = sender {
            let _ = sender.send(AgentRequest::Visibility { visible });
        }
    }

    pub fn has_agent(&self, tab: TabId) -> bool {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.descriptor.id == tab)
            .map(|t| t.agent.is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl BrowserHost for TabHub {
    async fn list_tabs(&self) -> Vec<TabDescriptor> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.descriptor.clone())
            .collect()
    }

    async fn deliver(&self, tab: TabId, msg: EffectMessage) -> Result<AgentAck, DeliveryError> {
        let sender = self
            .tabs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.descriptor.id == tab)
            .and_then(|t| t.agent.clone());

        let Some(sender) = sender else {
            return Err(DeliveryError::NoListener);
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if sender
            .send(AgentRequest::Effect { msg, ack: ack_tx })
            .is_err()
        {
            // The agent task is gone (navigation beat us); same as no listener.
            return Err(DeliveryError::NoListener);
        }
        ack_rx.await.map_err(|_| DeliveryError::NoAck)
    }

    async fn inject_agent(&self, tab: TabId) -> ClarifyResult<()> {
        let (document, local) = {
            let tabs = self.tabs.lock().unwrap();
            let hub_tab = tabs
                .iter()
                .find(|t| t.descriptor.id == tab)
                .ok_or_else(|| ClarifyError::injection(format!("unknown tab {}", tab)))?;
            if !hub_tab.descriptor.is_scriptable() {
                return Err(ClarifyError::injection(format!(
                    "tab {} is not scriptable",
                    tab
                )));
            }
            (Arc::clone(&hub_tab.document), Arc::clone(&hub_tab.local))
        };

        // A fresh content script reads the global record first thing.
        let global = match self.store.load().await {
            Ok(record) => record,
            Err(err) => {
                warn!(tab = %tab, error = %err, "Global record unreadable during injection");
                None
            }
        };

        let mut agent = TabAgent::new(tab, document, local).with_reporter(self.report_tx.clone());
        agent.self_initialize(global);

        let (tx, mut rx) = mpsc::unbounded_channel::<AgentRequest>();
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                match request {
                    AgentRequest::Effect { msg, ack } => {
                        let _ = ack.send(agent.handle(msg));
                    }
                    AgentRequest::Visibility { visible } => {
                        agent.on_visibility_changed(visible);
                    }
                }
            }
            debug!(tab = %tab, "Agent task stopped");
        });

        if let Some(hub_tab) = self
            .tabs
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.descriptor.id == tab)
        {
            hub_tab.agent = Some(tx);
        }
        debug!(tab = %tab, "Agent injected");
        Ok(())
    }
}
