//! Tab agent: applies accessibility effects inside one tab.
//!
//! The agent translates effect messages into idempotent document mutations,
//! echoes what it applied into a per-page fallback store, and opportunistically
//! reports the new state upstream. It owns no policy: the coordinator decides
//! what should be on, the agent makes the document match.

pub mod document;
pub mod effects;
pub mod local;

use clarify_core::protocol::{AgentAck, EffectMessage, StateReport};
use clarify_core::types::TabId;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

pub use document::{DocumentReadyState, PageDocument, VisibilityState};
pub use local::LocalEcho;

pub struct TabAgent {
    tab: TabId,
    document: Arc<Mutex<PageDocument>>,
    local: Arc<Mutex<LocalEcho>>,
    reporter: Option<UnboundedSender<StateReport>>,
    /// Messages received before the body existed, replayed on readiness.
    pending: Vec<EffectMessage>,
}

impl TabAgent {
    pub fn new(
        tab: TabId,
        document: Arc<Mutex<PageDocument>>,
        local: Arc<Mutex<LocalEcho>>,
    ) -> Self {
        Self {
            tab,
            document,
            local,
            reporter: None,
            pending: Vec::new(),
        }
    }

    /// Attach the upstream state-report channel.
    pub fn with_reporter(mut self, sender: UnboundedSender<StateReport>) -> Self {
        self.reporter = Some(sender);
        self
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Handle one effect message from the coordinator.
    ///
    /// Receipt is acknowledged even when the document is not writable yet;
    /// the message is queued and applied once the body exists.
    pub fn handle(&mut self, msg: EffectMessage) -> AgentAck {
        {
            let doc = self.document.lock().unwrap();
            if !doc.body_exists() {
                drop(doc);
                debug!(tab = %self.tab, "Document not ready, deferring effect");
                self.pending.push(msg);
                return AgentAck::Success;
            }
        }

        self.apply_now(&msg);
        AgentAck::Success
    }

    fn apply_now(&mut self, msg: &EffectMessage) {
        {
            let mut doc = self.document.lock().unwrap();
            effects::apply(&mut doc, msg);
        }
        self.echo_locally(msg);
        self.report_upstream(msg);
    }

    /// Mirror the applied change into the per-page fallback store. A reload
    /// within the same page can then self-initialize without the coordinator.
    fn echo_locally(&self, msg: &EffectMessage) {
        let mut local = self.local.lock().unwrap();
        if let Some(enabled) = effects::leaves_enabled(msg) {
            local.record_toggle(msg.feature(), enabled);
        }
        match *msg {
            EffectMessage::ToggleTextScaling {
                enabled: true,
                value,
            }
            | EffectMessage::UpdateTextScaling { value } => local.record_text_scaling(value),
            EffectMessage::ToggleLineHeight {
                enabled: true,
                value,
            }
            | EffectMessage::UpdateLineHeight { value } => local.record_line_height(value),
            EffectMessage::ToggleColorBlind {
                enabled: true,
                mode,
            }
            | EffectMessage::UpdateColorBlind { mode } => local.record_color_blind_mode(mode),
            _ => {}
        }
    }

    /// Fire-and-forget echo to the coordinator. A dead channel must never
    /// affect the document effect that already landed.
    fn report_upstream(&self, msg: &EffectMessage) {
        let (Some(reporter), Some(enabled)) = (&self.reporter, effects::leaves_enabled(msg)) else {
            return;
        };
        let report = StateReport {
            tab: self.tab,
            feature: msg.feature(),
            enabled,
        };
        if reporter.send(report).is_err() {
            debug!(tab = %self.tab, "State report dropped, coordinator gone");
        }
    }

    /// The document's body now exists; drain anything that arrived early.
    pub fn on_document_ready(&mut self) {
        {
            let mut doc = self.document.lock().unwrap();
            doc.mark_interactive();
        }
        let queued = std::mem::take(&mut self.pending);
        for msg in queued {
            self.apply_now(&msg);
        }
    }

    /// Visibility changed. Continuous effects are re-verified on return to
    /// visible because some navigation patterns silently tear down injected
    /// nodes without a reload.
    pub fn on_visibility_changed(&mut self, visible: bool) {
        let mut doc = self.document.lock().unwrap();
        doc.set_visibility(if visible {
            VisibilityState::Visible
        } else {
            VisibilityState::Hidden
        });
        if visible {
            effects::reverify_continuous(&mut doc);
        }
    }

    /// Runs once per page load, before any message arrives: replay every
    /// enabled feature from the global record, or from the local echo when
    /// the global record is unavailable.
    pub fn self_initialize(
        &mut self,
        global: Option<clarify_core::types::AccessibilityState>,
    ) {
        let state = match global {
            Some(state) => state,
            None => {
                let local = self.local.lock().unwrap();
                if local.is_empty() {
                    return;
                }
                warn!(tab = %self.tab, "Global record unavailable, initializing from local echo");
                local.snapshot()
            }
        };

        for msg in EffectMessage::replay_enabled(&state) {
            let ack = self.handle(msg);
            debug_assert_eq!(ack, AgentAck::Success);
        }
    }
}
