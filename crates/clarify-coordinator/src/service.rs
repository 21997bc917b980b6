//! Actor wrapper around the coordinator.
//!
//! The coordinator itself is plain owned state; this wrapper serializes
//! access to it from concurrent callers (popup boundary, tab lifecycle
//! hooks, agent reports) through one queue. Each envelope is processed to
//! completion before the next is dequeued, so no two state mutations can
//! interleave.

use clarify_core::protocol::{Command, CommandResponse, StateReport};
use clarify_core::types::TabId;
use clarify_core::{ClarifyError, ClarifyResult};
use clarify_store::StateStore;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::{BrowserHost, Coordinator};

enum Envelope {
    Command {
        cmd: Command,
        reply: oneshot::Sender<CommandResponse>,
    },
    Report(StateReport),
    TabActivated(TabId),
    TabLoaded(TabId),
}

/// Cheap cloneable handle to a running coordinator service.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

/// Spawn the coordinator's serving task and return a handle to it. The task
/// stops when every handle is dropped.
pub fn spawn<S, H>(mut coordinator: Coordinator<S, H>) -> CoordinatorHandle
where
    S: StateStore + 'static,
    H: BrowserHost + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            match envelope {
                Envelope::Command { cmd, reply } => {
                    let response = coordinator.handle_command(cmd).await;
                    let _ = reply.send(response);
                }
                Envelope::Report(report) => {
                    coordinator.report_state(Some(report.tab), report.feature, report.enabled);
                }
                Envelope::TabActivated(tab) => coordinator.on_tab_activated(tab).await,
                Envelope::TabLoaded(tab) => coordinator.on_tab_loaded(tab).await,
            }
        }
        // Flush whatever fan-outs are still in flight before going away.
        coordinator.settle().await;
        debug!("Coordinator service stopped");
    });

    CoordinatorHandle { tx }
}

impl CoordinatorHandle {
    /// Send a command and await its response.
    pub async fn command(&self, cmd: Command) -> ClarifyResult<CommandResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope::Command {
                cmd,
                reply: reply_tx,
            })
            .map_err(|_| ClarifyError::host("coordinator service stopped"))?;
        reply_rx
            .await
            .map_err(|_| ClarifyError::host("coordinator dropped the command"))
    }

    /// Forward an agent's state report. Fire-and-forget.
    pub fn report(&self, report: StateReport) {
        let _ = self.tx.send(Envelope::Report(report));
    }

    /// The user switched to this tab.
    pub fn tab_activated(&self, tab: TabId) {
        let _ = self.tx.send(Envelope::TabActivated(tab));
    }

    /// This tab finished loading a navigation.
    pub fn tab_loaded(&self, tab: TabId) {
        let _ = self.tx.send(Envelope::TabLoaded(tab));
    }
}
