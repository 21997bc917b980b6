//! Coordinator: the single source of truth for accessibility state.
//!
//! One coordinator owns the canonical record. Commands mutate it, every
//! mutation is persisted, and the matching effect is broadcast to all open
//! tabs as a best-effort side effect that never blocks the caller's
//! response. The exception is `turnOffAll`, which waits for its own
//! deliveries to settle before responding. Tab agents hold caches; their
//! reports are telemetry, never authority.

pub mod fanout;
pub mod host;
pub mod service;

use clarify_core::config::CoordinatorConfig;
use clarify_core::protocol::{Command, CommandResponse, EffectMessage};
use clarify_core::types::{AccessibilityState, Feature, TabId};
use clarify_store::StateStore;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub use fanout::{DeliveryOutcome, TabDelivery};
pub use host::BrowserHost;
pub use service::{spawn, CoordinatorHandle};

pub struct Coordinator<S, H> {
    state: AccessibilityState,
    store: S,
    host: Arc<H>,
    config: CoordinatorConfig,
    /// Fire-and-forget fan-outs. Completed entries are reaped on the next
    /// command so the set never grows with coordinator lifetime; `settle`
    /// drains it fully.
    inflight: JoinSet<Vec<TabDelivery>>,
}

impl<S, H> Coordinator<S, H>
where
    S: StateStore,
    H: BrowserHost + 'static,
{
    /// Load the persisted record (merged over defaults by serde) and start
    /// coordinating. An absent or unreadable record yields defaults.
    pub async fn new(store: S, host: H, config: CoordinatorConfig) -> Self {
        let state = match store.load().await {
            Ok(Some(state)) => state,
            Ok(None) => AccessibilityState::default(),
            Err(err) => {
                warn!(error = %err, "Failed to load persisted record, starting from defaults");
                AccessibilityState::default()
            }
        };
        info!(enabled = state.enabled_features().len(), "Coordinator started");

        Self {
            state,
            store,
            host: Arc::new(host),
            config,
            inflight: JoinSet::new(),
        }
    }

    /// The canonical record.
    pub fn state(&self) -> &AccessibilityState {
        &self.state
    }

    /// Handle one command to completion (mutation and persistence included).
    /// Fan-out side effects are spawned, not awaited, so the caller's
    /// response is never held up by slow tabs; `turnOffAll` is the exception.
    pub async fn handle_command(&mut self, cmd: Command) -> CommandResponse {
        // Reap finished fan-outs so the set stays bounded; their results
        // were already logged inside the task.
        while self.inflight.try_join_next().is_some() {}

        match cmd {
            Command::GetState => CommandResponse::success(self.state.clone()),
            Command::ToggleFeature { feature, enabled } => {
                self.toggle_feature(feature, enabled).await
            }
            Command::UpdateTextScaling { value } => {
                let clamped = self.state.set_text_scaling_value(value);
                self.persist().await;
                self.spawn_fanout(EffectMessage::UpdateTextScaling { value: clamped });
                CommandResponse::success(self.state.clone())
            }
            Command::UpdateLineHeight { value } => {
                let clamped = self.state.set_line_height_value(value);
                self.persist().await;
                self.spawn_fanout(EffectMessage::UpdateLineHeight { value: clamped });
                CommandResponse::success(self.state.clone())
            }
            Command::SetColorBlindMode { mode } => {
                self.state.set_color_blind_mode(mode);
                self.persist().await;
                self.spawn_fanout(EffectMessage::UpdateColorBlind { mode });
                CommandResponse::success(self.state.clone())
            }
            Command::TurnOffAll => self.turn_off_all().await,
            Command::UpdateState { feature, enabled } => {
                self.report_state(None, feature, enabled);
                CommandResponse::success(self.state.clone())
            }
            Command::CheckReadingLine => CommandResponse::Advisory {
                should_activate: self.state.reading_line,
            },
        }
    }

    async fn toggle_feature(&mut self, feature: Feature, enabled: bool) -> CommandResponse {
        self.state.toggle(feature, enabled);
        self.persist().await;
        info!(feature = %feature, enabled, "Feature toggled");
        self.spawn_fanout(EffectMessage::toggle(&self.state, feature, enabled));
        CommandResponse::success(self.state.clone())
    }

    /// Reset everything, persist once, disable every feature in every tab,
    /// and only respond once this command's own deliveries have settled.
    /// Settling is a best-effort completion signal, not a consistency
    /// guarantee, and a slow fan-out from an earlier command never holds
    /// the reply hostage.
    async fn turn_off_all(&mut self) -> CommandResponse {
        self.state.turn_off_all();
        self.persist().await;

        let disables = EffectMessage::disable_all();
        let fanouts = disables
            .iter()
            .map(|msg| fanout::fan_out(self.host.as_ref(), &self.config, msg));
        let results: Vec<TabDelivery> = futures::future::join_all(fanouts)
            .await
            .into_iter()
            .flatten()
            .collect();

        let failed = results.iter().filter(|r| !r.succeeded()).count();
        info!(
            deliveries = results.len(),
            failed, "Turned off all features"
        );
        CommandResponse::success(self.state.clone())
    }

    /// Advisory telemetry from a tab agent. The canonical record is never
    /// overwritten from below; a divergent tab is logged and left for the
    /// next reconciling event.
    pub fn report_state(&mut self, tab: Option<TabId>, feature: Feature, enabled: bool) {
        let canonical = self.state.is_enabled(feature);
        if canonical == enabled {
            debug!(?tab, feature = %feature, enabled, "Tab state report matches canonical state");
        } else {
            warn!(
                ?tab,
                feature = %feature,
                reported = enabled,
                canonical,
                "Tab reports divergent state; keeping canonical value"
            );
        }
    }

    /// A tab became active: re-apply every enabled feature to it. Re-applying
    /// an already-applied effect is a visual no-op, but it is still sent.
    pub async fn on_tab_activated(&mut self, tab: TabId) {
        let Some(descriptor) = self.find_tab(tab).await else {
            debug!(tab = %tab, "Activated tab unknown to host, nothing to reconcile");
            return;
        };

        for msg in EffectMessage::replay_enabled(&self.state) {
            let result =
                fanout::deliver_to_tab(self.host.as_ref(), &self.config, descriptor.clone(), &msg)
                    .await;
            if !result.succeeded() && result.outcome != DeliveryOutcome::Skipped {
                debug!(tab = %tab, outcome = ?result.outcome, "Reconcile delivery failed");
            }
        }
    }

    /// A tab finished loading: the fresh document has no effects and no
    /// listener, so inject the agent unconditionally and replay everything
    /// that is enabled.
    pub async fn on_tab_loaded(&mut self, tab: TabId) {
        let Some(descriptor) = self.find_tab(tab).await else {
            debug!(tab = %tab, "Loaded tab unknown to host, nothing to reconcile");
            return;
        };
        if !descriptor.is_scriptable() {
            return;
        }

        if let Err(err) = self.host.inject_agent(tab).await {
            warn!(tab = %tab, error = %err, "Agent injection on load failed");
            return;
        }

        for msg in EffectMessage::replay_enabled(&self.state) {
            fanout::deliver_to_tab(self.host.as_ref(), &self.config, descriptor.clone(), &msg)
                .await;
        }
    }

    /// Await every in-flight fan-out and return the merged per-tab results.
    pub async fn settle(&mut self) -> Vec<TabDelivery> {
        let mut results = Vec::new();
        while let Some(joined) = self.inflight.join_next().await {
            match joined {
                Ok(mut deliveries) => results.append(&mut deliveries),
                Err(err) => warn!(error = %err, "Fan-out task panicked"),
            }
        }
        results
    }

    fn spawn_fanout(&mut self, msg: EffectMessage) {
        let host = Arc::clone(&self.host);
        let config = self.config.clone();
        self.inflight.spawn(async move {
            let results = fanout::fan_out(host.as_ref(), &config, &msg).await;
            let failed = results.iter().filter(|r| !r.succeeded()).count();
            if failed > 0 {
                debug!(action = ?msg, failed, total = results.len(), "Fan-out left tabs unsynced");
            }
            results
        });
    }

    /// Persist the canonical record. A rejected write is logged and the
    /// in-memory record stands; store and memory stay divergent until the
    /// next successful write.
    async fn persist(&self) {
        if let Err(err) = self.store.save(&self.state).await {
            warn!(error = %err, "Failed to persist accessibility record");
        }
    }

    async fn find_tab(&self, tab: TabId) -> Option<clarify_core::types::TabDescriptor> {
        self.host.list_tabs().await.into_iter().find(|t| t.id == tab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarify_core::protocol::{AgentAck, DeliveryError};
    use clarify_core::types::{ColorBlindMode, TabDescriptor, TEXT_SCALING_DEFAULT};
    use clarify_store::MemoryStore;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use url::Url;

    /// Scripted host for coordinator tests: tabs are plain descriptors,
    /// "agents" are a set of tab ids with a registered listener.
    #[derive(Default)]
    struct MockHost {
        tabs: Mutex<Vec<TabDescriptor>>,
        agents: Mutex<HashSet<TabId>>,
        deliveries: Mutex<Vec<(TabId, EffectMessage)>>,
        injections: Mutex<Vec<TabId>>,
        fail_injection: AtomicBool,
        /// Deliveries of exactly this message never resolve.
        hang_on: Mutex<Option<EffectMessage>>,
    }

    impl MockHost {
        fn add_tab(&self, url: &str, with_agent: bool) -> TabId {
            let id = TabId::new();
            self.tabs.lock().unwrap().push(TabDescriptor {
                id,
                url: Url::parse(url).unwrap(),
                active: false,
            });
            if with_agent {
                self.agents.lock().unwrap().insert(id);
            }
            id
        }

        fn deliveries_for(&self, tab: TabId) -> Vec<EffectMessage> {
            self.deliveries
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| *t == tab)
                .map(|(_, m)| m.clone())
                .collect()
        }

        fn injection_count(&self) -> usize {
            self.injections.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl BrowserHost for MockHost {
        async fn list_tabs(&self) -> Vec<TabDescriptor> {
            self.tabs.lock().unwrap().clone()
        }

        async fn deliver(
            &self,
            tab: TabId,
            msg: EffectMessage,
        ) -> Result<AgentAck, DeliveryError> {
            let hang = self.hang_on.lock().unwrap().as_ref() == Some(&msg);
            if hang {
                futures::future::pending::<()>().await;
            }
            if !self.agents.lock().unwrap().contains(&tab) {
                return Err(DeliveryError::NoListener);
            }
            self.deliveries.lock().unwrap().push((tab, msg));
            Ok(AgentAck::Success)
        }

        async fn inject_agent(&self, tab: TabId) -> clarify_core::ClarifyResult<()> {
            if self.fail_injection.load(Ordering::SeqCst) {
                return Err(clarify_core::ClarifyError::injection("tab went away"));
            }
            self.injections.lock().unwrap().push(tab);
            self.agents.lock().unwrap().insert(tab);
            Ok(())
        }
    }

    async fn coordinator_with(
        host: MockHost,
    ) -> (Coordinator<MemoryStore, MockHost>, Arc<MockHost>) {
        let coordinator =
            Coordinator::new(MemoryStore::new(), host, CoordinatorConfig::default()).await;
        let host = Arc::clone(&coordinator.host);
        (coordinator, host)
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_mutates_persists_and_fans_out() {
        let mock = MockHost::default();
        let a = mock.add_tab("https://example.com/a", true);
        let b = mock.add_tab("https://example.com/b", true);
        let (mut coordinator, host) = coordinator_with(mock).await;

        let response = coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;

        match response {
            CommandResponse::Success { state } => assert!(state.high_contrast),
            other => panic!("unexpected response: {:?}", other),
        }

        let results = coordinator.settle().await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.succeeded()));
        for tab in [a, b] {
            assert_eq!(
                host.deliveries_for(tab),
                vec![EffectMessage::ToggleHighContrast { enabled: true }]
            );
        }

        // State/storage agreement
        let stored = coordinator.store.load().await.unwrap().unwrap();
        assert_eq!(&stored, coordinator.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_update_persists_and_agrees_with_storage() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let (mut coordinator, _host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::TextScaling,
                enabled: true,
            })
            .await;
        coordinator
            .handle_command(Command::UpdateTextScaling { value: 150 })
            .await;
        coordinator.settle().await;

        assert_eq!(coordinator.state().text_scaling.value, 150);
        let stored = coordinator.store.load().await.unwrap().unwrap();
        assert_eq!(&stored, coordinator.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_after_disable_resets_value_to_default() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let (mut coordinator, _host) = coordinator_with(mock).await;

        for cmd in [
            Command::ToggleFeature {
                feature: Feature::TextScaling,
                enabled: true,
            },
            Command::UpdateTextScaling { value: 150 },
            Command::ToggleFeature {
                feature: Feature::TextScaling,
                enabled: false,
            },
            Command::ToggleFeature {
                feature: Feature::TextScaling,
                enabled: true,
            },
        ] {
            coordinator.handle_command(cmd).await;
        }
        coordinator.settle().await;

        assert!(coordinator.state().text_scaling.enabled);
        assert_eq!(
            coordinator.state().text_scaling.value,
            TEXT_SCALING_DEFAULT
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_agent_is_injected_and_retried() {
        let mock = MockHost::default();
        let tab = mock.add_tab("https://example.com", false);
        let (mut coordinator, host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        let results = coordinator.settle().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, DeliveryOutcome::DeliveredAfterInject);
        assert_eq!(host.injection_count(), 1);
        assert_eq!(host.deliveries_for(tab).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_succeeds_even_when_a_tab_is_unreachable() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", false);
        mock.fail_injection.store(true, Ordering::SeqCst);
        let (mut coordinator, host) = coordinator_with(mock).await;

        let response = coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        assert!(matches!(response, CommandResponse::Success { .. }));

        let results = coordinator.settle().await;
        assert!(matches!(
            results[0].outcome,
            DeliveryOutcome::Failed(DeliveryError::NoListener)
        ));
        assert_eq!(host.injection_count(), 0);
        assert!(coordinator.state().high_contrast);
    }

    #[tokio::test(start_paused = true)]
    async fn test_internal_tabs_are_skipped() {
        let mock = MockHost::default();
        let internal = mock.add_tab("about:blank", false);
        let normal = mock.add_tab("https://example.com", true);
        let (mut coordinator, host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::DyslexiaFont,
                enabled: true,
            })
            .await;
        let results = coordinator.settle().await;

        let skipped = results.iter().find(|r| r.tab == internal).unwrap();
        assert_eq!(skipped.outcome, DeliveryOutcome::Skipped);
        assert_eq!(host.deliveries_for(internal).len(), 0);
        assert_eq!(host.deliveries_for(normal).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_off_all_resets_persists_once_and_settles() {
        let mock = MockHost::default();
        let tab = mock.add_tab("https://example.com", true);
        let (mut coordinator, host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::TextScaling,
                enabled: true,
            })
            .await;
        coordinator
            .handle_command(Command::UpdateTextScaling { value: 140 })
            .await;
        coordinator.settle().await;
        let writes_before = coordinator.store.write_count();

        let response = coordinator.handle_command(Command::TurnOffAll).await;
        match response {
            CommandResponse::Success { state } => {
                assert_eq!(state, AccessibilityState::default());
            }
            other => panic!("unexpected response: {:?}", other),
        }

        // One persisted write for the whole reset
        assert_eq!(coordinator.store.write_count(), writes_before + 1);

        // One disable per feature reached the tab, and turnOffAll's own
        // fan-outs had all settled before the response arrived.
        assert_eq!(host.deliveries_for(tab).len(), 3 + Feature::ALL.len());

        // Absorbing: a second invocation changes nothing
        coordinator.handle_command(Command::TurnOffAll).await;
        assert_eq!(coordinator.state(), &AccessibilityState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_fanouts_are_reaped_on_next_command() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let (mut coordinator, _host) = coordinator_with(mock).await;

        for enabled in [true, false, true] {
            coordinator
                .handle_command(Command::ToggleFeature {
                    feature: Feature::HighContrast,
                    enabled,
                })
                .await;
        }

        // Let the spawned fan-outs finish without anything reaping them.
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert!(!coordinator.inflight.is_empty());

        // Any command reaps the finished tasks, so the set stays bounded
        // over a long-lived coordinator.
        coordinator.handle_command(Command::GetState).await;
        assert!(coordinator.inflight.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_off_all_is_not_blocked_by_earlier_stuck_fanout() {
        let mock = MockHost::default();
        let tab = mock.add_tab("https://example.com", true);
        *mock.hang_on.lock().unwrap() =
            Some(EffectMessage::ToggleHighContrast { enabled: true });
        let (mut coordinator, host) = coordinator_with(mock).await;

        // This command's fan-out never completes.
        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;

        // turnOffAll awaits only its own disable fan-outs, so the stuck
        // delivery above cannot hold its reply hostage.
        let response = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            coordinator.handle_command(Command::TurnOffAll),
        )
        .await
        .expect("turnOffAll must not wait on unrelated fan-outs");
        assert!(matches!(response, CommandResponse::Success { .. }));

        // All eight disables reached the tab; the hung toggle never did.
        assert_eq!(host.deliveries_for(tab).len(), Feature::ALL.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_agent_reports_never_override_canonical_state() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let (mut coordinator, _host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        coordinator.settle().await;

        // A stale tab claims the feature is off
        coordinator.report_state(Some(TabId::new()), Feature::HighContrast, false);
        assert!(coordinator.state().high_contrast);

        // Same through the command surface
        coordinator
            .handle_command(Command::UpdateState {
                feature: Feature::HighContrast,
                enabled: false,
            })
            .await;
        assert!(coordinator.state().high_contrast);
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_failure_keeps_memory_state_and_succeeds() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let host_handle = Arc::new(mock);
        let store = MemoryStore::new();
        store.fail_writes(true);
        let mut coordinator = Coordinator {
            state: AccessibilityState::default(),
            store,
            host: host_handle,
            config: CoordinatorConfig::default(),
            inflight: JoinSet::new(),
        };

        let response = coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        assert!(matches!(response, CommandResponse::Success { .. }));
        assert!(coordinator.state().high_contrast);
        assert!(coordinator.store.load().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_merges_persisted_record() {
        let mut persisted = AccessibilityState::default();
        persisted.toggle(Feature::ReadingLine, true);
        let store = MemoryStore::with_record(persisted.clone());

        let coordinator =
            Coordinator::new(store, MockHost::default(), CoordinatorConfig::default()).await;
        assert_eq!(coordinator.state(), &persisted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_reading_line_advisory() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let (mut coordinator, _host) = coordinator_with(mock).await;

        let response = coordinator.handle_command(Command::CheckReadingLine).await;
        assert_eq!(
            response,
            CommandResponse::Advisory {
                should_activate: false
            }
        );

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::ReadingLine,
                enabled: true,
            })
            .await;
        coordinator.settle().await;

        let response = coordinator.handle_command(Command::CheckReadingLine).await;
        assert_eq!(
            response,
            CommandResponse::Advisory {
                should_activate: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_activation_reapplies_enabled_features() {
        let mock = MockHost::default();
        let tab = mock.add_tab("https://example.com", true);
        let (mut coordinator, host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::LineHeight,
                enabled: true,
            })
            .await;
        coordinator.settle().await;
        let before = host.deliveries_for(tab).len();

        coordinator.on_tab_activated(tab).await;

        let after = host.deliveries_for(tab);
        assert_eq!(after.len(), before + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_load_injects_then_replays() {
        let mock = MockHost::default();
        let tab = mock.add_tab("https://example.com", false);
        let (mut coordinator, host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::HighContrast,
                enabled: true,
            })
            .await;
        coordinator.settle().await;

        // The fan-out already injected once; simulate a navigation that wiped
        // the agent out again.
        host.agents.lock().unwrap().remove(&tab);
        coordinator.on_tab_loaded(tab).await;

        assert!(host.agents.lock().unwrap().contains(&tab));
        let msgs = host.deliveries_for(tab);
        assert_eq!(
            msgs.last(),
            Some(&EffectMessage::ToggleHighContrast { enabled: true })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_value_while_gate_off_is_recorded() {
        let mock = MockHost::default();
        mock.add_tab("https://example.com", true);
        let (mut coordinator, _host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::UpdateLineHeight { value: 2.0 })
            .await;
        coordinator.settle().await;

        assert!(!coordinator.state().line_height.enabled);
        assert_eq!(coordinator.state().line_height.value, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_color_blind_mode_update() {
        let mock = MockHost::default();
        let tab = mock.add_tab("https://example.com", true);
        let (mut coordinator, host) = coordinator_with(mock).await;

        coordinator
            .handle_command(Command::ToggleFeature {
                feature: Feature::ColorBlind,
                enabled: true,
            })
            .await;
        coordinator
            .handle_command(Command::SetColorBlindMode {
                mode: ColorBlindMode::Tritanopia,
            })
            .await;
        coordinator.settle().await;

        assert_eq!(
            coordinator.state().color_blind.mode,
            ColorBlindMode::Tritanopia
        );
        assert!(host.deliveries_for(tab).contains(&EffectMessage::UpdateColorBlind {
            mode: ColorBlindMode::Tritanopia
        }));
    }
}
