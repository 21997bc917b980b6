//! Wire protocol between popup, coordinator, and tab agents.
//!
//! Commands flow popup/agent -> coordinator; effect messages flow
//! coordinator -> agent. Both are tagged enums so dispatch is exhaustive
//! pattern matching rather than string comparison, and the serialized form
//! keeps the `action` field the existing popup and content scripts expect.

use crate::types::{AccessibilityState, ColorBlindMode, Feature, TabId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A command addressed to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Snapshot of the canonical state. No side effects.
    GetState,
    /// Flip one feature's gate.
    ToggleFeature { feature: Feature, enabled: bool },
    /// Change the text scaling percentage without touching the gate.
    UpdateTextScaling { value: u32 },
    /// Change the line height multiplier without touching the gate.
    UpdateLineHeight { value: f32 },
    /// Switch the compensated color deficiency without touching the gate.
    SetColorBlindMode { mode: ColorBlindMode },
    /// Reset everything to defaults and disable the effect in every tab.
    TurnOffAll,
    /// Advisory state echo from a tab agent. Fire-and-forget.
    UpdateState { feature: Feature, enabled: bool },
    /// Asked by a freshly initializing agent: should the reading line start?
    CheckReadingLine,
}

/// The coordinator's reply to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CommandResponse {
    /// Command applied; echoes the canonical state.
    #[serde(rename_all = "camelCase")]
    Success { state: AccessibilityState },
    /// Answer to the reading-line init probe.
    #[serde(rename_all = "camelCase")]
    Advisory { should_activate: bool },
    /// Invalid command; nothing was mutated.
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl CommandResponse {
    pub fn success(state: AccessibilityState) -> Self {
        CommandResponse::Success { state }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CommandResponse::Error {
            message: message.into(),
        }
    }
}

/// An effect-application message delivered to one tab's agent.
///
/// The serialized `action` reads `toggle<Feature>` / `update<Feature>`.
/// Toggle messages for parameterized features carry the parameter so a tab
/// that missed earlier updates still converges in one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EffectMessage {
    ToggleHighContrast { enabled: bool },
    ToggleDyslexiaFont { enabled: bool },
    ToggleReadingLine { enabled: bool },
    ToggleTextScaling { enabled: bool, value: u32 },
    UpdateTextScaling { value: u32 },
    ToggleLineHeight { enabled: bool, value: f32 },
    UpdateLineHeight { value: f32 },
    ToggleColorBlind { enabled: bool, mode: ColorBlindMode },
    UpdateColorBlind { mode: ColorBlindMode },
    ToggleReducedMotion { enabled: bool },
    ToggleLargeTargets { enabled: bool },
}

impl EffectMessage {
    /// Build the toggle message for one feature from the canonical state.
    pub fn toggle(state: &AccessibilityState, feature: Feature, enabled: bool) -> Self {
        match feature {
            Feature::HighContrast => EffectMessage::ToggleHighContrast { enabled },
            Feature::DyslexiaFont => EffectMessage::ToggleDyslexiaFont { enabled },
            Feature::ReadingLine => EffectMessage::ToggleReadingLine { enabled },
            Feature::TextScaling => EffectMessage::ToggleTextScaling {
                enabled,
                value: state.text_scaling.value,
            },
            Feature::LineHeight => EffectMessage::ToggleLineHeight {
                enabled,
                value: state.line_height.value,
            },
            Feature::ColorBlind => EffectMessage::ToggleColorBlind {
                enabled,
                mode: state.color_blind.mode,
            },
            Feature::ReducedMotion => EffectMessage::ToggleReducedMotion { enabled },
            Feature::LargeTargets => EffectMessage::ToggleLargeTargets { enabled },
        }
    }

    /// One disable message per feature, for the turn-off-all fan-out.
    pub fn disable_all() -> Vec<Self> {
        let defaults = AccessibilityState::default();
        Feature::ALL
            .iter()
            .map(|f| Self::toggle(&defaults, *f, false))
            .collect()
    }

    /// Toggle messages for every currently-enabled feature, used when
    /// reconciling a tab after activation or navigation.
    pub fn replay_enabled(state: &AccessibilityState) -> Vec<Self> {
        state
            .enabled_features()
            .into_iter()
            .map(|f| Self::toggle(state, f, true))
            .collect()
    }

    /// The feature this message is about.
    pub fn feature(&self) -> Feature {
        match self {
            EffectMessage::ToggleHighContrast { .. } => Feature::HighContrast,
            EffectMessage::ToggleDyslexiaFont { .. } => Feature::DyslexiaFont,
            EffectMessage::ToggleReadingLine { .. } => Feature::ReadingLine,
            EffectMessage::ToggleTextScaling { .. } | EffectMessage::UpdateTextScaling { .. } => {
                Feature::TextScaling
            }
            EffectMessage::ToggleLineHeight { .. } | EffectMessage::UpdateLineHeight { .. } => {
                Feature::LineHeight
            }
            EffectMessage::ToggleColorBlind { .. } | EffectMessage::UpdateColorBlind { .. } => {
                Feature::ColorBlind
            }
            EffectMessage::ToggleReducedMotion { .. } => Feature::ReducedMotion,
            EffectMessage::ToggleLargeTargets { .. } => Feature::LargeTargets,
        }
    }
}

/// Acknowledgement an agent returns for a delivered effect message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AgentAck {
    Success,
}

/// Why an effect message could not be delivered to a tab.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// No agent is listening in the tab. Expected for freshly opened or
    /// freshly navigated tabs; recovered by injecting and retrying once.
    #[error("no agent listening in tab")]
    NoListener,

    /// The agent went away mid-delivery (tab closed or navigated).
    #[error("agent channel closed")]
    ChannelClosed,

    /// The agent was reached but did not acknowledge in time.
    #[error("agent did not acknowledge")]
    NoAck,
}

/// A tab agent's opportunistic echo of the state it just applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    pub tab: TabId,
    pub feature: Feature,
    pub enabled: bool,
}
