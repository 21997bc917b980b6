//! Per-page fallback store.
//!
//! String-keyed entries mirroring what the agent last applied, so a reload
//! can self-initialize even when the global record is unreachable. Keys are
//! the feature wire names; parameterized features keep a second `...Value`
//! entry.

use clarify_core::types::{
    AccessibilityState, ColorBlindMode, Feature, LINE_HEIGHT_DEFAULT, TEXT_SCALING_DEFAULT,
};
use std::collections::BTreeMap;

pub const TEXT_SCALING_VALUE_KEY: &str = "textScalingValue";
pub const LINE_HEIGHT_VALUE_KEY: &str = "lineHeightValue";
pub const COLOR_BLIND_MODE_KEY: &str = "colorBlindMode";

/// Local echo of the applied state, string-keyed like a web storage area.
#[derive(Debug, Default, Clone)]
pub struct LocalEcho {
    entries: BTreeMap<String, String>,
}

impl LocalEcho {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a gate flip.
    pub fn record_toggle(&mut self, feature: Feature, enabled: bool) {
        self.set(feature.as_str(), enabled.to_string());
    }

    /// Record a parameter change.
    pub fn record_text_scaling(&mut self, value: u32) {
        self.set(TEXT_SCALING_VALUE_KEY, value.to_string());
    }

    pub fn record_line_height(&mut self, value: f32) {
        self.set(LINE_HEIGHT_VALUE_KEY, value.to_string());
    }

    pub fn record_color_blind_mode(&mut self, mode: ColorBlindMode) {
        self.set(COLOR_BLIND_MODE_KEY, mode.as_str());
    }

    fn gate(&self, feature: Feature) -> bool {
        self.get(feature.as_str()) == Some("true")
    }

    /// Reconstruct an approximate state record from the string entries.
    /// Unparseable values fall back to the feature defaults.
    pub fn snapshot(&self) -> AccessibilityState {
        let mut state = AccessibilityState::default();
        for feature in Feature::ALL {
            state.toggle(feature, self.gate(feature));
        }

        if let Some(value) = self.get(TEXT_SCALING_VALUE_KEY) {
            state.set_text_scaling_value(value.parse().unwrap_or(TEXT_SCALING_DEFAULT));
        }
        if let Some(value) = self.get(LINE_HEIGHT_VALUE_KEY) {
            state.set_line_height_value(value.parse().unwrap_or(LINE_HEIGHT_DEFAULT));
        }
        match self.get(COLOR_BLIND_MODE_KEY) {
            Some("protanopia") => state.set_color_blind_mode(ColorBlindMode::Protanopia),
            Some("tritanopia") => state.set_color_blind_mode(ColorBlindMode::Tritanopia),
            _ => {}
        }

        state
    }
}
