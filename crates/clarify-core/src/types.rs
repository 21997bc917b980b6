//! Common types used throughout Clarify

use serde::{Deserialize, Serialize};
use url::Url;

/// Default text scaling percentage applied when the feature is (re-)enabled.
pub const TEXT_SCALING_DEFAULT: u32 = 100;
/// Practical text scaling range.
pub const TEXT_SCALING_MIN: u32 = 50;
pub const TEXT_SCALING_MAX: u32 = 200;

/// Default line height multiplier applied when the feature is (re-)enabled.
pub const LINE_HEIGHT_DEFAULT: f32 = 1.5;
pub const LINE_HEIGHT_MIN: f32 = 1.0;
pub const LINE_HEIGHT_MAX: f32 = 3.0;

/// Unique identifier for a browser tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl TabId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Tab metadata as seen by the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabDescriptor {
    pub id: TabId,
    pub url: Url,
    /// Whether the user is currently looking at this tab
    pub active: bool,
}

impl TabDescriptor {
    /// Only http(s) documents can host an agent; browser-internal pages
    /// (about:, chrome:, file: on some platforms) are not addressable.
    pub fn is_scriptable(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }
}

/// The closed set of accessibility features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    HighContrast,
    DyslexiaFont,
    ReadingLine,
    TextScaling,
    LineHeight,
    ColorBlind,
    ReducedMotion,
    LargeTargets,
}

impl Feature {
    /// Every feature, in fan-out order.
    pub const ALL: [Feature; 8] = [
        Feature::HighContrast,
        Feature::DyslexiaFont,
        Feature::ReadingLine,
        Feature::TextScaling,
        Feature::LineHeight,
        Feature::ColorBlind,
        Feature::ReducedMotion,
        Feature::LargeTargets,
    ];

    /// The wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::HighContrast => "highContrast",
            Feature::DyslexiaFont => "dyslexiaFont",
            Feature::ReadingLine => "readingLine",
            Feature::TextScaling => "textScaling",
            Feature::LineHeight => "lineHeight",
            Feature::ColorBlind => "colorBlind",
            Feature::ReducedMotion => "reducedMotion",
            Feature::LargeTargets => "largeTargets",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color vision deficiency the color-blind filter compensates for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorBlindMode {
    #[default]
    Deuteranopia,
    Protanopia,
    Tritanopia,
}

impl ColorBlindMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBlindMode::Deuteranopia => "deuteranopia",
            ColorBlindMode::Protanopia => "protanopia",
            ColorBlindMode::Tritanopia => "tritanopia",
        }
    }
}

/// Text scaling: a gate plus a percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextScaling {
    pub enabled: bool,
    pub value: u32,
}

impl Default for TextScaling {
    fn default() -> Self {
        Self {
            enabled: false,
            value: TEXT_SCALING_DEFAULT,
        }
    }
}

/// Line height: a gate plus a unitless multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineHeight {
    pub enabled: bool,
    pub value: f32,
}

impl Default for LineHeight {
    fn default() -> Self {
        Self {
            enabled: false,
            value: LINE_HEIGHT_DEFAULT,
        }
    }
}

/// Color-blind compensation: a gate plus the compensated deficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorBlind {
    pub enabled: bool,
    pub mode: ColorBlindMode,
}

/// The single canonical accessibility record.
///
/// The coordinator's in-memory copy is authoritative; the persisted store and
/// every tab's local mirror are caches that may be stale. The shape is
/// append-only: new features are new keys, and keys we don't know about yet
/// (written by a newer version) are carried through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityState {
    pub high_contrast: bool,
    pub dyslexia_font: bool,
    pub reading_line: bool,
    pub text_scaling: TextScaling,
    pub line_height: LineHeight,
    pub color_blind: ColorBlind,
    pub reduced_motion: bool,
    pub large_targets: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AccessibilityState {
    /// Set a feature's gate. Enabling a parameterized feature after it was
    /// off resets its parameter to the documented default; disabling leaves
    /// the last value in place for inspection.
    pub fn toggle(&mut self, feature: Feature, enabled: bool) {
        match feature {
            Feature::HighContrast => self.high_contrast = enabled,
            Feature::DyslexiaFont => self.dyslexia_font = enabled,
            Feature::ReadingLine => self.reading_line = enabled,
            Feature::TextScaling => {
                if enabled && !self.text_scaling.enabled {
                    self.text_scaling.value = TEXT_SCALING_DEFAULT;
                }
                self.text_scaling.enabled = enabled;
            }
            Feature::LineHeight => {
                if enabled && !self.line_height.enabled {
                    self.line_height.value = LINE_HEIGHT_DEFAULT;
                }
                self.line_height.enabled = enabled;
            }
            Feature::ColorBlind => {
                if enabled && !self.color_blind.enabled {
                    self.color_blind.mode = ColorBlindMode::default();
                }
                self.color_blind.enabled = enabled;
            }
            Feature::ReducedMotion => self.reduced_motion = enabled,
            Feature::LargeTargets => self.large_targets = enabled,
        }
    }

    /// Whether a feature's gate is currently open.
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::HighContrast => self.high_contrast,
            Feature::DyslexiaFont => self.dyslexia_font,
            Feature::ReadingLine => self.reading_line,
            Feature::TextScaling => self.text_scaling.enabled,
            Feature::LineHeight => self.line_height.enabled,
            Feature::ColorBlind => self.color_blind.enabled,
            Feature::ReducedMotion => self.reduced_motion,
            Feature::LargeTargets => self.large_targets,
        }
    }

    /// Features whose gate is currently open, in fan-out order.
    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }

    /// Update the text scaling percentage, clamped to the practical range.
    /// The gate is untouched; the value is recorded even while disabled.
    pub fn set_text_scaling_value(&mut self, value: u32) -> u32 {
        let clamped = value.clamp(TEXT_SCALING_MIN, TEXT_SCALING_MAX);
        self.text_scaling.value = clamped;
        clamped
    }

    /// Update the line height multiplier, clamped to the practical range.
    pub fn set_line_height_value(&mut self, value: f32) -> f32 {
        let clamped = value.clamp(LINE_HEIGHT_MIN, LINE_HEIGHT_MAX);
        self.line_height.value = clamped;
        clamped
    }

    /// Switch the compensated color deficiency. The gate is untouched.
    pub fn set_color_blind_mode(&mut self, mode: ColorBlindMode) {
        self.color_blind.mode = mode;
    }

    /// Reset every gate and every parameter to its default. Keys written by
    /// newer versions survive untouched.
    pub fn turn_off_all(&mut self) {
        let extra = std::mem::take(&mut self.extra);
        *self = AccessibilityState {
            extra,
            ..AccessibilityState::default()
        };
    }
}
