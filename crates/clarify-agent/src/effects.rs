//! Per-feature effect handlers.
//!
//! Every handler is idempotent (applying twice equals applying once) and
//! reversible (disabling removes every trace it added). Updating a value
//! while the feature has no trace in the document is a silent no-op.
//! Features are independent and commutative in their DOM effects, so
//! replay order does not matter.

use clarify_core::protocol::EffectMessage;
use clarify_core::types::ColorBlindMode;

use crate::document::PageDocument;

pub const HIGH_CONTRAST_CLASS: &str = "clarify-high-contrast";
pub const COLOR_BLIND_CLASS_PREFIX: &str = "clarify-cb-";
pub const READING_LINE_OVERLAY: &str = "clarify-reading-line";
pub const READING_LINE_EVENT: &str = "pointermove";
pub const FONT_SIZE_STYLE: &str = "font-size";

/// Stable logical names for the injected stylesheet assets.
pub const HIGH_CONTRAST_SHEET: &str = "high-contrast.css";
pub const DYSLEXIA_FONT_SHEET: &str = "dyslexia-font.css";
pub const READING_LINE_SHEET: &str = "reading-line.css";
pub const LINE_HEIGHT_SHEET: &str = "line-height.css";
pub const COLOR_BLIND_SHEET: &str = "color-blind.css";
pub const REDUCED_MOTION_SHEET: &str = "reduced-motion.css";
pub const LARGE_TARGETS_SHEET: &str = "large-targets.css";

const HIGH_CONTRAST_CSS: &str = "html.clarify-high-contrast { filter: contrast(1.35); background: #000; } html.clarify-high-contrast body { background: #000; color: #fff; }";
const DYSLEXIA_FONT_CSS: &str = "body, body * { font-family: 'OpenDyslexic', 'Comic Sans MS', sans-serif !important; letter-spacing: 0.03em; }";
const READING_LINE_CSS: &str = "#clarify-reading-line { position: fixed; left: 0; right: 0; height: 2px; background: rgba(255, 200, 0, 0.9); pointer-events: none; z-index: 2147483647; }";
const REDUCED_MOTION_CSS: &str = "*, *::before, *::after { animation-duration: 0.001s !important; transition-duration: 0.001s !important; scroll-behavior: auto !important; }";
const LARGE_TARGETS_CSS: &str = "a, button, input, select, [role='button'] { min-width: 44px; min-height: 44px; }";

fn line_height_css(value: f32) -> String {
    format!(
        "body, body p, body li, body span {{ line-height: {} !important; }}",
        value
    )
}

fn color_blind_css(mode: ColorBlindMode) -> String {
    format!(
        "html.{}{} {{ filter: url('#clarify-{}-filter'); }}",
        COLOR_BLIND_CLASS_PREFIX,
        mode.as_str(),
        mode.as_str()
    )
}

fn color_blind_class(mode: ColorBlindMode) -> String {
    format!("{}{}", COLOR_BLIND_CLASS_PREFIX, mode.as_str())
}

/// Apply one effect message to the document.
pub fn apply(doc: &mut PageDocument, msg: &EffectMessage) {
    match *msg {
        EffectMessage::ToggleHighContrast { enabled } => {
            if enabled {
                doc.add_class(HIGH_CONTRAST_CLASS);
                doc.upsert_stylesheet(HIGH_CONTRAST_SHEET, HIGH_CONTRAST_CSS);
            } else {
                doc.remove_class(HIGH_CONTRAST_CLASS);
                doc.remove_stylesheet(HIGH_CONTRAST_SHEET);
            }
        }
        EffectMessage::ToggleDyslexiaFont { enabled } => {
            if enabled {
                doc.upsert_stylesheet(DYSLEXIA_FONT_SHEET, DYSLEXIA_FONT_CSS);
            } else {
                doc.remove_stylesheet(DYSLEXIA_FONT_SHEET);
            }
        }
        EffectMessage::ToggleReadingLine { enabled } => {
            if enabled {
                doc.upsert_stylesheet(READING_LINE_SHEET, READING_LINE_CSS);
                doc.add_overlay(READING_LINE_OVERLAY);
                doc.add_listener(READING_LINE_EVENT);
            } else {
                doc.remove_listener(READING_LINE_EVENT);
                doc.remove_overlay(READING_LINE_OVERLAY);
                doc.remove_stylesheet(READING_LINE_SHEET);
            }
        }
        EffectMessage::ToggleTextScaling { enabled, value } => {
            if enabled {
                doc.set_root_style(FONT_SIZE_STYLE, format!("{}%", value));
            } else {
                doc.remove_root_style(FONT_SIZE_STYLE);
            }
        }
        EffectMessage::UpdateTextScaling { value } => {
            // Only legal while active; otherwise leave no trace.
            if doc.root_style(FONT_SIZE_STYLE).is_some() {
                doc.set_root_style(FONT_SIZE_STYLE, format!("{}%", value));
            }
        }
        EffectMessage::ToggleLineHeight { enabled, value } => {
            if enabled {
                doc.upsert_stylesheet(LINE_HEIGHT_SHEET, line_height_css(value));
            } else {
                doc.remove_stylesheet(LINE_HEIGHT_SHEET);
            }
        }
        EffectMessage::UpdateLineHeight { value } => {
            if doc.has_stylesheet(LINE_HEIGHT_SHEET) {
                doc.upsert_stylesheet(LINE_HEIGHT_SHEET, line_height_css(value));
            }
        }
        EffectMessage::ToggleColorBlind { enabled, mode } => {
            clear_color_blind_classes(doc);
            if enabled {
                doc.add_class(&color_blind_class(mode));
                doc.upsert_stylesheet(COLOR_BLIND_SHEET, color_blind_css(mode));
            } else {
                doc.remove_stylesheet(COLOR_BLIND_SHEET);
            }
        }
        EffectMessage::UpdateColorBlind { mode } => {
            if doc.has_stylesheet(COLOR_BLIND_SHEET) {
                clear_color_blind_classes(doc);
                doc.add_class(&color_blind_class(mode));
                doc.upsert_stylesheet(COLOR_BLIND_SHEET, color_blind_css(mode));
            }
        }
        EffectMessage::ToggleReducedMotion { enabled } => {
            if enabled {
                doc.upsert_stylesheet(REDUCED_MOTION_SHEET, REDUCED_MOTION_CSS);
            } else {
                doc.remove_stylesheet(REDUCED_MOTION_SHEET);
            }
        }
        EffectMessage::ToggleLargeTargets { enabled } => {
            if enabled {
                doc.upsert_stylesheet(LARGE_TARGETS_SHEET, LARGE_TARGETS_CSS);
            } else {
                doc.remove_stylesheet(LARGE_TARGETS_SHEET);
            }
        }
    }
}

fn clear_color_blind_classes(doc: &mut PageDocument) {
    for mode in [
        ColorBlindMode::Deuteranopia,
        ColorBlindMode::Protanopia,
        ColorBlindMode::Tritanopia,
    ] {
        doc.remove_class(&color_blind_class(mode));
    }
}

/// Whether the effect message leaves the feature enabled in the document.
pub fn leaves_enabled(msg: &EffectMessage) -> Option<bool> {
    match *msg {
        EffectMessage::ToggleHighContrast { enabled }
        | EffectMessage::ToggleDyslexiaFont { enabled }
        | EffectMessage::ToggleReadingLine { enabled }
        | EffectMessage::ToggleTextScaling { enabled, .. }
        | EffectMessage::ToggleLineHeight { enabled, .. }
        | EffectMessage::ToggleColorBlind { enabled, .. }
        | EffectMessage::ToggleReducedMotion { enabled }
        | EffectMessage::ToggleLargeTargets { enabled } => Some(enabled),
        EffectMessage::UpdateTextScaling { .. }
        | EffectMessage::UpdateLineHeight { .. }
        | EffectMessage::UpdateColorBlind { .. } => None,
    }
}

/// Re-verify continuous effects after the tab becomes visible again. Some
/// navigation patterns tear down injected nodes without a full reload while
/// the listener registration survives.
pub fn reverify_continuous(doc: &mut PageDocument) {
    if doc.has_listener(READING_LINE_EVENT) && !doc.has_overlay(READING_LINE_OVERLAY) {
        tracing::debug!("Reading line overlay missing after visibility change, recreating");
        doc.upsert_stylesheet(READING_LINE_SHEET, READING_LINE_CSS);
        doc.add_overlay(READING_LINE_OVERLAY);
    }
}
