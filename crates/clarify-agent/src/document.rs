//! In-tab document model the effect handlers mutate.
//!
//! This is the agent's view of the page: root classes, injected stylesheets
//! keyed by logical asset name, inline root styles, attached listeners, and
//! overlay nodes. All mutations are check-before-insert so re-applying an
//! effect leaves the document unchanged.

use std::collections::{BTreeMap, BTreeSet};

/// Document ready state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentReadyState {
    /// Parsing; `document.body` may not exist yet.
    #[default]
    Loading,
    /// The body exists and can be mutated.
    Interactive,
    /// The document and all sub-resources have finished loading.
    Complete,
}

/// Visibility state of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
}

/// One tab's document, as far as the agent is concerned.
#[derive(Debug, Default)]
pub struct PageDocument {
    ready_state: DocumentReadyState,
    visibility: VisibilityState,
    root_classes: BTreeSet<String>,
    root_styles: BTreeMap<String, String>,
    stylesheets: BTreeMap<String, String>,
    listeners: BTreeSet<String>,
    overlays: BTreeSet<String>,
}

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document that is already past the body-exists barrier.
    pub fn interactive() -> Self {
        Self {
            ready_state: DocumentReadyState::Interactive,
            ..Self::default()
        }
    }

    pub fn ready_state(&self) -> DocumentReadyState {
        self.ready_state
    }

    /// Whether DOM writes are safe yet.
    pub fn body_exists(&self) -> bool {
        self.ready_state != DocumentReadyState::Loading
    }

    pub fn mark_interactive(&mut self) {
        if self.ready_state == DocumentReadyState::Loading {
            self.ready_state = DocumentReadyState::Interactive;
        }
    }

    pub fn mark_complete(&mut self) {
        self.ready_state = DocumentReadyState::Complete;
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: VisibilityState) {
        self.visibility = visibility;
    }

    // Root classes

    pub fn has_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    /// Returns true if the class was newly added.
    pub fn add_class(&mut self, class: &str) -> bool {
        self.root_classes.insert(class.to_string())
    }

    pub fn remove_class(&mut self, class: &str) -> bool {
        self.root_classes.remove(class)
    }

    pub fn class_count(&self) -> usize {
        self.root_classes.len()
    }

    // Inline root styles

    pub fn root_style(&self, property: &str) -> Option<&str> {
        self.root_styles.get(property).map(String::as_str)
    }

    pub fn set_root_style(&mut self, property: &str, value: impl Into<String>) {
        self.root_styles.insert(property.to_string(), value.into());
    }

    pub fn remove_root_style(&mut self, property: &str) -> bool {
        self.root_styles.remove(property).is_some()
    }

    // Injected stylesheets

    pub fn has_stylesheet(&self, name: &str) -> bool {
        self.stylesheets.contains_key(name)
    }

    /// Insert or replace the stylesheet with this logical name. There is
    /// never more than one node per name.
    pub fn upsert_stylesheet(&mut self, name: &str, css: impl Into<String>) {
        self.stylesheets.insert(name.to_string(), css.into());
    }

    pub fn remove_stylesheet(&mut self, name: &str) -> bool {
        self.stylesheets.remove(name).is_some()
    }

    pub fn stylesheet(&self, name: &str) -> Option<&str> {
        self.stylesheets.get(name).map(String::as_str)
    }

    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    // Listeners

    pub fn has_listener(&self, event: &str) -> bool {
        self.listeners.contains(event)
    }

    pub fn add_listener(&mut self, event: &str) -> bool {
        self.listeners.insert(event.to_string())
    }

    pub fn remove_listener(&mut self, event: &str) -> bool {
        self.listeners.remove(event)
    }

    // Overlay nodes

    pub fn has_overlay(&self, id: &str) -> bool {
        self.overlays.contains(id)
    }

    pub fn add_overlay(&mut self, id: &str) -> bool {
        self.overlays.insert(id.to_string())
    }

    pub fn remove_overlay(&mut self, id: &str) -> bool {
        self.overlays.remove(id)
    }

    /// Simulates the silent teardown some navigation patterns perform:
    /// injected overlay nodes disappear without the listeners going away.
    pub fn drop_overlays(&mut self) {
        self.overlays.clear();
    }

    /// True when no effect has left any trace.
    pub fn is_pristine(&self) -> bool {
        self.root_classes.is_empty()
            && self.root_styles.is_empty()
            && self.stylesheets.is_empty()
            && self.listeners.is_empty()
            && self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_state_transitions() {
        let mut doc = PageDocument::new();
        assert_eq!(doc.ready_state(), DocumentReadyState::Loading);
        assert!(!doc.body_exists());

        doc.mark_interactive();
        assert_eq!(doc.ready_state(), DocumentReadyState::Interactive);
        assert!(doc.body_exists());

        doc.mark_complete();
        assert_eq!(doc.ready_state(), DocumentReadyState::Complete);
    }

    #[test]
    fn test_class_insert_is_checked() {
        let mut doc = PageDocument::interactive();
        assert!(doc.add_class("clarify-high-contrast"));
        assert!(!doc.add_class("clarify-high-contrast"));
        assert_eq!(doc.class_count(), 1);
    }

    #[test]
    fn test_stylesheet_upsert_replaces() {
        let mut doc = PageDocument::interactive();
        doc.upsert_stylesheet("line-height.css", "a");
        doc.upsert_stylesheet("line-height.css", "b");
        assert_eq!(doc.stylesheet_count(), 1);
        assert_eq!(doc.stylesheet("line-height.css"), Some("b"));
    }

    #[test]
    fn test_pristine() {
        let mut doc = PageDocument::interactive();
        assert!(doc.is_pristine());
        doc.add_listener("pointermove");
        assert!(!doc.is_pristine());
        doc.remove_listener("pointermove");
        assert!(doc.is_pristine());
    }
}
