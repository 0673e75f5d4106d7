//! The seam between the extraction engine and a live (or recorded) page.
//!
//! Every navigation and extraction step talks to the page only through
//! [`Page`]. [`ChromePage`](crate::browser::ChromePage) drives a real tab;
//! [`SnapshotPage`](crate::browser::SnapshotPage) replays captured HTML.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a named sub-document of the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle {
    pub name: String,
}

impl FrameHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Document an operation runs against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// The top-level document
    Document,
    /// A sub-document located by the frame locator
    Frame(FrameHandle),
}

impl Scope {
    pub fn frame(name: impl Into<String>) -> Self {
        Scope::Frame(FrameHandle::new(name))
    }

    pub fn label(&self) -> &str {
        match self {
            Scope::Document => "document",
            Scope::Frame(frame) => &frame.name,
        }
    }
}

impl From<FrameHandle> for Scope {
    fn from(frame: FrameHandle) -> Self {
        Scope::Frame(frame)
    }
}

/// Reference to an element found in a scope, with a snapshot of its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Scope the element lives in
    pub scope: Scope,

    /// Page-specific reference used to address the element again
    pub node_ref: String,

    /// Lower-case tag name
    pub tag_name: String,

    /// Trimmed text content at lookup time
    pub text: String,

    /// `value` attribute or property, if any
    pub value: Option<String>,

    /// `title` attribute, if any
    pub title: Option<String>,
}

impl ElementHandle {
    pub fn new(scope: Scope, node_ref: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            scope,
            node_ref: node_ref.into(),
            tag_name: tag_name.into(),
            text: String::new(),
            value: None,
            title: None,
        }
    }

    /// Builder method: set text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder method: set value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder method: set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One `<option>` of a native selection control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeOption {
    pub index: usize,
    pub text: String,
    pub value: String,
    #[serde(default)]
    pub title: String,
}

/// Synthetic DOM events dispatched at an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomEvent {
    Click,
    MouseDown,
    MouseUp,
    Focus,
    Change,
    Input,
    KeyDown(String),
}

impl DomEvent {
    pub fn name(&self) -> &str {
        match self {
            DomEvent::Click => "click",
            DomEvent::MouseDown => "mousedown",
            DomEvent::MouseUp => "mouseup",
            DomEvent::Focus => "focus",
            DomEvent::Change => "change",
            DomEvent::Input => "input",
            DomEvent::KeyDown(_) => "keydown",
        }
    }
}

/// Operations the engine needs from a browsing session.
///
/// Lookups return `Ok(None)` for a clean miss and `Err` when the lookup
/// itself broke (malformed selector, detached frame); callers in the
/// resolver treat both as a miss.
pub trait Page {
    /// First attached element matching `selector` in `scope`
    fn query(&self, scope: &Scope, selector: &str) -> Result<Option<ElementHandle>>;

    /// Every element matching `selector` in `scope`, in document order
    fn query_all(&self, scope: &Scope, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Nearest ancestor of `element` (or the element itself) matching `selector`
    fn closest(&self, element: &ElementHandle, selector: &str) -> Result<Option<ElementHandle>>;

    /// Names of every sub-document currently attached, nested ones included
    fn frame_names(&self) -> Result<Vec<String>>;

    /// Click an element
    fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Dispatch synthetic events at an element, in order
    fn dispatch(&self, element: &ElementHandle, events: &[DomEvent]) -> Result<()>;

    /// Focus a text input, select its current content and type `text` over it
    fn fill(&self, element: &ElementHandle, text: &str) -> Result<()>;

    /// Press a key on whatever element currently has focus
    fn press_key(&self, key: &str) -> Result<()>;

    /// Options of a native `<select>`
    fn native_options(&self, select: &ElementHandle) -> Result<Vec<NativeOption>>;

    /// Select option `index` of a native `<select>` and notify its listeners
    /// (change and input events, plus any inline `onchange` handler)
    fn choose_native_option(&self, select: &ElementHandle, index: usize) -> Result<()>;

    /// Currently selected option of a native `<select>`
    fn selected_native_option(&self, select: &ElementHandle) -> Result<Option<NativeOption>>;

    /// Serialized markup of the whole scope
    fn html(&self, scope: &Scope) -> Result<String>;

    /// Fixed settle delay
    fn settle(&self, delay: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_label() {
        assert_eq!(Scope::Document.label(), "document");
        assert_eq!(Scope::frame("contentframe").label(), "contentframe");
        assert_eq!(Scope::from(FrameHandle::new("sidebarframe")), Scope::frame("sidebarframe"));
    }

    #[test]
    fn test_element_handle_builder() {
        let handle = ElementHandle::new(Scope::Document, "r1", "option")
            .with_text("2 PC Set 01")
            .with_value("123")
            .with_title("2 PC Set");

        assert_eq!(handle.text, "2 PC Set 01");
        assert_eq!(handle.value.as_deref(), Some("123"));
        assert_eq!(handle.title.as_deref(), Some("2 PC Set"));
    }

    #[test]
    fn test_dom_event_names() {
        assert_eq!(DomEvent::MouseDown.name(), "mousedown");
        assert_eq!(DomEvent::KeyDown("ArrowDown".to_string()).name(), "keydown");
    }
}
