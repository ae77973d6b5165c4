//! Document access used by the page controllers.
//!
//! Controllers only talk to the [`Dom`] trait. The browser build implements it
//! over `web-sys` (see `web.rs`); tests and tools use the in-memory
//! [`MemoryDom`]. Every listener and timer hands back a [`Subscription`] that
//! detaches on drop, so a controller's lifetime bounds everything it wired up.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;
use std::time::Duration;

use crate::state::data::FormFieldSet;

pub use memory::{MemoryDom, NodeId};

/// The subset of CSS selectors the controllers need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `[name]`
    Attribute(&'static str),
    /// `.name`
    Class(&'static str),
    /// `tag`
    Tag(&'static str),
    /// `a[href^="#"]`
    FragmentLink,
}

impl Selector {
    pub fn to_css(self) -> String {
        match self {
            Selector::Attribute(name) => format!("[{}]", name),
            Selector::Class(name) => format!(".{}", name),
            Selector::Tag(name) => name.to_string(),
            Selector::FragmentLink => "a[href^=\"#\"]".to_string(),
        }
    }
}

/// Events the controllers listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Submit,
    Input,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Submit => "submit",
            EventKind::Input => "input",
        }
    }
}

/// Whether a handler wants the browser's default action suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    PreventDefault,
}

/// Description of an element to create
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub text: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.push((property.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

/// Snapshot of one form control
#[derive(Debug, Clone, PartialEq)]
pub struct FormControl<N> {
    pub node: N,
    pub name: String,
    /// `type` for inputs, otherwise the tag name (`select`, `textarea`)
    pub kind: String,
    pub required: bool,
    pub disabled: bool,
    pub value: String,
    pub checked: bool,
}

impl<N> FormControl<N> {
    /// Value this control contributes to a form submission, if any.
    ///
    /// Mirrors `FormData`: unnamed, disabled and button-like controls are
    /// skipped; checkboxes and radios only count when checked and default to
    /// `"on"`.
    pub fn submitted_value(&self) -> Option<&str> {
        if self.name.is_empty() || self.disabled {
            return None;
        }
        match self.kind.as_str() {
            "submit" | "button" | "reset" | "image" | "file" => None,
            "checkbox" | "radio" if !self.checked => None,
            "checkbox" | "radio" if self.value.is_empty() => Some("on"),
            _ => Some(&self.value),
        }
    }
}

/// Detach handle for a listener or timer. Dropping it detaches.
#[must_use = "dropping a Subscription detaches it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to detach
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Keep the underlying listener alive for the rest of the page's life
    pub fn forget(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.cancel.is_some())
            .finish()
    }
}

/// Handler for repeatable events
pub type Handler = Box<dyn FnMut() -> Propagation>;

/// Callback for one-shot listeners and timers
pub type Callback = Box<dyn FnOnce()>;

/// Live document operations.
///
/// Implementations are cheap handles (`Clone`) onto one document, so
/// callbacks can capture their own copy.
pub trait Dom: Clone + 'static {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    // ========== Lookup ==========

    fn query_all(&self, selector: Selector) -> Vec<Self::Node>;
    fn query_within(&self, scope: &Self::Node, selector: Selector) -> Vec<Self::Node>;
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    fn head(&self) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    // ========== Mutation ==========

    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn add_class(&self, node: &Self::Node, class_name: &str);
    fn remove_class(&self, node: &Self::Node, class_name: &str);
    fn has_class(&self, node: &Self::Node, class_name: &str) -> bool;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn create(&self, spec: &ElementSpec) -> Option<Self::Node>;
    fn append(&self, parent: &Self::Node, child: &Self::Node);
    fn prepend(&self, parent: &Self::Node, child: &Self::Node);
    fn remove(&self, node: &Self::Node);

    // ========== Forms ==========

    /// Inputs, selects and textareas of a form, in document order
    fn controls(&self, form: &Self::Node) -> Vec<FormControl<Self::Node>>;
    fn reset_form(&self, form: &Self::Node);

    /// Field set a submission of `form` would carry
    fn form_data(&self, form: &Self::Node) -> FormFieldSet {
        let mut fields = FormFieldSet::new();
        for control in self.controls(form) {
            if let Some(value) = control.submitted_value() {
                fields.insert(control.name.as_str(), value);
            }
        }
        fields
    }

    // ========== Navigation ==========

    fn scroll_into_view(&self, node: &Self::Node);
    /// Open `url` in a new browsing context; false when the browser refused
    fn open_link(&self, url: &str) -> bool;

    // ========== Events ==========

    fn listen(&self, node: &Self::Node, kind: EventKind, handler: Handler) -> Subscription;
    fn listen_once(&self, node: &Self::Node, kind: EventKind, callback: Callback) -> Subscription;
    fn set_timeout(&self, delay: Duration, callback: Callback) -> Subscription;
}
