//! Browser backend over `web-sys`.
//!
//! Listeners are `gloo-events` handles and timers are `gloo-timers`
//! timeouts; both detach when dropped, which is what [`Subscription`] relies on.

use std::time::Duration;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, StorageEvent, Window,
};

use super::{Callback, Dom, ElementSpec, EventKind, FormControl, Handler, Propagation, Selector, Subscription};
use crate::error::{Result, SiteError};
use crate::state::session::{is_logged_in_value, SessionFlag};

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| SiteError::Dom("no window".to_string()))
}

/// Handle onto the page's live document
#[derive(Clone, Debug)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn new() -> Result<Self> {
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| SiteError::Dom("no document".to_string()))?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// True until the document has been fully parsed
    pub fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn control(element: Element) -> Option<FormControl<Element>> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return Some(FormControl {
                name: input.name(),
                kind: input.type_().to_lowercase(),
                required: input.required(),
                disabled: input.disabled(),
                value: input.value(),
                checked: input.checked(),
                node: element,
            });
        }
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Some(FormControl {
                name: select.name(),
                kind: "select".to_string(),
                required: select.required(),
                disabled: select.disabled(),
                value: select.value(),
                checked: false,
                node: element,
            });
        }
        if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            return Some(FormControl {
                name: area.name(),
                kind: "textarea".to_string(),
                required: area.required(),
                disabled: area.disabled(),
                value: area.value(),
                checked: false,
                node: element,
            });
        }
        None
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn query_all(&self, selector: Selector) -> Vec<Element> {
        self.document
            .query_selector_all(&selector.to_css())
            .map(elements)
            .unwrap_or_default()
    }

    fn query_within(&self, scope: &Element, selector: Selector) -> Vec<Element> {
        scope
            .query_selector_all(&selector.to_css())
            .map(elements)
            .unwrap_or_default()
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(el) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = el.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(drop)
        } else {
            style.set_property(property, value)
        };
        if result.is_err() {
            debug!(property, "style rejected");
        }
    }

    fn add_class(&self, node: &Element, class_name: &str) {
        let _ = node.class_list().add_1(class_name);
    }

    fn remove_class(&self, node: &Element, class_name: &str) {
        let _ = node.class_list().remove_1(class_name);
    }

    fn has_class(&self, node: &Element, class_name: &str) -> bool {
        node.class_list().contains(class_name)
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn create(&self, spec: &ElementSpec) -> Option<Element> {
        let el = self.document.create_element(&spec.tag).ok()?;
        if let Some(id) = &spec.id {
            el.set_id(id);
        }
        if let Some(class_name) = &spec.class_name {
            el.set_class_name(class_name);
        }
        for (name, value) in &spec.attributes {
            el.set_attribute(name, value).ok()?;
        }
        for (property, value) in &spec.styles {
            self.set_style(&el, property, value);
        }
        if let Some(text) = &spec.text {
            el.set_text_content(Some(text));
        }
        Some(el)
    }

    fn append(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn prepend(&self, parent: &Element, child: &Element) {
        let _ = parent.prepend_with_node_1(child);
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn controls(&self, form: &Element) -> Vec<FormControl<Element>> {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return Vec::new();
        };
        let elements = form.elements();
        (0..elements.length())
            .filter_map(|i| elements.item(i))
            .filter_map(Self::control)
            .collect()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn open_link(&self, url: &str) -> bool {
        matches!(self.window.open_with_url_and_target(url, "_blank"), Ok(Some(_)))
    }

    fn listen(&self, node: &Element, kind: EventKind, mut handler: Handler) -> Subscription {
        let listener = EventListener::new_with_options(
            node,
            kind.name(),
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if handler() == Propagation::PreventDefault {
                    event.prevent_default();
                }
            },
        );
        Subscription::new(move || drop(listener))
    }

    fn listen_once(&self, node: &Element, kind: EventKind, callback: Callback) -> Subscription {
        let listener = EventListener::once(node, kind.name(), move |_| callback());
        Subscription::new(move || drop(listener))
    }

    fn set_timeout(&self, delay: Duration, callback: Callback) -> Subscription {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, callback);
        Subscription::new(move || drop(timeout))
    }
}

/// Login flag read from `sessionStorage`, following `storage` events
#[derive(Clone, Debug)]
pub struct WebSession {
    window: Window,
    key: String,
}

impl WebSession {
    pub fn new(key: &str) -> Result<Self> {
        Ok(Self {
            window: window()?,
            key: key.to_string(),
        })
    }

    fn read(&self) -> Option<String> {
        let storage = self.window.session_storage().ok().flatten()?;
        storage.get_item(&self.key).ok().flatten()
    }
}

impl SessionFlag for WebSession {
    fn is_set(&self) -> bool {
        is_logged_in_value(self.read().as_deref())
    }

    fn subscribe(&self, mut on_change: Box<dyn FnMut()>) -> Subscription {
        let key = self.key.clone();
        let listener = EventListener::new(&self.window, "storage", move |event| {
            let Some(event) = event.dyn_ref::<StorageEvent>() else {
                return;
            };
            // A missing key means the whole store was cleared
            match event.key() {
                Some(changed) if changed != key => {}
                _ => on_change(),
            }
        });
        Subscription::new(move || drop(listener))
    }
}
