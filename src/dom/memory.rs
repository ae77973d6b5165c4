//! In-memory document.
//!
//! A small element tree with listeners, a manual clock and a record of opened
//! links. It implements [`Dom`] with the same observable behaviour the page
//! controllers rely on in a browser, which makes the controllers testable
//! without one.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::{
    Callback, Dom, ElementSpec, EventKind, FormControl, Handler, Propagation, Selector,
    Subscription,
};

/// Index of an element in a [`MemoryDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    default_value: String,
    checked: bool,
    default_checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    scrolled: u32,
}

enum Listener {
    Repeat(Rc<RefCell<Handler>>),
    Once(Callback),
}

struct ListenerEntry {
    id: u64,
    node: NodeId,
    kind: EventKind,
    listener: Listener,
}

struct Timer {
    id: u64,
    due: Duration,
    callback: Callback,
}

struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    listeners: Vec<ListenerEntry>,
    timers: Vec<Timer>,
    now: Duration,
    next_id: u64,
    opened: Vec<String>,
    popups_blocked: bool,
}

impl Document {
    fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            listeners: Vec::new(),
            timers: Vec::new(),
            now: Duration::ZERO,
            next_id: 0,
            opened: Vec::new(),
            popups_blocked: false,
        };
        let root = doc.alloc(&ElementSpec::new("html"));
        let head = doc.alloc(&ElementSpec::new("head"));
        let body = doc.alloc(&ElementSpec::new("body"));
        doc.attach(root, head, false);
        doc.attach(root, body, false);
        doc.root = root;
        doc.head = head;
        doc.body = body;
        doc
    }

    fn alloc(&mut self, spec: &ElementSpec) -> NodeId {
        let mut data = NodeData {
            tag: spec.tag.to_lowercase(),
            id: spec.id.clone(),
            text: spec.text.clone().unwrap_or_default(),
            ..Default::default()
        };
        if let Some(class_name) = &spec.class_name {
            data.classes = class_name.split_whitespace().map(str::to_string).collect();
        }
        for (name, value) in &spec.attributes {
            match name.as_str() {
                "id" => data.id = Some(value.clone()),
                "class" => data.classes = value.split_whitespace().map(str::to_string).collect(),
                "value" => {
                    data.value = value.clone();
                    data.default_value = value.clone();
                }
                "checked" => {
                    data.checked = true;
                    data.default_checked = true;
                }
                _ => {}
            }
            data.attributes.insert(name.clone(), value.clone());
        }
        for (property, value) in &spec.styles {
            data.styles.insert(property.clone(), value.clone());
        }
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, first: bool) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        if first {
            children.insert(0, child);
        } else {
            children.push(child);
        }
    }

    /// Descendants of `scope` in document order, excluding `scope`
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, node: NodeId, selector: Selector) -> bool {
        let data = &self.nodes[node.0];
        match selector {
            Selector::Attribute(name) => match name {
                "id" => data.id.is_some(),
                "class" => !data.classes.is_empty(),
                _ => data.attributes.contains_key(name),
            },
            Selector::Class(name) => data.classes.iter().any(|c| c == name),
            Selector::Tag(name) => data.tag.eq_ignore_ascii_case(name),
            Selector::FragmentLink => {
                data.tag == "a"
                    && data
                        .attributes
                        .get("href")
                        .is_some_and(|href| href.starts_with('#'))
            }
        }
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared handle onto an in-memory document
#[derive(Clone)]
pub struct MemoryDom {
    doc: Rc<RefCell<Document>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doc = self.doc.borrow();
        f.debug_struct("MemoryDom")
            .field("nodes", &doc.nodes.len())
            .field("listeners", &doc.listeners.len())
            .field("timers", &doc.timers.len())
            .finish()
    }
}

impl MemoryDom {
    /// Empty document with `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        Self {
            doc: Rc::new(RefCell::new(Document::new())),
        }
    }

    // ========== Building ==========

    /// Create an element and append it to `parent`
    pub fn element(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let mut doc = self.doc.borrow_mut();
        let node = doc.alloc(&spec);
        doc.attach(parent, node, false);
        node
    }

    pub fn head_id(&self) -> NodeId {
        self.doc.borrow().head
    }

    pub fn body_id(&self) -> NodeId {
        self.doc.borrow().body
    }

    // ========== Simulated user input ==========

    pub fn set_value(&self, node: NodeId, value: &str) {
        self.doc.borrow_mut().nodes[node.0].value = value.to_string();
    }

    pub fn set_checked(&self, node: NodeId, checked: bool) {
        self.doc.borrow_mut().nodes[node.0].checked = checked;
    }

    /// Fire `kind` at `node`; reports whether a handler suppressed the default
    pub fn dispatch(&self, node: NodeId, kind: EventKind) -> Propagation {
        let mut repeat = Vec::new();
        let mut once = Vec::new();
        {
            let mut doc = self.doc.borrow_mut();
            let mut i = 0;
            while i < doc.listeners.len() {
                let entry = &doc.listeners[i];
                if entry.node != node || entry.kind != kind {
                    i += 1;
                    continue;
                }
                let handler = match &entry.listener {
                    Listener::Repeat(handler) => Some(handler.clone()),
                    Listener::Once(_) => None,
                };
                match handler {
                    Some(handler) => {
                        repeat.push(handler);
                        i += 1;
                    }
                    None => {
                        if let Listener::Once(callback) = doc.listeners.remove(i).listener {
                            once.push(callback);
                        }
                    }
                }
            }
        }

        let mut propagation = Propagation::Continue;
        for handler in repeat {
            let mut handler = handler.borrow_mut();
            if (&mut **handler)() == Propagation::PreventDefault {
                propagation = Propagation::PreventDefault;
            }
        }
        for callback in once {
            callback();
        }
        propagation
    }

    /// Move the clock forward, firing every timer that falls due
    pub fn advance(&self, by: Duration) {
        let target = self.doc.borrow().now + by;
        loop {
            let next = {
                let mut doc = self.doc.borrow_mut();
                let due = doc
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let timer = doc.timers.remove(i);
                    doc.now = timer.due;
                    timer.callback
                })
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.doc.borrow_mut().now = target;
    }

    pub fn set_popups_blocked(&self, blocked: bool) {
        self.doc.borrow_mut().popups_blocked = blocked;
    }

    // ========== Inspection ==========

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.doc.borrow().nodes[node.0].styles.get(property).cloned()
    }

    pub fn value(&self, node: NodeId) -> String {
        self.doc.borrow().nodes[node.0].value.clone()
    }

    pub fn text(&self, node: NodeId) -> String {
        self.doc.borrow().nodes[node.0].text.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.doc.borrow().nodes[node.0].children.clone()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.doc.borrow().is_connected(node)
    }

    pub fn scroll_count(&self, node: NodeId) -> u32 {
        self.doc.borrow().nodes[node.0].scrolled
    }

    pub fn opened_links(&self) -> Vec<String> {
        self.doc.borrow().opened.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.doc.borrow().listeners.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.doc.borrow().timers.len()
    }

    fn unsubscribe_listener(doc: &Weak<RefCell<Document>>, id: u64) -> Subscription {
        let doc = doc.clone();
        Subscription::new(move || {
            if let Some(doc) = doc.upgrade() {
                // Drop the handler only after the borrow ends; it may own
                // subscriptions of its own.
                let removed = {
                    let mut doc = doc.borrow_mut();
                    doc.listeners
                        .iter()
                        .position(|l| l.id == id)
                        .map(|i| doc.listeners.remove(i))
                };
                drop(removed);
            }
        })
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn query_all(&self, selector: Selector) -> Vec<NodeId> {
        let doc = self.doc.borrow();
        doc.descendants(doc.root)
            .into_iter()
            .filter(|n| doc.matches(*n, selector))
            .collect()
    }

    fn query_within(&self, scope: &NodeId, selector: Selector) -> Vec<NodeId> {
        let doc = self.doc.borrow();
        doc.descendants(*scope)
            .into_iter()
            .filter(|n| doc.matches(*n, selector))
            .collect()
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let doc = self.doc.borrow();
        doc.descendants(doc.root)
            .into_iter()
            .find(|n| doc.nodes[n.0].id.as_deref() == Some(id))
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.doc.borrow().head)
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.doc.borrow().body)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let doc = self.doc.borrow();
        let data = &doc.nodes[node.0];
        match name {
            "id" => data.id.clone(),
            "class" if data.classes.is_empty() => None,
            "class" => Some(data.classes.join(" ")),
            _ => data.attributes.get(name).cloned(),
        }
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut doc = self.doc.borrow_mut();
        let styles = &mut doc.nodes[node.0].styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn add_class(&self, node: &NodeId, class_name: &str) {
        let mut doc = self.doc.borrow_mut();
        let classes = &mut doc.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class_name) {
            classes.push(class_name.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class_name: &str) {
        self.doc.borrow_mut().nodes[node.0]
            .classes
            .retain(|c| c != class_name);
    }

    fn has_class(&self, node: &NodeId, class_name: &str) -> bool {
        self.doc.borrow().nodes[node.0]
            .classes
            .iter()
            .any(|c| c == class_name)
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        let mut doc = self.doc.borrow_mut();
        let children = std::mem::take(&mut doc.nodes[node.0].children);
        for child in children {
            doc.nodes[child.0].parent = None;
        }
        doc.nodes[node.0].text = text.to_string();
    }

    fn create(&self, spec: &ElementSpec) -> Option<NodeId> {
        Some(self.doc.borrow_mut().alloc(spec))
    }

    fn append(&self, parent: &NodeId, child: &NodeId) {
        self.doc.borrow_mut().attach(*parent, *child, false);
    }

    fn prepend(&self, parent: &NodeId, child: &NodeId) {
        self.doc.borrow_mut().attach(*parent, *child, true);
    }

    fn remove(&self, node: &NodeId) {
        self.doc.borrow_mut().detach(*node);
    }

    fn controls(&self, form: &NodeId) -> Vec<FormControl<NodeId>> {
        let doc = self.doc.borrow();
        doc.descendants(*form)
            .into_iter()
            .filter_map(|node| {
                let data = &doc.nodes[node.0];
                let kind = match data.tag.as_str() {
                    "input" => data
                        .attributes
                        .get("type")
                        .map(|t| t.to_lowercase())
                        .unwrap_or_else(|| "text".to_string()),
                    "select" | "textarea" => data.tag.clone(),
                    _ => return None,
                };
                Some(FormControl {
                    node,
                    name: data.attributes.get("name").cloned().unwrap_or_default(),
                    kind,
                    required: data.attributes.contains_key("required"),
                    disabled: data.attributes.contains_key("disabled"),
                    value: data.value.clone(),
                    checked: data.checked,
                })
            })
            .collect()
    }

    fn reset_form(&self, form: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        for node in doc.descendants(*form) {
            let data = &mut doc.nodes[node.0];
            data.value = data.default_value.clone();
            data.checked = data.default_checked;
        }
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.doc.borrow_mut().nodes[node.0].scrolled += 1;
    }

    fn open_link(&self, url: &str) -> bool {
        let mut doc = self.doc.borrow_mut();
        if doc.popups_blocked {
            return false;
        }
        doc.opened.push(url.to_string());
        true
    }

    fn listen(&self, node: &NodeId, kind: EventKind, handler: Handler) -> Subscription {
        let id = {
            let mut doc = self.doc.borrow_mut();
            let id = doc.next_id();
            doc.listeners.push(ListenerEntry {
                id,
                node: *node,
                kind,
                listener: Listener::Repeat(Rc::new(RefCell::new(handler))),
            });
            id
        };
        Self::unsubscribe_listener(&Rc::downgrade(&self.doc), id)
    }

    fn listen_once(&self, node: &NodeId, kind: EventKind, callback: Callback) -> Subscription {
        let id = {
            let mut doc = self.doc.borrow_mut();
            let id = doc.next_id();
            doc.listeners.push(ListenerEntry {
                id,
                node: *node,
                kind,
                listener: Listener::Once(callback),
            });
            id
        };
        Self::unsubscribe_listener(&Rc::downgrade(&self.doc), id)
    }

    fn set_timeout(&self, delay: Duration, callback: Callback) -> Subscription {
        let id = {
            let mut doc = self.doc.borrow_mut();
            let id = doc.next_id();
            let due = doc.now + delay;
            doc.timers.push(Timer { id, due, callback });
            id
        };
        let doc = Rc::downgrade(&self.doc);
        Subscription::new(move || {
            if let Some(doc) = doc.upgrade() {
                let removed = {
                    let mut doc = doc.borrow_mut();
                    doc.timers
                        .iter()
                        .position(|t| t.id == id)
                        .map(|i| doc.timers.remove(i))
                };
                drop(removed);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_queries_skip_detached_nodes() {
        let dom = MemoryDom::new();
        let body = dom.body_id();
        let a = dom.element(body, ElementSpec::new("div").with_class("tile"));
        let b = dom.element(a, ElementSpec::new("div").with_class("tile"));
        assert_eq!(dom.query_all(Selector::Class("tile")), vec![a, b]);
        assert_eq!(dom.query_within(&a, Selector::Class("tile")), vec![b]);

        dom.remove(&a);
        assert!(dom.query_all(Selector::Class("tile")).is_empty());
        assert!(!dom.is_connected(b));
    }

    #[test]
    fn test_once_listener_fires_once() {
        let dom = MemoryDom::new();
        let input = dom.element(dom.body_id(), ElementSpec::new("input"));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = dom.listen_once(&input, EventKind::Input, Box::new(move || h.set(h.get() + 1)));

        dom.dispatch(input, EventKind::Input);
        dom.dispatch(input, EventKind::Input);
        assert_eq!(hits.get(), 1);
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let dom = MemoryDom::new();
        let button = dom.element(dom.body_id(), ElementSpec::new("button"));
        let sub = dom.listen(&button, EventKind::Click, Box::new(|| Propagation::PreventDefault));
        assert_eq!(dom.dispatch(button, EventKind::Click), Propagation::PreventDefault);

        drop(sub);
        assert_eq!(dom.dispatch(button, EventKind::Click), Propagation::Continue);
    }

    #[test]
    fn test_timers_fire_in_order() {
        let dom = MemoryDom::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let _late = dom.set_timeout(Duration::from_secs(2), Box::new(move || l.borrow_mut().push("late")));
        let l = log.clone();
        let _early = dom.set_timeout(Duration::from_secs(1), Box::new(move || l.borrow_mut().push("early")));

        dom.advance(Duration::from_millis(999));
        assert!(log.borrow().is_empty());
        dom.advance(Duration::from_secs(5));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let dom = MemoryDom::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let timer = dom.set_timeout(Duration::from_secs(1), Box::new(move || f.set(true)));
        drop(timer);
        dom.advance(Duration::from_secs(2));
        assert!(!fired.get());
        assert_eq!(dom.pending_timers(), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let dom = MemoryDom::new();
        let form = dom.element(dom.body_id(), ElementSpec::new("form"));
        let name = dom.element(form, ElementSpec::new("input").with_attribute("name", "n"));
        let unit = dom.element(
            form,
            ElementSpec::new("input")
                .with_attribute("name", "unit")
                .with_attribute("value", "inches"),
        );
        dom.set_value(name, "Asha");
        dom.set_value(unit, "cm");

        dom.reset_form(&form);
        assert_eq!(dom.value(name), "");
        assert_eq!(dom.value(unit), "inches");
    }
}
