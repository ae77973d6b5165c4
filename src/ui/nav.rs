use std::rc::{Rc, Weak};

use crate::dom::{Dom, EventKind, Propagation, Selector, Subscription};

pub const TOGGLE_ID: &str = "navToggle";
pub const MENU_ID: &str = "navMenu";
const OPEN_CLASS: &str = "active";
const OPEN_ICON: &str = "✕";
const CLOSED_ICON: &str = "☰";

struct Inner<D: Dom> {
    dom: D,
    toggle: D::Node,
    menu: D::Node,
}

impl<D: Dom> Inner<D> {
    fn toggle(&self) {
        let open = !self.dom.has_class(&self.menu, OPEN_CLASS);
        if open {
            self.dom.add_class(&self.menu, OPEN_CLASS);
        } else {
            self.dom.remove_class(&self.menu, OPEN_CLASS);
        }
        self.dom
            .set_text(&self.toggle, if open { OPEN_ICON } else { CLOSED_ICON });
    }

    fn close(&self) {
        self.dom.remove_class(&self.menu, OPEN_CLASS);
        self.dom.set_text(&self.toggle, CLOSED_ICON);
    }
}

/// Mobile menu button
pub struct NavToggle<D: Dom> {
    inner: Rc<Inner<D>>,
    _listeners: Vec<Subscription>,
}

impl<D: Dom> NavToggle<D> {
    /// `None` unless both `#navToggle` and `#navMenu` exist
    pub fn attach(dom: &D) -> Option<Self> {
        let toggle = dom.by_id(TOGGLE_ID)?;
        let menu = dom.by_id(MENU_ID)?;
        let inner = Rc::new(Inner {
            dom: dom.clone(),
            toggle: toggle.clone(),
            menu: menu.clone(),
        });

        let weak: Weak<Inner<D>> = Rc::downgrade(&inner);
        let mut listeners = vec![dom.listen(
            &toggle,
            EventKind::Click,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.toggle();
                }
                Propagation::Continue
            }),
        )];

        for link in dom.query_within(&menu, Selector::Tag("a")) {
            let weak = Rc::downgrade(&inner);
            listeners.push(dom.listen(
                &link,
                EventKind::Click,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.close();
                    }
                    Propagation::Continue
                }),
            ));
        }

        Some(Self {
            inner,
            _listeners: listeners,
        })
    }

    pub fn toggle(&self) {
        self.inner.toggle();
    }

    pub fn close(&self) {
        self.inner.close();
    }
}
