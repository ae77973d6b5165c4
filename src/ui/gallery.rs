//! Gallery category filter.

use std::rc::{Rc, Weak};

use tracing::debug;

use crate::dom::{Dom, ElementSpec, EventKind, Propagation, Selector, Subscription};
use crate::state::data::filter_matches;

pub const FILTER_BUTTON_CLASS: &str = "filter-btn";
pub const ITEM_CLASS: &str = "gallery-item";
pub const ACTIVE_CLASS: &str = "active";
pub const FILTER_ATTR: &str = "data-filter";
pub const CATEGORY_ATTR: &str = "data-category";

/// Animation applied to items that become visible
pub const FADE_IN: &str = "fadeIn 0.5s";
const KEYFRAMES_ID: &str = "gallery-fade-in";
const KEYFRAMES: &str = "@keyframes fadeIn { from { opacity: 0; transform: translateY(10px); } to { opacity: 1; transform: translateY(0); } }";

/// Make sure the `fadeIn` keyframes exist on the page, in `<head>` when
/// the document has one
fn ensure_keyframes<D: Dom>(dom: &D) {
    if dom.by_id(KEYFRAMES_ID).is_some() {
        return;
    }
    let Some(host) = dom.head().or_else(|| dom.body()) else {
        return;
    };
    let spec = ElementSpec::new("style").with_id(KEYFRAMES_ID).with_text(KEYFRAMES);
    if let Some(style) = dom.create(&spec) {
        dom.append(&host, &style);
    }
}

struct Inner<D: Dom> {
    dom: D,
    buttons: Vec<D::Node>,
}

impl<D: Dom> Inner<D> {
    fn select(&self, button: &D::Node) {
        for other in &self.buttons {
            self.dom.remove_class(other, ACTIVE_CLASS);
        }
        self.dom.add_class(button, ACTIVE_CLASS);

        match self.dom.attribute(button, FILTER_ATTR) {
            Some(filter) => self.apply(&filter),
            None => debug!("filter button without data-filter"),
        }
    }

    fn apply(&self, filter: &str) {
        let mut shown = 0;
        for item in self.dom.query_all(Selector::Class(ITEM_CLASS)) {
            let category = self.dom.attribute(&item, CATEGORY_ATTR);
            if filter_matches(filter, category.as_deref()) {
                self.dom.set_style(&item, "display", "block");
                self.dom.set_style(&item, "animation", FADE_IN);
                shown += 1;
            } else {
                self.dom.set_style(&item, "display", "none");
            }
        }
        debug!(filter, shown, "gallery filtered");
    }
}

/// Click handling for the gallery filter buttons
pub struct GalleryFilter<D: Dom> {
    inner: Rc<Inner<D>>,
    _on_click: Vec<Subscription>,
}

impl<D: Dom> GalleryFilter<D> {
    pub fn attach(dom: &D) -> Self {
        ensure_keyframes(dom);

        let inner = Rc::new(Inner {
            dom: dom.clone(),
            buttons: dom.query_all(Selector::Class(FILTER_BUTTON_CLASS)),
        });

        let on_click = inner
            .buttons
            .iter()
            .map(|button| {
                let weak: Weak<Inner<D>> = Rc::downgrade(&inner);
                let target = button.clone();
                dom.listen(
                    button,
                    EventKind::Click,
                    Box::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.select(&target);
                        }
                        Propagation::Continue
                    }),
                )
            })
            .collect();

        Self {
            inner,
            _on_click: on_click,
        }
    }

    /// Activate `button` and filter by its `data-filter`
    pub fn select(&self, button: &D::Node) {
        self.inner.select(button);
    }

    /// Show only items whose category matches `filter` (`all` shows every item)
    pub fn apply(&self, filter: &str) {
        self.inner.apply(filter);
    }
}
