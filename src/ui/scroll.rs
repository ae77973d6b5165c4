use tracing::debug;

use crate::dom::{Dom, EventKind, Propagation, Selector, Subscription};

/// Smooth scrolling for same-page `#fragment` links
pub struct SmoothScroll<D: Dom> {
    dom: D,
    _on_click: Vec<Subscription>,
}

/// Scroll to the element named by a `#id` href. Returns whether a target was
/// found; a bare `#` never matches.
fn follow<D: Dom>(dom: &D, href: &str) -> bool {
    let id = href.strip_prefix('#').unwrap_or(href);
    if id.is_empty() {
        return false;
    }
    match dom.by_id(id) {
        Some(target) => {
            dom.scroll_into_view(&target);
            true
        }
        None => {
            debug!(href, "no scroll target");
            false
        }
    }
}

impl<D: Dom> SmoothScroll<D> {
    pub fn attach(dom: &D) -> Self {
        let on_click = dom
            .query_all(Selector::FragmentLink)
            .into_iter()
            .map(|link| {
                let handle = dom.clone();
                let anchor = link.clone();
                dom.listen(
                    &link,
                    EventKind::Click,
                    Box::new(move || {
                        if let Some(href) = handle.attribute(&anchor, "href") {
                            follow(&handle, &href);
                        }
                        Propagation::PreventDefault
                    }),
                )
            })
            .collect();

        Self {
            dom: dom.clone(),
            _on_click: on_click,
        }
    }

    pub fn follow(&self, href: &str) -> bool {
        follow(&self.dom, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDom};

    #[test]
    fn test_link_click_scrolls_to_target() {
        let dom = MemoryDom::new();
        let body = dom.body_id();
        let link = dom.element(body, ElementSpec::new("a").with_attribute("href", "#contact"));
        let section = dom.element(body, ElementSpec::new("section").with_id("contact"));
        let _scroll = SmoothScroll::attach(&dom);

        assert_eq!(dom.dispatch(link, EventKind::Click), Propagation::PreventDefault);
        assert_eq!(dom.scroll_count(section), 1);
    }

    #[test]
    fn test_missing_target_is_a_no_op() {
        let dom = MemoryDom::new();
        let body = dom.body_id();
        let missing = dom.element(body, ElementSpec::new("a").with_attribute("href", "#nowhere"));
        let bare = dom.element(body, ElementSpec::new("a").with_attribute("href", "#"));
        let scroll = SmoothScroll::attach(&dom);

        assert_eq!(dom.dispatch(missing, EventKind::Click), Propagation::PreventDefault);
        assert_eq!(dom.dispatch(bare, EventKind::Click), Propagation::PreventDefault);
        assert!(!scroll.follow("#nowhere"));
        assert!(!scroll.follow("#"));
        assert_eq!(dom.scroll_count(body), 0);
    }

    #[test]
    fn test_other_links_untouched() {
        let dom = MemoryDom::new();
        let external = dom.element(
            dom.body_id(),
            ElementSpec::new("a").with_attribute("href", "booking.html"),
        );
        let _scroll = SmoothScroll::attach(&dom);
        assert_eq!(dom.dispatch(external, EventKind::Click), Propagation::Continue);
    }
}
