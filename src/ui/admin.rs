//! Admin-only affordances.
//!
//! Elements tagged `data-admin-only` are shown while the session flag is set
//! and `data-customer-only` elements while it is not. Each element may pick
//! its display mode through `data-admin-display` / `data-customer-display`.

use std::rc::{Rc, Weak};

use tracing::debug;

use crate::config::SiteConfig;
use crate::dom::{Dom, ElementSpec, Selector, Subscription};
use crate::state::session::SessionFlag;

pub const ADMIN_ONLY: &str = "data-admin-only";
pub const CUSTOMER_ONLY: &str = "data-customer-only";
pub const ADMIN_DISPLAY: &str = "data-admin-display";
pub const CUSTOMER_DISPLAY: &str = "data-customer-display";

/// Container the admin link is added to
pub const NAV_MENU_CLASS: &str = "nav-menu";
pub const NAV_LINK_CLASS: &str = "admin-nav-link";
pub const FAB_ID: &str = "adminFab";

const ADMIN_DEFAULT_DISPLAY: &str = "inline-block";
const CUSTOMER_DEFAULT_DISPLAY: &str = "block";

/// Show or hide every tagged element for the given login state
pub fn apply_visibility<D: Dom>(dom: &D, logged_in: bool) {
    let admin = dom.query_all(Selector::Attribute(ADMIN_ONLY));
    let customer = dom.query_all(Selector::Attribute(CUSTOMER_ONLY));

    for el in &admin {
        let display = if logged_in {
            dom.attribute(el, ADMIN_DISPLAY)
                .unwrap_or_else(|| ADMIN_DEFAULT_DISPLAY.to_string())
        } else {
            "none".to_string()
        };
        dom.set_style(el, "display", &display);
    }
    for el in &customer {
        let display = if logged_in {
            "none".to_string()
        } else {
            dom.attribute(el, CUSTOMER_DISPLAY)
                .unwrap_or_else(|| CUSTOMER_DEFAULT_DISPLAY.to_string())
        };
        dom.set_style(el, "display", &display);
    }

    debug!(
        logged_in,
        admin = admin.len(),
        customer = customer.len(),
        "admin visibility applied"
    );
}

/// Add a hidden admin entry to every nav menu that lacks one
pub fn inject_nav_links<D: Dom>(dom: &D, admin_page: &str) {
    for menu in dom.query_all(Selector::Class(NAV_MENU_CLASS)) {
        if !dom.query_within(&menu, Selector::Class(NAV_LINK_CLASS)).is_empty() {
            continue;
        }

        let item = ElementSpec::new("li")
            .with_class(NAV_LINK_CLASS)
            .with_attribute(ADMIN_ONLY, "")
            .with_attribute(ADMIN_DISPLAY, "inline-block")
            .with_style("display", "none");
        let link = ElementSpec::new("a")
            .with_attribute("href", admin_page)
            .with_attribute("title", "Admin Panel")
            .with_style("background", "#FFD700")
            .with_style("color", "#8B0000")
            .with_style("padding", "8px 16px")
            .with_style("border-radius", "20px")
            .with_style("font-weight", "600")
            .with_text("🔑 Admin");

        if let (Some(item), Some(link)) = (dom.create(&item), dom.create(&link)) {
            dom.append(&item, &link);
            dom.append(&menu, &item);
        }
    }
}

/// Add the hidden floating admin button unless it is already on the page
pub fn inject_floating_button<D: Dom>(dom: &D, admin_page: &str) {
    if dom.by_id(FAB_ID).is_some() {
        return;
    }
    let Some(body) = dom.body() else {
        return;
    };

    let fab = ElementSpec::new("a")
        .with_id(FAB_ID)
        .with_class("fab-admin")
        .with_attribute("href", admin_page)
        .with_attribute("title", "Admin Panel")
        .with_attribute(ADMIN_ONLY, "")
        .with_attribute(ADMIN_DISPLAY, "flex")
        .with_style("display", "none")
        .with_style("position", "fixed")
        .with_style("bottom", "100px")
        .with_style("right", "20px")
        .with_style("width", "56px")
        .with_style("height", "56px")
        .with_style("background", "#FFD700")
        .with_style("color", "#8B0000")
        .with_style("border-radius", "50%")
        .with_style("align-items", "center")
        .with_style("justify-content", "center")
        .with_style("box-shadow", "0 4px 12px rgba(0,0,0,0.3)")
        .with_style("z-index", "9998")
        .with_style("text-decoration", "none")
        .with_style("font-size", "1.5rem")
        .with_text("🔑");

    if let Some(fab) = dom.create(&fab) {
        dom.append(&body, &fab);
    }
}

struct Inner<D, S> {
    dom: D,
    session: S,
}

impl<D: Dom, S: SessionFlag> Inner<D, S> {
    fn refresh(&self) {
        apply_visibility(&self.dom, self.session.is_set());
    }
}

/// Keeps admin-tagged elements in step with the session flag
pub struct AdminVisibility<D: Dom, S: SessionFlag + 'static> {
    inner: Rc<Inner<D, S>>,
    _on_change: Subscription,
}

impl<D: Dom, S: SessionFlag + 'static> AdminVisibility<D, S> {
    /// Inject the admin affordances, apply the current flag and follow
    /// later flag changes until dropped
    pub fn attach(dom: &D, session: S, config: &SiteConfig) -> Self {
        inject_nav_links(dom, &config.admin_page);
        inject_floating_button(dom, &config.admin_page);

        let inner = Rc::new(Inner {
            dom: dom.clone(),
            session,
        });
        inner.refresh();

        let weak: Weak<Inner<D, S>> = Rc::downgrade(&inner);
        let on_change = inner.session.subscribe(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                debug!("session flag changed");
                inner.refresh();
            }
        }));

        Self {
            inner,
            _on_change: on_change,
        }
    }

    /// Current flag state
    pub fn is_logged_in(&self) -> bool {
        self.inner.session.is_set()
    }

    /// Re-read the flag and re-apply visibility now
    pub fn refresh(&self) {
        self.inner.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId};
    use crate::state::session::MemorySession;

    struct Page {
        dom: MemoryDom,
        menu: NodeId,
        admin_block: NodeId,
        admin_inline: NodeId,
        customer: NodeId,
        customer_flex: NodeId,
    }

    fn page() -> Page {
        let dom = MemoryDom::new();
        let body = dom.body_id();
        let menu = dom.element(body, ElementSpec::new("ul").with_class(NAV_MENU_CLASS));
        dom.element(menu, ElementSpec::new("li").with_text("Home"));
        let admin_block = dom.element(
            body,
            ElementSpec::new("div")
                .with_attribute(ADMIN_ONLY, "")
                .with_attribute(ADMIN_DISPLAY, "block"),
        );
        let admin_inline = dom.element(body, ElementSpec::new("span").with_attribute(ADMIN_ONLY, ""));
        let customer = dom.element(body, ElementSpec::new("div").with_attribute(CUSTOMER_ONLY, ""));
        let customer_flex = dom.element(
            body,
            ElementSpec::new("div")
                .with_attribute(CUSTOMER_ONLY, "")
                .with_attribute(CUSTOMER_DISPLAY, "flex"),
        );
        Page {
            dom,
            menu,
            admin_block,
            admin_inline,
            customer,
            customer_flex,
        }
    }

    fn display(dom: &MemoryDom, node: NodeId) -> Option<String> {
        dom.style(node, "display")
    }

    #[test]
    fn test_logged_in_shows_admin_hides_customer() {
        let p = page();
        let admin = AdminVisibility::attach(&p.dom, MemorySession::logged_in(), &SiteConfig::default());
        assert!(admin.is_logged_in());

        assert_eq!(display(&p.dom, p.admin_block).as_deref(), Some("block"));
        assert_eq!(display(&p.dom, p.admin_inline).as_deref(), Some("inline-block"));
        assert_eq!(display(&p.dom, p.customer).as_deref(), Some("none"));
        assert_eq!(display(&p.dom, p.customer_flex).as_deref(), Some("none"));

        let fab = p.dom.by_id(FAB_ID).unwrap();
        assert_eq!(display(&p.dom, fab).as_deref(), Some("flex"));
        let link = p.dom.query_all(Selector::Class(NAV_LINK_CLASS))[0];
        assert_eq!(display(&p.dom, link).as_deref(), Some("inline-block"));
    }

    #[test]
    fn test_any_other_value_is_logged_out() {
        for value in [None, Some("false"), Some("yes"), Some("")] {
            let p = page();
            let admin = AdminVisibility::attach(&p.dom, MemorySession::new(value), &SiteConfig::default());
            assert!(!admin.is_logged_in());

            assert_eq!(display(&p.dom, p.admin_block).as_deref(), Some("none"));
            assert_eq!(display(&p.dom, p.admin_inline).as_deref(), Some("none"));
            assert_eq!(display(&p.dom, p.customer).as_deref(), Some("block"));
            assert_eq!(display(&p.dom, p.customer_flex).as_deref(), Some("flex"));
            let fab = p.dom.by_id(FAB_ID).unwrap();
            assert_eq!(display(&p.dom, fab).as_deref(), Some("none"));
        }
    }

    #[test]
    fn test_injection_is_idempotent() {
        let p = page();
        let config = SiteConfig::default();
        let _first = AdminVisibility::attach(&p.dom, MemorySession::logged_out(), &config);
        let _second = AdminVisibility::attach(&p.dom, MemorySession::logged_out(), &config);

        assert_eq!(p.dom.query_within(&p.menu, Selector::Class(NAV_LINK_CLASS)).len(), 1);
        assert_eq!(p.dom.query_all(Selector::Class("fab-admin")).len(), 1);

        let link = p.dom.query_within(&p.menu, Selector::Tag("a"))[0];
        assert_eq!(p.dom.attribute(&link, "href").as_deref(), Some("admin.html"));
        assert_eq!(p.dom.text(link), "🔑 Admin");
    }

    #[test]
    fn test_follows_cross_tab_changes() {
        let p = page();
        let session = MemorySession::logged_out();
        let admin = AdminVisibility::attach(&p.dom, session.clone(), &SiteConfig::default());
        assert_eq!(display(&p.dom, p.admin_block).as_deref(), Some("none"));

        session.write(Some("true"));
        assert_eq!(display(&p.dom, p.admin_block).as_deref(), Some("block"));
        assert_eq!(display(&p.dom, p.customer).as_deref(), Some("none"));

        session.write(None);
        assert_eq!(display(&p.dom, p.admin_block).as_deref(), Some("none"));

        drop(admin);
        assert_eq!(session.subscriber_count(), 0);
        session.write(Some("true"));
        assert_eq!(display(&p.dom, p.admin_block).as_deref(), Some("none"));
    }

    #[test]
    fn test_refresh_picks_up_elements_added_later() {
        let p = page();
        let admin = AdminVisibility::attach(&p.dom, MemorySession::logged_in(), &SiteConfig::default());
        let late = p
            .dom
            .element(p.dom.body_id(), ElementSpec::new("button").with_attribute(ADMIN_ONLY, ""));
        assert_eq!(display(&p.dom, late), None);

        admin.refresh();
        assert_eq!(display(&p.dom, late).as_deref(), Some("inline-block"));
    }

    #[test]
    fn test_no_nav_menu_is_fine() {
        let dom = MemoryDom::new();
        let _admin = AdminVisibility::attach(&dom, MemorySession::logged_in(), &SiteConfig::default());
        assert!(dom.query_all(Selector::Class(NAV_LINK_CLASS)).is_empty());
        assert!(dom.by_id(FAB_ID).is_some());
    }
}
