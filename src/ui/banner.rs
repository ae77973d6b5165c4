use std::time::Duration;

use crate::dom::{Dom, ElementSpec, Subscription};

/// Class shared by every status banner
pub const ALERT_CLASS: &str = "alert";

/// Banner flavour, mapped to `alert-success` / `alert-error`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    fn class_name(self) -> &'static str {
        match self {
            BannerKind::Success => "alert alert-success",
            BannerKind::Error => "alert alert-error",
        }
    }
}

/// A transient banner shown as the first child of its host.
///
/// The banner removes itself after its delay. Only the element created here
/// is ever removed; `.alert` markup that ships with the page is left alone.
pub struct Banner<D: Dom> {
    dom: D,
    node: D::Node,
    _timer: Subscription,
}

impl<D: Dom> Banner<D> {
    pub fn show(dom: &D, host: &D::Node, kind: BannerKind, text: &str, delay: Duration) -> Option<Self> {
        let node = dom.create(
            &ElementSpec::new("div")
                .with_class(kind.class_name())
                .with_text(text),
        )?;
        dom.prepend(host, &node);

        let remover = dom.clone();
        let target = node.clone();
        let timer = dom.set_timeout(delay, Box::new(move || remover.remove(&target)));

        Some(Self {
            dom: dom.clone(),
            node,
            _timer: timer,
        })
    }

    pub fn node(&self) -> &D::Node {
        &self.node
    }

    /// Take the banner down now and cancel its timer
    pub fn dismiss(self) {
        self.dom.remove(&self.node);
    }
}
