//! Booking form controller.
//!
//! Wires `#bookingForm` to the booking pipeline: validate the controls, build
//! the message, hand it off through the messaging deep-link and reset the form.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::booking::validate::PHONE_ERROR;
use crate::booking::{deep_link, validate, BookingRequest, Composer, ValidationReport};
use crate::config::SiteConfig;
use crate::dom::{Dom, EventKind, Propagation, Subscription};
use crate::ui::banner::{Banner, BannerKind};

pub const FORM_ID: &str = "bookingForm";
pub const SUCCESS_TEXT: &str = "Form submitted! Opening WhatsApp...";
pub const ERROR_BORDER: &str = "#dc3545";

/// Where the last submission attempt got to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Submitted,
    Rejected,
}

/// Result of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The message link was handed to the browser. `opened` is false when a
    /// pop-up blocker refused it.
    Submitted { link: String, opened: bool },
    Rejected(ValidationReport),
}

/// Source of the message timestamp
pub type Clock = Box<dyn Fn() -> NaiveDateTime>;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

struct Inner<D: Dom> {
    dom: D,
    form: D::Node,
    config: SiteConfig,
    clock: Clock,
    stage: Cell<Stage>,
    /// Pending clear-on-input listeners for marked fields
    marks: RefCell<Vec<(D::Node, Subscription)>>,
    /// Banner currently shown by this form
    banner: RefCell<Option<Banner<D>>>,
}

impl<D: Dom> Inner<D> {
    fn submit(&self) -> Outcome {
        self.stage.set(Stage::Validating);
        self.clear_marks();

        let controls = self.dom.controls(&self.form);
        let report = validate(&controls);
        if !report.is_valid() {
            for index in report.marked() {
                self.mark(&controls[index].node);
            }
            if report.bad_phone.is_some() {
                self.show_banner(BannerKind::Error, PHONE_ERROR);
            }
            debug!(
                missing = report.missing.len(),
                bad_phone = report.bad_phone.is_some(),
                "booking rejected"
            );
            self.stage.set(Stage::Rejected);
            return Outcome::Rejected(report);
        }

        let fields = self.dom.form_data(&self.form);
        let request = BookingRequest::from_fields(&fields);
        let message = Composer::from_config(&self.config).compose(&request, (self.clock)());
        let link = deep_link(&self.config.messaging, &message);

        let opened = self.dom.open_link(&link);
        if opened {
            info!(fields = fields.len(), "booking handed off");
        } else {
            warn!("messaging link was blocked by the browser");
        }

        self.show_banner(BannerKind::Success, SUCCESS_TEXT);
        self.dom.reset_form(&self.form);
        self.stage.set(Stage::Submitted);
        Outcome::Submitted { link, opened }
    }

    fn mark(&self, node: &D::Node) {
        self.dom.set_style(node, "border-color", ERROR_BORDER);

        let dom = self.dom.clone();
        let target = node.clone();
        let clear = self.dom.listen_once(
            node,
            EventKind::Input,
            Box::new(move || dom.set_style(&target, "border-color", "")),
        );
        self.marks.borrow_mut().push((node.clone(), clear));
    }

    /// Each attempt starts from unmarked fields
    fn clear_marks(&self) {
        let marks = std::mem::take(&mut *self.marks.borrow_mut());
        for (node, clear) in marks {
            self.dom.set_style(&node, "border-color", "");
            drop(clear);
        }
    }

    fn show_banner(&self, kind: BannerKind, text: &str) {
        if let Some(previous) = self.banner.take() {
            previous.dismiss();
        }
        let shown = Banner::show(&self.dom, &self.form, kind, text, self.config.banner_delay());
        self.banner.replace(shown);
    }
}

/// Submission handling for the booking form
pub struct BookingForm<D: Dom> {
    inner: Rc<Inner<D>>,
    _on_submit: Subscription,
}

impl<D: Dom> BookingForm<D> {
    /// Attach to `#bookingForm`; `None` when the page has no booking form
    pub fn attach(dom: &D, config: &SiteConfig) -> Option<Self> {
        Self::attach_with_clock(dom, config, Box::new(local_now))
    }

    pub fn attach_with_clock(dom: &D, config: &SiteConfig, clock: Clock) -> Option<Self> {
        let form = dom.by_id(FORM_ID)?;
        let inner = Rc::new(Inner {
            dom: dom.clone(),
            form: form.clone(),
            config: config.clone(),
            clock,
            stage: Cell::new(Stage::Idle),
            marks: RefCell::new(Vec::new()),
            banner: RefCell::new(None),
        });

        let weak: Weak<Inner<D>> = Rc::downgrade(&inner);
        let on_submit = dom.listen(
            &form,
            EventKind::Submit,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.submit();
                }
                Propagation::PreventDefault
            }),
        );

        Some(Self {
            inner,
            _on_submit: on_submit,
        })
    }

    /// Run the pipeline as if the form had been submitted
    pub fn submit(&self) -> Outcome {
        self.inner.submit()
    }

    pub fn stage(&self) -> Stage {
        self.inner.stage.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::validate::REQUIRED_FIELDS;
    use crate::dom::{ElementSpec, MemoryDom, NodeId, Selector};
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Page {
        dom: MemoryDom,
        form: NodeId,
        name: NodeId,
        phone: NodeId,
        address: NodeId,
        garment: NodeId,
        bust: NodeId,
        fabric: NodeId,
    }

    fn page() -> Page {
        let dom = MemoryDom::new();
        let form = dom.element(dom.body_id(), ElementSpec::new("form").with_id(FORM_ID));
        let field = |tag: &str, name: &str, kind: Option<&str>, required: bool| {
            let mut spec = ElementSpec::new(tag).with_attribute("name", name);
            if let Some(kind) = kind {
                spec = spec.with_attribute("type", kind);
            }
            if required {
                spec = spec.with_attribute("required", "");
            }
            dom.element(form, spec)
        };
        let name = field("input", "customer_name", None, true);
        let phone = field("input", "phone_number", Some("tel"), true);
        field("input", "email", Some("email"), false);
        let address = field("textarea", "address", None, true);
        let garment = field("select", "garment_type", None, true);
        let bust = field("input", "bust", Some("number"), false);
        field("input", "waist", Some("number"), false);
        let fabric = field("input", "fabric_provided", Some("checkbox"), false);
        dom.element(form, ElementSpec::new("button").with_attribute("type", "submit"));
        Page {
            dom,
            form,
            name,
            phone,
            address,
            garment,
            bust,
            fabric,
        }
    }

    fn fill_asha(p: &Page) {
        p.dom.set_value(p.name, "Asha");
        p.dom.set_value(p.phone, "9876543210");
        p.dom.set_value(p.address, "12 MG Road");
        p.dom.set_value(p.garment, "Blouse");
        p.dom.set_value(p.bust, "34");
    }

    fn fixed_clock() -> Clock {
        Box::new(|| {
            NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        })
    }

    fn border(p: &Page, node: NodeId) -> Option<String> {
        p.dom.style(node, "border-color")
    }

    #[test]
    fn test_missing_form_is_none() {
        let dom = MemoryDom::new();
        assert!(BookingForm::attach(&dom, &SiteConfig::default()).is_none());
    }

    #[test]
    fn test_end_to_end_submission() {
        let p = page();
        let booking = BookingForm::attach_with_clock(&p.dom, &SiteConfig::default(), fixed_clock()).unwrap();
        assert_eq!(booking.stage(), Stage::Idle);
        fill_asha(&p);
        p.dom.set_checked(p.fabric, true);

        assert_eq!(p.dom.dispatch(p.form, EventKind::Submit), Propagation::PreventDefault);
        assert_eq!(booking.stage(), Stage::Submitted);

        let opened = p.dom.opened_links();
        assert_eq!(opened.len(), 1);
        let prefix = "https://wa.me/918840586403?text=";
        assert!(opened[0].starts_with(prefix));
        let message = urlencoding::decode(&opened[0][prefix.len()..]).unwrap();
        assert!(message.contains("👤 Name: Asha"));
        assert!(message.contains("📞 Phone: 9876543210"));
        assert!(message.contains("👗 Garment Type: Blouse"));
        assert!(message.contains("• Bust: 34 inches"));
        assert!(!message.contains("Waist"));
        assert!(message.contains("🧵 Fabric Provided: Yes"));
        assert!(message.contains("*Date:* 19/10/2026, 10:30:00 am"));

        let banners = p.dom.query_all(Selector::Class("alert-success"));
        assert_eq!(banners.len(), 1);
        assert_eq!(p.dom.text(banners[0]), SUCCESS_TEXT);
        assert_eq!(p.dom.children(p.form)[0], banners[0]);

        for node in [p.name, p.phone, p.address, p.garment, p.bust] {
            assert_eq!(p.dom.value(node), "");
        }
        assert!(p.dom.form_data(&p.form).get("fabric_provided").is_none());

        p.dom.advance(Duration::from_millis(4_999));
        assert_eq!(p.dom.query_all(Selector::Class("alert")).len(), 1);
        p.dom.advance(Duration::from_millis(1));
        assert!(p.dom.query_all(Selector::Class("alert")).is_empty());
    }

    #[test]
    fn test_blank_required_fields_are_all_marked() {
        let p = page();
        let booking = BookingForm::attach(&p.dom, &SiteConfig::default()).unwrap();
        p.dom.set_value(p.name, "   ");
        p.dom.set_value(p.garment, "Kurti");

        let outcome = booking.submit();
        assert!(matches!(outcome, Outcome::Rejected(ref r) if r.missing.len() == 3));
        assert_eq!(booking.stage(), Stage::Rejected);
        assert!(p.dom.opened_links().is_empty());
        assert!(p.dom.query_all(Selector::Class("alert")).is_empty());

        for node in [p.name, p.phone, p.address] {
            assert_eq!(border(&p, node).as_deref(), Some(ERROR_BORDER));
        }
        assert_eq!(border(&p, p.garment), None);
        assert_eq!(p.dom.value(p.garment), "Kurti");
    }

    #[test]
    fn test_each_blank_required_field_blocks_submission() {
        for field in REQUIRED_FIELDS {
            let p = page();
            let booking = BookingForm::attach(&p.dom, &SiteConfig::default()).unwrap();
            fill_asha(&p);
            let required = [
                ("customer_name", p.name),
                ("phone_number", p.phone),
                ("address", p.address),
                ("garment_type", p.garment),
            ];
            let (_, blank) = *required.iter().find(|(name, _)| *name == field).unwrap();
            p.dom.set_value(blank, "   ");

            let outcome = booking.submit();
            assert!(matches!(outcome, Outcome::Rejected(_)), "{field}");
            assert!(p.dom.opened_links().is_empty(), "{field}");
            for (name, node) in required {
                let expected = (node == blank).then_some(ERROR_BORDER);
                assert_eq!(border(&p, node).as_deref(), expected, "{field}: {name}");
            }
            assert_eq!(p.dom.value(p.name), if field == "customer_name" { "   " } else { "Asha" });
        }
    }

    #[test]
    fn test_success_replaces_error_banner_but_keeps_page_alerts() {
        let p = page();
        let notice = p.dom.element(
            p.dom.body_id(),
            ElementSpec::new("div").with_class("alert alert-info").with_text("Closed on Sundays"),
        );
        let booking = BookingForm::attach_with_clock(&p.dom, &SiteConfig::default(), fixed_clock()).unwrap();
        fill_asha(&p);
        p.dom.set_value(p.phone, "12345");
        booking.submit();
        assert_eq!(p.dom.query_all(Selector::Class("alert-error")).len(), 1);

        p.dom.set_value(p.phone, "9876543210");
        assert!(matches!(booking.submit(), Outcome::Submitted { .. }));
        assert!(p.dom.query_all(Selector::Class("alert-error")).is_empty());
        assert_eq!(p.dom.query_all(Selector::Class("alert-success")).len(), 1);
        assert!(p.dom.is_connected(notice));

        p.dom.advance(Duration::from_secs(5));
        assert_eq!(p.dom.query_all(Selector::Class("alert")), vec![notice]);
    }

    #[test]
    fn test_bad_phone_shows_error_banner() {
        for number in ["1234567890", "98765"] {
            let p = page();
            let booking = BookingForm::attach(&p.dom, &SiteConfig::default()).unwrap();
            fill_asha(&p);
            p.dom.set_value(p.phone, number);

            let outcome = booking.submit();
            assert!(matches!(outcome, Outcome::Rejected(ref r) if r.bad_phone.is_some()));
            assert!(p.dom.opened_links().is_empty());
            assert_eq!(border(&p, p.phone).as_deref(), Some(ERROR_BORDER));

            let banners = p.dom.query_all(Selector::Class("alert-error"));
            assert_eq!(banners.len(), 1);
            assert_eq!(p.dom.text(banners[0]), PHONE_ERROR);
            assert_eq!(p.dom.value(p.name), "Asha");
        }
    }

    #[test]
    fn test_marking_clears_on_first_input_only() {
        let p = page();
        let booking = BookingForm::attach(&p.dom, &SiteConfig::default()).unwrap();
        booking.submit();
        assert_eq!(border(&p, p.name).as_deref(), Some(ERROR_BORDER));

        p.dom.dispatch(p.name, EventKind::Input);
        assert_eq!(border(&p, p.name), None);
        assert_eq!(border(&p, p.address).as_deref(), Some(ERROR_BORDER));
        // Clearing does not re-validate
        assert_eq!(booking.stage(), Stage::Rejected);

        booking.submit();
        assert_eq!(border(&p, p.name).as_deref(), Some(ERROR_BORDER));
        fill_asha(&p);
        assert!(matches!(booking.submit(), Outcome::Submitted { opened: true, .. }));
        assert_eq!(border(&p, p.name), None);
        assert_eq!(border(&p, p.address), None);
    }

    #[test]
    fn test_blocked_popup_still_completes() {
        let p = page();
        let booking = BookingForm::attach(&p.dom, &SiteConfig::default()).unwrap();
        fill_asha(&p);
        p.dom.set_popups_blocked(true);

        let outcome = booking.submit();
        assert!(matches!(outcome, Outcome::Submitted { opened: false, .. }));
        assert_eq!(p.dom.query_all(Selector::Class("alert-success")).len(), 1);
        assert_eq!(p.dom.value(p.name), "");
    }

    #[test]
    fn test_detached_after_drop() {
        let p = page();
        let booking = BookingForm::attach(&p.dom, &SiteConfig::default()).unwrap();
        fill_asha(&p);
        drop(booking);

        assert_eq!(p.dom.dispatch(p.form, EventKind::Submit), Propagation::Continue);
        assert!(p.dom.opened_links().is_empty());
        assert_eq!(p.dom.listener_count(), 0);
    }
}
