/// Page controllers
///
/// Each controller attaches to whatever markup it finds and no-ops when its
/// elements are absent:
/// - Admin-only visibility and injected admin links (admin.rs)
/// - Booking form submission (booking.rs)
/// - Gallery category filter (gallery.rs)
/// - Smooth fragment scrolling (scroll.rs)
/// - Mobile nav toggle (nav.rs)
pub mod admin;
pub mod banner;
pub mod booking;
pub mod gallery;
pub mod nav;
pub mod scroll;

use tracing::info;

use crate::config::SiteConfig;
use crate::dom::Dom;
use crate::state::session::SessionFlag;

pub use admin::AdminVisibility;
pub use booking::BookingForm;
pub use gallery::GalleryFilter;
pub use nav::NavToggle;
pub use scroll::SmoothScroll;

/// Every controller for one page. Dropping it detaches all listeners and
/// cancels pending timers.
pub struct Site<D: Dom, S: SessionFlag + 'static> {
    pub admin: AdminVisibility<D, S>,
    pub booking: Option<BookingForm<D>>,
    pub gallery: GalleryFilter<D>,
    pub scroll: SmoothScroll<D>,
    pub nav: Option<NavToggle<D>>,
}

impl<D: Dom, S: SessionFlag + 'static> Site<D, S> {
    pub fn mount(dom: &D, session: S, config: &SiteConfig) -> Self {
        let site = Self {
            admin: AdminVisibility::attach(dom, session, config),
            booking: BookingForm::attach(dom, config),
            gallery: GalleryFilter::attach(dom),
            scroll: SmoothScroll::attach(dom),
            nav: NavToggle::attach(dom),
        };
        info!(
            booking = site.booking.is_some(),
            nav = site.nav.is_some(),
            admin = site.admin.is_logged_in(),
            "site mounted"
        );
        site
    }
}
