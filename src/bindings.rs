//! Browser entry point and the functions exported to page scripts.
//!
//! Build with:
//! ```bash
//! wasm-pack build --target web --out-dir www/pkg
//! ```

use std::cell::RefCell;

use gloo_events::EventListener;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::config::SiteConfig;
use crate::dom::web::{WebDom, WebSession};
use crate::dom::Dom;
use crate::logging;
use crate::state::session::SessionFlag;
use crate::ui::Site;

/// Inline configuration block, if the page carries one
const CONFIG_SCRIPT_ID: &str = "site-config";

thread_local! {
    static SITE: RefCell<Option<Site<WebDom, WebSession>>> = const { RefCell::new(None) };
    static CONFIG: RefCell<SiteConfig> = RefCell::new(SiteConfig::default());
}

fn load_config(dom: &WebDom) -> SiteConfig {
    let Some(json) = dom
        .by_id(CONFIG_SCRIPT_ID)
        .and_then(|script| script.text_content())
    else {
        return SiteConfig::default();
    };
    SiteConfig::from_json(&json).unwrap_or_else(|e| {
        warn!("ignoring inline site config: {}", e);
        SiteConfig::default()
    })
}

fn mount(dom: WebDom, config: SiteConfig) {
    let session = match WebSession::new(&config.session_key) {
        Ok(session) => session,
        Err(e) => {
            warn!("site not mounted: {}", e);
            return;
        }
    };
    let site = Site::mount(&dom, session, &config);
    SITE.with(|slot| *slot.borrow_mut() = Some(site));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init_browser("tailor_site=info");

    let dom = WebDom::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let config = load_config(&dom);
    CONFIG.with(|slot| *slot.borrow_mut() = config.clone());

    if dom.is_loading() {
        let document = dom.document().clone();
        EventListener::once(&document, "DOMContentLoaded", move |_| mount(dom, config)).forget();
    } else {
        mount(dom, config);
    }
    Ok(())
}

/// Whether the admin flag is set for this tab
#[wasm_bindgen(js_name = isLoggedIn)]
pub fn is_logged_in() -> bool {
    let key = CONFIG.with(|c| c.borrow().session_key.clone());
    WebSession::new(&key).is_ok_and(|session| session.is_set())
}

/// Re-apply admin visibility, e.g. right after the login flow sets the flag
#[wasm_bindgen(js_name = updateUI)]
pub fn update_ui() {
    SITE.with(|slot| {
        if let Some(site) = slot.borrow().as_ref() {
            site.admin.refresh();
        }
    });
}

/// Media upload settings as a plain JS object
#[wasm_bindgen(js_name = mediaConfig)]
pub fn media_config() -> Result<JsValue, JsValue> {
    let media = CONFIG.with(|c| c.borrow().media.clone());
    serde_wasm_bindgen::to_value(&media).map_err(Into::into)
}
