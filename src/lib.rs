//! Client logic for the tailoring shop website.
//!
//! The page controllers in [`ui`] run in the browser through the `web-sys`
//! backend; the same controllers run against [`dom::MemoryDom`] in tests.
//! Off the browser, the crate also provides the gallery generator and the
//! booking preview used by the `tailor-site` binary.

pub mod booking;
pub mod config;
pub mod dom;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod gallery;
pub mod logging;
pub mod state;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod bindings;

pub use config::SiteConfig;
pub use error::{Result, SiteError};
pub use ui::Site;
