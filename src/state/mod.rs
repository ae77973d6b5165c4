/// State module
///
/// This module holds the page-level data the controllers work with:
/// - Form field sets and gallery categories (data.rs)
/// - The admin session flag and its change notifications (session.rs)

pub mod data;
pub mod session;
