//! Admin login flag.
//!
//! The flag lives in per-tab session storage and is owned by the login page;
//! this crate only reads it and reacts when it changes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dom::Subscription;

/// Session storage key used by the login page
pub const SESSION_KEY: &str = "adminLoggedIn";

/// Does a raw storage value mean "logged in"?
pub fn is_logged_in_value(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Read-only view of the admin login flag
pub trait SessionFlag {
    /// Current flag state
    fn is_set(&self) -> bool;

    /// Call `on_change` whenever the flag changes outside this page (other
    /// tabs, the login flow). Dropping the handle stops notifications.
    fn subscribe(&self, on_change: Box<dyn FnMut()>) -> Subscription;
}

type Listeners = Vec<(u64, Rc<RefCell<Box<dyn FnMut()>>>)>;

#[derive(Default)]
struct Store {
    value: Option<String>,
    listeners: Listeners,
    next_id: u64,
}

/// Session storage stand-in.
///
/// [`MemorySession::write`] plays the part of the external login flow: it
/// stores the value and notifies subscribers the way a storage event would.
#[derive(Clone, Default)]
pub struct MemorySession {
    store: Rc<RefCell<Store>>,
}

impl MemorySession {
    pub fn new(value: Option<&str>) -> Self {
        let session = Self::default();
        session.store.borrow_mut().value = value.map(str::to_string);
        session
    }

    pub fn logged_in() -> Self {
        Self::new(Some("true"))
    }

    pub fn logged_out() -> Self {
        Self::new(None)
    }

    /// Set or clear the stored value and notify subscribers
    pub fn write(&self, value: Option<&str>) {
        let listeners: Vec<_> = {
            let mut store = self.store.borrow_mut();
            store.value = value.map(str::to_string);
            store.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            let mut listener = listener.borrow_mut();
            (&mut **listener)();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.store.borrow().listeners.len()
    }

    fn detach(store: &Weak<RefCell<Store>>, id: u64) {
        if let Some(store) = store.upgrade() {
            let removed = {
                let mut store = store.borrow_mut();
                store
                    .listeners
                    .iter()
                    .position(|(i, _)| *i == id)
                    .map(|pos| store.listeners.remove(pos))
            };
            drop(removed);
        }
    }
}

impl SessionFlag for MemorySession {
    fn is_set(&self) -> bool {
        is_logged_in_value(self.store.borrow().value.as_deref())
    }

    fn subscribe(&self, on_change: Box<dyn FnMut()>) -> Subscription {
        let id = {
            let mut store = self.store.borrow_mut();
            store.next_id += 1;
            let id = store.next_id;
            store.listeners.push((id, Rc::new(RefCell::new(on_change))));
            id
        };
        let store = Rc::downgrade(&self.store);
        Subscription::new(move || Self::detach(&store, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_only_literal_true_counts() {
        assert!(is_logged_in_value(Some("true")));
        assert!(!is_logged_in_value(Some("TRUE")));
        assert!(!is_logged_in_value(Some("1")));
        assert!(!is_logged_in_value(Some("")));
        assert!(!is_logged_in_value(None));
    }

    #[test]
    fn test_write_notifies_until_dropped() {
        let session = MemorySession::logged_out();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let sub = session.subscribe(Box::new(move || c.set(c.get() + 1)));

        session.write(Some("true"));
        assert!(session.is_set());
        assert_eq!(calls.get(), 1);

        drop(sub);
        session.write(None);
        assert!(!session.is_set());
        assert_eq!(calls.get(), 1);
        assert_eq!(session.subscriber_count(), 0);
    }
}
