//! Durable key-value storage for the collapse flag.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Result, SidebarError};

/// Synchronous string storage (`localStorage` in the browser).
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage.
///
/// Clones share the same map, so a test can hand one clone to the widget and
/// inspect the other. The browser adapter falls back to it when
/// `localStorage` is blocked.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    failing: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose every access fails, like `localStorage` under a
    /// restrictive privacy mode.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Direct read, bypassing the failure flag.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.failing {
            return Err(SidebarError::Storage(format!("read of '{key}' denied")));
        }
        Ok(self.peek(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.failing {
            return Err(SidebarError::Storage(format!("write of '{key}' denied")));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_items() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.set_item("sidebar-collapsed", "true").unwrap();
        assert_eq!(view.peek("sidebar-collapsed").as_deref(), Some("true"));
        assert_eq!(view.get_item("missing").unwrap(), None);
    }

    #[test]
    fn failing_storage_errors_on_every_access() {
        let storage = MemoryStorage::failing();
        assert!(storage.get_item("k").is_err());
        assert!(storage.set_item("k", "v").is_err());
        assert_eq!(storage.peek("k"), None);
    }
}
