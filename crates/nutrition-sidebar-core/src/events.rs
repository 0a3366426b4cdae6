//! Notification events dispatched on the document.

use serde_json::{Value, json};

use crate::models::FilterSelection;

/// Prefix of every event name, e.g. `sidebar:filters-changed`.
pub const EVENT_PREFIX: &str = "sidebar:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Expanded,
    Collapsed,
    /// `tab_name` is `None` when the clicked link has no `data-tab`.
    MenuItemSelected { tab_name: Option<String> },
    FiltersChanged { filters: FilterSelection },
}

impl SidebarEvent {
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Expanded => "sidebar-expanded",
            Self::Collapsed => "sidebar-collapsed",
            Self::MenuItemSelected { .. } => "menu-item-selected",
            Self::FiltersChanged { .. } => "filters-changed",
        }
    }

    /// Full DOM event type.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{EVENT_PREFIX}{}", self.short_name())
    }

    /// `CustomEvent.detail` payload.
    #[must_use]
    pub fn detail(&self) -> Value {
        match self {
            Self::Expanded | Self::Collapsed => json!({}),
            Self::MenuItemSelected { tab_name } => json!({ "tabName": tab_name }),
            Self::FiltersChanged { filters } => json!({ "filters": filters }),
        }
    }
}
