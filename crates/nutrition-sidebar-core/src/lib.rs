//! Core state, markup, and host bridge for the nutrition dashboard sidebar
//!
//! This crate provides:
//! - The collapsible [`Sidebar`] widget, generic over a [`Document`]
//! - Capability traits for storage, the host bridge, and deferred actions
//! - The typed markup tree and the static menu/filter catalog
//! - Configuration (`SidebarConfig`) and common error types
//! - In-memory capabilities for tests ([`testing`])
//!
//! Nothing here depends on a browser; the `nutrition-sidebar-wasm` crate binds
//! the traits to `web-sys`.

#![forbid(unsafe_code)]

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod markup;
pub mod models;
pub mod schedule;
pub mod sidebar;
pub mod storage;
pub mod testing;

// Re-export key types for convenience
pub use bridge::{
    FILTERS_INPUT, HostBridge, HostCommand, INBOUND_HANDLERS, NoopBridge, OutboundInput,
    Priority, SET_ACTIVE_TAB_HANDLER, TAB_CHANGE_INPUT, UPDATE_FILTERS_HANDLER,
};
pub use config::SidebarConfig;
pub use dom::{Document, Query};
pub use error::{Result as SidebarResult, SidebarError};
pub use events::{EVENT_PREFIX, SidebarEvent};
pub use models::{CollapseState, FilterPatch, FilterSelection, Indicator};
pub use schedule::{DeferredAction, Scheduler};
pub use sidebar::Sidebar;
pub use storage::{MemoryStorage, Storage};
