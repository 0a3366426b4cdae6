//! Browser bindings for the nutrition dashboard sidebar.
//!
//! This crate binds the `nutrition-sidebar-core` capability traits to the
//! browser and exposes a small JavaScript API. The host page mounts the
//! sidebar explicitly and keeps the returned handle; nothing is installed on
//! `window`.
//!
//! # Architecture
//!
//! ```text
//! Browser page                         Host runtime (Shiny)
//!   ├─ WebDocument  (web-sys DOM)        ├─ setInputValue ← sidebar_tab_change
//!   ├─ localStorage (collapse flag)      │                 ← sidebar_filters
//!   ├─ setTimeout   (mobile collapse)    └─ custom messages → updateSidebarFilters
//!   └─ Sidebar<WebDocument>                                   → setActiveTab
//! ```
//!
//! # Building
//!
//! ```bash
//! wasm-pack build crates/nutrition-sidebar-wasm --target web
//! ```
//!
//! # Usage
//!
//! ```javascript
//! import init, { mountSidebar } from './nutrition_sidebar_wasm.js';
//!
//! await init();
//! const sidebar = await mountSidebar('{"brandTitle": "Rwanda Nutrition"}');
//! sidebar.setActiveTab('rankings');
//! console.log(sidebar.getCurrentFilters());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

pub use nutrition_sidebar_core::{FilterPatch, FilterSelection, SidebarConfig, SidebarResult};

/// Resolve the optional JSON config passed to `mountSidebar`.
///
/// A missing or blank argument means defaults.
pub fn parse_mount_config(config_json: Option<&str>) -> SidebarResult<SidebarConfig> {
    match config_json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => SidebarConfig::from_json(json),
        None => Ok(SidebarConfig::default()),
    }
}

/// Whether `document.readyState` allows querying the parsed DOM.
///
/// Only `"loading"` means the body may still be incomplete; `"interactive"`
/// and `"complete"` are both past `DOMContentLoaded`.
#[must_use]
pub fn document_is_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

// ──────────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────────
