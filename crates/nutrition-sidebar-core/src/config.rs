//! Widget configuration.
//!
//! The host page may pass a JSON object when mounting the sidebar; every
//! field is optional and falls back to the values the dashboard ships with.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SidebarError};

/// Viewport width (CSS pixels) at or below which the mobile layout applies.
pub const DEFAULT_BREAKPOINT_PX: u32 = 768;

/// Storage key holding the persisted collapse flag.
pub const DEFAULT_STORAGE_KEY: &str = "sidebar-collapsed";

/// Delay before the panel closes after a mobile menu selection.
pub const DEFAULT_MOBILE_COLLAPSE_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SidebarConfig {
    /// Mobile layout applies when `viewport_width <= breakpoint_px`
    pub breakpoint_px: u32,
    /// Key under which the collapse flag is persisted
    pub storage_key: String,
    /// Delay before auto-collapsing after a mobile menu selection
    pub mobile_collapse_delay_ms: u64,
    /// Classes tried in order to locate the host's main-content region
    pub main_content_classes: Vec<String>,
    /// Text shown next to the logo
    pub brand_title: String,
    /// Whether Ctrl+B toggles the sidebar
    pub keyboard_shortcut: bool,
    /// `tracing` filter directive used by the browser log subscriber
    pub log_filter: String,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: DEFAULT_BREAKPOINT_PX,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            mobile_collapse_delay_ms: DEFAULT_MOBILE_COLLAPSE_DELAY_MS,
            main_content_classes: vec!["content-wrapper".to_string(), "main-content".to_string()],
            brand_title: "Rwanda Nutrition".to_string(),
            keyboard_shortcut: true,
            log_filter: "info".to_string(),
        }
    }
}

impl SidebarConfig {
    /// Parse and validate a JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SidebarError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.breakpoint_px == 0 {
            return Err(SidebarError::Config(
                "breakpointPx must be greater than zero".to_string(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(SidebarError::Config(
                "storageKey must not be empty".to_string(),
            ));
        }
        if self.main_content_classes.is_empty()
            || self.main_content_classes.iter().any(|c| c.trim().is_empty())
        {
            return Err(SidebarError::Config(
                "mainContentClasses must list at least one non-empty class".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_mobile_width(&self, viewport_width: f64) -> bool {
        viewport_width <= f64::from(self.breakpoint_px)
    }

    #[must_use]
    pub const fn mobile_collapse_delay(&self) -> Duration {
        Duration::from_millis(self.mobile_collapse_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SidebarConfig::from_json("{}").unwrap();
        assert_eq!(config, SidebarConfig::default());
        assert_eq!(config.breakpoint_px, 768);
        assert_eq!(config.storage_key, "sidebar-collapsed");
        assert_eq!(config.mobile_collapse_delay(), Duration::from_millis(300));
    }

    #[test]
    fn camel_case_fields_override_defaults() {
        let config =
            SidebarConfig::from_json(r#"{"breakpointPx": 1024, "brandTitle": "Demo"}"#).unwrap();
        assert_eq!(config.breakpoint_px, 1024);
        assert_eq!(config.brand_title, "Demo");
        assert!(config.keyboard_shortcut);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SidebarConfig::from_json(r#"{"breakpoint": 10}"#).unwrap_err();
        assert_eq!(err.error_type(), "INVALID_CONFIG");
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        assert!(SidebarConfig::from_json(r#"{"breakpointPx": 0}"#).is_err());
        assert!(SidebarConfig::from_json(r#"{"storageKey": "  "}"#).is_err());
        assert!(SidebarConfig::from_json(r#"{"mainContentClasses": []}"#).is_err());
        assert!(SidebarConfig::from_json(r#"{"mainContentClasses": [""]}"#).is_err());
    }

    #[test]
    fn breakpoint_is_inclusive() {
        let config = SidebarConfig::default();
        assert!(config.is_mobile_width(768.0));
        assert!(config.is_mobile_width(320.0));
        assert!(!config.is_mobile_width(768.5));
        assert!(!config.is_mobile_width(1280.0));
    }
}
