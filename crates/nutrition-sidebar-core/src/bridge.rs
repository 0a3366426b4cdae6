//! Host bridge: messages to and from the server-driven application.
//!
//! Outbound, the sidebar sets host inputs (`sidebar_tab_change`,
//! `sidebar_filters`). Inbound, the host sends custom messages that are
//! parsed into [`HostCommand`]s. When no host is attached the widget runs
//! with [`NoopBridge`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SidebarError};
use crate::models::{FilterPatch, FilterSelection};

/// Input receiving the selected tab identifier.
pub const TAB_CHANGE_INPUT: &str = "sidebar_tab_change";
/// Input receiving the full filter record.
pub const FILTERS_INPUT: &str = "sidebar_filters";

/// Inbound handler applying a [`FilterPatch`].
pub const UPDATE_FILTERS_HANDLER: &str = "updateSidebarFilters";
/// Inbound handler selecting a tab.
pub const SET_ACTIVE_TAB_HANDLER: &str = "setActiveTab";
pub const INBOUND_HANDLERS: [&str; 2] = [UPDATE_FILTERS_HANDLER, SET_ACTIVE_TAB_HANDLER];

/// Host input priority. The sidebar only sends `event` inputs, which make
/// the host react even when the value did not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Event,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
        }
    }
}

/// A value pushed to a host input.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundInput {
    pub name: &'static str,
    pub value: Value,
    pub priority: Priority,
}

impl OutboundInput {
    /// A link without a tab identifier still notifies the host, with `null`.
    #[must_use]
    pub fn tab_change(tab_name: Option<&str>) -> Self {
        Self {
            name: TAB_CHANGE_INPUT,
            value: tab_name.map_or(Value::Null, Value::from),
            priority: Priority::Event,
        }
    }

    pub fn filters(filters: &FilterSelection) -> Result<Self> {
        Ok(Self {
            name: FILTERS_INPUT,
            value: serde_json::to_value(filters)?,
            priority: Priority::Event,
        })
    }
}

/// Outbound half of the host connection.
pub trait HostBridge {
    fn set_input_value(&self, input: &OutboundInput) -> Result<()>;
}

/// Bridge used when the page has no host runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBridge;

impl HostBridge for NoopBridge {
    fn set_input_value(&self, input: &OutboundInput) -> Result<()> {
        tracing::trace!(input = input.name, "no host attached; dropping input");
        Ok(())
    }
}

/// Command received from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    UpdateFilters(FilterPatch),
    SetActiveTab { tab_name: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetActiveTabMessage {
    tab_name: String,
}

impl HostCommand {
    /// Parse the message delivered to inbound handler `handler`.
    pub fn parse(handler: &str, message: Value) -> Result<Self> {
        let malformed = |e: serde_json::Error| SidebarError::MalformedCommand {
            handler: handler.to_string(),
            reason: e.to_string(),
        };
        match handler {
            UPDATE_FILTERS_HANDLER => serde_json::from_value::<FilterPatch>(message)
                .map(Self::UpdateFilters)
                .map_err(malformed),
            SET_ACTIVE_TAB_HANDLER => serde_json::from_value::<SetActiveTabMessage>(message)
                .map(|m| Self::SetActiveTab { tab_name: m.tab_name })
                .map_err(malformed),
            other => Err(SidebarError::UnknownCommand(other.to_string())),
        }
    }

    #[must_use]
    pub const fn handler(&self) -> &'static str {
        match self {
            Self::UpdateFilters(_) => UPDATE_FILTERS_HANDLER,
            Self::SetActiveTab { .. } => SET_ACTIVE_TAB_HANDLER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tab_change_is_event_priority() {
        let input = OutboundInput::tab_change(Some("rankings"));
        assert_eq!(input.name, "sidebar_tab_change");
        assert_eq!(input.value, json!("rankings"));
        assert_eq!(input.priority.as_str(), "event");
    }

    #[test]
    fn filters_input_carries_record() {
        let filters = FilterSelection {
            year: Some("2020".into()),
            province: Some("all".into()),
            age_group: Some("all".into()),
            nutrient: Some("Zinc".into()),
            indicators: vec!["stunting".into(), "anemia".into()],
        };
        let input = OutboundInput::filters(&filters).unwrap();
        assert_eq!(input.name, "sidebar_filters");
        assert_eq!(
            input.value,
            json!({
                "year": "2020",
                "province": "all",
                "ageGroup": "all",
                "nutrient": "Zinc",
                "indicators": ["stunting", "anemia"],
            })
        );
    }

    #[test]
    fn parses_set_active_tab() {
        let cmd = HostCommand::parse("setActiveTab", json!({ "tabName": "trends" })).unwrap();
        assert_eq!(cmd, HostCommand::SetActiveTab { tab_name: "trends".into() });
        assert_eq!(cmd.handler(), SET_ACTIVE_TAB_HANDLER);
    }

    #[test]
    fn parses_partial_filter_update() {
        let cmd =
            HostCommand::parse("updateSidebarFilters", json!({ "nutrient": "Iron" })).unwrap();
        let HostCommand::UpdateFilters(patch) = cmd else {
            panic!("expected filter update");
        };
        assert_eq!(patch.nutrient.as_deref(), Some("Iron"));
        assert!(patch.year.is_none());
    }

    #[test]
    fn rejects_malformed_and_unknown_messages() {
        let err = HostCommand::parse("setActiveTab", json!({ "tab": "x" })).unwrap_err();
        assert!(matches!(err, SidebarError::MalformedCommand { .. }));

        let err = HostCommand::parse("updateSidebarFilters", json!({ "indicators": { "stunting": true } }))
            .unwrap_err();
        assert_eq!(err.error_type(), "TYPE_ERROR");

        let err = HostCommand::parse("resetEverything", json!({})).unwrap_err();
        assert!(matches!(err, SidebarError::UnknownCommand(name) if name == "resetEverything"));
    }

    #[test]
    fn noop_bridge_accepts_everything() {
        assert!(NoopBridge.set_input_value(&OutboundInput::tab_change(Some("x"))).is_ok());
    }
}
