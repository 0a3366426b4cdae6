//! Error types for the sidebar widget.
//!
//! Most sidebar operations degrade silently; these errors surface only at the
//! seams where a caller can act on them (configuration parsing, inbound host
//! commands, mounting) or where an adapter wants to log what was skipped.

use thiserror::Error;

/// Result type alias for sidebar operations
pub type Result<T> = std::result::Result<T, SidebarError>;

/// Main error type for the sidebar widget
#[derive(Debug, Error)]
pub enum SidebarError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Host bridge error: {0}")]
    Bridge(String),

    #[error("Unknown host command: {0}")]
    UnknownCommand(String),

    #[error("Malformed '{handler}' message: {reason}")]
    MalformedCommand { handler: String, reason: String },

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SidebarError {
    /// Returns the error type string (for logs and the JS surface)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "INVALID_CONFIG",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Bridge(_) => "BRIDGE_ERROR",
            Self::UnknownCommand(_) => "UNKNOWN_COMMAND",
            Self::MalformedCommand { .. } | Self::Serialization(_) => "TYPE_ERROR",
            Self::Dom(_) => "DOM_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_mapping() {
        let cases: Vec<(SidebarError, &str)> = vec![
            (SidebarError::Config("x".into()), "INVALID_CONFIG"),
            (SidebarError::Storage("quota".into()), "STORAGE_ERROR"),
            (SidebarError::Bridge("no shiny".into()), "BRIDGE_ERROR"),
            (SidebarError::UnknownCommand("nope".into()), "UNKNOWN_COMMAND"),
            (
                SidebarError::MalformedCommand {
                    handler: "setActiveTab".into(),
                    reason: "missing tabName".into(),
                },
                "TYPE_ERROR",
            ),
            (SidebarError::Dom("no body".into()), "DOM_ERROR"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.error_type(), expected, "{err}");
        }
    }

    #[test]
    fn malformed_command_message_names_handler() {
        let err = SidebarError::MalformedCommand {
            handler: "setActiveTab".into(),
            reason: "missing field `tabName`".into(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed 'setActiveTab' message: missing field `tabName`"
        );
    }
}
