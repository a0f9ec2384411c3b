//! Plugin Error Handling
//!
//! Error taxonomy for the plugin runtime: contract and load failures raised
//! while executing a source, lifecycle misuse, registry collisions and
//! dispatch failures.

use crate::notifications::api::NotificationError;
use crate::operation::DomainError;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    /// The source ran but its export does not have the required shape
    #[error("Plugin '{plugin}' violates the export contract: {reason}")]
    ContractViolation { plugin: String, reason: String },

    /// The source could not be read or its top-level code failed
    #[error("Failed to load plugin '{plugin}': {cause}")]
    LoadFailure { plugin: String, cause: String },

    #[error("Plugin '{plugin}' is already loaded")]
    AlreadyLoaded { plugin: String },

    #[error("Plugin '{plugin}' is not loaded")]
    NotLoaded { plugin: String },

    #[error("Operation '{operation}' requested by '{requested_by}' is already provided by '{owner}'")]
    NameCollision {
        operation: String,
        requested_by: String,
        owner: String,
    },

    #[error("Unknown operation: {operation}")]
    UnknownOperation { operation: String },

    #[error("Operation '{operation}' is disabled (plugin '{plugin}' is disabled)")]
    OperationDisabled { operation: String, plugin: String },

    /// The callable itself returned a domain error
    #[error("Operation '{operation}' failed: {cause}")]
    OperationFailed {
        operation: String,
        #[source]
        cause: DomainError,
    },

    #[error("Plugin discovery failed in '{path}': {cause}")]
    Discovery { path: String, cause: String },

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl PluginError {
    pub(crate) fn load_failure(plugin: &str, cause: impl ToString) -> Self {
        PluginError::LoadFailure {
            plugin: plugin.to_string(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn contract(plugin: &str, reason: impl Into<String>) -> Self {
        PluginError::ContractViolation {
            plugin: plugin.to_string(),
            reason: reason.into(),
        }
    }

    /// Identity of the plugin the error is attributed to, if any
    pub fn plugin(&self) -> Option<&str> {
        match self {
            PluginError::ContractViolation { plugin, .. }
            | PluginError::LoadFailure { plugin, .. }
            | PluginError::AlreadyLoaded { plugin }
            | PluginError::NotLoaded { plugin }
            | PluginError::OperationDisabled { plugin, .. } => Some(plugin),
            PluginError::NameCollision { requested_by, .. } => Some(requested_by),
            PluginError::UnknownOperation { .. }
            | PluginError::OperationFailed { .. }
            | PluginError::Discovery { .. }
            | PluginError::Notification(_) => None,
        }
    }
}

impl crate::core::error_handling::ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PluginError::OperationFailed { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PluginError::OperationFailed { cause, .. } => Some(cause.message()),
            _ => None,
        }
    }
}
