//! Generic error handling utilities
//!
//! Shared reporting for the error enums of the runtime, so the host can log
//! any failure the same way without knowing its concrete type.

use std::any::Any;

/// Errors that know whether their message is meant for the user
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; otherwise it returns `None` and the caller falls back to a
/// generic context line.
pub trait ContextualError: std::error::Error {
    /// True when the error carries a message the user can act on directly,
    /// e.g. a failing operation reporting a domain error
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// The headline shown for an error: its user message when actionable,
/// otherwise the operation context
pub fn error_headline<'a, E: ContextualError + ?Sized>(error: &'a E, context: &'a str) -> &'a str {
    if error.is_user_actionable() {
        error.user_message().unwrap_or(context)
    } else {
        context
    }
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use plugcalc::core::error_handling::log_error_with_context;
/// # use plugcalc::plugin::api::PluginError;
/// let err = PluginError::NotLoaded { plugin: "stats".to_string() };
/// log_error_with_context(&err, "Unloading plugin");
/// // Logs: "FATAL: Unloading plugin" and the detail at debug level
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", error_headline(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Text carried by a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
