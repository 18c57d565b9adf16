//! Error types for the command dispatch core.

use crate::command::DispatchState;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Separator error: {0}")]
    Separator(#[from] SeparatorError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid delimiter pattern: {0}")]
    Delimiter(#[from] regex::Error),
}

/// Failures raised while partitioning a message into raw per-parameter values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeparatorError {
    #[error("Expected {expected} content tokens including the trigger, found {found}")]
    ContentTokenCount { expected: usize, found: usize },

    #[error("Expected {expected} attachments, found {found}")]
    AttachmentCount { expected: usize, found: usize },

    #[error("Context extraction failed: {0}")]
    Extractor(String),

    #[error("Parameters not accounted for by any separator: {}", .0.join(", "))]
    Unaccounted(Vec<String>),
}

/// The dispatcher's failure taxonomy.
///
/// Only `CommandFault` carries the original fault; the others are expected
/// outcomes routed to the command's hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Permission check failed for command {command}")]
    PermissionDenied { command: String },

    #[error("No parameter configuration of command {command} matched")]
    ArgumentMismatch { command: String },

    #[error("Could not derive parameters: {}", missing.join(", "))]
    FieldDerivationFailure { missing: Vec<String> },

    #[error("Command {command} failed: {reason}")]
    CommandFault { command: String, reason: String },

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: DispatchState,
        to: DispatchState,
    },
}

/// Command registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Command {name} is already registered")]
    AlreadyRegistered { name: String },

    #[error("Command {name} not found")]
    NotFound { name: String },

    #[error("Registry is busy, cannot register {name} synchronously")]
    Busy { name: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text carried by a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
