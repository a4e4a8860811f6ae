//! Error types for the messaging plugin

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

/// Errors reported to the actor of a single command or chat attempt.
///
/// None of these are system faults: each aborts one operation without
/// touching session state, and its `Display` text is what the actor sees.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("No players matched query.")]
    NoSuchTarget { query: String },

    #[error("More than one player found! Use @<name> for exact matching.")]
    AmbiguousTarget { query: String, candidates: Vec<String> },

    #[error("You haven't messaged anyone.")]
    NoPriorRecipient,

    #[error("You are muted.")]
    Muted,

    #[error("You don't have permission.")]
    PermissionDenied { permission: String },

    #[error("A player is required for this command.")]
    PlayerOnly,

    /// The host has no session open for the actor, so nothing can be stored.
    #[error("You have no active session.")]
    NoSession,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{reason} Usage: /{command} {usage}")]
    InvalidUsage {
        command: String,
        usage: String,
        reason: &'static str,
    },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to write config file {0}: {1}")]
    FileWrite(PathBuf, IoError),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Template '{key}' must contain the %s placeholder")]
    MissingPlaceholder { key: &'static str },
}

/// Event bus errors
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Handler execution failed: {0}")]
    HandlerExecution(String),
}

pub type MessagingResult<T> = Result<T, MessagingError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
