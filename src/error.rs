use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Errors produced while parsing a key combo string such as `ctrl+shift+up`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComboParseError {
    #[error("key combo string is empty")]
    Empty,
    #[error("key combo has no key, only modifiers")]
    MissingKey,
    #[error("key combo names more than one key: '{0}'")]
    UnknownToken(String),
    #[error("unknown modifier '{0}' in key combo")]
    UnknownModifier(String),
}

/// Domain errors for the permission and shortcut core.
#[derive(Error, Debug)]
pub enum ToolgateError {
    #[error("invalid key combo: {0}")]
    InvalidCombo(#[from] ComboParseError),

    #[error("failed to read config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("tool '{tool}' was denied: {reason}")]
    Denied { tool: String, reason: String },
}

impl ToolgateError {
    /// Message suitable for showing in the transcript next to a refused tool call.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCombo(e) => format!("Shortcut not understood: {}", e),
            Self::Config { path, .. } => format!("Could not read {}", path.display()),
            Self::ConfigParse(e) => format!("Configuration issue: {}", e),
            Self::Denied { tool, reason } => format!("{} was not run ({})", tool, reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolgateError>;

/// Extension trait for logging a recoverable failure and carrying on.
///
/// Both methods record the caller's file and line through `#[track_caller]`.
pub trait ResultExt<T> {
    /// Log at error level and return `None`.
    fn log_err(self) -> Option<T>;
    /// Log at warn level and return `None`. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
