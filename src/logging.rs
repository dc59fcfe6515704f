//! Structured JSONL logging plus human-readable stderr output.
//!
//! - **JSONL to file** (`<data dir>/toolgate/logs/toolgate.jsonl`) for tooling
//! - **Compact to stderr** for developers, optional
//!
//! # Usage
//!
//! ```rust,ignore
//! // Keep the guard alive for the duration of the program.
//! let _guard = toolgate::logging::init(LoggingOptions::default());
//! tracing::info!(event_type = "app_start", "Assistant started");
//! ```
//!
//! The core modules log through the helpers at the bottom of this file so
//! every event carries an `event_type` field.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ResultExt;
use crate::permissions::PermissionMode;
use crate::shortcuts::ShortcutLayer;

const LOG_FILE_NAME: &str = "toolgate.jsonl";
const DEFAULT_FILTER: &str = "info";
const MAX_RECENT_EVENTS: usize = 50;

static RECENT_EVENTS: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }
}

/// Where and how to log.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Directory for the JSONL file. `None` uses [`default_log_dir`].
    pub log_dir: Option<PathBuf>,
    /// Also write compact lines to stderr.
    pub stderr: bool,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_dir: None,
            stderr: true,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

/// Initialize logging without failing.
///
/// Falls back to a sink that discards output when the log file cannot be
/// opened. If a global subscriber is already installed, the existing one
/// stays in place and receives a warning.
pub fn init(options: LoggingOptions) -> LoggingGuard {
    try_init(options.clone()).warn_on_err().unwrap_or_else(|| {
        let (_, file_guard) = tracing_appender::non_blocking(std::io::sink());
        LoggingGuard {
            _file_guard: file_guard,
            log_path: log_file_in(options.log_dir),
        }
    })
}

/// Initialize logging, returning an error if a global subscriber exists.
pub fn try_init(options: LoggingOptions) -> Result<LoggingGuard, TryInitError> {
    let log_dir = options.log_dir.clone().unwrap_or_else(default_log_dir);
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join(LOG_FILE_NAME);

    let (non_blocking_file, file_guard) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_appender::non_blocking(std::io::sink())
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = options.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_path,
    })
}

/// `<data dir>/toolgate/logs`, or a temp-dir fallback.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("toolgate").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("toolgate-logs"))
}

fn log_file_in(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(default_log_dir).join(LOG_FILE_NAME)
}

fn add_recent(line: String) {
    let buffer =
        RECENT_EVENTS.get_or_init(|| Mutex::new(VecDeque::with_capacity(MAX_RECENT_EVENTS)));
    let mut buf = buffer.lock();
    if buf.len() >= MAX_RECENT_EVENTS {
        buf.pop_front();
    }
    buf.push_back(line);
}

/// Most recent permission and shortcut events, oldest first. Meant for a
/// debug panel in the terminal UI.
pub fn recent_events() -> Vec<String> {
    RECENT_EVENTS
        .get()
        .map(|buffer| buffer.lock().iter().cloned().collect())
        .unwrap_or_default()
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log the outcome of offering a key to one binding.
pub fn log_shortcut_event(binding_id: &str, combo: &str, layer: ShortcutLayer, outcome: &str) {
    tracing::debug!(
        event_type = "shortcut_event",
        binding_id = binding_id,
        combo = combo,
        layer = %layer,
        outcome = outcome,
        "Shortcut {} {} on {}", combo, outcome, layer
    );
}

/// Log an approval decision.
pub fn log_approval_event(tool_name: &str, approved: bool, path: &str, reason: Option<&str>) {
    add_recent(format!(
        "[APPROVAL] {} {} via {}",
        tool_name,
        if approved { "approved" } else { "denied" },
        path
    ));

    tracing::info!(
        event_type = "approval_event",
        tool_name = tool_name,
        approved = approved,
        path = path,
        reason = reason,
        "Tool {} {} via {}",
        tool_name,
        if approved { "approved" } else { "denied" },
        path
    );
}

/// Log a permission mode change.
pub fn log_mode_change(from: PermissionMode, to: PermissionMode) {
    add_recent(format!("[MODE] {} -> {}", from, to));

    tracing::info!(
        event_type = "mode_change",
        from = %from,
        to = %to,
        "Permission mode changed from {} to {}", from, to
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_feed_bounded_recent_events() {
        log_approval_event("read_file", true, "pre_approved", None);
        log_mode_change(PermissionMode::Interactive, PermissionMode::Auto);

        let recent = recent_events();
        assert!(recent.iter().any(|l| l == "[APPROVAL] read_file approved via pre_approved"));
        assert!(recent.iter().any(|l| l == "[MODE] interactive -> auto"));

        for i in 0..(MAX_RECENT_EVENTS + 10) {
            log_approval_event(&format!("tool-{}", i), false, "bridge", Some("declined"));
        }
        assert!(recent_events().len() <= MAX_RECENT_EVENTS);
    }

    #[test]
    fn default_log_file_name() {
        let path = log_file_in(Some(PathBuf::from("/tmp/x")));
        assert_eq!(path, PathBuf::from("/tmp/x/toolgate.jsonl"));
    }
}
