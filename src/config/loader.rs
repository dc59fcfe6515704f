//! Configuration loading from the file system

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::types::Config;
use crate::error::{Result, ToolgateError};

/// `<config dir>/toolgate/config.json`, or `./toolgate/config.json` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Parse a JSON config document. Missing fields take their defaults.
pub fn load_config_from_str(json: &str) -> Result<Config> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a config file, reporting every failure.
pub fn try_load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|source| ToolgateError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&contents)
}

/// Load configuration from `path`.
///
/// Returns `Config::default()` if the file is missing, unreadable, or
/// malformed; this never fails.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    match try_load_config(path) {
        Ok(config) => {
            info!(
                permission_mode = %config.permission_mode,
                pre_approved = config.pre_approved_tools.len(),
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            let error_hint = parse_hint(&e);
            warn!(error = %e, hint = %error_hint, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

fn parse_hint(error: &ToolgateError) -> &'static str {
    let ToolgateError::ConfigParse(e) = error else {
        return "";
    };
    let message = e.to_string();
    if message.contains("unknown variant") && message.contains("auto") {
        "permissionMode must be \"auto\" or \"interactive\""
    } else if message.contains("unknown variant") && message.contains("allow") {
        "noBridgePolicy must be \"allow\" or \"deny\""
    } else if message.contains("unknown variant") && message.contains("global") {
        "initialLayer must be one of \"global\", \"screen\", \"dialog\", \"input\""
    } else if message.contains("expected a sequence") {
        "preApprovedTools must be an array of tool names, e.g. [\"read_file\"]"
    } else {
        ""
    }
}
