//! Configuration module - startup settings for permissions and shortcuts
//!
//! This module provides functionality for:
//! - Loading configuration from `<config dir>/toolgate/config.json`
//! - Default values for all settings
//! - Building the registry, mode store, gate and dispatcher from a `Config`
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - The `Config` struct and its builders
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_DETECT_SHORTCUT_CONFLICTS, DEFAULT_INITIAL_LAYER, DEFAULT_NO_BRIDGE_POLICY,
    DEFAULT_PERMISSION_MODE,
};

pub use types::Config;

pub use loader::{default_config_path, load_config, load_config_from_str, try_load_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
