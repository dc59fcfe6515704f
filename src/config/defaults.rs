//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

use crate::permissions::{NoBridgePolicy, PermissionMode};
use crate::shortcuts::ShortcutLayer;

/// Config file location under the platform config directory
pub const CONFIG_DIR_NAME: &str = "toolgate";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Tool calls need a human decision unless pre-approved
pub const DEFAULT_PERMISSION_MODE: PermissionMode = PermissionMode::Interactive;

/// Approve when no UI bridge is attached
pub const DEFAULT_NO_BRIDGE_POLICY: NoBridgePolicy = NoBridgePolicy::Allow;

pub const DEFAULT_DETECT_SHORTCUT_CONFLICTS: bool = true;

pub const DEFAULT_INITIAL_LAYER: ShortcutLayer = ShortcutLayer::Screen;

/// Tools seeded into the pre-approved set at startup
pub const DEFAULT_PRE_APPROVED_TOOLS: &[&str] = &[];
