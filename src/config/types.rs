//! Configuration type definitions

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::permissions::{
    ApprovalGate, NoBridgePolicy, PermissionMode, PermissionModeStore, PolicyDispatcher,
    PreApprovedSet,
};
use crate::shortcuts::{RegistryOptions, ShortcutLayer, ShortcutRegistry};

/// Startup settings for the permission and shortcut core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// `auto` or `interactive` (default: interactive)
    #[serde(default = "default_permission_mode")]
    pub permission_mode: PermissionMode,
    /// What the gate does with no UI attached (default: allow)
    #[serde(default = "default_no_bridge_policy")]
    pub no_bridge_policy: NoBridgePolicy,
    /// Warn when two bindings share a combo on one layer (default: true)
    #[serde(default = "default_detect_shortcut_conflicts")]
    pub detect_shortcut_conflicts: bool,
    /// Shortcut layer active at startup (default: screen)
    #[serde(default = "default_initial_layer")]
    pub initial_layer: ShortcutLayer,
    /// Tool names exempt from confirmation from the start
    #[serde(default = "default_pre_approved_tools")]
    pub pre_approved_tools: Vec<String>,
}

fn default_permission_mode() -> PermissionMode {
    DEFAULT_PERMISSION_MODE
}
fn default_no_bridge_policy() -> NoBridgePolicy {
    DEFAULT_NO_BRIDGE_POLICY
}
fn default_detect_shortcut_conflicts() -> bool {
    DEFAULT_DETECT_SHORTCUT_CONFLICTS
}
fn default_initial_layer() -> ShortcutLayer {
    DEFAULT_INITIAL_LAYER
}
fn default_pre_approved_tools() -> Vec<String> {
    DEFAULT_PRE_APPROVED_TOOLS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            permission_mode: DEFAULT_PERMISSION_MODE,
            no_bridge_policy: DEFAULT_NO_BRIDGE_POLICY,
            detect_shortcut_conflicts: DEFAULT_DETECT_SHORTCUT_CONFLICTS,
            initial_layer: DEFAULT_INITIAL_LAYER,
            pre_approved_tools: default_pre_approved_tools(),
        }
    }
}

impl Config {
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            detect_conflicts: self.detect_shortcut_conflicts,
            initial_layer: self.initial_layer,
        }
    }

    pub fn build_registry(&self) -> ShortcutRegistry {
        ShortcutRegistry::with_options(self.registry_options())
    }

    pub fn build_mode_store(&self) -> PermissionModeStore {
        PermissionModeStore::new(self.permission_mode)
    }

    /// Gate seeded with `pre_approved_tools`. Blank names are skipped.
    pub fn build_gate(&self) -> ApprovalGate {
        let seeded: PreApprovedSet = self
            .pre_approved_tools
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect();
        ApprovalGate::with_pre_approved(seeded).with_no_bridge_policy(self.no_bridge_policy)
    }

    /// Mode store and gate wired into a dispatcher.
    pub fn build_dispatcher(&self) -> PolicyDispatcher {
        PolicyDispatcher::new(Arc::new(self.build_mode_store()), Arc::new(self.build_gate()))
    }
}
