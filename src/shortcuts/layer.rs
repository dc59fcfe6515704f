//! Shortcut layers, ordered by priority.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Priority tier a binding lives in: `global` < `screen` < `dialog` < `input`.
///
/// Exactly one layer is active at a time. `Global` bindings are always
/// eligible, whatever the active layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutLayer {
    Global,
    #[default]
    Screen,
    Dialog,
    Input,
}

impl ShortcutLayer {
    /// All layers, lowest priority first.
    pub const ALL: [ShortcutLayer; 4] = [
        ShortcutLayer::Global,
        ShortcutLayer::Screen,
        ShortcutLayer::Dialog,
        ShortcutLayer::Input,
    ];

    /// Numeric priority (higher wins).
    pub fn priority(&self) -> u8 {
        match self {
            Self::Global => 0,
            Self::Screen => 1,
            Self::Dialog => 2,
            Self::Input => 3,
        }
    }

    /// Whether a binding on this layer may fire while `active` is the active layer.
    pub fn is_eligible_under(&self, active: ShortcutLayer) -> bool {
        *self == Self::Global || self.priority() >= active.priority()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Screen => "screen",
            Self::Dialog => "dialog",
            Self::Input => "input",
        }
    }
}

impl fmt::Display for ShortcutLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a layer name is not one of the four tiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shortcut layer '{0}'")]
pub struct UnknownLayer(pub String);

impl FromStr for ShortcutLayer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "screen" => Ok(Self::Screen),
            "dialog" => Ok(Self::Dialog),
            "input" => Ok(Self::Input),
            _ => Err(UnknownLayer(s.to_string())),
        }
    }
}
