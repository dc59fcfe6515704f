//! Toolgate - permission gating and shortcut routing for terminal assistants
//!
//! This library provides the two pieces of an agentic terminal assistant
//! that sit between the model's tool calls, the human, and the keyboard:
//!
//! - [`permissions`]: decides whether a proposed tool call may run, either
//!   automatically or by suspending until the human answers in the UI
//! - [`shortcuts`]: routes keystrokes to handlers across prioritized layers

pub mod config;
pub mod error;
pub mod logging;
pub mod permissions;
pub mod shortcuts;

pub use config::{load_config, Config};
pub use error::{ComboParseError, Result, ResultExt, ToolgateError};
pub use permissions::{
    ApprovalGate, ApprovalResponder, ChannelBridge, PendingApproval, PermissionMode,
    PermissionModeStore, PermissionResult, PolicyDispatcher, ToolPermissionContext, UiBridge,
};
pub use shortcuts::{KeyCombo, KeyFlags, ShortcutBinding, ShortcutLayer, ShortcutRegistry};
