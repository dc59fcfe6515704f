//! Single entry point the tool-execution loop calls before running a tool.

use std::sync::Arc;

use tracing::debug;

use super::gate::ApprovalGate;
use super::mode::{PermissionMode, PermissionModeStore};
use super::types::{PermissionResult, ToolPermissionContext};
use crate::error::{Result, ToolgateError};
use crate::logging;

/// Reason attached to every approval granted in auto mode.
pub const AUTO_MODE_REASON: &str = "auto mode";

/// Routes each request by the current [`PermissionMode`].
///
/// The mode is read per call, so a toggle applies to the next request while
/// one already suspended in the gate keeps waiting.
#[derive(Clone)]
pub struct PolicyDispatcher {
    mode: Arc<PermissionModeStore>,
    gate: Arc<ApprovalGate>,
}

impl PolicyDispatcher {
    pub fn new(mode: Arc<PermissionModeStore>, gate: Arc<ApprovalGate>) -> Self {
        Self { mode, gate }
    }

    /// In `auto` mode approve immediately without touching the gate or the
    /// UI; in `interactive` mode defer to [`ApprovalGate::request_approval`].
    pub async fn request_approval(&self, context: ToolPermissionContext) -> PermissionResult {
        match self.mode.get() {
            PermissionMode::Auto => {
                logging::log_approval_event(
                    &context.tool_name,
                    true,
                    "auto",
                    Some(AUTO_MODE_REASON),
                );
                PermissionResult::approved_with_reason(AUTO_MODE_REASON)
            }
            PermissionMode::Interactive => {
                debug!(
                    event_type = "approval_request",
                    tool_name = %context.tool_name,
                    "Deferring to approval gate"
                );
                self.gate.request_approval(context).await
            }
        }
    }

    /// Like [`request_approval`](Self::request_approval) but turns a denial
    /// into [`ToolgateError::Denied`], for loops that propagate with `?`.
    pub async fn authorize(&self, context: ToolPermissionContext) -> Result<PermissionResult> {
        let tool = context.tool_name.clone();
        let result = self.request_approval(context).await;
        if result.approved {
            Ok(result)
        } else {
            Err(ToolgateError::Denied {
                tool,
                reason: result.reason.unwrap_or_else(|| "denied".to_string()),
            })
        }
    }

    /// Every tool counts as pre-approved in auto mode.
    pub fn has_pre_approval(&self, tool_name: &str) -> bool {
        match self.mode.get() {
            PermissionMode::Auto => true,
            PermissionMode::Interactive => self.gate.has_pre_approval(tool_name),
        }
    }

    pub fn mode(&self) -> PermissionMode {
        self.mode.get()
    }

    pub fn mode_store(&self) -> &Arc<PermissionModeStore> {
        &self.mode
    }

    pub fn gate(&self) -> &Arc<ApprovalGate> {
        &self.gate
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
