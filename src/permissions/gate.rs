//! Interactive approval gate.
//!
//! Pre-approved tools pass straight through. Anything else is handed to the
//! attached [`UiBridge`] and the caller is suspended until the human answers.
//! Requests on one gate are single-flight: a second request waits for the
//! first to resolve before it reaches the bridge.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bridge::{ApprovalResponder, UiBridge};
use super::types::{PermissionResult, ToolPermissionContext};
use crate::logging;

/// Reason attached to approvals granted because no UI bridge is attached.
pub const NO_BRIDGE_REASON: &str = "no UI bridge";
/// Reason attached when the bridge drops a request without answering.
pub const DIALOG_CLOSED_REASON: &str = "approval dialog closed";

/// What to do when approval is needed but no UI bridge is attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoBridgePolicy {
    /// Approve, so the tool loop never deadlocks waiting for nobody.
    #[default]
    Allow,
    /// Deny until a UI is attached.
    Deny,
}

/// Tool names exempt from interactive confirmation.
///
/// Cloning shares the underlying set, so several gates can use one set.
#[derive(Clone, Debug, Default)]
pub struct PreApprovedSet {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl PreApprovedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tool_name: &str) -> bool {
        self.inner.read().contains(tool_name)
    }

    /// Returns `true` if the name was newly added.
    pub fn insert(&self, tool_name: &str) -> bool {
        self.inner.write().insert(tool_name.to_string())
    }

    /// Returns `true` if the name was present.
    pub fn remove(&self, tool_name: &str) -> bool {
        self.inner.write().remove(tool_name)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted copy of the current names.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().iter().cloned().collect();
        names.sort();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for PreApprovedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(iter.into_iter().map(Into::into).collect())),
        }
    }
}

/// Returns the single-flight token to the gate when dropped.
struct FlightGuard<'a> {
    tx: &'a async_channel::Sender<()>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let _ = self.tx.try_send(());
    }
}

pub struct ApprovalGate {
    pre_approved: PreApprovedSet,
    bridge: RwLock<Option<Arc<dyn UiBridge>>>,
    no_bridge_policy: NoBridgePolicy,
    flight_tx: async_channel::Sender<()>,
    flight_rx: async_channel::Receiver<()>,
}

impl Default for ApprovalGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self::with_pre_approved(PreApprovedSet::new())
    }

    /// Build a gate over an existing (possibly shared) pre-approved set.
    pub fn with_pre_approved(pre_approved: PreApprovedSet) -> Self {
        let (flight_tx, flight_rx) = async_channel::bounded(1);
        // Capacity 1 on a fresh channel: this cannot fail.
        let _ = flight_tx.try_send(());
        Self {
            pre_approved,
            bridge: RwLock::new(None),
            no_bridge_policy: NoBridgePolicy::default(),
            flight_tx,
            flight_rx,
        }
    }

    pub fn with_no_bridge_policy(mut self, policy: NoBridgePolicy) -> Self {
        self.no_bridge_policy = policy;
        self
    }

    pub fn no_bridge_policy(&self) -> NoBridgePolicy {
        self.no_bridge_policy
    }

    pub fn attach_bridge(&self, bridge: Arc<dyn UiBridge>) {
        debug!(event_type = "approval_bridge", "UI bridge attached");
        *self.bridge.write() = Some(bridge);
    }

    pub fn detach_bridge(&self) -> Option<Arc<dyn UiBridge>> {
        debug!(event_type = "approval_bridge", "UI bridge detached");
        self.bridge.write().take()
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge.read().is_some()
    }

    /// Decide whether a tool call may run, asking the human if needed.
    ///
    /// Suspends until the bridge answers. There is no timeout and no way to
    /// cancel; only an answer (or the bridge dropping the request) resumes.
    pub async fn request_approval(&self, context: ToolPermissionContext) -> PermissionResult {
        let tool_name = context.tool_name.clone();

        if self.has_pre_approval(&tool_name) {
            logging::log_approval_event(&tool_name, true, "pre_approved", None);
            return PermissionResult::approved();
        }

        let bridge = self.bridge.read().clone();
        let Some(bridge) = bridge else {
            return self.without_bridge(&tool_name);
        };

        let _flight = self.enter_flight().await;

        // A request ahead of us may have granted a standing approval.
        if self.has_pre_approval(&tool_name) {
            logging::log_approval_event(&tool_name, true, "pre_approved", None);
            return PermissionResult::approved();
        }

        let (responder, answer) = ApprovalResponder::channel();
        bridge.ask(context, responder);

        let result = match answer.recv().await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    event_type = "approval_bridge",
                    tool_name = %tool_name,
                    "Approval request dropped without an answer; denying"
                );
                PermissionResult::denied(DIALOG_CLOSED_REASON)
            }
        };

        if result.grants_pre_approval() {
            self.record_preference(&tool_name, true);
        }
        logging::log_approval_event(
            &tool_name,
            result.approved,
            "ui_bridge",
            result.reason.as_deref(),
        );
        result
    }

    /// Add (`always_allow = true`) or remove a standing approval.
    /// Returns whether the set changed.
    pub fn record_preference(&self, tool_name: &str, always_allow: bool) -> bool {
        let changed = if always_allow {
            self.pre_approved.insert(tool_name)
        } else {
            self.pre_approved.remove(tool_name)
        };
        if changed {
            debug!(
                event_type = "pre_approval",
                tool_name = tool_name,
                always_allow = always_allow,
                "Pre-approval updated"
            );
        }
        changed
    }

    pub fn clear_preferences(&self) {
        self.pre_approved.clear();
    }

    pub fn has_pre_approval(&self, tool_name: &str) -> bool {
        self.pre_approved.contains(tool_name)
    }

    pub fn pre_approved_tools(&self) -> Vec<String> {
        self.pre_approved.snapshot()
    }

    fn without_bridge(&self, tool_name: &str) -> PermissionResult {
        match self.no_bridge_policy {
            NoBridgePolicy::Allow => {
                warn!(
                    event_type = "approval_bridge",
                    tool_name = tool_name,
                    "No UI bridge attached; approving"
                );
                logging::log_approval_event(tool_name, true, "no_bridge", Some(NO_BRIDGE_REASON));
                PermissionResult::approved_with_reason(NO_BRIDGE_REASON)
            }
            NoBridgePolicy::Deny => {
                warn!(
                    event_type = "approval_bridge",
                    tool_name = tool_name,
                    "No UI bridge attached; denying"
                );
                logging::log_approval_event(tool_name, false, "no_bridge", Some(NO_BRIDGE_REASON));
                PermissionResult::denied(NO_BRIDGE_REASON)
            }
        }
    }

    async fn enter_flight(&self) -> FlightGuard<'_> {
        // The gate owns a sender, so the channel never closes while we wait.
        let _ = self.flight_rx.recv().await;
        FlightGuard { tx: &self.flight_tx }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
