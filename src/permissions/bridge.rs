//! The narrow contract between the approval gate and the terminal UI.
//!
//! For every request the gate creates a one-shot channel, keeps the
//! receiving end, and hands the sending end to the bridge wrapped in an
//! [`ApprovalResponder`]. The responder is move-only and every resolving
//! method consumes it, so a request is answered at most once. Dropping it
//! unanswered closes the channel and the gate treats that as a denial.

use tracing::warn;

use super::types::{PermissionResult, ToolPermissionContext};

/// Implemented by the presentation layer: show a confirmation surface and
/// answer through the responder once the human picks approve, deny, or
/// approve-and-remember.
///
/// `ask` must not block; the answer is delivered later through the
/// responder, from any thread.
pub trait UiBridge: Send + Sync {
    fn ask(&self, context: ToolPermissionContext, responder: ApprovalResponder);
}

impl<F> UiBridge for F
where
    F: Fn(ToolPermissionContext, ApprovalResponder) + Send + Sync,
{
    fn ask(&self, context: ToolPermissionContext, responder: ApprovalResponder) {
        self(context, responder)
    }
}

/// Sending half of one approval request.
#[derive(Debug)]
pub struct ApprovalResponder {
    tx: async_channel::Sender<PermissionResult>,
}

impl ApprovalResponder {
    pub(crate) fn channel() -> (Self, async_channel::Receiver<PermissionResult>) {
        let (tx, rx) = async_channel::bounded(1);
        (Self { tx }, rx)
    }

    /// Deliver the decision. Returns `false` if nobody is waiting any more.
    pub fn resolve(self, result: PermissionResult) -> bool {
        self.tx.try_send(result).is_ok()
    }

    pub fn approve(self) -> bool {
        self.resolve(PermissionResult::approved())
    }

    pub fn deny(self, reason: impl Into<String>) -> bool {
        self.resolve(PermissionResult::denied(reason))
    }

    pub fn always_allow(self) -> bool {
        self.resolve(PermissionResult::always_allow())
    }

    /// Whether the requesting side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An approval request waiting for a human, as delivered by [`ChannelBridge`].
#[derive(Debug)]
pub struct PendingApproval {
    pub context: ToolPermissionContext,
    responder: ApprovalResponder,
}

impl PendingApproval {
    pub fn approve(self) -> bool {
        self.responder.approve()
    }

    pub fn deny(self, reason: impl Into<String>) -> bool {
        self.responder.deny(reason)
    }

    pub fn always_allow(self) -> bool {
        self.responder.always_allow()
    }

    pub fn resolve(self, result: PermissionResult) -> bool {
        self.responder.resolve(result)
    }
}

/// A bridge that forwards each request to the UI task over a channel.
///
/// The UI side owns the receiver, awaits [`PendingApproval`]s, opens its
/// dialog, and resolves each one. If the receiver is gone, the request is
/// dropped and resolves as denied.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    tx: async_channel::Sender<PendingApproval>,
}

impl ChannelBridge {
    pub fn new() -> (Self, async_channel::Receiver<PendingApproval>) {
        let (tx, rx) = async_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl UiBridge for ChannelBridge {
    fn ask(&self, context: ToolPermissionContext, responder: ApprovalResponder) {
        let tool_name = context.tool_name.clone();
        if self
            .tx
            .try_send(PendingApproval { context, responder })
            .is_err()
        {
            warn!(
                event_type = "approval_bridge",
                tool_name = %tool_name,
                "Approval UI receiver is gone; request dropped"
            );
        }
    }
}
