//! Tool-call permission handling.
//!
//! - [`PermissionModeStore`] holds the `auto` / `interactive` policy
//! - [`ApprovalGate`] suspends a request until a human answers through a [`UiBridge`]
//! - [`PolicyDispatcher`] is what the tool loop calls before running a tool
//!
//! ```rust,ignore
//! let dispatcher = PolicyDispatcher::new(mode_store, gate);
//! let result = dispatcher
//!     .request_approval(ToolPermissionContext::new("bash").with_argument("command", "ls"))
//!     .await;
//! if !result.approved {
//!     // report the refusal to the model
//! }
//! ```

mod bridge;
mod dispatcher;
mod gate;
mod mode;
mod types;

pub use bridge::{ApprovalResponder, ChannelBridge, PendingApproval, UiBridge};
pub use dispatcher::{PolicyDispatcher, AUTO_MODE_REASON};
pub use gate::{
    ApprovalGate, NoBridgePolicy, PreApprovedSet, DIALOG_CLOSED_REASON, NO_BRIDGE_REASON,
};
pub use mode::{ModeSubscriber, PermissionMode, PermissionModeStore, UnknownMode};
pub use types::{PermissionResult, ToolPermissionContext};
