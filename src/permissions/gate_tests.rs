use super::*;
use crate::permissions::bridge::ChannelBridge;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_bridge(calls: Arc<AtomicUsize>, answer: PermissionResult) -> Arc<dyn UiBridge> {
    Arc::new(move |_ctx: ToolPermissionContext, responder: ApprovalResponder| {
        calls.fetch_add(1, Ordering::SeqCst);
        responder.resolve(answer.clone());
    })
}

async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn pre_approved_tool_skips_the_bridge() {
    let gate = ApprovalGate::with_pre_approved(["read_file"].into_iter().collect());
    let calls = Arc::new(AtomicUsize::new(0));
    gate.attach_bridge(counting_bridge(calls.clone(), PermissionResult::denied("no")));

    let result = gate.request_approval(ToolPermissionContext::new("read_file")).await;

    assert_eq!(result, PermissionResult::approved());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_bridge_fails_open_by_default() {
    let gate = ApprovalGate::new();
    let result = gate.request_approval(ToolPermissionContext::new("bash")).await;

    assert!(result.approved);
    assert_eq!(result.reason.as_deref(), Some(NO_BRIDGE_REASON));
    assert!(!gate.has_pre_approval("bash"));
}

#[tokio::test]
async fn missing_bridge_can_fail_closed() {
    let gate = ApprovalGate::new().with_no_bridge_policy(NoBridgePolicy::Deny);
    let result = gate.request_approval(ToolPermissionContext::new("bash")).await;

    assert!(!result.approved);
    assert_eq!(result.reason.as_deref(), Some(NO_BRIDGE_REASON));
}

#[tokio::test]
async fn request_stays_pending_until_the_human_answers() {
    let gate = Arc::new(ApprovalGate::new());
    let (bridge, requests) = ChannelBridge::new();
    gate.attach_bridge(Arc::new(bridge));

    let task = {
        let gate = gate.clone();
        tokio::spawn(async move {
            gate.request_approval(
                ToolPermissionContext::new("write_file").with_argument("path", "notes.md"),
            )
            .await
        })
    };

    let pending = requests.recv().await.unwrap();
    assert_eq!(pending.context.tool_name, "write_file");
    settle().await;
    assert!(!task.is_finished());

    assert!(pending.approve());
    assert_eq!(task.await.unwrap(), PermissionResult::approved());
    assert!(!gate.has_pre_approval("write_file"));
}

#[tokio::test]
async fn always_allow_records_pre_approval() {
    let gate = ApprovalGate::new();
    let calls = Arc::new(AtomicUsize::new(0));
    gate.attach_bridge(counting_bridge(calls.clone(), PermissionResult::always_allow()));

    let first = gate.request_approval(ToolPermissionContext::new("grep")).await;
    assert!(first.grants_pre_approval());
    assert!(gate.has_pre_approval("grep"));

    let second = gate.request_approval(ToolPermissionContext::new("grep")).await;
    assert_eq!(second, PermissionResult::approved());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn denial_never_adds_pre_approval() {
    let gate = ApprovalGate::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let denied_but_remembered = PermissionResult {
        approved: false,
        reason: Some("not in this repo".to_string()),
        remember_choice: true,
    };
    gate.attach_bridge(counting_bridge(calls.clone(), denied_but_remembered.clone()));

    let result = gate.request_approval(ToolPermissionContext::new("rm")).await;

    assert_eq!(result, denied_but_remembered);
    assert!(!gate.has_pre_approval("rm"));
    assert!(gate.pre_approved_tools().is_empty());
}

#[tokio::test]
async fn dropped_responder_resolves_as_denied() {
    let gate = ApprovalGate::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    gate.attach_bridge(Arc::new(
        move |_ctx: ToolPermissionContext, responder: ApprovalResponder| {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(responder);
        },
    ));

    let result = gate.request_approval(ToolPermissionContext::new("bash")).await;
    assert_eq!(result, PermissionResult::denied(DIALOG_CLOSED_REASON));

    // The slot is released, so the next request still reaches the bridge.
    gate.request_approval(ToolPermissionContext::new("bash")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_requests_reach_the_bridge_one_at_a_time() {
    let gate = Arc::new(ApprovalGate::new());
    let (bridge, requests) = ChannelBridge::new();
    gate.attach_bridge(Arc::new(bridge));

    let spawn_request = |tool: &'static str| {
        let gate = gate.clone();
        tokio::spawn(async move { gate.request_approval(ToolPermissionContext::new(tool)).await })
    };
    let first = spawn_request("edit_file");
    let second = spawn_request("bash");

    let pending = requests.recv().await.unwrap();
    settle().await;
    assert!(requests.try_recv().is_err());

    let first_tool = pending.context.tool_name.clone();
    assert!(pending.deny("wrong file"));

    let next = requests.recv().await.unwrap();
    assert_ne!(next.context.tool_name, first_tool);
    assert!(next.approve());

    let results = [first.await.unwrap(), second.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.approved).count(), 1);
}

#[tokio::test]
async fn queued_request_rechecks_pre_approval() {
    let gate = Arc::new(ApprovalGate::new());
    let (bridge, requests) = ChannelBridge::new();
    gate.attach_bridge(Arc::new(bridge));

    let spawn_request = || {
        let gate = gate.clone();
        tokio::spawn(async move { gate.request_approval(ToolPermissionContext::new("bash")).await })
    };
    let first = spawn_request();
    let second = spawn_request();

    let pending = requests.recv().await.unwrap();
    settle().await;
    assert!(pending.always_allow());

    let results = [first.await.unwrap(), second.await.unwrap()];
    assert!(results.iter().all(|r| r.approved));
    assert_eq!(results.iter().filter(|r| r.remember_choice).count(), 1);
    assert!(requests.try_recv().is_err());
}

#[test]
fn record_preference_adds_and_removes() {
    let gate = ApprovalGate::new();
    assert!(gate.record_preference("write_file", true));
    assert!(!gate.record_preference("write_file", true));
    assert!(gate.record_preference("bash", true));
    assert_eq!(gate.pre_approved_tools(), vec!["bash", "write_file"]);

    assert!(gate.record_preference("bash", false));
    assert!(!gate.record_preference("bash", false));
    assert_eq!(gate.pre_approved_tools(), vec!["write_file"]);

    gate.clear_preferences();
    assert!(gate.pre_approved_tools().is_empty());
}

#[test]
fn gates_can_share_one_pre_approved_set() {
    let shared = PreApprovedSet::new();
    let a = ApprovalGate::with_pre_approved(shared.clone());
    let b = ApprovalGate::with_pre_approved(shared.clone());

    a.record_preference("ls", true);
    assert!(b.has_pre_approval("ls"));
    assert_eq!(shared.len(), 1);
}

#[test]
fn bridge_attach_and_detach() {
    let gate = ApprovalGate::new();
    assert!(!gate.has_bridge());
    let (bridge, _requests) = ChannelBridge::new();
    gate.attach_bridge(Arc::new(bridge));
    assert!(gate.has_bridge());
    assert!(gate.detach_bridge().is_some());
    assert!(!gate.has_bridge());
}

#[test]
fn no_bridge_policy_serde() {
    assert_eq!(
        serde_json::from_str::<NoBridgePolicy>("\"deny\"").unwrap(),
        NoBridgePolicy::Deny
    );
    assert_eq!(NoBridgePolicy::default(), NoBridgePolicy::Allow);
}
