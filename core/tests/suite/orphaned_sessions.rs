use minion_core::orphan::LifecycleTransition;
use minion_core::protocol::events::SessionTerminatedEvent;
use minion_core::protocol::events::ToolCallEvent;
use minion_core::protocol::messages::SessionLifecycleNotification;
use minion_core::protocol::tool_call::ResolvedToolStatus;
use minion_core::protocol::tool_call::ToolCallStatus;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::drain;
use super::event_types;
use super::feed;
use super::manager;

fn terminated(session_id: &str, terminated: bool) -> SessionLifecycleNotification {
    SessionLifecycleNotification {
        session_id: session_id.to_string(),
        terminated,
    }
}

#[test]
fn termination_overlays_executing_calls_without_overwriting() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Bash", "input": { "cmd": "sleep 60" } }),
            json!({ "session_id": "s1", "type": "permission_request", "request_id": "r1", "tool_name": "Bash", "input_params": { "cmd": "sleep 60" } }),
            json!({ "session_id": "s1", "type": "permission_response", "request_id": "r1", "decision": "allow" }),
            json!({ "session_id": "s1", "type": "tool_use", "id": "t2", "name": "Read", "input": { "path": "/a" } }),
            json!({ "session_id": "s1", "type": "tool_result", "tool_use_id": "t2", "content": "contents" }),
        ],
    )?;
    drain(&rx_event);

    assert_eq!(
        manager.observe_lifecycle(&terminated("s1", true)),
        LifecycleTransition::Terminated
    );

    let Some(view) = manager.tool_call_view("s1", "t1") else {
        anyhow::bail!("t1 should exist");
    };
    assert_eq!(view.status, ResolvedToolStatus::Orphaned);
    assert_eq!(view.record.status, ToolCallStatus::Executing);
    assert!(!view.has_error);
    let Some(info) = view.orphaned_info else {
        anyhow::bail!("orphaned calls carry orphan info");
    };
    assert_eq!(info.message, "Session was terminated");
    assert!(info.terminated_at.is_some());

    assert_eq!(
        manager.tool_call_view("s1", "t2").map(|view| view.status),
        Some(ResolvedToolStatus::Completed)
    );
    assert_eq!(
        drain(&rx_event),
        vec![ToolCallEvent::SessionTerminated(SessionTerminatedEvent {
            session_id: "s1".to_string(),
            orphaned_tool_call_ids: vec!["t1".to_string()],
        })]
    );
    Ok(())
}

#[test]
fn backend_status_beats_orphan_detection() -> anyhow::Result<()> {
    let (mut manager, _rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Bash", "input": { "cmd": "make" } }),
            json!({ "session_id": "s1", "type": "tool_status", "tool_use_id": "t1", "status": "running" }),
            json!({ "session_id": "s1", "type": "session_lifecycle", "terminated": true }),
        ],
    )?;

    let Some(view) = manager.tool_call_view("s1", "t1") else {
        anyhow::bail!("t1 should exist");
    };
    assert_eq!(view.status, ResolvedToolStatus::Executing);
    assert_eq!(view.orphaned_info, None);

    feed(
        &mut manager,
        &[json!({ "session_id": "s1", "type": "tool_status", "tool_use_id": "t1", "status": "interrupted" })],
    )?;
    assert_eq!(
        manager.tool_call_view("s1", "t1").map(|view| view.status),
        Some(ResolvedToolStatus::Orphaned)
    );
    Ok(())
}

#[test]
fn resumed_session_clears_overlay() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Bash", "input": { "cmd": "make" } }),
            json!({ "session_id": "s1", "type": "session_lifecycle", "terminated": true }),
            json!({ "session_id": "s1", "type": "session_lifecycle", "terminated": true }),
            json!({ "session_id": "s1", "type": "session_lifecycle", "terminated": false }),
        ],
    )?;

    assert_eq!(
        manager.tool_call_view("s1", "t1").map(|view| view.status),
        Some(ResolvedToolStatus::Pending)
    );
    assert_eq!(
        event_types(&rx_event)?,
        vec!["toolcall.started", "session.terminated", "session.resumed"]
    );
    Ok(())
}

#[test]
fn termination_only_affects_its_own_session() -> anyhow::Result<()> {
    let (mut manager, _rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Bash", "input": { "cmd": "make" } }),
            json!({ "session_id": "s2", "type": "tool_use", "id": "t1", "name": "Bash", "input": { "cmd": "make" } }),
        ],
    )?;
    manager.observe_lifecycle(&terminated("s1", true));

    assert_eq!(
        manager.tool_call_view("s1", "t1").map(|view| view.status),
        Some(ResolvedToolStatus::Orphaned)
    );
    assert_eq!(
        manager.tool_call_view("s2", "t1").map(|view| view.status),
        Some(ResolvedToolStatus::Pending)
    );
    Ok(())
}
