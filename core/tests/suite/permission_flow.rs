use minion_core::protocol::tool_call::PermissionDecision;
use minion_core::protocol::tool_call::ResolvedToolStatus;
use minion_core::protocol::tool_call::ToolCallResult;
use minion_core::protocol::tool_call::ToolCallStatus;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::event_types;
use super::feed;
use super::manager;

#[test]
fn observed_tool_use_correlates_with_permission_request() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Read", "input": { "path": "/a" } }),
            json!({ "session_id": "s1", "type": "permission_request", "request_id": "r1", "tool_name": "Read", "input_params": { "path": "/a" } }),
        ],
    )?;

    let Some(view) = manager.tool_call_view("s1", "t1") else {
        anyhow::bail!("t1 should exist");
    };
    assert_eq!(view.record.id, "t1");
    assert!(!view.record.is_historical);
    assert_eq!(view.record.status, ToolCallStatus::PermissionRequired);
    assert_eq!(view.status, ResolvedToolStatus::PermissionRequired);
    assert_eq!(view.summary, "❓ Read(path=\"/a\") - Awaiting Permission");
    assert_eq!(
        event_types(&rx_event)?,
        vec!["toolcall.started", "toolcall.permission_required"]
    );
    Ok(())
}

#[test]
fn request_without_tool_use_is_reconstructed_as_historical() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[json!({
            "session_id": "s1",
            "type": "permission_request",
            "request_id": "r2",
            "tool_name": "Bash",
            "input_params": { "cmd": "ls" },
            "suggestions": [{ "type": "addRules", "rules": ["Bash(ls)"] }],
        })],
    )?;

    let Some(view) = manager.tool_call_view("s1", "historical_r2") else {
        anyhow::bail!("historical record should exist");
    };
    assert!(view.record.is_historical);
    assert!(!view.record.is_expanded);
    assert_eq!(view.record.suggestions.len(), 1);
    assert_eq!(event_types(&rx_event)?, vec!["toolcall.permission_required"]);

    // A later real invocation with the same signature is not captured by it.
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t5", "name": "Bash", "input": { "cmd": "ls" } }),
            json!({ "session_id": "s1", "type": "permission_request", "request_id": "r3", "tool_name": "Bash", "input_params": { "cmd": "ls" } }),
        ],
    )?;
    assert_eq!(
        manager
            .tool_call_view("s1", "t5")
            .and_then(|view| view.record.permission_request_id),
        Some("r3".to_string())
    );
    assert_eq!(
        manager
            .tool_call_view("s1", "historical_r2")
            .and_then(|view| view.record.permission_request_id),
        Some("r2".to_string())
    );
    Ok(())
}

#[test]
fn deny_completes_with_error_and_collapses() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Bash", "input": { "cmd": "rm -rf build" } }),
            json!({ "session_id": "s1", "type": "permission_request", "request_id": "r1", "tool_name": "Bash", "input_params": { "cmd": "rm -rf build" } }),
            json!({ "session_id": "s1", "type": "permission_response", "request_id": "r1", "decision": "deny", "reasoning": "Not now" }),
        ],
    )?;

    let Some(view) = manager.tool_call_view("s1", "t1") else {
        anyhow::bail!("t1 should exist");
    };
    assert_eq!(view.record.status, ToolCallStatus::Completed);
    assert_eq!(view.record.permission_decision, Some(PermissionDecision::Deny));
    assert_eq!(view.record.result, Some(ToolCallResult::denied(Some("Not now"))));
    assert!(!view.record.is_expanded);
    assert!(view.has_error);
    assert_eq!(view.summary, "❌ Bash(cmd=\"rm -rf build\") - Denied");
    assert_eq!(
        event_types(&rx_event)?,
        vec![
            "toolcall.started",
            "toolcall.permission_required",
            "toolcall.completed",
        ]
    );
    Ok(())
}

#[test]
fn unrecognized_decision_is_treated_as_deny() -> anyhow::Result<()> {
    let (mut manager, _rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "type": "permission_request", "request_id": "r1", "tool_name": "Write", "input_params": { "path": "/etc/hosts" } }),
            json!({ "type": "permission_response", "request_id": "r1", "decision": "maybe" }),
        ],
    )?;

    let Some(view) = manager.tool_call_view("default", "historical_r1") else {
        anyhow::bail!("historical record should exist");
    };
    assert_eq!(view.record.status, ToolCallStatus::Completed);
    assert_eq!(
        view.record.result,
        Some(ToolCallResult {
            error: true,
            content: json!("Permission denied"),
        })
    );
    Ok(())
}

#[test]
fn allow_then_result_runs_to_completion() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_use", "id": "t1", "name": "Edit", "input": { "path": "src/lib.rs", "old": "a", "new": "b" } }),
            json!({ "session_id": "s1", "type": "permission_request", "request_id": "r1", "tool_name": "Edit", "input_params": { "new": "b", "path": "src/lib.rs", "old": "a" } }),
            json!({ "session_id": "s1", "type": "permission_response", "request_id": "r1", "decision": "allow", "applied_updates": [{ "type": "setMode", "mode": "acceptEdits" }] }),
        ],
    )?;
    assert_eq!(
        manager.tool_call_view("s1", "t1").map(|view| view.status),
        Some(ResolvedToolStatus::Executing)
    );

    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_result", "tool_use_id": "t1", "is_error": false, "content": "edited" }),
            json!({ "session_id": "s1", "type": "assistant_explanation", "content": "Fixing the typo", "related_tool_ids": ["t1"] }),
        ],
    )?;
    let Some(view) = manager.tool_call_view("s1", "t1") else {
        anyhow::bail!("t1 should exist");
    };
    assert_eq!(view.record.status, ToolCallStatus::Completed);
    assert_eq!(view.record.applied_updates.len(), 1);
    assert_eq!(view.record.explanation.as_deref(), Some("Fixing the typo"));
    assert!(!view.has_error);
    assert_eq!(
        event_types(&rx_event)?,
        vec![
            "toolcall.started",
            "toolcall.permission_required",
            "toolcall.updated",
            "toolcall.completed",
            "toolcall.updated",
        ]
    );
    Ok(())
}

#[test]
fn unknown_references_are_ignored() -> anyhow::Result<()> {
    let (mut manager, rx_event) = manager();
    feed(
        &mut manager,
        &[
            json!({ "session_id": "s1", "type": "tool_result", "tool_use_id": "missing", "is_error": false, "content": "x" }),
            json!({ "session_id": "s1", "type": "permission_response", "request_id": "nope", "decision": "allow" }),
        ],
    )?;
    assert_eq!(manager.tool_call_views("s1"), Vec::new());
    assert_eq!(event_types(&rx_event)?, Vec::<String>::new());
    Ok(())
}
