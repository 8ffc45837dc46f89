use minion_core::MinionErr;
use minion_core::protocol::tool_call::ResolvedToolStatus;
use minion_core::transcript::read_transcript;
use pretty_assertions::assert_eq;

use super::manager;

const TRANSCRIPT: &str = r#"
{"session_id":"s1","type":"tool_use","id":"t1","name":"Read","input":{"path":"/a"}}
{"session_id":"s1","type":"permission_request","request_id":"r1","tool_name":"Read","input_params":{"path":"/a"}}
{"session_id":"s1","type":"permission_response","request_id":"r1","decision":"allow"}

{"session_id":"s2","type":"permission_request","request_id":"r9","tool_name":"Bash","input_params":{"cmd":"ls"}}
{"session_id":"s1","type":"session_lifecycle","terminated":true}
"#;

#[test]
fn replaying_a_transcript_reproduces_statuses() -> anyhow::Result<()> {
    let envelopes = read_transcript(TRANSCRIPT.as_bytes())?;
    assert_eq!(envelopes.len(), 5);

    let (mut manager, _rx_event) = manager();
    for envelope in &envelopes {
        manager.handle_envelope(envelope, "default");
    }

    let summaries: Vec<String> = manager
        .session_ids()
        .flat_map(|session_id| manager.tool_call_views(session_id))
        .map(|view| view.summary)
        .collect();
    assert_eq!(
        summaries,
        vec![
            "🔧 Read(path=\"/a\") - Unknown".to_string(),
            "❓ Bash(cmd=\"ls\") - Awaiting Permission".to_string(),
        ]
    );
    assert_eq!(
        manager.tool_call_view("s2", "historical_r9").map(|view| view.status),
        Some(ResolvedToolStatus::PermissionRequired)
    );
    Ok(())
}

#[test]
fn malformed_line_aborts_with_line_number() {
    let transcript = "{\"type\":\"tool_use\",\"id\":\"t1\"}\nnot json\n";
    match read_transcript(transcript.as_bytes()) {
        Err(MinionErr::TranscriptLine { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a transcript error, got {other:?}"),
    }
}
