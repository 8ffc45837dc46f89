use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

use crate::tool_call::ToolCallRecord;

/// Notifications fired after each mutating engine operation. Exactly one
/// event is sent per mutation; operations that turn out to be no-ops send
/// nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type")]
pub enum ToolCallEvent {
    #[serde(rename = "toolcall.started")]
    Started(ToolCallStartedEvent),
    #[serde(rename = "toolcall.permission_required")]
    PermissionRequired(ToolCallPermissionRequiredEvent),
    #[serde(rename = "toolcall.completed")]
    Completed(ToolCallCompletedEvent),
    #[serde(rename = "toolcall.updated")]
    Updated(ToolCallUpdatedEvent),
    #[serde(rename = "session.terminated")]
    SessionTerminated(SessionTerminatedEvent),
    #[serde(rename = "session.resumed")]
    SessionResumed(SessionResumedEvent),
}

impl ToolCallEvent {
    pub fn session_id(&self) -> &str {
        match self {
            ToolCallEvent::Started(event) => &event.session_id,
            ToolCallEvent::PermissionRequired(event) => &event.session_id,
            ToolCallEvent::Completed(event) => &event.session_id,
            ToolCallEvent::Updated(event) => &event.session_id,
            ToolCallEvent::SessionTerminated(event) => &event.session_id,
            ToolCallEvent::SessionResumed(event) => &event.session_id,
        }
    }
}

/// A tool invocation was observed and a record created for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallStartedEvent {
    pub session_id: String,
    pub tool_call: ToolCallRecord,
}

/// A record now waits for the user's decision. `tool_call.is_historical`
/// tells whether it was synthesized from the request alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallPermissionRequiredEvent {
    pub session_id: String,
    pub tool_call: ToolCallRecord,
}

/// A record reached a terminal outcome (result received or permission denied).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallCompletedEvent {
    pub session_id: String,
    pub tool_call: ToolCallRecord,
}

/// One or more records changed without reaching a terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallUpdatedEvent {
    pub session_id: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// The owning session ended; `orphaned_tool_call_ids` lists the calls that
/// were still in flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct SessionTerminatedEvent {
    pub session_id: String,
    pub orphaned_tool_call_ids: Vec<String>,
}

/// A terminated session was reported live again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct SessionResumedEvent {
    pub session_id: String,
}
