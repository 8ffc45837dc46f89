use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use crate::tool_call::BackendToolStatus;
use crate::tool_call::PermissionDecision;
use crate::tool_call::PermissionUpdate;

/// A `tool_use` block emitted by the agent inside an assistant turn.
///
/// `name` and `input` are optional on the wire: the engine degrades to
/// sentinel signatures instead of rejecting a malformed block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolUseBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub input: Option<Value>,
}

/// The agent runtime asks the user whether a tool may run.
///
/// Carries no `tool_use_id`; correlation happens through the tool signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct PermissionRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub input_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<PermissionUpdate>,
}

/// The decision taken for an earlier [`PermissionRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct PermissionResponse {
    pub request_id: String,
    pub decision: PermissionDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_updates: Vec<PermissionUpdate>,
}

/// Terminal outcome of a tool invocation, keyed by the invocation id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub content: Value,
}

/// Natural-language rationale the assistant produced for one or more tool calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct AssistantExplanation {
    pub content: String,
    #[serde(default)]
    pub related_tool_ids: Vec<String>,
}

/// Authoritative status pushed by the backend for a single tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct ToolStatusUpdate {
    pub tool_use_id: String,
    pub status: BackendToolStatus,
}

/// Lifecycle change of the session that owns a set of tool calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct SessionLifecycleNotification {
    pub session_id: String,
    pub terminated: bool,
}

/// Lifecycle payload inside an [`InboundEnvelope`]; the session comes from the
/// envelope itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct SessionLifecycleUpdate {
    pub terminated: bool,
}

/// Every message kind the tool-call engine consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    ToolUse(ToolUseBlock),
    PermissionRequest(PermissionRequest),
    PermissionResponse(PermissionResponse),
    ToolResult(ToolResultBlock),
    AssistantExplanation(AssistantExplanation),
    ToolStatus(ToolStatusUpdate),
    SessionLifecycle(SessionLifecycleUpdate),
}

/// One line of a transcript: an [`InboundMessage`] addressed to a session.
///
/// `session_id` may be omitted when a transcript only covers one session; the
/// consumer substitutes its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub message: InboundMessage,
}
