use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use strum_macros::Display;
use ts_rs::TS;

/// Status the client infers from the messages it has observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, TS)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    PermissionRequired,
    Executing,
    Completed,
    Error,
}

impl ToolCallStatus {
    /// `completed` and `error` are the only states reachable through explicit
    /// protocol messages that end a tool call.
    pub fn is_terminal(self) -> bool {
        matches!(self, ToolCallStatus::Completed | ToolCallStatus::Error)
    }
}

/// Status as declared by the backend. Wins over anything inferred locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, TS)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendToolStatus {
    Pending,
    AwaitingPermission,
    Running,
    Completed,
    Failed,
    Denied,
    Interrupted,
}

/// Single externally-visible status for a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, TS)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolvedToolStatus {
    Pending,
    PermissionRequired,
    Executing,
    Completed,
    Error,
    /// The owning session terminated before a terminal outcome arrived.
    Orphaned,
}

impl ResolvedToolStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolvedToolStatus::Completed | ResolvedToolStatus::Error | ResolvedToolStatus::Orphaned
        )
    }
}

impl From<ToolCallStatus> for ResolvedToolStatus {
    fn from(status: ToolCallStatus) -> Self {
        match status {
            ToolCallStatus::Pending => ResolvedToolStatus::Pending,
            ToolCallStatus::PermissionRequired => ResolvedToolStatus::PermissionRequired,
            ToolCallStatus::Executing => ResolvedToolStatus::Executing,
            ToolCallStatus::Completed => ResolvedToolStatus::Completed,
            ToolCallStatus::Error => ResolvedToolStatus::Error,
        }
    }
}

/// Decision taken on a permission request.
///
/// Only the literal `"allow"` grants permission; every other value on the wire
/// is treated as a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, TS)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PermissionDecision {
    Allow,
    Deny,
}

impl PermissionDecision {
    pub fn from_wire(value: &str) -> Self {
        if value == "allow" {
            PermissionDecision::Allow
        } else {
            PermissionDecision::Deny
        }
    }
}

impl<'de> Deserialize<'de> for PermissionDecision {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&value))
    }
}

/// A permission-rule change proposed with a request or applied with a response.
///
/// Only `type` is interpreted; the remaining fields are kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(type = "{ type: string } & Record<string, unknown>")]
pub struct PermissionUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Terminal payload of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallResult {
    pub error: bool,
    pub content: Value,
}

impl ToolCallResult {
    pub const DEFAULT_DENIAL_MESSAGE: &'static str = "Permission denied";

    pub fn denied(reasoning: Option<&str>) -> Self {
        Self {
            error: true,
            content: Value::String(
                reasoning
                    .unwrap_or(Self::DEFAULT_DENIAL_MESSAGE)
                    .to_string(),
            ),
        }
    }
}

/// Everything the client knows about one tool invocation within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallRecord {
    /// Protocol tool-use id, or `historical_<request_id>` for records
    /// synthesized from a permission request.
    pub id: String,
    pub name: String,
    pub input: Value,
    pub signature: String,
    pub status: ToolCallStatus,
    pub permission_request_id: Option<String>,
    pub permission_decision: Option<PermissionDecision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_updates: Vec<PermissionUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<PermissionUpdate>,
    pub result: Option<ToolCallResult>,
    pub explanation: Option<String>,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
    pub is_expanded: bool,
    pub is_historical: bool,
}

impl ToolCallRecord {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_denied(&self) -> bool {
        self.permission_decision == Some(PermissionDecision::Deny)
    }
}

/// Explanation attached to a tool call whose session died under it.
///
/// `terminated_at` is absent when the orphan status was declared by the
/// backend (`interrupted`) for a session not known to be terminated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct OrphanedInfo {
    pub message: String,
    #[ts(type = "string | null")]
    pub terminated_at: Option<DateTime<Utc>>,
}

/// Read model handed to presentation: the record plus everything derived
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ToolCallView {
    pub record: ToolCallRecord,
    pub status: ResolvedToolStatus,
    pub has_error: bool,
    pub orphaned_info: Option<OrphanedInfo>,
    pub summary: String,
}
