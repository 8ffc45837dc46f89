//! Correlates permission requests and responses with registry records.
//!
//! A `permission_request` carries no tool-use id, so it is matched through the
//! tool signature. When no observed invocation matches (reconnect, history not
//! backfilled yet) a historical record is synthesized under
//! `historical_<request_id>` so the request can still be answered.

use chrono::Utc;
use minion_protocol::messages::PermissionRequest;
use minion_protocol::messages::PermissionResponse;
use minion_protocol::tool_call::PermissionDecision;
use minion_protocol::tool_call::ToolCallRecord;
use minion_protocol::tool_call::ToolCallResult;
use minion_protocol::tool_call::ToolCallStatus;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::registry::ToolCallRegistry;
use crate::signature::signature;

/// Prefix of ids synthesized for requests with no observed invocation.
pub const HISTORICAL_ID_PREFIX: &str = "historical_";

pub fn historical_tool_call_id(request_id: &str) -> String {
    format!("{HISTORICAL_ID_PREFIX}{request_id}")
}

/// How a permission request was matched to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCorrelation {
    /// Matched an observed `tool_use` through its signature.
    Observed,
    /// No observed invocation matched; a historical record was synthesized.
    Historical,
    /// The request id was already correlated; nothing changed.
    Replayed,
}

#[derive(Debug)]
pub struct CorrelatedRequest<'r> {
    pub tool_call: &'r ToolCallRecord,
    pub correlation: RequestCorrelation,
}

/// Borrows a session's registry for the duration of one permission message.
pub struct PermissionCoordinator<'a> {
    registry: &'a mut ToolCallRegistry,
}

impl<'a> PermissionCoordinator<'a> {
    pub fn new(registry: &'a mut ToolCallRegistry) -> Self {
        Self { registry }
    }

    pub fn handle_permission_request(self, request: &PermissionRequest) -> CorrelatedRequest<'a> {
        let registry = self.registry;
        let signature = signature(request.tool_name.as_deref(), request.input_params.as_ref());

        let (id, correlation) = if let Some(id) = registry
            .tool_call_id_for_request(&request.request_id)
            .map(str::to_string)
        {
            debug!(request_id = %request.request_id, tool_call_id = %id, "ignoring replayed permission_request");
            (id, RequestCorrelation::Replayed)
        } else if let Some(id) = registry.claim_for_signature(&signature) {
            (id, RequestCorrelation::Observed)
        } else {
            let id = historical_tool_call_id(&request.request_id);
            if registry.contains(&id) {
                warn!(tool_call_id = %id, "historical id already in use; reusing existing record");
                (id, RequestCorrelation::Replayed)
            } else {
                debug!(
                    request_id = %request.request_id,
                    %signature,
                    "no observed tool_use matches permission_request; synthesizing historical record"
                );
                (id, RequestCorrelation::Historical)
            }
        };

        registry.index_request(&request.request_id, &id);
        let tool_call = registry.get_or_insert_historical(id, |id| ToolCallRecord {
            id,
            name: request.tool_name.clone().unwrap_or_default(),
            input: request
                .input_params
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new())),
            signature: signature.into_string(),
            status: ToolCallStatus::PermissionRequired,
            permission_request_id: Some(request.request_id.clone()),
            permission_decision: None,
            applied_updates: Vec::new(),
            suggestions: request.suggestions.clone(),
            result: None,
            explanation: None,
            timestamp: Utc::now(),
            is_expanded: false,
            is_historical: true,
        });
        if correlation == RequestCorrelation::Observed {
            tool_call.status = ToolCallStatus::PermissionRequired;
            tool_call.permission_request_id = Some(request.request_id.clone());
            tool_call.suggestions = request.suggestions.clone();
        }
        CorrelatedRequest {
            tool_call,
            correlation,
        }
    }

    /// Applies the user's decision. Returns `None` for an unknown request id or
    /// when the record has already reached a terminal outcome.
    pub fn handle_permission_response(
        self,
        response: &PermissionResponse,
    ) -> Option<&'a ToolCallRecord> {
        let registry = self.registry;
        let Some(id) = registry
            .tool_call_id_for_request(&response.request_id)
            .map(str::to_string)
        else {
            warn!(request_id = %response.request_id, "permission_response for unknown request");
            return None;
        };
        let record = registry.get_mut(&id)?;
        if record.is_terminal() {
            debug!(
                request_id = %response.request_id,
                tool_call_id = %id,
                status = %record.status,
                "ignoring permission_response for finished tool call"
            );
            return None;
        }

        record.permission_decision = Some(response.decision);
        record.applied_updates = response.applied_updates.clone();
        match response.decision {
            PermissionDecision::Allow => {
                record.status = ToolCallStatus::Executing;
            }
            PermissionDecision::Deny => {
                record.status = ToolCallStatus::Completed;
                record.result = Some(ToolCallResult::denied(response.reasoning.as_deref()));
                record.is_expanded = false;
            }
        }
        Some(record)
    }
}
