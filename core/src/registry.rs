//! Per-session store of tool-call records.
//!
//! Records are keyed by id and never removed; the registry is dropped as a
//! whole when its session is discarded. Two secondary indexes support the
//! permission flow: signature → ids of observed (non-historical) calls still
//! waiting for a permission request, in arrival order, and permission request
//! id → id once a request has been correlated.

use std::collections::HashMap;
use std::collections::VecDeque;

use chrono::Utc;
use indexmap::IndexMap;
use indexmap::map::Entry;
use minion_protocol::messages::AssistantExplanation;
use minion_protocol::messages::ToolResultBlock;
use minion_protocol::messages::ToolUseBlock;
use minion_protocol::tool_call::ToolCallRecord;
use minion_protocol::tool_call::ToolCallResult;
use minion_protocol::tool_call::ToolCallStatus;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::signature::ToolSignature;
use crate::signature::signature;

#[derive(Debug, Default)]
pub struct ToolCallRegistry {
    records: IndexMap<String, ToolCallRecord>,
    by_signature: HashMap<ToolSignature, VecDeque<String>>,
    by_request_id: HashMap<String, String>,
}

impl ToolCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly observed tool invocation with `status=pending`.
    ///
    /// A block whose id is already known is a replay and returns the existing
    /// record untouched. Identical invocations queue up behind each other
    /// under their shared signature.
    pub fn handle_tool_use(&mut self, block: &ToolUseBlock) -> &ToolCallRecord {
        match self.records.entry(block.id.clone()) {
            Entry::Occupied(entry) => {
                debug!(tool_use_id = %block.id, "ignoring replayed tool_use");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let signature = signature(block.name.as_deref(), block.input.as_ref());
                let waiting = self.by_signature.entry(signature.clone()).or_default();
                if !waiting.is_empty() {
                    debug!(%signature, waiting = waiting.len(), current = %block.id, "identical tool call already in flight");
                }
                waiting.push_back(block.id.clone());
                entry.insert(ToolCallRecord {
                    id: block.id.clone(),
                    name: block.name.clone().unwrap_or_default(),
                    input: block
                        .input
                        .clone()
                        .unwrap_or_else(|| Value::Object(Map::new())),
                    signature: signature.into_string(),
                    status: ToolCallStatus::Pending,
                    permission_request_id: None,
                    permission_decision: None,
                    applied_updates: Vec::new(),
                    suggestions: Vec::new(),
                    result: None,
                    explanation: None,
                    timestamp: Utc::now(),
                    is_expanded: true,
                    is_historical: false,
                })
            }
        }
    }

    /// Applies a terminal result. Returns `None` when the id is unknown or the
    /// record already reached a terminal outcome (including a denial).
    pub fn handle_tool_result(&mut self, block: &ToolResultBlock) -> Option<&ToolCallRecord> {
        let Some(record) = self.records.get_mut(&block.tool_use_id) else {
            warn!(tool_use_id = %block.tool_use_id, "tool_result for unknown tool call");
            return None;
        };
        if record.is_terminal() {
            debug!(
                tool_use_id = %block.tool_use_id,
                status = %record.status,
                denied = record.is_denied(),
                "ignoring tool_result for finished tool call"
            );
            return None;
        }

        record.status = if block.is_error {
            ToolCallStatus::Error
        } else {
            ToolCallStatus::Completed
        };
        record.result = Some(ToolCallResult {
            error: block.is_error,
            content: block.content.clone(),
        });
        record.is_expanded = false;
        Some(record)
    }

    /// Attaches the explanation to every listed record that exists and returns
    /// the updated records. Unknown ids are skipped.
    pub fn handle_assistant_explanation(
        &mut self,
        explanation: &AssistantExplanation,
    ) -> Vec<&ToolCallRecord> {
        let mut updated: Vec<&str> = Vec::new();
        for id in &explanation.related_tool_ids {
            match self.records.get_mut(id) {
                Some(record) => {
                    record.explanation = Some(explanation.content.clone());
                    if !updated.contains(&id.as_str()) {
                        updated.push(id);
                    }
                }
                None => debug!(tool_use_id = %id, "explanation references unknown tool call"),
            }
        }
        updated
            .into_iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    pub fn get_tool_call(&self, id: &str) -> Option<&ToolCallRecord> {
        self.records.get(id)
    }

    /// Snapshot of every record. Callers must not rely on the order.
    pub fn get_all_tool_calls(&self) -> Vec<&ToolCallRecord> {
        self.records.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.records.values()
    }

    /// Records that have not reached `completed` or `error`.
    pub fn pending_tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.records.values().filter(|record| !record.is_terminal())
    }

    pub fn tool_call_for_request(&self, request_id: &str) -> Option<&ToolCallRecord> {
        self.by_request_id
            .get(request_id)
            .and_then(|id| self.records.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn toggle_tool_expansion(&mut self, id: &str) -> Option<&ToolCallRecord> {
        let record = self.records.get_mut(id)?;
        record.is_expanded = !record.is_expanded;
        Some(record)
    }

    pub fn set_tool_expansion(&mut self, id: &str, expanded: bool) -> Option<&ToolCallRecord> {
        let record = self.records.get_mut(id)?;
        record.is_expanded = expanded;
        Some(record)
    }

    /// Claims the oldest observed record with `signature` that is still
    /// non-terminal and not correlated with any permission request. Finished
    /// or claimed ids are dropped from the queue on the way.
    pub(crate) fn claim_for_signature(&mut self, signature: &ToolSignature) -> Option<String> {
        let waiting = self.by_signature.get_mut(signature)?;
        let records = &self.records;
        waiting.retain(|id| {
            records.get(id).is_some_and(|record| {
                !record.is_historical
                    && !record.is_terminal()
                    && record.permission_request_id.is_none()
            })
        });
        let claimed = waiting.pop_front();
        if waiting.is_empty() {
            self.by_signature.remove(signature);
        }
        claimed
    }

    pub(crate) fn tool_call_id_for_request(&self, request_id: &str) -> Option<&str> {
        self.by_request_id.get(request_id).map(String::as_str)
    }

    pub(crate) fn index_request(&mut self, request_id: &str, id: &str) {
        self.by_request_id
            .insert(request_id.to_string(), id.to_string());
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ToolCallRecord> {
        self.records.get_mut(id)
    }

    /// Returns the record stored under `id`, synthesizing it with
    /// `historical` when absent. Historical records stay out of the signature
    /// index so a later real invocation can never match them.
    pub(crate) fn get_or_insert_historical(
        &mut self,
        id: String,
        historical: impl FnOnce(String) -> ToolCallRecord,
    ) -> &mut ToolCallRecord {
        match self.records.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let record = historical(entry.key().clone());
                entry.insert(record)
            }
        }
    }
}
