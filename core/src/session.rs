//! One session's tool-call state plus its event publisher.

use std::collections::HashMap;

use async_channel::Sender;
use minion_protocol::events::ToolCallCompletedEvent;
use minion_protocol::events::ToolCallEvent;
use minion_protocol::events::ToolCallPermissionRequiredEvent;
use minion_protocol::events::ToolCallStartedEvent;
use minion_protocol::events::ToolCallUpdatedEvent;
use minion_protocol::messages::AssistantExplanation;
use minion_protocol::messages::InboundMessage;
use minion_protocol::messages::PermissionRequest;
use minion_protocol::messages::PermissionResponse;
use minion_protocol::messages::ToolResultBlock;
use minion_protocol::messages::ToolStatusUpdate;
use minion_protocol::messages::ToolUseBlock;
use minion_protocol::tool_call::BackendToolStatus;
use minion_protocol::tool_call::ToolCallRecord;
use minion_protocol::tool_call::ToolCallStatus;
use tracing::debug;
use tracing::warn;

use crate::permissions::PermissionCoordinator;
use crate::permissions::RequestCorrelation;
use crate::registry::ToolCallRegistry;

/// Owns the registry and backend-declared statuses of one session and fires
/// exactly one [`ToolCallEvent`] after every mutating operation.
#[derive(Debug)]
pub struct ToolCallSession {
    session_id: String,
    registry: ToolCallRegistry,
    backend_statuses: HashMap<String, BackendToolStatus>,
    tx_event: Sender<ToolCallEvent>,
}

impl ToolCallSession {
    pub fn new(session_id: impl Into<String>, tx_event: Sender<ToolCallEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            registry: ToolCallRegistry::new(),
            backend_statuses: HashMap::new(),
            tx_event,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn registry(&self) -> &ToolCallRegistry {
        &self.registry
    }

    pub fn backend_status(&self, tool_call_id: &str) -> Option<BackendToolStatus> {
        self.backend_statuses.get(tool_call_id).copied()
    }

    /// Routes a message to the matching handler. Lifecycle notifications are
    /// owned by the session manager and ignored here.
    pub fn handle_message(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::ToolUse(block) => {
                self.handle_tool_use(block);
            }
            InboundMessage::PermissionRequest(request) => {
                self.handle_permission_request(request);
            }
            InboundMessage::PermissionResponse(response) => {
                self.handle_permission_response(response);
            }
            InboundMessage::ToolResult(block) => {
                self.handle_tool_result(block);
            }
            InboundMessage::AssistantExplanation(explanation) => {
                self.handle_assistant_explanation(explanation);
            }
            InboundMessage::ToolStatus(update) => {
                self.handle_tool_status(update);
            }
            InboundMessage::SessionLifecycle(_) => {
                debug!(session_id = %self.session_id, "lifecycle update must go through SessionManager");
            }
        }
    }

    pub fn handle_tool_use(&mut self, block: &ToolUseBlock) -> &ToolCallRecord {
        let created = !self.registry.contains(&block.id);
        let record = self.registry.handle_tool_use(block);
        if created {
            send_event(
                &self.tx_event,
                ToolCallEvent::Started(ToolCallStartedEvent {
                    session_id: self.session_id.clone(),
                    tool_call: record.clone(),
                }),
            );
        }
        record
    }

    pub fn handle_permission_request(&mut self, request: &PermissionRequest) -> &ToolCallRecord {
        let correlated =
            PermissionCoordinator::new(&mut self.registry).handle_permission_request(request);
        if correlated.correlation != RequestCorrelation::Replayed {
            send_event(
                &self.tx_event,
                ToolCallEvent::PermissionRequired(ToolCallPermissionRequiredEvent {
                    session_id: self.session_id.clone(),
                    tool_call: correlated.tool_call.clone(),
                }),
            );
        }
        correlated.tool_call
    }

    pub fn handle_permission_response(
        &mut self,
        response: &PermissionResponse,
    ) -> Option<&ToolCallRecord> {
        let record =
            PermissionCoordinator::new(&mut self.registry).handle_permission_response(response)?;
        let event = if record.status == ToolCallStatus::Completed {
            ToolCallEvent::Completed(ToolCallCompletedEvent {
                session_id: self.session_id.clone(),
                tool_call: record.clone(),
            })
        } else {
            ToolCallEvent::Updated(ToolCallUpdatedEvent {
                session_id: self.session_id.clone(),
                tool_calls: vec![record.clone()],
            })
        };
        send_event(&self.tx_event, event);
        Some(record)
    }

    pub fn handle_tool_result(&mut self, block: &ToolResultBlock) -> Option<&ToolCallRecord> {
        let record = self.registry.handle_tool_result(block)?;
        send_event(
            &self.tx_event,
            ToolCallEvent::Completed(ToolCallCompletedEvent {
                session_id: self.session_id.clone(),
                tool_call: record.clone(),
            }),
        );
        Some(record)
    }

    pub fn handle_assistant_explanation(
        &mut self,
        explanation: &AssistantExplanation,
    ) -> Vec<&ToolCallRecord> {
        let updated = self.registry.handle_assistant_explanation(explanation);
        if !updated.is_empty() {
            send_event(
                &self.tx_event,
                ToolCallEvent::Updated(ToolCallUpdatedEvent {
                    session_id: self.session_id.clone(),
                    tool_calls: updated.iter().copied().cloned().collect(),
                }),
            );
        }
        updated
    }

    /// Stores the backend-declared status for a known tool call. A push that
    /// repeats the current status is not a mutation and fires nothing.
    pub fn handle_tool_status(&mut self, update: &ToolStatusUpdate) -> Option<&ToolCallRecord> {
        let Some(record) = self.registry.get_tool_call(&update.tool_use_id) else {
            warn!(tool_use_id = %update.tool_use_id, status = %update.status, "tool_status for unknown tool call");
            return None;
        };
        let previous = self
            .backend_statuses
            .insert(update.tool_use_id.clone(), update.status);
        if previous != Some(update.status) {
            send_event(
                &self.tx_event,
                ToolCallEvent::Updated(ToolCallUpdatedEvent {
                    session_id: self.session_id.clone(),
                    tool_calls: vec![record.clone()],
                }),
            );
        }
        Some(record)
    }

    pub fn toggle_tool_expansion(&mut self, id: &str) -> Option<&ToolCallRecord> {
        let record = self.registry.toggle_tool_expansion(id)?;
        send_event(
            &self.tx_event,
            ToolCallEvent::Updated(ToolCallUpdatedEvent {
                session_id: self.session_id.clone(),
                tool_calls: vec![record.clone()],
            }),
        );
        Some(record)
    }

    pub fn set_tool_expansion(&mut self, id: &str, expanded: bool) -> Option<&ToolCallRecord> {
        let changed = self
            .registry
            .get_tool_call(id)?
            .is_expanded
            != expanded;
        let record = self.registry.set_tool_expansion(id, expanded)?;
        if changed {
            send_event(
                &self.tx_event,
                ToolCallEvent::Updated(ToolCallUpdatedEvent {
                    session_id: self.session_id.clone(),
                    tool_calls: vec![record.clone()],
                }),
            );
        }
        Some(record)
    }
}

/// The channel is unbounded, so sending only fails once every receiver is gone.
pub(crate) fn send_event(tx_event: &Sender<ToolCallEvent>, event: ToolCallEvent) {
    if let Err(e) = tx_event.try_send(event) {
        debug!("dropping tool call event, no receiver: {e}");
    }
}
