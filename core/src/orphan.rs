//! Tracks which sessions have terminated so in-flight tool calls belonging to
//! them can be reported as orphaned instead of hanging forever.

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use minion_protocol::messages::SessionLifecycleNotification;
use minion_protocol::tool_call::BackendToolStatus;
use minion_protocol::tool_call::OrphanedInfo;
use minion_protocol::tool_call::ToolCallRecord;
use tracing::debug;

use crate::registry::ToolCallRegistry;
use crate::status::map_backend_status;

/// Effect of a lifecycle notification on the detector's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleTransition {
    Terminated,
    Resumed,
    Unchanged,
}

#[derive(Debug)]
pub struct OrphanDetector {
    message: String,
    terminated: HashMap<String, DateTime<Utc>>,
}

impl OrphanDetector {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            terminated: HashMap::new(),
        }
    }

    pub fn observe(&mut self, notification: &SessionLifecycleNotification) -> LifecycleTransition {
        self.observe_at(notification, Utc::now())
    }

    /// Like [`Self::observe`] with an explicit observation time. A repeated
    /// termination keeps the first timestamp.
    pub fn observe_at(
        &mut self,
        notification: &SessionLifecycleNotification,
        at: DateTime<Utc>,
    ) -> LifecycleTransition {
        let session_id = &notification.session_id;
        if notification.terminated {
            if self.terminated.contains_key(session_id) {
                debug!(%session_id, "session already terminated");
                return LifecycleTransition::Unchanged;
            }
            self.terminated.insert(session_id.clone(), at);
            LifecycleTransition::Terminated
        } else if self.terminated.remove(session_id).is_some() {
            LifecycleTransition::Resumed
        } else {
            LifecycleTransition::Unchanged
        }
    }

    pub fn is_session_terminated(&self, session_id: &str) -> bool {
        self.terminated.contains_key(session_id)
    }

    pub fn terminated_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.terminated.get(session_id).copied()
    }

    /// True iff the session has terminated and the tool call exists and has
    /// not reached a terminal status. `backend` is the backend-declared status
    /// of the call, which decides terminality over the local one.
    pub fn is_orphaned(
        &self,
        session_id: &str,
        tool_call_id: &str,
        registry: &ToolCallRegistry,
        backend: Option<BackendToolStatus>,
    ) -> bool {
        registry
            .get_tool_call(tool_call_id)
            .is_some_and(|record| self.is_record_orphaned(session_id, record, backend))
    }

    pub fn is_record_orphaned(
        &self,
        session_id: &str,
        record: &ToolCallRecord,
        backend: Option<BackendToolStatus>,
    ) -> bool {
        let terminal = match backend {
            Some(status) => map_backend_status(status).is_terminal(),
            None => record.is_terminal(),
        };
        !terminal && self.is_session_terminated(session_id)
    }

    /// Display info for an orphaned call of `session_id`. The termination time
    /// is absent if the session is not known to have terminated.
    pub fn orphaned_info(&self, session_id: &str) -> OrphanedInfo {
        OrphanedInfo {
            message: self.message.clone(),
            terminated_at: self.terminated_at(session_id),
        }
    }

    /// Drops lifecycle state for a discarded session.
    pub fn forget(&mut self, session_id: &str) {
        self.terminated.remove(session_id);
    }
}

impl Default for OrphanDetector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ORPHANED_MESSAGE)
    }
}
