//! Single precedence function for the externally visible status of a tool
//! call. Precedence, highest first: backend-declared status, orphan
//! detection, the registry's locally inferred status.

use minion_protocol::tool_call::BackendToolStatus;
use minion_protocol::tool_call::OrphanedInfo;
use minion_protocol::tool_call::ResolvedToolStatus;
use minion_protocol::tool_call::ToolCallRecord;
use minion_protocol::tool_call::ToolCallStatus;
use minion_protocol::tool_call::ToolCallView;

use crate::orphan::OrphanDetector;
use crate::summary::SummaryLimits;
use crate::summary::collapsed_summary;

pub fn map_backend_status(status: BackendToolStatus) -> ResolvedToolStatus {
    match status {
        BackendToolStatus::Pending => ResolvedToolStatus::Pending,
        BackendToolStatus::AwaitingPermission => ResolvedToolStatus::PermissionRequired,
        BackendToolStatus::Running => ResolvedToolStatus::Executing,
        BackendToolStatus::Completed => ResolvedToolStatus::Completed,
        BackendToolStatus::Failed => ResolvedToolStatus::Error,
        BackendToolStatus::Denied => ResolvedToolStatus::Completed,
        BackendToolStatus::Interrupted => ResolvedToolStatus::Orphaned,
    }
}

/// `orphaned` is the orphan detector's verdict for this record.
pub fn resolve_status(
    record: &ToolCallRecord,
    backend: Option<BackendToolStatus>,
    orphaned: bool,
) -> ResolvedToolStatus {
    match backend {
        Some(status) => map_backend_status(status),
        None if orphaned => ResolvedToolStatus::Orphaned,
        None => record.status.into(),
    }
}

pub fn has_error(record: &ToolCallRecord) -> bool {
    record.result.as_ref().is_some_and(|result| result.error)
        || record.status == ToolCallStatus::Error
        || record.is_denied()
}

/// Resolves statuses against the lifecycle state held by an [`OrphanDetector`].
#[derive(Clone, Copy)]
pub struct StatusResolver<'a> {
    orphans: &'a OrphanDetector,
}

impl<'a> StatusResolver<'a> {
    pub fn new(orphans: &'a OrphanDetector) -> Self {
        Self { orphans }
    }

    pub fn resolve(
        &self,
        session_id: &str,
        record: &ToolCallRecord,
        backend: Option<BackendToolStatus>,
    ) -> ResolvedToolStatus {
        resolve_status(
            record,
            backend,
            self.orphans.is_record_orphaned(session_id, record, backend),
        )
    }

    /// Present exactly when `status` is `orphaned`.
    pub fn orphaned_info(&self, session_id: &str, status: ResolvedToolStatus) -> Option<OrphanedInfo> {
        (status == ResolvedToolStatus::Orphaned).then(|| self.orphans.orphaned_info(session_id))
    }

    pub fn view(
        &self,
        session_id: &str,
        record: &ToolCallRecord,
        backend: Option<BackendToolStatus>,
        limits: &SummaryLimits,
    ) -> ToolCallView {
        let status = self.resolve(session_id, record, backend);
        ToolCallView {
            record: record.clone(),
            status,
            has_error: has_error(record),
            orphaned_info: self.orphaned_info(session_id, status),
            summary: collapsed_summary(record, status, limits),
        }
    }
}
