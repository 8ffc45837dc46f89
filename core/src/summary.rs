//! One-line summaries for collapsed tool-call rows.

use minion_protocol::tool_call::ResolvedToolStatus;
use minion_protocol::tool_call::ToolCallRecord;
use serde_json::Value;

use crate::signature::UNKNOWN_TOOL_NAME;

const ELLIPSIS: &str = "...";

/// Truncation limits for the parameter part of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLimits {
    /// Max chars of the value when the input has exactly one parameter.
    pub single_value_max_chars: usize,
    /// Max chars of each value when several parameters are listed.
    pub multi_value_max_chars: usize,
    /// Inputs with more parameters than this collapse to `(<N> parameters)`.
    pub max_listed_params: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            single_value_max_chars: 30,
            multi_value_max_chars: 15,
            max_listed_params: 3,
        }
    }
}

/// Icon and label shown for a status. A denied call shows as denied even
/// though its status is `completed`.
pub fn status_presentation(status: ResolvedToolStatus, denied: bool) -> (&'static str, &'static str) {
    match status {
        ResolvedToolStatus::Pending => ("🔄", "Pending"),
        ResolvedToolStatus::PermissionRequired => ("❓", "Awaiting Permission"),
        ResolvedToolStatus::Executing => ("⚡", "Executing"),
        ResolvedToolStatus::Completed if denied => ("❌", "Denied"),
        ResolvedToolStatus::Completed => ("✅", "Completed"),
        ResolvedToolStatus::Error => ("💥", "Error"),
        ResolvedToolStatus::Orphaned => ("🔧", "Unknown"),
    }
}

/// Summary built from the record's locally inferred status.
pub fn generate_collapsed_summary(record: &ToolCallRecord, limits: &SummaryLimits) -> String {
    collapsed_summary(record, record.status.into(), limits)
}

/// Summary for `record` shown with an externally resolved `status`.
pub fn collapsed_summary(
    record: &ToolCallRecord,
    status: ResolvedToolStatus,
    limits: &SummaryLimits,
) -> String {
    let (icon, label) = status_presentation(status, record.is_denied());
    let name = if record.name.is_empty() {
        UNKNOWN_TOOL_NAME
    } else {
        record.name.as_str()
    };
    let params = parameter_summary(&record.input, limits);
    format!("{icon} {name}{params} - {label}")
}

/// Renders the parenthesized parameter list, or an empty string when the
/// input has no parameters.
pub fn parameter_summary(input: &Value, limits: &SummaryLimits) -> String {
    let Value::Object(params) = input else {
        return String::new();
    };

    match params.len() {
        0 => String::new(),
        1 => params
            .iter()
            .map(|(key, value)| {
                format!(
                    "({key}=\"{}\")",
                    truncate(&display_value(value), limits.single_value_max_chars)
                )
            })
            .collect(),
        n if n <= limits.max_listed_params => {
            let listed: Vec<String> = params
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{key}=\"{}\"",
                        truncate(&display_value(value), limits.multi_value_max_chars)
                    )
                })
                .collect();
            format!("({})", listed.join(", "))
        }
        n => format!("({n} parameters)"),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
