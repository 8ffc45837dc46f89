//! Correlation keys for tool calls that do not share an id yet.
//!
//! A `permission_request` names the tool and its parameters but not the
//! `tool_use` id, so both sides are reduced to `<tool_name>:<canonical-json>`
//! and matched on that string. Canonical JSON sorts object keys at every
//! depth, which makes the key independent of parameter insertion order.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::warn;

/// Name used in the sentinel signature when the tool name is missing.
pub const UNKNOWN_TOOL_NAME: &str = "unknown";

const EMPTY_PARAMS: &str = "{}";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolSignature(String);

impl ToolSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ToolSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a signature fell back to a sentinel form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureDiagnostic {
    MissingToolName,
    NonObjectInput,
}

impl fmt::Display for SignatureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureDiagnostic::MissingToolName => {
                f.write_str("tool name is missing; using the unknown sentinel signature")
            }
            SignatureDiagnostic::NonObjectInput => {
                f.write_str("tool input is missing or not an object; using empty parameters")
            }
        }
    }
}

/// Computes the signature and reports whether a sentinel form was used.
pub fn signature_with_diagnostic(
    tool_name: Option<&str>,
    input: Option<&Value>,
) -> (ToolSignature, Option<SignatureDiagnostic>) {
    let Some(tool_name) = tool_name.filter(|name| !name.is_empty()) else {
        return (
            ToolSignature(format!("{UNKNOWN_TOOL_NAME}:{EMPTY_PARAMS}")),
            Some(SignatureDiagnostic::MissingToolName),
        );
    };

    match input {
        Some(input @ Value::Object(_)) => (
            ToolSignature(format!("{tool_name}:{}", canonical_json(input))),
            None,
        ),
        _ => (
            ToolSignature(format!("{tool_name}:{EMPTY_PARAMS}")),
            Some(SignatureDiagnostic::NonObjectInput),
        ),
    }
}

/// Computes the signature, logging a warning when input was malformed.
pub fn signature(tool_name: Option<&str>, input: Option<&Value>) -> ToolSignature {
    let (signature, diagnostic) = signature_with_diagnostic(tool_name, input);
    if let Some(diagnostic) = diagnostic {
        warn!(%signature, "{diagnostic}");
    }
    signature
}

/// Serializes `value` as compact JSON with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push('{');
            for (index, (key, value)) in sorted.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                // `Value`'s Display writes compact JSON, including string escaping.
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
