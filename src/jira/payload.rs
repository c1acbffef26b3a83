//! Mapping from Jira REST payloads onto the panel's domain types.
//!
//! This is the only place that knows tracker field identifiers; everything
//! downstream sees `AddressFields`.

use route_panel_common::{AddressFields, IssueSnapshot};
use serde_json::Value;

use crate::errors::FetchError;
use crate::panel_config::FieldMapping;

/// Validate an issue key (`HAUL-123`) or numeric issue id (`10042`).
///
/// Format check only; it does not verify the issue exists.
pub fn is_valid_issue_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    if key.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let Some((project, number)) = key.rsplit_once('-') else {
        return false;
    };
    let mut project_chars = project.chars();
    let starts_with_letter = project_chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && project_chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Build a snapshot from an issue payload.
///
/// Requires `fields` to be an object and `fields.status.name` to be a string.
/// The payload's own `key` wins over `requested_key` when present, since a
/// request by numeric id returns the human key.
pub fn snapshot_from_payload(
    requested_key: &str,
    payload: &Value,
    mapping: &FieldMapping,
) -> Result<IssueSnapshot, FetchError> {
    let fields = payload
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Shape("missing `fields` object".to_string()))?;

    let status = fields
        .get("status")
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::Shape("missing `fields.status.name`".to_string()))?;

    let pickup = field_text(fields.get(&mapping.pickup), &mapping.pickup)?;
    let delivery = field_text(fields.get(&mapping.delivery), &mapping.delivery)?;

    let key = payload
        .get("key")
        .and_then(Value::as_str)
        .unwrap_or(requested_key);

    Ok(IssueSnapshot::new(
        key,
        status,
        AddressFields { pickup, delivery },
    ))
}

/// Read the `fields.updated` timestamp used as a change marker.
pub fn updated_from_payload(payload: &Value) -> Result<String, FetchError> {
    payload
        .get("fields")
        .and_then(|f| f.get("updated"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FetchError::Shape("missing `fields.updated`".to_string()))
}

/// Plain text of a custom field value.
///
/// - absent or `null` → `None`
/// - string → as is
/// - rich text (Atlassian Document Format) → flattened text
/// - select option (`{"value": ...}`) → the option value
/// - anything else → shape error
pub fn field_text(value: Option<&Value>, field_id: &str) -> Result<Option<String>, FetchError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(doc) if doc.get("type").and_then(Value::as_str) == Some("doc") => {
            let mut out = String::new();
            collect_adf_text(doc, &mut out);
            Ok(Some(out))
        }
        Some(Value::Object(obj)) if obj.get("value").is_some_and(Value::is_string) => {
            Ok(obj.get("value").and_then(Value::as_str).map(str::to_string))
        }
        Some(other) => Err(FetchError::Shape(format!(
            "field `{}` has unsupported value type {}",
            field_id,
            json_type_name(other)
        ))),
    }
}

// Block-level ADF nodes start on a new line.
fn is_adf_block(node: &Value) -> bool {
    matches!(
        node.get("type").and_then(Value::as_str),
        Some("paragraph" | "heading" | "blockquote" | "listItem" | "codeBlock")
    )
}

fn collect_adf_text(node: &Value, out: &mut String) {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("hardBreak") => out.push('\n'),
        _ => {
            if let Some(children) = node.get("content").and_then(Value::as_array) {
                for child in children {
                    if is_adf_block(child) && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    collect_adf_text(child, out);
                }
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
