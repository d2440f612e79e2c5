//! Command dispatch table (§6.3): one arm per wire command, each mapping
//! `{ref, ...}` JSON args onto a [`Holder`] call and a `{success,data}` or
//! `{success:false,error}` envelope.

use serde_json::{json, Value};

use crate::error::{HwpError, Result};
use crate::holder::{DocumentHolder, Holder};
use crate::ops::{EditOperation, FormatOptions, InsertPosition};

use super::transport::Response;

pub async fn dispatch(holder: &mut Holder, command: &str, args: &Value) -> Response {
    let outcome = match command {
        "read" => read(holder, args),
        "text" => text(holder),
        "validate" => validate(holder),
        "edit-text" => edit_text(holder, args),
        "edit-table-cell" => edit_text(holder, args),
        "edit-format" => edit_format(holder, args),
        "add-table" => add_table(holder, args),
        "add-paragraph" => add_paragraph(holder, args),
        "ping" => Ok(Value::Null),
        other => Err(HwpError::Protocol(format!("unknown command: {other}"))),
    };
    match outcome {
        Ok(data) => Response::success(data),
        Err(err) => Response::from_error(&err),
    }
}

fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| HwpError::Protocol(format!("missing string arg `{key}`")))
}

fn arg_usize(args: &Value, key: &str) -> Result<usize> {
    args.get(key)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .ok_or_else(|| HwpError::Protocol(format!("missing integer arg `{key}`")))
}

fn read(holder: &mut Holder, args: &Value) -> Result<Value> {
    let header = holder.get_header()?.clone();
    let sections = holder.get_sections()?.to_vec();
    let document = json!({ "header": header, "sections": sections });

    match args.get("ref").and_then(Value::as_str) {
        Some(reference) => find_by_reference(&document, reference)
            .ok_or_else(|| HwpError::RefNotFound(reference.to_string())),
        None => Ok(document),
    }
}

/// Every addressable entity (paragraph, table, cell, text box, image)
/// carries its own `reference` string already built by the reader, so
/// resolving `ref` is a plain tree walk rather than a second parse of the
/// dotted grammar.
fn find_by_reference(value: &Value, reference: &str) -> Option<Value> {
    match value {
        Value::Object(map) => {
            if map.get("reference").and_then(Value::as_str) == Some(reference) {
                return Some(value.clone());
            }
            map.values().find_map(|v| find_by_reference(v, reference))
        }
        Value::Array(items) => items.iter().find_map(|v| find_by_reference(v, reference)),
        _ => None,
    }
}

fn text(holder: &mut Holder) -> Result<Value> {
    let sections = holder.get_sections()?;
    let texts: Vec<String> = sections
        .iter()
        .map(|s| s.paragraphs.iter().map(|p| p.text()).collect::<Vec<_>>().join("\n"))
        .collect();
    Ok(json!(texts))
}

fn validate(holder: &mut Holder) -> Result<Value> {
    let report = holder.validate()?;
    Ok(serde_json::to_value(report).map_err(|e| HwpError::Protocol(e.to_string()))?)
}

fn edit_text(holder: &mut Holder, args: &Value) -> Result<Value> {
    let reference = arg_str(args, "ref")?;
    let text = arg_str(args, "text")?;
    let op = EditOperation::edit_text(reference, text)?;
    holder.apply_operations(&[op])?;
    Ok(json!({ "ref": reference, "text": text, "success": true }))
}

fn parse_format(args: &Value) -> Result<FormatOptions> {
    let value = args
        .get("format")
        .cloned()
        .ok_or_else(|| HwpError::Protocol("missing `format` arg".to_string()))?;
    serde_json::from_value(value).map_err(|e| HwpError::Protocol(format!("malformed format: {e}")))
}

fn edit_format(holder: &mut Holder, args: &Value) -> Result<Value> {
    let reference = arg_str(args, "ref")?;
    let format = parse_format(args)?;
    let start = args.get("start").and_then(Value::as_u64).map(|v| v as usize);
    let end = args.get("end").and_then(Value::as_u64).map(|v| v as usize);
    let op = EditOperation::edit_format(reference, format, start, end)?;
    holder.apply_operations(&[op])?;
    Ok(json!({ "ref": reference, "success": true }))
}

fn add_table(holder: &mut Holder, args: &Value) -> Result<Value> {
    let reference = arg_str(args, "ref")?;
    let rows = arg_usize(args, "rows")?;
    let cols = arg_usize(args, "cols")?;
    let cell_text: Vec<String> = match args.get("data") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect(),
        _ => Vec::new(),
    };
    let op = EditOperation::add_table(reference, rows, cols, cell_text)?;
    holder.apply_operations(&[op])?;
    Ok(json!({ "success": true }))
}

fn add_paragraph(holder: &mut Holder, args: &Value) -> Result<Value> {
    let reference = arg_str(args, "ref")?;
    let text = arg_str(args, "text")?;
    let position = match args.get("position").and_then(Value::as_str) {
        Some("before") => InsertPosition::Before,
        Some("end") | None => InsertPosition::End,
        Some("after") => InsertPosition::After,
        Some(other) => return Err(HwpError::Protocol(format!("unknown position: {other}"))),
    };
    let format = match args.get("format") {
        Some(value) if !value.is_null() => {
            Some(serde_json::from_value(value.clone()).map_err(|e| HwpError::Protocol(format!("malformed format: {e}")))?)
        }
        _ => None,
    };
    let op = EditOperation::add_paragraph(reference, text, position, format)?;
    holder.apply_operations(&[op])?;
    Ok(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_reference_locates_a_nested_paragraph() {
        let doc = json!({
            "sections": [
                { "paragraphs": [{ "reference": "s0.p0", "text": "hi" }] }
            ]
        });
        let found = find_by_reference(&doc, "s0.p0").unwrap();
        assert_eq!(found["text"], "hi");
    }

    #[test]
    fn find_by_reference_returns_none_for_unknown_ref() {
        let doc = json!({ "sections": [] });
        assert!(find_by_reference(&doc, "s9.p9").is_none());
    }
}
