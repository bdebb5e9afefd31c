//! Recovery of a structured draft entry from free-form oracle text. The
//! oracle is asked for exactly one JSON object but routinely wraps it in
//! prose or code fences, so decoding runs a fixed fallback chain:
//! whole-text parse, fenced `json` block, first outermost brace span, fail.
//! After decoding, fields are coerced defensively; lines are never silently
//! dropped and line semantics are never guessed beyond the documented
//! direction mapping.

use crate::error::{JournalError, Result};
use crate::schema::{EntryDirection, EntryLine, JournalEntry};
use chrono::NaiveDate;
use log::debug;
use serde_json::Value;

const SNIPPET_LEN: usize = 200;

pub struct ResponseCoercionParser;

impl ResponseCoercionParser {
    /// Extracts and coerces a draft [`JournalEntry`] from oracle text.
    pub fn parse(text: &str) -> Result<JournalEntry> {
        let value = Self::extract_json(text)?;
        Self::coerce_entry(&value)
    }

    fn extract_json(text: &str) -> Result<Value> {
        // (a) the whole response is the object
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
            return Ok(value);
        }

        // (b) a fenced block explicitly labeled as JSON
        if let Some(block) = Self::fenced_json_block(text) {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(block.trim()) {
                debug!("oracle response recovered from fenced json block");
                return Ok(value);
            }
        }

        // (c) the first outermost {...} span
        if let Some(span) = Self::first_brace_span(text) {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(span) {
                debug!("oracle response recovered from brace span");
                return Ok(value);
            }
        }

        Err(JournalError::ParseFailure {
            snippet: truncate(text, SNIPPET_LEN),
        })
    }

    fn fenced_json_block(text: &str) -> Option<&str> {
        let fence_start = text
            .find("```json")
            .or_else(|| text.find("```JSON"))
            .or_else(|| text.find("```Json"))?;
        let body_start = fence_start + "```json".len();
        let body = &text[body_start..];
        let end = body.find("```")?;
        Some(&body[..end])
    }

    /// Scans for the first balanced top-level object, tracking string
    /// literals so braces inside text content do not break the count.
    fn first_brace_span(text: &str) -> Option<&str> {
        let bytes = text.as_bytes();
        let start = text.find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=i]);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn coerce_entry(value: &Value) -> Result<JournalEntry> {
        let lines = match value.get("entry_lines") {
            Some(Value::Array(items)) => items
                .iter()
                .map(Self::coerce_line)
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(JournalEntry {
            business_description: coerce_string(value.get("business_description")),
            entry_date: coerce_date(value.get("entry_date"))?,
            voucher_number: coerce_optional_string(value.get("voucher_number")),
            entry_lines: lines,
            analysis_process: coerce_string(value.get("analysis_process")),
            applied_rules: coerce_string(value.get("applied_rules")),
            confidence_score: coerce_amount(value.get("confidence_score")).clamp(0.0, 1.0),
            is_balanced: coerce_bool(value.get("is_balanced"), false),
            validation_notes: coerce_string(value.get("validation_notes")),
            needs_review: coerce_bool(value.get("needs_review"), true),
        })
    }

    fn coerce_line(value: &Value) -> Result<EntryLine> {
        let direction_token = coerce_string(value.get("direction"));
        let direction = EntryDirection::from_token(&direction_token)?;

        let auxiliary = match value.get("auxiliary_accounting").or_else(|| value.get("auxiliary")) {
            Some(Value::Object(map)) => Some(map.clone()),
            _ => None,
        };

        Ok(EntryLine {
            account_code: coerce_string(value.get("account_code")),
            account_name: coerce_string(value.get("account_name")),
            direction,
            amount: coerce_amount(value.get("amount")),
            description: coerce_optional_string(value.get("description")),
            auxiliary,
        })
    }
}

/// List- or map-valued content destined for a string field is serialized to
/// text rather than rejected; scalars are stringified.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(v @ (Value::Array(_) | Value::Object(_))) => {
            serde_json::to_string(v).unwrap_or_default()
        }
        Some(v) => v.to_string(),
    }
}

fn coerce_optional_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Null) | None => None,
        other => Some(coerce_string(other)),
    }
}

fn coerce_amount(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn coerce_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        _ => default,
    }
}

fn coerce_date(value: Option<&Value>) -> Result<NaiveDate> {
    let raw = coerce_string(value);
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), format) {
            return Ok(date);
        }
    }
    Err(JournalError::SchemaViolation {
        field: "entry_date".to_string(),
        detail: format!("'{}' is not a recognized calendar date", raw),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
