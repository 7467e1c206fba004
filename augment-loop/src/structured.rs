//! Structured extraction from session text.
//!
//! The text is read as JSON into the caller's type. Output cut off
//! mid-value (token limits) is repaired by closing the open string and
//! brackets and, where needed, dropping the trailing partial member.

use crate::error::StructuredError;
use serde::de::DeserializeOwned;

/// Parse `text` as `T`.
///
/// Returns `Ok(None)` when the text is blank. A Markdown code fence around
/// the JSON and prose before the first `{` or `[` are ignored.
///
/// # Errors
///
/// [`StructuredError::Parse`] when neither the text nor any repaired prefix
/// of it deserializes as `T`.
pub fn extract_structured<T: DeserializeOwned>(text: &str) -> Result<Option<T>, StructuredError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let body = json_body(text);

    let strict_err = match serde_json::from_str::<T>(body) {
        Ok(value) => return Ok(Some(value)),
        Err(e) => e,
    };

    let mut last_err = strict_err.to_string();
    for value in repairs(body) {
        match serde_json::from_value::<T>(value) {
            Ok(parsed) => return Ok(Some(parsed)),
            Err(e) => last_err = e.to_string(),
        }
    }
    Err(StructuredError::Parse {
        message: last_err,
        raw: text.to_string(),
    })
}

/// Strip a code fence and any leading prose.
fn json_body(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string (e.g. `json`) on the fence line.
        body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
        body = body.trim_end();
        body = body.strip_suffix("```").unwrap_or(body).trim();
    }
    match body.find(['{', '[']) {
        Some(start) => &body[start..],
        None => body,
    }
}

/// Largest JSON value recoverable from a truncated document.
///
/// Tries the whole text first, then successively earlier cut points (before
/// a `,` or just after an opening bracket), closing whatever is open.
pub fn repair_json(text: &str) -> Option<serde_json::Value> {
    repairs(text).next()
}

/// Every value recoverable from `text`, longest cut first.
fn repairs(text: &str) -> impl Iterator<Item = serde_json::Value> + '_ {
    let mut cuts = vec![text.len()];
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            ',' => cuts.push(i),
            '{' | '[' => cuts.push(i + 1),
            _ => {}
        }
    }

    cuts.sort_unstable();
    cuts.dedup();
    cuts.into_iter()
        .rev()
        .filter_map(move |cut| serde_json::from_str(&close(&text[..cut])).ok())
}

/// Close an open string and every open bracket of `prefix`.
fn close(prefix: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in prefix.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = prefix.to_string();
    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}
