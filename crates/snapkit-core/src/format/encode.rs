//! Fragment encoding
//!
//! A fragment is one `exports['<name>'] = <literal>` assignment terminated by
//! a newline. Strings become fenced template blocks whose content starts on
//! its own line; everything else is pretty-printed JSON.

use crate::errors::{Result, SnapshotError};
use crate::value::Snapshots;
use serde_json::Value;

/// Escape a snapshot name for embedding inside a single-quoted literal
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for embedding inside a backtick fence
///
/// Only the backslash, the fence character, the `${` substitution opener and
/// carriage returns (which a template would read back as `\n`) are escaped.
/// Non-ASCII text is written as-is.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode a text snapshot as a fenced fragment
///
/// # Errors
///
/// - `EmptyValue`: `text` is empty
///
/// # Example
///
/// ```
/// use snapkit_core::format::encode_text;
///
/// let fragment = encode_text("name", "foo").unwrap();
/// assert_eq!(fragment, "exports['name'] = `\nfoo\n`\n");
/// ```
pub fn encode_text(name: &str, text: &str) -> Result<String> {
    if text.is_empty() {
        return Err(SnapshotError::EmptyValue {
            key: name.to_string(),
        });
    }
    Ok(format!(
        "exports['{}'] = `\n{}\n`\n",
        escape_name(name),
        escape_text(text)
    ))
}

/// Encode a structured snapshot as a pretty-printed literal
///
/// Output uses 2-space indentation and keeps object keys in the order the
/// value holds them, so equal values always encode to identical bytes.
///
/// # Errors
///
/// - `Serialization`: the value could not be written as JSON
pub fn encode_structured(name: &str, value: &Value) -> Result<String> {
    let literal = serde_json::to_string_pretty(value)?;
    Ok(format!("exports['{}'] = {}\n", escape_name(name), literal))
}

/// Encode one entry, picking the text or structured form by value type
///
/// # Errors
///
/// - `EmptyValue`: the value is an empty string
/// - `Serialization`: the value could not be written as JSON
pub fn encode_entry(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => encode_text(name, text),
        other => encode_structured(name, other),
    }
}

/// Produce one fragment per entry
///
/// With `sort_keys` names are ordered lexicographically (by code point),
/// otherwise the mapping's insertion order is kept.
///
/// # Errors
///
/// Propagates the first encoding failure.
pub fn format_fragments(entries: &Snapshots, sort_keys: bool) -> Result<Vec<String>> {
    let mut names: Vec<&String> = entries.keys().collect();
    if sort_keys {
        names.sort();
    }
    names
        .into_iter()
        .map(|name| encode_entry(name, &entries[name.as_str()]))
        .collect()
}

/// Render a whole snapshot file
///
/// Fragments are joined with a newline; since every fragment ends with one,
/// consecutive entries are separated by a blank line. No entries yields an
/// empty string.
///
/// # Errors
///
/// Propagates the first encoding failure.
pub fn render_file(entries: &Snapshots, sort_keys: bool) -> Result<String> {
    Ok(format_fragments(entries, sort_keys)?.join("\n"))
}
