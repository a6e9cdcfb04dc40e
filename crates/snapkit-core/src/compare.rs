//! Comparators deciding whether a value matches its recorded snapshot

use difference::{Changeset, Difference};
use serde_json::Value;

/// Outcome of comparing a value against its expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareOutcome {
    Match,
    Mismatch { message: String },
}

impl CompareOutcome {
    pub fn mismatch(message: impl Into<String>) -> Self {
        CompareOutcome::Mismatch {
            message: message.into(),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, CompareOutcome::Match)
    }
}

/// Decides whether `value` matches `expected`
pub trait Comparator {
    fn compare(&self, expected: &Value, value: &Value) -> CompareOutcome;
}

impl<F> Comparator for F
where
    F: Fn(&Value, &Value) -> CompareOutcome,
{
    fn compare(&self, expected: &Value, value: &Value) -> CompareOutcome {
        self(expected, value)
    }
}

/// Compact JSON text equality
///
/// The mismatch message is `<expected> !== <value>` with both sides as
/// compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComparator;

impl Comparator for JsonComparator {
    fn compare(&self, expected: &Value, value: &Value) -> CompareOutcome {
        let e = expected.to_string();
        let v = value.to_string();
        if e == v {
            CompareOutcome::Match
        } else {
            CompareOutcome::mismatch(format!("{} !== {}", e, v))
        }
    }
}

/// Line diff for text snapshots
///
/// When both sides are strings the message lists removed lines with `-` and
/// added lines with `+`; anything else falls back to [`JsonComparator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDiffComparator;

impl Comparator for TextDiffComparator {
    fn compare(&self, expected: &Value, value: &Value) -> CompareOutcome {
        match (expected, value) {
            (Value::String(e), Value::String(v)) => {
                if e == v {
                    CompareOutcome::Match
                } else {
                    CompareOutcome::mismatch(line_diff(e, v))
                }
            }
            _ => JsonComparator.compare(expected, value),
        }
    }
}

/// Render a line diff of `expected` against `actual`
pub fn line_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut out = String::from("--- expected\n+++ actual\n");
    for diff in &changeset.diffs {
        let (prefix, chunk) = match diff {
            Difference::Same(chunk) => (' ', chunk),
            Difference::Rem(chunk) => ('-', chunk),
            Difference::Add(chunk) => ('+', chunk),
        };
        for line in chunk.split('\n') {
            out.push(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
