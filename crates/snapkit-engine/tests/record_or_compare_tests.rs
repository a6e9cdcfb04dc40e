// Integration tests for the record-or-compare entry points.
// Covers first recording, matching, mismatches, CI refusal, update and dry runs,
// custom store transforms and comparators.

use serde::Serialize;
use serde_json::{json, Value};
use snapkit_core::logging_facility::test_capture::init_test_capture;
use snapkit_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use snapkit_core::{CompareOutcome, ExErrorKind, ResetScope, TextDiffComparator};
use snapkit_engine::{SnapshotConfig, SnapshotOptions, SnapshotRequest, SnapshotSession};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, SnapshotSession) {
    let temp_dir = TempDir::new().unwrap();
    let session = SnapshotSession::with_root(temp_dir.path(), SnapshotConfig::default());
    (temp_dir, session)
}

fn ci_options() -> SnapshotOptions {
    SnapshotOptions {
        ci: Some(true),
        ..SnapshotOptions::default()
    }
}

fn stored_text(session: &SnapshotSession, file: &str) -> String {
    fs::read_to_string(session.snapshot_path(file, None).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// recording and matching
// ---------------------------------------------------------------------------

#[test]
fn test_first_call_records_value() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "adds numbers");

    let value = session.record_or_compare(&request, &42).unwrap();

    assert_eq!(value, json!(42));
    assert_eq!(stored_text(&session, "spec.rs"), "exports['adds numbers 1'] = 42\n");
}

#[test]
fn test_sequential_calls_get_sequential_keys() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "name");

    session.record_or_compare(&request, "first").unwrap();
    session.record_or_compare(&request, "second").unwrap();

    assert_eq!(
        stored_text(&session, "spec.rs"),
        "exports['name 1'] = `\nfirst\n`\n\nexports['name 2'] = `\nsecond\n`\n"
    );
}

#[test]
fn test_reset_restarts_numbering_and_matches_recorded_values() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "name");

    session.record_or_compare(&request, "first").unwrap();
    session.record_or_compare(&request, "second").unwrap();
    session.reset_counters(None).unwrap();

    // same sequence again: both calls compare against the recorded values
    assert_eq!(session.record_or_compare(&request, "first").unwrap(), json!("first"));
    assert_eq!(session.record_or_compare(&request, "second").unwrap(), json!("second"));
}

#[test]
fn test_scoped_reset_only_touches_one_test() {
    let (_tmp, mut session) = setup();
    let first = SnapshotRequest::auto("spec.rs", "first");
    let second = SnapshotRequest::auto("spec.rs", "second");

    session.record_or_compare(&first, &1).unwrap();
    session.record_or_compare(&second, &1).unwrap();
    session
        .reset_counters(Some(&ResetScope {
            file: "spec.rs".to_string(),
            spec_name: "first".to_string(),
        }))
        .unwrap();

    session.record_or_compare(&first, &1).unwrap();
    session.record_or_compare(&second, &2).unwrap();

    let text = stored_text(&session, "spec.rs");
    assert!(text.contains("exports['first 1'] = 1\n"));
    assert!(!text.contains("first 2"));
    assert!(text.contains("exports['second 2'] = 2\n"));
}

#[test]
fn test_structured_value_is_canonicalized() {
    #[derive(Serialize)]
    struct Person {
        name: &'static str,
        age: u32,
        nickname: Option<&'static str>,
    }

    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "person");
    let person = Person {
        name: "Joe",
        age: 42,
        nickname: None,
    };

    let value = session.record_or_compare(&request, &person).unwrap();

    assert_eq!(value, json!({"name": "Joe", "age": 42, "nickname": null}));
    session.reset_counters(None).unwrap();
    assert_eq!(session.record_or_compare(&request, &person).unwrap(), value);
}

#[test]
fn test_mismatch_reports_test_name() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "value");

    session.record_or_compare(&request, "foo").unwrap();
    session.reset_counters(None).unwrap();
    let err = session.record_or_compare(&request, "bar").unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SnapshotMismatch);
    assert_eq!(err.message(), "Different value of snapshot \"value\"\n\"foo\" !== \"bar\"");
    // the stored value is left alone
    assert!(stored_text(&session, "spec.rs").contains("foo"));
}

#[test]
fn test_mismatch_reports_exact_key() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::exact("spec.rs", "my key");

    session.record_or_compare(&request, &1).unwrap();
    let err = session.record_or_compare(&request, &2).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SnapshotMismatch);
    assert_eq!(err.key(), Some("my key"));
    assert!(err.message().starts_with("Different value of snapshot \"my key\""));
}

#[test]
fn test_exact_key_is_independent_per_file() {
    let (_tmp, mut session) = setup();

    session
        .record_or_compare(&SnapshotRequest::exact("a.rs", "foo"), "from a")
        .unwrap();
    session
        .record_or_compare(&SnapshotRequest::exact("b.rs", "foo"), "from b")
        .unwrap();

    let again_a = session
        .record_or_compare(&SnapshotRequest::exact("a.rs", "foo"), "from a")
        .unwrap();
    assert_eq!(again_a, json!("from a"));
    assert!(stored_text(&session, "b.rs").contains("from b"));
    assert!(!stored_text(&session, "a.rs").contains("from b"));
}

#[test]
fn test_recorded_floats_match_in_next_run() {
    let (tmp, mut session) = setup();
    let values: Vec<f64> = (1..2000).map(|i| f64::from(i).sqrt() / 7.0).collect();
    for (i, value) in values.iter().enumerate().take(50) {
        session
            .record_or_compare(&SnapshotRequest::exact("floats.rs", format!("t{}", i)), value)
            .unwrap();
    }
    session
        .record_or_compare(&SnapshotRequest::exact("floats.rs", "all"), &values)
        .unwrap();

    // a new session reads everything back from disk
    let mut next_run = SnapshotSession::with_root(tmp.path(), SnapshotConfig::default());
    for (i, value) in values.iter().enumerate().take(50) {
        next_run
            .record_or_compare(&SnapshotRequest::exact("floats.rs", format!("t{}", i)), value)
            .unwrap();
    }
    let matched = next_run
        .record_or_compare(&SnapshotRequest::exact("floats.rs", "all"), &values)
        .unwrap();
    assert_eq!(matched, json!(values));
}

#[test]
fn test_unsorted_save_keeps_insertion_order() {
    let (_tmp, mut session) = setup();
    let options = SnapshotOptions {
        sort_keys: Some(false),
        ..SnapshotOptions::default()
    };

    for key in ["x", "b", "a"] {
        let request = SnapshotRequest::exact("spec.rs", key).with_options(options.clone());
        session.record_or_compare(&request, &1).unwrap();
    }

    assert_eq!(
        stored_text(&session, "spec.rs"),
        "exports['x'] = 1\n\nexports['b'] = 1\n\nexports['a'] = 1\n"
    );
}

#[test]
fn test_sorted_save_orders_keys() {
    let (_tmp, mut session) = setup();

    for key in ["x", "b", "a"] {
        session
            .record_or_compare(&SnapshotRequest::exact("spec.rs", key), &1)
            .unwrap();
    }

    assert_eq!(
        stored_text(&session, "spec.rs"),
        "exports['a'] = 1\n\nexports['b'] = 1\n\nexports['x'] = 1\n"
    );
}

#[test]
fn test_custom_extension() {
    let (tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "ext").with_extension(".test");

    session.record_or_compare(&request, &true).unwrap();

    assert!(tmp.path().join("__snapshots__").join("spec.rs.test").exists());
}

#[test]
fn test_extension_without_dot_is_rejected() {
    let (tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "ext").with_extension("test");

    let err = session.record_or_compare(&request, &true).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidArgument);
    assert!(!tmp.path().join("__snapshots__").exists());
}

#[test]
fn test_missing_identity_is_rejected() {
    let (_tmp, mut session) = setup();

    let err = session
        .record_or_compare(&SnapshotRequest::auto("", "name"), &1)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidArgument);

    let err = session
        .record_or_compare(&SnapshotRequest::exact("spec.rs", ""), &1)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidArgument);
}

// ---------------------------------------------------------------------------
// CI, update, dry run
// ---------------------------------------------------------------------------

#[test]
fn test_ci_refuses_new_value_without_writing() {
    let (tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "new test").with_options(ci_options());

    let err = session.record_or_compare(&request, &1).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::CannotSaveOnCi);
    assert_eq!(err.file(), Some("spec.rs"));
    assert_eq!(err.key(), Some("new test 1"));
    assert_eq!(
        err.message(),
        "Cannot store new snapshot value\nin spec.rs\nfor spec called \"new test\"\n\
         test key \"new test 1\"\nwhen running on CI (opts.ci = 1)\n\
         see https://github.com/bahmutov/snap-shot-core/issues/5"
    );
    assert!(!tmp.path().join("__snapshots__").exists());
}

#[test]
fn test_ci_from_config_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = SnapshotConfig {
        ci: true,
        ..SnapshotConfig::default()
    };
    let mut session = SnapshotSession::with_root(temp_dir.path(), config);

    let err = session
        .record_or_compare(&SnapshotRequest::exact("spec.rs", "k"), &1)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::CannotSaveOnCi);

    // a per-call override wins
    let request = SnapshotRequest::exact("spec.rs", "k").with_options(SnapshotOptions {
        ci: Some(false),
        ..SnapshotOptions::default()
    });
    assert_eq!(session.record_or_compare(&request, &1).unwrap(), json!(1));
}

#[test]
fn test_ci_still_compares_existing_values() {
    let (_tmp, mut session) = setup();

    session
        .record_or_compare(&SnapshotRequest::exact("spec.rs", "k"), &7)
        .unwrap();
    let request = SnapshotRequest::exact("spec.rs", "k").with_options(ci_options());

    assert_eq!(session.record_or_compare(&request, &7).unwrap(), json!(7));
}

#[test]
fn test_update_overwrites_stored_value() {
    let (_tmp, mut session) = setup();

    session
        .record_or_compare(&SnapshotRequest::exact("spec.rs", "k"), "old")
        .unwrap();
    let request = SnapshotRequest::exact("spec.rs", "k").with_options(SnapshotOptions {
        update: true,
        ..SnapshotOptions::default()
    });

    assert_eq!(session.record_or_compare(&request, "new").unwrap(), json!("new"));
    assert_eq!(stored_text(&session, "spec.rs"), "exports['k'] = `\nnew\n`\n");
}

#[test]
fn test_dry_run_never_writes() {
    let (tmp, mut session) = setup();
    let request = SnapshotRequest::auto("spec.rs", "dry").with_options(SnapshotOptions {
        dry_run: true,
        ..SnapshotOptions::default()
    });

    assert_eq!(session.record_or_compare(&request, &1).unwrap(), json!(1));
    assert!(!tmp.path().join("__snapshots__").exists());
}

#[test]
fn test_empty_string_is_rejected() {
    let (tmp, mut session) = setup();

    let err = session
        .record_or_compare(&SnapshotRequest::auto("spec.rs", "blank"), "")
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::EmptyValue);
    assert_eq!(err.key(), Some("blank 1"));
    assert!(!tmp.path().join("__snapshots__").exists());
}

// ---------------------------------------------------------------------------
// store transforms and comparators
// ---------------------------------------------------------------------------

#[test]
fn test_store_transform_applies_to_recorded_value_only() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::exact("spec.rs", "schema");
    let to_type = |value: Value| json!(if value.is_number() { "number" } else { "other" });
    let same_type = |expected: &Value, value: &Value| {
        let kind = if value.is_number() { "number" } else { "other" };
        if expected == &json!(kind) {
            CompareOutcome::Match
        } else {
            CompareOutcome::mismatch(format!("expected {} got {}", expected, kind))
        }
    };

    let recorded = session
        .record_or_compare_with(&request, &42, to_type, &same_type)
        .unwrap();
    assert_eq!(recorded, json!("number"));

    let matched = session
        .record_or_compare_with(&request, &7, to_type, &same_type)
        .unwrap();
    assert_eq!(matched, json!("number"));

    let err = session
        .record_or_compare_with(&request, "seven", to_type, &same_type)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::SnapshotMismatch);
    assert!(err.message().ends_with("expected \"number\" got other"));
}

#[test]
fn test_store_transform_returning_empty_text_is_rejected() {
    let (_tmp, mut session) = setup();

    let err = session
        .record_or_compare_with(
            &SnapshotRequest::exact("spec.rs", "k"),
            &1,
            |_| json!(""),
            &TextDiffComparator,
        )
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::EmptyValue);
}

#[test]
fn test_text_diff_comparator_message() {
    let (_tmp, mut session) = setup();
    let request = SnapshotRequest::exact("spec.rs", "poem");

    session
        .record_or_compare_with(
            &request,
            "roses\nviolets",
            std::convert::identity,
            &TextDiffComparator,
        )
        .unwrap();
    let err = session
        .record_or_compare_with(
            &request,
            "roses\ntulips",
            std::convert::identity,
            &TextDiffComparator,
        )
        .unwrap_err();

    assert!(err.message().contains("-violets\n"));
    assert!(err.message().contains("+tulips\n"));
}

// ---------------------------------------------------------------------------
// existing files
// ---------------------------------------------------------------------------

#[test]
fn test_compares_against_hand_written_file() {
    let (tmp, mut session) = setup();
    let folder = tmp.path().join("__snapshots__");
    fs::create_dir_all(&folder).unwrap();
    fs::write(
        folder.join("spec.rs.snapshot.js"),
        "exports['greets 1'] = `\nhello\n`\n\nexports['list'] = [\n  1,\n  2\n]\n",
    )
    .unwrap();

    let greeting = session
        .record_or_compare(&SnapshotRequest::auto("spec.rs", "greets"), "hello")
        .unwrap();
    let list = session
        .record_or_compare(&SnapshotRequest::exact("spec.rs", "list"), &[1, 2])
        .unwrap();

    assert_eq!(greeting, json!("hello"));
    assert_eq!(list, json!([1, 2]));
}

#[test]
fn test_corrupt_file_is_fatal() {
    let (tmp, mut session) = setup();
    let folder = tmp.path().join("__snapshots__");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("spec.rs.snapshot.js"), "exports['a'] = [1,").unwrap();

    let err = session
        .record_or_compare(&SnapshotRequest::exact("spec.rs", "a"), &1)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Parse);
}

// ---------------------------------------------------------------------------
// logging
// ---------------------------------------------------------------------------

#[test]
fn test_lifecycle_events_are_logged() {
    let capture = init_test_capture();
    let (_tmp, mut session) = setup();
    let file = "logging_unique_spec.rs";

    session
        .record_or_compare(&SnapshotRequest::exact(file, "k"), &1)
        .unwrap();
    session
        .record_or_compare(&SnapshotRequest::exact(file, "k"), &2)
        .unwrap_err();

    let starts = capture.events_with_field("record_or_compare", "file", file);
    assert_eq!(starts.len(), 2);
    assert!(starts.iter().all(|e| e.event.as_deref() == Some(EVENT_START)));

    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some("record_or_compare")
            && e.event.as_deref() == Some(EVENT_END)
            && e.field("outcome") == Some("recorded")
    });
    assert!(ends >= 1);

    let mismatches = capture.count_events(|e| {
        e.op.as_deref() == Some("record_or_compare")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("err.code") == Some("ERR_SNAPSHOT_MISMATCH")
    });
    assert!(mismatches >= 1);
}
