//! Tests for OperationRecord column assignment and error latching

use crate::models::{OperationRecord, Redirect, TermAction, RECOGNIZED_COLUMNS};

#[test]
fn test_set_column_assigns_recognized_columns() {
    let mut record = OperationRecord::default();
    record.set_column("vocabulary_name", "Category").unwrap();
    record.set_column("term_name", "Sports").unwrap();
    record.set_column("tid", "42").unwrap();
    record.set_column("action", "merge").unwrap();
    record.set_column("target_term_name", "Athletics").unwrap();
    record.set_column("target_field", "field_category").unwrap();

    assert_eq!(record.vocabulary_name, "Category");
    assert_eq!(record.term_name, "Sports");
    assert_eq!(record.tid, "42");
    assert_eq!(record.action, TermAction::Merge);
    assert_eq!(record.target_term_name, "Athletics");
    assert_eq!(record.target_field, "field_category");
}

#[test]
fn test_set_column_ignores_unrecognized_columns() {
    let mut record = OperationRecord::default();
    record.set_column("colour", "blue").unwrap();
    assert_eq!(record, OperationRecord::default());
}

#[test]
fn test_invalid_action_is_schema_error() {
    let mut record = OperationRecord::default();
    let err = record.set_column("action", "obliterate").unwrap_err();
    assert_eq!(err.to_string(), "obliterate is not a valid action");
    // The action stays at its default; the caller latches the error message.
    assert_eq!(record.action, TermAction::None);
}

#[test]
fn test_redirect_defaults_and_normalization() {
    let mut record = OperationRecord::default();
    assert_eq!(record.redirect, Redirect::Moved301);

    record.set_column("redirect", "n").unwrap();
    assert_eq!(record.redirect, Redirect::No);

    record.set_column("redirect", "y").unwrap();
    assert_eq!(record.redirect, Redirect::Moved301);

    assert!(record.set_column("redirect", "teapot").is_err());
}

#[test]
fn test_first_error_wins() {
    let mut record = OperationRecord::default();
    record.record_error("first failure");
    record.record_error("second failure");
    assert_eq!(record.error.as_deref(), Some("first failure"));
}

#[test]
fn test_has_action() {
    let mut record = OperationRecord::default();
    assert!(!record.has_action());
    record.set_column("action", "delete").unwrap();
    assert!(record.has_action());
}

#[test]
fn test_recognized_columns_cover_every_field_the_sheet_defines() {
    // Every recognized column must be assignable without error.
    let mut record = OperationRecord::default();
    for column in RECOGNIZED_COLUMNS {
        let value = match column {
            "action" => "create",
            "redirect" => "301",
            _ => "x",
        };
        record.set_column(column, value).unwrap();
    }
}
