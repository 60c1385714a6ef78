//! Tests for operation sheet parsing

use crate::models::{Redirect, TermAction};
use crate::operations::{read_operations, read_operations_from_path, ReaderOptions};
use std::io::Write;

#[test]
fn test_parse_basic_csv() {
    let sheet = "\
vocabulary_name,term_name,action,parent_term_name
Category,Sports,create,
Category,Football,create,Sports
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].term_name, "Sports");
    assert_eq!(records[0].action, TermAction::Create);
    assert_eq!(records[1].parent_term_name, "Sports");
    assert!(records[1].error.is_none());
}

#[test]
fn test_column_order_is_irrelevant() {
    let sheet = "\
action,parent_term_name,term_name,vocabulary_name
create,Sports,Football,Category
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records[0].vocabulary_name, "Category");
    assert_eq!(records[0].term_name, "Football");
    assert_eq!(records[0].parent_term_name, "Sports");
}

#[test]
fn test_unrecognized_columns_ignored_and_missing_default_empty() {
    let sheet = "\
term_name,shoe_size,action
Sports,44,delete
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records[0].term_name, "Sports");
    assert_eq!(records[0].action, TermAction::Delete);
    // vocabulary_name column absent from the header: defaults to empty.
    assert_eq!(records[0].vocabulary_name, "");
}

#[test]
fn test_values_are_trimmed() {
    let sheet = "\
vocabulary_name,term_name,action
  Category  ,  Sports  ,  create
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records[0].vocabulary_name, "Category");
    assert_eq!(records[0].term_name, "Sports");
    assert_eq!(records[0].action, TermAction::Create);
}

#[test]
fn test_tsv_delimiter() {
    let sheet = "vocabulary_name\tterm_name\taction\nCategory\tSports\tdelete\n";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::tsv()).unwrap();
    assert_eq!(records[0].term_name, "Sports");
    assert_eq!(records[0].action, TermAction::Delete);
}

#[test]
fn test_invalid_action_latched_not_fatal() {
    let sheet = "\
vocabulary_name,term_name,action,redirect
Category,Sports,explode,
Category,Football,delete,n
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].error.as_deref(),
        Some("explode is not a valid action")
    );
    assert_eq!(records[0].action, TermAction::None);
    // The bad row does not poison the rest of the sheet.
    assert!(records[1].error.is_none());
    assert_eq!(records[1].redirect, Redirect::No);
}

#[test]
fn test_one_bad_column_does_not_abort_the_row() {
    let sheet = "\
vocabulary_name,term_name,redirect,action,new_name
Category,Sports,302,rename,Athletics
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    let record = &records[0];
    // The redirect failure is latched, but later columns were still assigned.
    assert_eq!(
        record.error.as_deref(),
        Some("302 is not a valid redirect value")
    );
    assert_eq!(record.action, TermAction::Rename);
    assert_eq!(record.new_name, "Athletics");
}

#[test]
fn test_rows_with_no_action_are_parsed() {
    // Export sheets re-imported as operation sheets carry actionless rows.
    let sheet = "\
vocabulary_name,term_name,tid,action
Category,Sports,4,
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].has_action());
    assert_eq!(records[0].tid, "4");
}

#[test]
fn test_read_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "vocabulary_name,term_name,action\nCategory,Sports,create\n"
    )
    .unwrap();

    let records = read_operations_from_path(file.path(), ReaderOptions::csv()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, TermAction::Create);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = read_operations_from_path("/no/such/sheet.csv", ReaderOptions::csv());
    assert!(result.is_err());
}
