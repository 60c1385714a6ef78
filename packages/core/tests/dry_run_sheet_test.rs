//! Integration tests for the full sheet pipeline
//!
//! Tests cover:
//! - CSV sheet -> reader -> engine -> batch, end to end
//! - Intra-batch chaining (create then reference, delete child then parent)
//! - Error reporting without aborting the run
//! - TSV parsing through the same pipeline

use std::sync::Once;
use term_manager_core::operations::{read_operations, ReaderOptions};
use term_manager_core::providers::{SnapshotTerm, StaticDirectory};
use term_manager_core::{DryRunEngine, TermAction};

// Capture engine tracing when tests run with RUST_LOG set.
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_vocabulary("Category", "1")
        .with_vocabulary("Tags", "2")
        .with_field("field_category", ["1"])
        .with_field("field_tags", ["2"])
}

fn term(
    vocabulary: &str,
    name: &str,
    tid: &str,
    parent: Option<(&str, &str)>,
    node_count: u64,
    child_tids: &[&str],
) -> SnapshotTerm {
    SnapshotTerm {
        vocabulary_name: vocabulary.to_string(),
        term_name: name.to_string(),
        tid: tid.to_string(),
        vid: if vocabulary == "Category" { "1" } else { "2" }.to_string(),
        parent_tid: parent.map(|(tid, _)| tid.to_string()).unwrap_or_default(),
        parent_term_name: parent.map(|(_, name)| name.to_string()).unwrap_or_default(),
        path: String::new(),
        node_count,
        child_tids: child_tids.iter().map(|tid| tid.to_string()).collect(),
    }
}

fn snapshot() -> Vec<SnapshotTerm> {
    vec![
        term("Category", "News", "10", None, 0, &["11"]),
        term("Category", "Sport", "11", Some(("10", "News")), 0, &["12"]),
        term("Category", "Football", "12", Some(("11", "Sport")), 4, &[]),
        term("Category", "Politics", "20", None, 5, &[]),
        term("Category", "Business", "21", None, 3, &[]),
    ]
}

// =========================================================================
// End-to-end sheet processing
// =========================================================================

#[test]
fn test_clean_sheet_end_to_end() {
    init_tracing();
    let sheet = "\
vocabulary_name,term_name,action,parent_term_name,target_term_name,target_vocabulary_name,new_name,redirect
Category,Tennis,create,Sport,,,,
Category,Junior Tennis,create,Tennis,,,,
Category,Football,move parent,,News,,,
Category,Politics,rename,,,,Current Affairs,
Category,Business,merge,,Current Affairs,Category,,301
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();
    assert_eq!(records.len(), 5);

    let directory = directory();
    let mut engine = DryRunEngine::new(&snapshot(), &directory, &directory).unwrap();
    engine.process_all(records);

    let summary = engine.summary();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.errors, 0);
    assert!(engine.batch().is_clean());

    let tree = engine.tree();

    // Row 2 referenced the term row 1 created.
    let idx = tree.lookup_active("Junior Tennis", "Category", "").unwrap();
    assert_eq!(tree.get(idx).parent_name, "Tennis");

    // Football now hangs off News directly.
    let idx = tree.lookup_active("Football", "Category", "").unwrap();
    assert_eq!(tree.get(idx).parent_tid, "10");

    // The rename clone absorbed the merge (rows 4 then 5 chained onto it).
    let idx = tree.lookup_active("Current Affairs", "Category", "").unwrap();
    let current_affairs = tree.get(idx);
    assert_eq!(current_affairs.tid, "20");
    assert_eq!(current_affairs.node_count, 5 + 3);
    assert!(current_affairs.locked);

    let err = tree.lookup_active("Business", "Category", "").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Category > Business has been merged into Category > Current Affairs"
    );
}

#[test]
fn test_sheet_with_failures_reports_all_of_them() {
    init_tracing();
    let sheet = "\
vocabulary_name,term_name,action,parent_term_name,new_name
Category,Sport,delete,,
Category,Politics,create,,
Category,Gardening,rename,,Allotments
Category,Football,delete,,
Category,Sport,delete,,
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();

    let directory = directory();
    let mut engine = DryRunEngine::new(&snapshot(), &directory, &directory).unwrap();
    engine.process_all(records);

    // Three failures, and the two valid rows still went through.
    let messages: Vec<&str> = engine
        .batch()
        .errors()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Category > Sport cannot be deleted as it has children",
            "Category > Politics already exists",
            "Category > Gardening does not exist",
        ]
    );

    // Row 4 deleted Football, clearing the way for row 5 to delete Sport.
    let tree = engine.tree();
    let err = tree.lookup_active("Sport", "Category", "").unwrap_err();
    assert_eq!(err.to_string(), "Category > Sport has been flagged for delete");
}

#[test]
fn test_tsv_sheet_through_the_pipeline() {
    init_tracing();
    let sheet = "vocabulary_name\tterm_name\taction\nCategory\tCricket\tcreate\n";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::tsv()).unwrap();

    let directory = directory();
    let mut engine = DryRunEngine::new(&snapshot(), &directory, &directory).unwrap();
    engine.process_all(records);

    assert!(engine.batch().is_clean());
    let idx = engine.tree().lookup_active("Cricket", "Category", "").unwrap();
    assert_eq!(engine.tree().get(idx).pending_action, TermAction::Create);
}

#[test]
fn test_schema_errors_survive_into_the_batch() {
    init_tracing();
    let sheet = "\
vocabulary_name,term_name,action
Category,Football,explode
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();

    let directory = directory();
    let mut engine = DryRunEngine::new(&snapshot(), &directory, &directory).unwrap();
    engine.process_all(records);

    assert_eq!(engine.batch().len(), 1);
    assert_eq!(
        engine.batch().errors()[0].message,
        "explode is not a valid action"
    );
    // The row never acted on the tree.
    assert!(engine.tree().lookup_active("Football", "Category", "").is_ok());
}

#[test]
fn test_into_parts_hands_over_tree_and_batch() {
    init_tracing();
    let sheet = "\
vocabulary_name,term_name,action
Category,Cricket,create
";
    let records = read_operations(sheet.as_bytes(), ReaderOptions::csv()).unwrap();

    let directory = directory();
    let mut engine = DryRunEngine::new(&snapshot(), &directory, &directory).unwrap();
    engine.process_all(records);

    let (tree, batch) = engine.into_parts();
    assert_eq!(batch.len(), 1);
    assert!(tree.lookup_active("Cricket", "Category", "").is_ok());
}
