//! Operation Sheets
//!
//! Parsing of CSV/TSV operation sheets into [`crate::models::OperationRecord`]
//! rows, and the [`OperationBatch`] that accumulates processed rows and
//! their errors in sheet order.

mod batch;
mod reader;

pub use batch::{BatchError, OperationBatch};
pub use reader::{read_operations, read_operations_from_path, ReaderOptions};
