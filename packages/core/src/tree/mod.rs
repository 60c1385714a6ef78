//! In-Memory Taxonomy Forest
//!
//! The point-in-time tree every dry run validates against and mutates.

mod store;

pub use store::{TaxonomyTree, TermIdx};
