//! Equivalency engine - structural comparison of object graphs and tabular data
//!
//! This crate walks a subject and an expectation side by side:
//! - Object graphs, lists and maps, with cycle detection
//! - Data sets, tables, columns, rows, relations and constraints
//! - Row pairing by position or by primary key
//! - Mismatch collection with precise paths

pub mod comparand;
pub mod equivalency;
pub mod error;
pub mod matching;
pub mod node;
mod tabular;
pub mod validator;

pub use comparand::Comparand;
pub use equivalency::{Comparison, Equivalency};
pub use error::EquivalencyError;
pub use matching::{pair_by_index, pair_by_name, pair_rows, primary_key_columns, Pairing, PrimaryKeyMismatch};
pub use node::{Node, PathSegment};
pub use validator::{leaves_equal, EquivalencyValidator};
