//! Equivalency Core
//!
//! Data model for structural equivalency: dynamic values and object graphs,
//! the tabular entities, member descriptors, comparison options and the
//! mismatch facts a comparison produces.
//! Never rename mismatch codes - they are part of the public API.

pub mod value;
pub mod data;
pub mod member;
pub mod options;
pub mod mismatch;
pub mod report;
pub mod config;

pub use value::{Value, ObjectGraph, Object, ObjectId, Member};
pub use data::{
    ColumnType, DataSet, DataTable, DataColumn, DataRow, RowField, RowState, RowVersion,
    DataRelation, Constraint, ConstraintKind, Rule, AcceptRejectRule,
};
pub use member::{MemberInfo, MemberSelector, RelatedType};
pub use options::{EquivalencyOptions, RowMatchMode, MemberPredicate, OptionsError};
pub use mismatch::{Mismatch, MismatchCode, MismatchSink};
pub use report::{EquivalencyReport, ReportVersion, ReportSummary};
pub use config::{Config, DefaultOptions, ConfigError};
