//! Comparison options
//!
//! An [`EquivalencyOptions`] value is built once (usually by cloning the
//! passed-down defaults and applying a configuration callback) and is then
//! only read for the duration of a comparison. Builder calls are cumulative:
//! every `excluding_*` call unions with what is already configured.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::DataColumn;
use crate::member::{MemberInfo, MemberSelector, RelatedType};

/// Arbitrary member exclusion predicate
pub type MemberPredicate = Arc<dyn Fn(&MemberInfo<'_>) -> bool + Send + Sync>;

/// How rows of two tables are paired before they are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMatchMode {
    /// Row `i` pairs with row `i`
    #[default]
    Index,

    /// Rows pair by equal primary-key value tuples
    PrimaryKey,
}

impl fmt::Display for RowMatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::PrimaryKey => write!(f, "primary_key"),
        }
    }
}

/// Errors raised while building options
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("'{expression}' is not a simple member access")]
    InvalidMemberExpression { expression: String },

    #[error("{type_name} has no member named '{member}'")]
    UnknownMember { type_name: String, member: String },
}

#[derive(Clone)]
enum MemberExclusion {
    /// Root-relative member path
    Path(MemberSelector),

    /// Member of a related type, by declaring type and name
    Related {
        declaring_type: &'static str,
        member: String,
    },

    /// Caller-supplied predicate
    Predicate(MemberPredicate),
}

impl MemberExclusion {
    fn matches(&self, info: &MemberInfo<'_>) -> bool {
        match self {
            Self::Path(selector) => selector.matches(info.path),
            Self::Related { declaring_type, member } => {
                info.declaring_type == *declaring_type && info.name == member
            }
            Self::Predicate(predicate) => predicate(info),
        }
    }
}

impl fmt::Debug for MemberExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(selector) => write!(f, "Path({})", selector),
            Self::Related { declaring_type, member } => write!(f, "Related({}.{})", declaring_type, member),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// Options governing one equivalency comparison
#[derive(Debug, Clone, Default)]
pub struct EquivalencyOptions {
    allow_mismatched_types: bool,
    ignore_unmatched_columns: bool,
    row_match_mode: RowMatchMode,
    exclude_original_data: bool,
    excluded_tables: BTreeSet<String>,
    excluded_columns: BTreeSet<String>,
    excluded_columns_by_table: BTreeMap<String, BTreeSet<String>>,
    member_exclusions: Vec<MemberExclusion>,
}

impl EquivalencyOptions {
    /// Create options with every setting at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerate differing runtime types between subject and expectation
    pub fn allowing_mismatched_types(&mut self) -> &mut Self {
        self.allow_mismatched_types = true;
        self
    }

    /// Skip columns present on only one side instead of failing
    pub fn ignoring_unmatched_columns(&mut self) -> &mut Self {
        self.ignore_unmatched_columns = true;
        self
    }

    /// Choose how rows are paired
    pub fn using_row_match_mode(&mut self, mode: RowMatchMode) -> &mut Self {
        self.row_match_mode = mode;
        self
    }

    /// Compare only current values of rows that are modified on both sides
    pub fn excluding_original_data(&mut self) -> &mut Self {
        self.exclude_original_data = true;
        self
    }

    /// Exclude the member at a root-relative member path
    pub fn excluding(&mut self, expression: &str) -> Result<&mut Self, OptionsError> {
        let selector = MemberSelector::parse(expression)?;
        self.member_exclusions.push(MemberExclusion::Path(selector));
        Ok(self)
    }

    /// Exclude every member for which the predicate returns true
    pub fn excluding_members<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.member_exclusions
            .push(MemberExclusion::Predicate(Arc::new(predicate)));
        self
    }

    /// Exclude a member of a related type wherever it is reached
    pub fn excluding_related(&mut self, related: RelatedType, member: &str) -> Result<&mut Self, OptionsError> {
        let (declaring_type, member) = related.resolve(member)?;
        self.member_exclusions.push(MemberExclusion::Related {
            declaring_type,
            member,
        });
        Ok(self)
    }

    /// Exclude a table by name
    pub fn excluding_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.excluded_tables.insert(table.into());
        self
    }

    /// Exclude several tables by name
    pub fn excluding_tables<I>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.excluded_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Exclude one column of one table
    pub fn excluding_column(&mut self, table: impl Into<String>, column: impl Into<String>) -> &mut Self {
        self.excluded_columns_by_table
            .entry(table.into())
            .or_default()
            .insert(column.into());
        self
    }

    /// Exclude several columns of one table
    pub fn excluding_columns<I>(&mut self, table: impl Into<String>, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.excluded_columns_by_table
            .entry(table.into())
            .or_default()
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Exclude a column by name in every table
    pub fn excluding_column_in_all_tables(&mut self, column: impl Into<String>) -> &mut Self {
        self.excluded_columns.insert(column.into());
        self
    }

    /// Exclude several columns by name in every table
    pub fn excluding_columns_in_all_tables<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.excluded_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Exclude a column definition
    ///
    /// A column attached to a table is excluded in that table only; a
    /// detached column is excluded in every table.
    pub fn excluding_data_column(&mut self, column: &DataColumn) -> &mut Self {
        match &column.table_name {
            Some(table) => self.excluding_column(table.clone(), column.column_name.clone()),
            None => self.excluding_column_in_all_tables(column.column_name.clone()),
        }
    }

    /// Exclude several column definitions
    pub fn excluding_data_columns<'c, I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = &'c DataColumn>,
    {
        for column in columns {
            self.excluding_data_column(column);
        }
        self
    }

    /// Whether differing runtime types are tolerated
    pub fn allow_mismatched_types(&self) -> bool {
        self.allow_mismatched_types
    }

    /// Whether one-sided columns are skipped
    pub fn ignore_unmatched_columns(&self) -> bool {
        self.ignore_unmatched_columns
    }

    /// Row pairing mode
    pub fn row_match_mode(&self) -> RowMatchMode {
        self.row_match_mode
    }

    /// Whether original values of modified rows are skipped
    pub fn exclude_original_data(&self) -> bool {
        self.exclude_original_data
    }

    /// Excluded table names
    pub fn excluded_tables(&self) -> &BTreeSet<String> {
        &self.excluded_tables
    }

    /// Column names excluded in every table
    pub fn excluded_columns(&self) -> &BTreeSet<String> {
        &self.excluded_columns
    }

    /// Column names excluded per table
    pub fn excluded_columns_by_table(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.excluded_columns_by_table
    }

    /// Whether a table is excluded
    pub fn is_table_excluded(&self, table: &str) -> bool {
        self.excluded_tables.contains(table)
    }

    /// Whether a column of a table is excluded
    pub fn is_column_excluded(&self, table: &str, column: &str) -> bool {
        self.excluded_columns.contains(column)
            || self
                .excluded_columns_by_table
                .get(table)
                .is_some_and(|columns| columns.contains(column))
    }

    /// Whether a column definition is excluded
    ///
    /// Attached columns are checked against their table; detached columns
    /// only against the all-tables exclusions.
    pub fn should_exclude_column(&self, column: &DataColumn) -> bool {
        match &column.table_name {
            Some(table) => self.is_column_excluded(table, &column.column_name),
            None => self.excluded_columns.contains(&column.column_name),
        }
    }

    /// Whether any member exclusion matches
    pub fn is_member_excluded(&self, info: &MemberInfo<'_>) -> bool {
        self.member_exclusions.iter().any(|exclusion| exclusion.matches(info))
    }
}
