//! Tabular entities: data sets, tables, columns, rows, relations, constraints
//!
//! These mirror the structure of an in-memory relational data set. The
//! comparison engine only reads them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Portable column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean type
    Bool,

    /// Integer type (any precision)
    Int,

    /// Floating point (any precision)
    Float,

    /// Decimal with precision and scale
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },

    /// String/text type
    String,

    /// Date (no time component)
    Date,

    /// Timestamp (with time component)
    Timestamp,

    /// Binary data
    Bytes,

    /// Arbitrary object values
    Object,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Decimal { precision, scale } => {
                match (precision, scale) {
                    (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                    (Some(p), None) => write!(f, "DECIMAL({})", p),
                    _ => write!(f, "DECIMAL"),
                }
            }
            Self::String => write!(f, "STRING"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Bytes => write!(f, "BYTES"),
            Self::Object => write!(f, "OBJECT"),
        }
    }
}

/// Lifecycle state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RowState {
    /// Loaded and not changed since
    #[default]
    Unchanged,

    /// Added since the last accept; has no original version
    Added,

    /// Changed since the last accept; has both versions
    Modified,

    /// Deleted since the last accept; has no current version
    Deleted,
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "Unchanged"),
            Self::Added => write!(f, "Added"),
            Self::Modified => write!(f, "Modified"),
            Self::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Which snapshot of a row's fields to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowVersion {
    /// Values as they are now
    Current,

    /// Values as they were at the last accept
    Original,
}

impl fmt::Display for RowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "Current"),
            Self::Original => write!(f, "Original"),
        }
    }
}

/// Referential action for foreign keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rule {
    None,
    #[default]
    Cascade,
    SetNull,
    SetDefault,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Cascade => write!(f, "Cascade"),
            Self::SetNull => write!(f, "SetNull"),
            Self::SetDefault => write!(f, "SetDefault"),
        }
    }
}

/// Whether accepting/rejecting a parent row cascades to children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcceptRejectRule {
    #[default]
    None,
    Cascade,
}

impl fmt::Display for AcceptRejectRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Cascade => write!(f, "Cascade"),
        }
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    /// Name of the owning table, if attached to one
    #[serde(default)]
    pub table_name: Option<String>,

    /// Column name
    pub column_name: String,

    /// Declared value type
    pub data_type: ColumnType,

    /// Whether null values are allowed
    pub allow_db_null: bool,

    /// Whether values are generated on insert
    pub auto_increment: bool,

    /// First generated value
    pub auto_increment_seed: i64,

    /// Increment between generated values
    pub auto_increment_step: i64,

    /// Display caption
    pub caption: String,

    /// Value used when a row does not set this column
    #[serde(default)]
    pub default_value: Value,

    /// Computed column expression (empty when not computed)
    #[serde(default)]
    pub expression: String,

    /// Maximum text length, if limited
    #[serde(default)]
    pub max_length: Option<u32>,

    /// Whether the column is read-only
    pub read_only: bool,

    /// Whether values must be unique
    pub unique: bool,

    /// Free-form metadata
    #[serde(default)]
    pub extended_properties: BTreeMap<String, Value>,
}

impl DataColumn {
    /// Create a nullable column with default settings
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        let column_name = name.into();
        Self {
            table_name: None,
            caption: column_name.clone(),
            column_name,
            data_type,
            allow_db_null: true,
            auto_increment: false,
            auto_increment_seed: 0,
            auto_increment_step: 1,
            default_value: Value::Null,
            expression: String::new(),
            max_length: None,
            read_only: false,
            unique: false,
            extended_properties: BTreeMap::new(),
        }
    }

    /// Disallow null values
    pub fn not_null(mut self) -> Self {
        self.allow_db_null = false;
        self
    }

    /// Generate values on insert
    pub fn with_auto_increment(mut self, seed: i64, step: i64) -> Self {
        self.auto_increment = true;
        self.auto_increment_seed = seed;
        self.auto_increment_step = step;
        self
    }

    /// Set the caption
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Make this a computed column
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    /// Limit text length
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Mark as read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Attach the column to a table by name
    pub fn in_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Add an extended property
    pub fn with_extended_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extended_properties.insert(key.into(), value.into());
        self
    }
}

/// One field of a row, in both versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    /// Column this field belongs to
    pub column: String,

    /// Current value (absent for deleted rows)
    #[serde(default)]
    pub current: Option<Value>,

    /// Original value (absent for added rows)
    #[serde(default)]
    pub original: Option<Value>,
}

impl RowField {
    /// Read one version of the field
    pub fn version(&self, version: RowVersion) -> Option<&Value> {
        match version {
            RowVersion::Current => self.current.as_ref(),
            RowVersion::Original => self.original.as_ref(),
        }
    }
}

/// A row with its state and ordered field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    /// Name of the owning table
    pub table_name: String,

    /// Row state
    #[serde(default)]
    pub state: RowState,

    /// Error text attached to the row, if any
    #[serde(default)]
    pub row_error: Option<String>,

    /// Fields in column order
    #[serde(default)]
    pub fields: Vec<RowField>,
}

impl DataRow {
    /// Create an unchanged row with no fields
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            state: RowState::Unchanged,
            row_error: None,
            fields: Vec::new(),
        }
    }

    /// Create a newly added row (no original version)
    pub fn added(table_name: impl Into<String>) -> Self {
        Self {
            state: RowState::Added,
            ..Self::new(table_name)
        }
    }

    /// Add a field as it was loaded
    ///
    /// Added rows only get a current value; other rows get the same value in
    /// both versions.
    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let original = match self.state {
            RowState::Added => None,
            _ => Some(value.clone()),
        };
        self.fields.push(RowField {
            column: column.into(),
            current: Some(value),
            original,
        });
        self
    }

    /// Change the current value of a field, like an edit would
    ///
    /// Unchanged rows become modified. Unknown columns are appended.
    pub fn set_value(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.column == column) {
            Some(field) => field.current = Some(value),
            None => self.fields.push(RowField {
                column: column.to_string(),
                current: Some(value),
                original: None,
            }),
        }
        if self.state == RowState::Unchanged {
            self.state = RowState::Modified;
        }
    }

    /// Mark the row deleted, dropping its current version
    pub fn delete(&mut self) {
        for field in &mut self.fields {
            field.current = None;
        }
        self.state = RowState::Deleted;
    }

    /// Commit the current values as the new originals
    ///
    /// Added and modified rows become unchanged. Deleted rows are left as
    /// they are; [`DataTable::accept_changes`] removes them.
    pub fn accept_changes(&mut self) {
        if self.state == RowState::Deleted {
            return;
        }
        for field in &mut self.fields {
            field.original = field.current.clone();
        }
        self.state = RowState::Unchanged;
    }

    /// Set the row error text
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.row_error = Some(error.into());
        self
    }

    /// Find a field by column name
    pub fn field(&self, column: &str) -> Option<&RowField> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Read a field value in the given version
    pub fn value(&self, column: &str, version: RowVersion) -> Option<&Value> {
        self.field(column).and_then(|f| f.version(version))
    }

    /// Whether the row carries a version at all
    pub fn has_version(&self, version: RowVersion) -> bool {
        match version {
            RowVersion::Current => self.state != RowState::Deleted,
            RowVersion::Original => self.state != RowState::Added,
        }
    }

    /// Column names in field order
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column.as_str()).collect()
    }
}

/// Parent/child link between two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRelation {
    /// Relation name
    pub relation_name: String,

    /// Parent table name
    pub parent_table: String,

    /// Child table name
    pub child_table: String,

    /// Key columns on the parent
    pub parent_columns: Vec<String>,

    /// Key columns on the child
    pub child_columns: Vec<String>,

    /// Whether child rows nest under parent rows
    #[serde(default)]
    pub nested: bool,

    /// Free-form metadata
    #[serde(default)]
    pub extended_properties: BTreeMap<String, Value>,
}

impl DataRelation {
    /// Create a relation between parent and child columns
    pub fn new<P, C>(
        relation_name: impl Into<String>,
        parent_table: impl Into<String>,
        parent_columns: P,
        child_table: impl Into<String>,
        child_columns: C,
    ) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            relation_name: relation_name.into(),
            parent_table: parent_table.into(),
            child_table: child_table.into(),
            parent_columns: parent_columns.into_iter().map(Into::into).collect(),
            child_columns: child_columns.into_iter().map(Into::into).collect(),
            nested: false,
            extended_properties: BTreeMap::new(),
        }
    }

    /// Mark as nested
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }
}

/// Kind-specific part of a constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Uniqueness over a set of columns
    Unique {
        columns: Vec<String>,
        is_primary_key: bool,
    },

    /// Reference from this table's columns to another table's columns
    ForeignKey {
        columns: Vec<String>,
        related_table: String,
        related_columns: Vec<String>,
        delete_rule: Rule,
        update_rule: Rule,
        accept_reject_rule: AcceptRejectRule,
    },
}

impl ConstraintKind {
    /// Runtime type name of the constraint
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Unique { .. } => "UniqueConstraint",
            Self::ForeignKey { .. } => "ForeignKeyConstraint",
        }
    }

    /// Constrained columns on the owning table
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Unique { columns, .. } | Self::ForeignKey { columns, .. } => columns,
        }
    }
}

/// A table constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name (may be empty)
    pub constraint_name: String,

    /// Owning table name
    #[serde(default)]
    pub table_name: String,

    /// Free-form metadata
    #[serde(default)]
    pub extended_properties: BTreeMap<String, Value>,

    /// Unique or foreign-key details
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Create a unique constraint
    pub fn unique<I>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            constraint_name: name.into(),
            table_name: String::new(),
            extended_properties: BTreeMap::new(),
            kind: ConstraintKind::Unique {
                columns: columns.into_iter().map(Into::into).collect(),
                is_primary_key: false,
            },
        }
    }

    /// Create the unique constraint backing a primary key
    pub fn primary_key<I>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut constraint = Self::unique(name, columns);
        if let ConstraintKind::Unique { is_primary_key, .. } = &mut constraint.kind {
            *is_primary_key = true;
        }
        constraint
    }

    /// Create a foreign-key constraint with cascading rules
    pub fn foreign_key<C, R>(
        name: impl Into<String>,
        columns: C,
        related_table: impl Into<String>,
        related_columns: R,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            constraint_name: name.into(),
            table_name: String::new(),
            extended_properties: BTreeMap::new(),
            kind: ConstraintKind::ForeignKey {
                columns: columns.into_iter().map(Into::into).collect(),
                related_table: related_table.into(),
                related_columns: related_columns.into_iter().map(Into::into).collect(),
                delete_rule: Rule::Cascade,
                update_rule: Rule::Cascade,
                accept_reject_rule: AcceptRejectRule::None,
            },
        }
    }

    /// Set the delete rule of a foreign key (no-op for unique constraints)
    pub fn with_delete_rule(mut self, rule: Rule) -> Self {
        if let ConstraintKind::ForeignKey { delete_rule, .. } = &mut self.kind {
            *delete_rule = rule;
        }
        self
    }
}

/// A named table of columns and rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    /// Runtime type name ("DataTable" or a typed subclass)
    pub type_name: String,

    /// Table name
    pub table_name: String,

    /// XML namespace
    #[serde(default)]
    pub namespace: String,

    /// XML prefix
    #[serde(default)]
    pub prefix: String,

    /// Whether string comparisons inside the table are case-sensitive
    #[serde(default)]
    pub case_sensitive: bool,

    /// Display expression
    #[serde(default)]
    pub display_expression: String,

    /// Free-form metadata
    #[serde(default)]
    pub extended_properties: BTreeMap<String, Value>,

    /// Columns in ordinal order
    #[serde(default)]
    pub columns: Vec<DataColumn>,

    /// Primary key column names, in key order
    #[serde(default)]
    pub primary_key: Vec<String>,

    /// Constraints
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// Rows in collection order
    #[serde(default)]
    pub rows: Vec<DataRow>,
}

impl DataTable {
    /// Create an empty table
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            type_name: "DataTable".to_string(),
            table_name: table_name.into(),
            namespace: String::new(),
            prefix: String::new(),
            case_sensitive: false,
            display_expression: String::new(),
            extended_properties: BTreeMap::new(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            constraints: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Use a typed subclass name as the runtime type
    pub fn typed_as(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Add a column, attaching it to this table
    pub fn with_column(mut self, column: DataColumn) -> Self {
        self.columns.push(column.in_table(self.table_name.clone()));
        self
    }

    /// Set the primary key columns
    pub fn with_primary_key<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a constraint, attaching it to this table
    pub fn with_constraint(mut self, mut constraint: Constraint) -> Self {
        constraint.table_name = self.table_name.clone();
        self.constraints.push(constraint);
        self
    }

    /// Add an unchanged row whose values follow column order
    ///
    /// Values beyond the last column are ignored.
    pub fn with_row<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let row = self
            .columns
            .iter()
            .zip(values)
            .fold(DataRow::new(self.table_name.clone()), |row, (column, value)| {
                row.with_value(column.column_name.clone(), value)
            });
        self.with_data_row(row)
    }

    /// Add a prepared row, attaching it to this table
    pub fn with_data_row(mut self, mut row: DataRow) -> Self {
        row.table_name = self.table_name.clone();
        self.rows.push(row);
        self
    }

    /// Add an extended property
    pub fn with_extended_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extended_properties.insert(key.into(), value.into());
        self
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column_name.as_str()).collect()
    }

    /// Commit every row, dropping deleted ones
    pub fn accept_changes(&mut self) {
        self.rows.retain(|row| row.state != RowState::Deleted);
        for row in &mut self.rows {
            row.accept_changes();
        }
    }

    /// Mutable access to a row by position
    pub fn row_mut(&mut self, index: usize) -> Option<&mut DataRow> {
        self.rows.get_mut(index)
    }
}

/// A named collection of tables and the relations between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Runtime type name ("DataSet" or a typed subclass)
    pub type_name: String,

    /// Data set name
    pub data_set_name: String,

    /// XML namespace
    #[serde(default)]
    pub namespace: String,

    /// XML prefix
    #[serde(default)]
    pub prefix: String,

    /// Whether string comparisons are case-sensitive
    #[serde(default)]
    pub case_sensitive: bool,

    /// Whether constraints are enforced on update
    #[serde(default = "default_true")]
    pub enforce_constraints: bool,

    /// Free-form metadata
    #[serde(default)]
    pub extended_properties: BTreeMap<String, Value>,

    /// Tables
    #[serde(default)]
    pub tables: Vec<DataTable>,

    /// Relations between tables
    #[serde(default)]
    pub relations: Vec<DataRelation>,
}

fn default_true() -> bool {
    true
}

impl DataSet {
    /// Create an empty data set
    pub fn new(data_set_name: impl Into<String>) -> Self {
        Self {
            type_name: "DataSet".to_string(),
            data_set_name: data_set_name.into(),
            namespace: String::new(),
            prefix: String::new(),
            case_sensitive: false,
            enforce_constraints: true,
            extended_properties: BTreeMap::new(),
            tables: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Use a typed subclass name as the runtime type
    pub fn typed_as(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Add a table
    pub fn with_table(mut self, table: DataTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a relation
    pub fn with_relation(mut self, relation: DataRelation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Add an extended property
    pub fn with_extended_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extended_properties.insert(key.into(), value.into());
        self
    }

    /// Find a table by name
    pub fn table(&self, name: &str) -> Option<&DataTable> {
        self.tables.iter().find(|t| t.table_name == name)
    }

    /// Find a table by name, mutably
    pub fn table_mut(&mut self, name: &str) -> Option<&mut DataTable> {
        self.tables.iter_mut().find(|t| t.table_name == name)
    }
}
