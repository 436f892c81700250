//! Dynamic values and the object graph arena
//!
//! Composite objects live in an arena owned by [`ObjectGraph`] and are
//! referenced by [`ObjectId`], so cyclic graphs can be described without
//! shared mutable pointers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Constraint, DataColumn, DataRelation, DataRow, DataSet, DataTable};

/// Index of an object inside an [`ObjectGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value that can appear anywhere in a compared graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absent value (null reference or DBNull)
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// Floating point
    Float(f64),

    /// Text
    Text(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Point in time
    Timestamp(DateTime<Utc>),

    /// Ordered collection, matched by index
    List(Vec<Value>),

    /// Keyed collection, matched by key
    Map(BTreeMap<String, Value>),

    /// Reference to an object in the owning graph
    Object(ObjectId),

    /// Data set
    DataSet(Box<DataSet>),

    /// Data table
    DataTable(Box<DataTable>),

    /// Data column
    DataColumn(Box<DataColumn>),

    /// Data row
    DataRow(Box<DataRow>),

    /// Data relation
    DataRelation(Box<DataRelation>),

    /// Unique or foreign-key constraint
    Constraint(Box<Constraint>),
}

impl Value {
    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value is compared by direct equality
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::Bool(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::Text(_)
                | Self::Bytes(_)
                | Self::Date(_)
                | Self::Timestamp(_)
        )
    }

    /// Runtime type name, without resolving object references
    ///
    /// Objects report `"Object"` here; use [`ObjectGraph::type_name`] to get
    /// the declared type of the referenced object.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::Text(_) => "Text",
            Self::Bytes(_) => "Bytes",
            Self::Date(_) => "Date",
            Self::Timestamp(_) => "Timestamp",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Object(_) => "Object",
            Self::DataSet(set) => &set.type_name,
            Self::DataTable(table) => &table.type_name,
            Self::DataColumn(_) => "DataColumn",
            Self::DataRow(_) => "DataRow",
            Self::DataRelation(_) => "DataRelation",
            Self::Constraint(constraint) => constraint.kind.type_name(),
        }
    }

    /// Text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "<null>"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Date(date) => write!(f, "{}", date),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::List(items) => write!(f, "<list of {} items>", items.len()),
            Self::Map(entries) => write!(f, "<map of {} entries>", entries.len()),
            Self::Object(id) => write!(f, "<object {}>", id),
            Self::DataSet(set) => write!(f, "{} {:?}", set.type_name, set.data_set_name),
            Self::DataTable(table) => write!(f, "{} {:?}", table.type_name, table.table_name),
            Self::DataColumn(column) => write!(f, "DataColumn {:?}", column.column_name),
            Self::DataRow(row) => write!(f, "DataRow of {:?} ({})", row.table_name, row.state),
            Self::DataRelation(relation) => write!(f, "DataRelation {:?}", relation.relation_name),
            Self::Constraint(constraint) => {
                write!(f, "{} {:?}", constraint.kind.type_name(), constraint.constraint_name)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Map(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<DataSet> for Value {
    fn from(value: DataSet) -> Self {
        Self::DataSet(Box::new(value))
    }
}

impl From<DataTable> for Value {
    fn from(value: DataTable) -> Self {
        Self::DataTable(Box::new(value))
    }
}

impl From<DataColumn> for Value {
    fn from(value: DataColumn) -> Self {
        Self::DataColumn(Box::new(value))
    }
}

impl From<DataRow> for Value {
    fn from(value: DataRow) -> Self {
        Self::DataRow(Box::new(value))
    }
}

impl From<DataRelation> for Value {
    fn from(value: DataRelation) -> Self {
        Self::DataRelation(Box::new(value))
    }
}

impl From<Constraint> for Value {
    fn from(value: Constraint) -> Self {
        Self::Constraint(Box::new(value))
    }
}

/// A named member of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Member name
    pub name: String,

    /// Member value
    pub value: Value,
}

/// A composite object with ordered, named members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Declared type of the object
    pub type_name: String,

    /// Members in declaration order
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Object {
    /// Create an object with no members
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: Vec::new(),
        }
    }

    /// Add or replace a member
    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_member(name, value);
        self
    }

    /// Add or replace a member in place
    pub fn set_member(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(member) => member.value = value,
            None => self.members.push(Member { name, value }),
        }
    }

    /// Find a member value by name
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.members.iter().find(|m| m.name == name).map(|m| &m.value)
    }
}

/// A root value plus the arena of objects it (transitively) references
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectGraph {
    /// Entry point of the graph
    pub root: Value,

    /// Object arena, indexed by [`ObjectId`]
    #[serde(default)]
    pub objects: Vec<Object>,
}

impl ObjectGraph {
    /// Create a graph with an empty arena
    pub fn new(root: impl Into<Value>) -> Self {
        Self {
            root: root.into(),
            objects: Vec::new(),
        }
    }

    /// Add an object to the arena and return its id
    pub fn add(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// Look up an object
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    /// Look up an object mutably
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.0)
    }

    /// Set a member on an object already in the arena
    ///
    /// Returns `false` if the id does not exist. This is how back-references
    /// are wired up after both ends of a cycle have been added.
    pub fn set_member(&mut self, id: ObjectId, name: impl Into<String>, value: impl Into<Value>) -> bool {
        match self.object_mut(id) {
            Some(object) => {
                object.set_member(name, value);
                true
            }
            None => false,
        }
    }

    /// Replace the root value
    pub fn with_root(mut self, root: impl Into<Value>) -> Self {
        self.root = root.into();
        self
    }

    /// Runtime type name of a value, resolving object references
    pub fn type_name<'a>(&'a self, value: &'a Value) -> &'a str {
        match value {
            Value::Object(id) => self.object(*id).map_or("Object", |o| o.type_name.as_str()),
            other => other.kind_name(),
        }
    }
}

impl From<Value> for ObjectGraph {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

impl From<DataSet> for ObjectGraph {
    fn from(set: DataSet) -> Self {
        Self::new(set)
    }
}

impl From<DataTable> for ObjectGraph {
    fn from(table: DataTable) -> Self {
        Self::new(table)
    }
}

impl From<DataRow> for ObjectGraph {
    fn from(row: DataRow) -> Self {
        Self::new(row)
    }
}
