//! Member descriptors and exclusion selectors
//!
//! A [`MemberInfo`] describes one member reached during a comparison. Member
//! exclusion predicates, path selectors and related-type exclusions all
//! decide against it, so no runtime type introspection is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::OptionsError;

/// Description of a member visited during a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInfo<'a> {
    /// Type that declares the member (e.g. `DataTable`, `Customer`)
    pub declaring_type: &'a str,

    /// Member name
    pub name: &'a str,

    /// Dotted member chain from the root, without index or key segments
    pub path: &'a str,
}

impl<'a> MemberInfo<'a> {
    /// Create a member descriptor
    pub fn new(declaring_type: &'a str, name: &'a str, path: &'a str) -> Self {
        Self {
            declaring_type,
            name,
            path,
        }
    }
}

/// A simple member-access chain such as `Customer.Address.City`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberSelector {
    segments: Vec<String>,
}

impl MemberSelector {
    /// Parse a dotted chain of identifiers
    ///
    /// Anything else (empty input, operators, calls, indexers, whitespace
    /// inside a segment) is not a simple member access and is rejected.
    pub fn parse(expression: &str) -> Result<Self, OptionsError> {
        let invalid = || OptionsError::InvalidMemberExpression {
            expression: expression.to_string(),
        };

        let segments = expression
            .trim()
            .split('.')
            .map(|segment| {
                if is_identifier(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(invalid())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Member names in the chain
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether a member path matches this selector exactly
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('.');
        self.segments.iter().all(|s| parts.next() == Some(s.as_str())) && parts.next().is_none()
    }
}

impl fmt::Display for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl TryFrom<String> for MemberSelector {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemberSelector> for String {
    fn from(selector: MemberSelector) -> Self {
        selector.to_string()
    }
}

/// Identifier: a letter or underscore followed by letters, digits or underscores
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

const CONSTRAINT_MEMBERS: &[&str] = &["ConstraintName", "Table", "ExtendedProperties"];
const UNIQUE_CONSTRAINT_MEMBERS: &[&str] = &["Columns", "IsPrimaryKey"];
const FOREIGN_KEY_CONSTRAINT_MEMBERS: &[&str] = &[
    "Columns",
    "RelatedTable",
    "RelatedColumns",
    "DeleteRule",
    "UpdateRule",
    "AcceptRejectRule",
];
const DATA_COLUMN_MEMBERS: &[&str] = &[
    "ColumnName",
    "DataType",
    "AllowDBNull",
    "AutoIncrement",
    "AutoIncrementSeed",
    "AutoIncrementStep",
    "Caption",
    "DefaultValue",
    "Expression",
    "MaxLength",
    "ReadOnly",
    "Unique",
    "ExtendedProperties",
];
const DATA_RELATION_MEMBERS: &[&str] = &[
    "RelationName",
    "ParentTable",
    "ChildTable",
    "ParentColumns",
    "ChildColumns",
    "Nested",
    "ExtendedProperties",
];
const DATA_ROW_MEMBERS: &[&str] = &["RowState", "RowError"];
const DATA_TABLE_MEMBERS: &[&str] = &[
    "TableName",
    "Namespace",
    "Prefix",
    "CaseSensitive",
    "DisplayExpression",
    "ExtendedProperties",
    "Columns",
    "PrimaryKey",
    "Constraints",
    "Rows",
];

/// Type families reachable from a data set whose members can be excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelatedType {
    Constraint,
    ForeignKeyConstraint,
    UniqueConstraint,
    DataColumn,
    DataRelation,
    DataRow,
    DataTable,
}

impl RelatedType {
    /// Type name as seen in [`MemberInfo::declaring_type`]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Constraint => "Constraint",
            Self::ForeignKeyConstraint => "ForeignKeyConstraint",
            Self::UniqueConstraint => "UniqueConstraint",
            Self::DataColumn => "DataColumn",
            Self::DataRelation => "DataRelation",
            Self::DataRow => "DataRow",
            Self::DataTable => "DataTable",
        }
    }

    fn own_members(&self) -> &'static [&'static str] {
        match self {
            Self::Constraint => CONSTRAINT_MEMBERS,
            Self::ForeignKeyConstraint => FOREIGN_KEY_CONSTRAINT_MEMBERS,
            Self::UniqueConstraint => UNIQUE_CONSTRAINT_MEMBERS,
            Self::DataColumn => DATA_COLUMN_MEMBERS,
            Self::DataRelation => DATA_RELATION_MEMBERS,
            Self::DataRow => DATA_ROW_MEMBERS,
            Self::DataTable => DATA_TABLE_MEMBERS,
        }
    }

    fn base(&self) -> Option<RelatedType> {
        match self {
            Self::ForeignKeyConstraint | Self::UniqueConstraint => Some(Self::Constraint),
            _ => None,
        }
    }

    /// Resolve a member name to the type that declares it
    ///
    /// Members inherited from a base type resolve to the base, the way a
    /// member access on a subclass reports its declaring type.
    pub fn declaring_type_of(&self, member: &str) -> Option<&'static str> {
        if self.own_members().contains(&member) {
            return Some(self.type_name());
        }
        self.base().and_then(|base| base.declaring_type_of(member))
    }

    /// Resolve a member into a `(declaring_type, member)` pair
    pub fn resolve(&self, member: &str) -> Result<(&'static str, String), OptionsError> {
        if !is_identifier(member) {
            return Err(OptionsError::InvalidMemberExpression {
                expression: member.to_string(),
            });
        }
        self.declaring_type_of(member)
            .map(|declaring| (declaring, member.to_string()))
            .ok_or_else(|| OptionsError::UnknownMember {
                type_name: self.type_name().to_string(),
                member: member.to_string(),
            })
    }
}

impl fmt::Display for RelatedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
