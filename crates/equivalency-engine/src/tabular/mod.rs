//! Comparison of tabular data: data sets, tables, columns, rows, relations
//! and constraints
//!
//! Tabular values are compared member by member, the same way objects are,
//! with the option set deciding which tables, columns and members take part.
//! Collections keyed by name are paired by name; see [`crate::matching`].

mod constraint;
mod data_column;
mod data_row;
mod data_set;
mod data_table;
mod relation;

use crate::matching::pair_by_name;
use crate::node::{Node, PathSegment};
use crate::validator::EquivalencyValidator;
use equivalency_core::{Constraint, DataColumn, DataRelation, DataTable, Mismatch, MismatchCode, Value};
use std::collections::BTreeMap;

const EXTENDED_PROPERTIES: &str = "ExtendedProperties";

/// An element of a name-keyed tabular collection
pub(crate) trait Keyed {
    /// Runtime type name of the collection holding these elements
    const COLLECTION: &'static str;

    /// Name used for pairing; empty names pair by position
    fn key(&self) -> &str;

    /// Runtime type name of the element
    fn runtime_type(&self) -> &str;
}

impl Keyed for DataTable {
    const COLLECTION: &'static str = "DataTableCollection";

    fn key(&self) -> &str {
        &self.table_name
    }

    fn runtime_type(&self) -> &str {
        &self.type_name
    }
}

impl Keyed for DataColumn {
    const COLLECTION: &'static str = "DataColumnCollection";

    fn key(&self) -> &str {
        &self.column_name
    }

    fn runtime_type(&self) -> &str {
        "DataColumn"
    }
}

impl Keyed for Constraint {
    const COLLECTION: &'static str = "ConstraintCollection";

    fn key(&self) -> &str {
        &self.constraint_name
    }

    fn runtime_type(&self) -> &str {
        self.kind.type_name()
    }
}

impl Keyed for DataRelation {
    const COLLECTION: &'static str = "DataRelationCollection";

    fn key(&self) -> &str {
        &self.relation_name
    }

    fn runtime_type(&self) -> &str {
        "DataRelation"
    }
}

/// Compares a paired element; the node already points at the element
type CompareFn<'a, T> = fn(&mut EquivalencyValidator<'a>, &T, &T, &Node<'_>);

impl<'a> EquivalencyValidator<'a> {
    /// Compare a member holding a plain value, unless it is excluded
    pub(crate) fn compare_member(
        &mut self,
        node: &Node<'_>,
        declaring_type: &str,
        name: &str,
        subject: impl Into<Value>,
        expectation: impl Into<Value>,
    ) {
        if self.is_excluded(node, declaring_type, name) {
            return;
        }
        let (subject, expectation) = (subject.into(), expectation.into());
        self.descend(node, PathSegment::Member(name.to_string()), &subject, &expectation);
    }

    /// Compare an ordered list of column names, leaving out excluded columns
    ///
    /// Each side's columns are filtered against the table they belong to.
    pub(crate) fn compare_column_names(
        &mut self,
        node: &Node<'_>,
        declaring_type: &str,
        name: &str,
        subject: (&str, &[String]),
        expectation: (&str, &[String]),
    ) {
        let subject = self.column_list(subject.0, subject.1);
        let expectation = self.column_list(expectation.0, expectation.1);
        self.compare_member(node, declaring_type, name, subject, expectation);
    }

    fn column_list(&self, table: &str, columns: &[String]) -> Value {
        Value::List(
            columns
                .iter()
                .filter(|column| !self.options.is_column_excluded(table, column))
                .map(|column| Value::from(column.as_str()))
                .collect(),
        )
    }

    /// Compare extended property maps by key
    pub(crate) fn compare_extended_properties(
        &mut self,
        node: &Node<'_>,
        declaring_type: &str,
        subject: &BTreeMap<String, Value>,
        expectation: &BTreeMap<String, Value>,
    ) {
        if self.is_excluded(node, declaring_type, EXTENDED_PROPERTIES) {
            return;
        }
        let child = node.member(EXTENDED_PROPERTIES, "Map", "Map");
        if self.enter(&child) {
            self.compare_maps(subject, expectation, &child);
        }
    }

    /// Pair a name-keyed collection and compare every pair
    ///
    /// Elements left unpaired are reported as missing or unexpected unless
    /// `report_unmatched` is off.
    pub(crate) fn compare_keyed<T: Keyed>(
        &mut self,
        node: &Node<'_>,
        member: &str,
        subject: &[&T],
        expectation: &[&T],
        report_unmatched: bool,
        compare: CompareFn<'a, T>,
    ) {
        let collection = node.member(member, T::COLLECTION, T::COLLECTION);
        if !self.enter(&collection) {
            return;
        }

        let pairing = pair_by_name(subject, expectation, |element| element.key());
        for &(s, e) in &pairing.matched {
            let segment = segment_for(expectation[e], e);
            let (s, e) = (subject[s], expectation[e]);
            let child = collection.child(segment, s.runtime_type(), e.runtime_type());
            if self.enter(&child) {
                compare(self, s, e, &child);
            }
        }

        if !report_unmatched {
            return;
        }
        for &e in &pairing.expectation_only {
            let element = expectation[e];
            let path = collection.path_with(&segment_for(element, e));
            let mismatch = Mismatch::new(MismatchCode::MissingElement, path).with_expected(describe(element));
            self.report(mismatch);
        }
        for &s in &pairing.subject_only {
            let element = subject[s];
            let path = collection.path_with(&segment_for(element, s));
            let mismatch = Mismatch::new(MismatchCode::UnexpectedElement, path).with_actual(describe(element));
            self.report(mismatch);
        }
    }
}

/// Named elements are addressed by name, unnamed ones by position
fn segment_for<T: Keyed>(element: &T, index: usize) -> PathSegment {
    match element.key() {
        "" => PathSegment::Index(index),
        key => PathSegment::Key(key.to_string()),
    }
}

fn describe<T: Keyed>(element: &T) -> String {
    format!("{} {:?}", element.runtime_type(), element.key())
}
