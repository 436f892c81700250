//! Recursive structural comparison
//!
//! The validator walks subject and expectation in lockstep, dispatching on
//! the shape of each pair of values, and reports every mismatch to a sink.
//! Tabular values are handled in [`crate::tabular`].

use crate::comparand::Comparand;
use crate::node::{Node, PathSegment};
use equivalency_core::{
    EquivalencyOptions, MemberInfo, Mismatch, MismatchCode, MismatchSink, ObjectGraph, ObjectId, Value,
};
use std::collections::{BTreeMap, HashSet};

/// Walks two object graphs and reports where they differ
pub struct EquivalencyValidator<'a> {
    pub(crate) options: &'a EquivalencyOptions,
    subject_graph: &'a ObjectGraph,
    expectation_graph: &'a ObjectGraph,
    sink: &'a mut dyn MismatchSink,

    /// Object pairs on the current recursion path
    visiting: HashSet<(ObjectId, ObjectId)>,
    nodes_visited: usize,
}

impl<'a> EquivalencyValidator<'a> {
    /// Create a validator over two graphs
    pub fn new(
        options: &'a EquivalencyOptions,
        subject_graph: &'a ObjectGraph,
        expectation_graph: &'a ObjectGraph,
        sink: &'a mut dyn MismatchSink,
    ) -> Self {
        Self {
            options,
            subject_graph,
            expectation_graph,
            sink,
            visiting: HashSet::new(),
            nodes_visited: 0,
        }
    }

    /// Number of positions compared so far
    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    /// Compare the roots of both graphs
    pub fn validate_graphs(&mut self, description: &dyn Fn() -> String) {
        let (subject_graph, expectation_graph) = (self.subject_graph, self.expectation_graph);
        self.validate(&subject_graph.root, &expectation_graph.root, description);
    }

    /// Compare two root values, resolving object references in the graphs
    pub fn validate(&mut self, subject: &Value, expectation: &Value, description: &dyn Fn() -> String) {
        let (subject_graph, expectation_graph) = (self.subject_graph, self.expectation_graph);
        let subject_type = subject_graph.type_name(subject);
        let expectation_type = expectation_graph.type_name(expectation);
        let root = Node::root(subject_type, expectation_type, description);
        let compile_time_type = if expectation.is_null() { subject_type } else { expectation_type };
        self.assert_equality(Comparand::new(subject, expectation, compile_time_type), &root);
    }

    /// Compare one subject/expectation pair at the given node
    pub fn assert_equality(&mut self, comparand: Comparand<'_>, node: &Node<'_>) {
        self.nodes_visited += 1;
        let Comparand {
            subject,
            expectation,
            compile_time_type,
        } = comparand;

        match (subject.is_null(), expectation.is_null()) {
            (true, true) => return,
            (true, false) => {
                self.report(Mismatch::new(MismatchCode::UnexpectedNull, node.path()).with_comparison(expectation, subject));
                return;
            }
            (false, true) => {
                self.report(Mismatch::new(MismatchCode::ExpectedNull, node.path()).with_comparison(expectation, subject));
                return;
            }
            (false, false) => {}
        }

        if !self.check_types(node) {
            return;
        }

        match (subject, expectation) {
            (Value::Object(s), Value::Object(e)) => self.compare_objects(*s, *e, compile_time_type, node),
            (Value::List(s), Value::List(e)) => self.compare_lists(s, e, node),
            (Value::Map(s), Value::Map(e)) => self.compare_maps(s, e, node),
            (Value::DataSet(s), Value::DataSet(e)) => self.compare_data_sets(s, e, node),
            (Value::DataTable(s), Value::DataTable(e)) => self.compare_data_tables(s, e, node),
            (Value::DataColumn(s), Value::DataColumn(e)) => self.compare_data_columns(s, e, node),
            (Value::DataRow(s), Value::DataRow(e)) => self.compare_data_rows(s, e, node),
            (Value::DataRelation(s), Value::DataRelation(e)) => self.compare_data_relations(s, e, node),
            (Value::Constraint(s), Value::Constraint(e)) => self.compare_constraints(s, e, node),
            (s, e) if s.is_leaf() && e.is_leaf() => self.compare_leaves(s, e, node),
            _ => {
                let mismatch = Mismatch::new(MismatchCode::TypeMismatch, node.path())
                    .with_comparison(node.expectation_type(), node.subject_type());
                self.report(mismatch);
            }
        }
    }

    /// Compare a child pair one segment below `node`
    pub(crate) fn descend(&mut self, node: &Node<'_>, segment: PathSegment, subject: &Value, expectation: &Value) {
        let (subject_graph, expectation_graph) = (self.subject_graph, self.expectation_graph);
        let subject_type = subject_graph.type_name(subject);
        let expectation_type = expectation_graph.type_name(expectation);
        let child = node.child(segment, subject_type, expectation_type);
        let compile_time_type = if expectation.is_null() { subject_type } else { expectation_type };
        self.assert_equality(Comparand::new(subject, expectation, compile_time_type), &child);
    }

    /// Count a node created outside [`Self::assert_equality`] and check its types
    pub(crate) fn enter(&mut self, node: &Node<'_>) -> bool {
        self.nodes_visited += 1;
        self.check_types(node)
    }

    /// Report a type mismatch unless the runtime types agree or mismatches are allowed
    fn check_types(&mut self, node: &Node<'_>) -> bool {
        if node.subject_type() == node.expectation_type() || self.options.allow_mismatched_types() {
            return true;
        }
        let mismatch = Mismatch::new(MismatchCode::TypeMismatch, node.path())
            .with_comparison(node.expectation_type(), node.subject_type());
        self.report(mismatch);
        false
    }

    /// Whether a member is excluded by any configured member rule
    pub(crate) fn is_excluded(&self, node: &Node<'_>, declaring_type: &str, name: &str) -> bool {
        let path = node.member_path_with(name);
        let excluded = self
            .options
            .is_member_excluded(&MemberInfo::new(declaring_type, name, &path));
        if excluded {
            tracing::trace!(%path, declaring_type, "member excluded");
        }
        excluded
    }

    pub(crate) fn report(&mut self, mismatch: Mismatch) {
        tracing::trace!(path = %mismatch.path, code = %mismatch.code, "mismatch");
        self.sink.report(mismatch);
    }

    fn compare_objects(&mut self, subject: ObjectId, expectation: ObjectId, declaring_type: &str, node: &Node<'_>) {
        let (subject_graph, expectation_graph) = (self.subject_graph, self.expectation_graph);
        let (Some(subject_object), Some(expectation_object)) =
            (subject_graph.object(subject), expectation_graph.object(expectation))
        else {
            self.report(
                Mismatch::new(MismatchCode::DanglingReference, node.path()).with_comparison(expectation, subject),
            );
            return;
        };

        // A pair already on the recursion path has been (or is being) compared
        if !self.visiting.insert((subject, expectation)) {
            tracing::trace!(path = %node.path(), %subject, %expectation, "cyclic reference");
            return;
        }

        for member in &expectation_object.members {
            if self.is_excluded(node, declaring_type, &member.name) {
                continue;
            }
            let segment = PathSegment::Member(member.name.clone());
            match subject_object.member(&member.name) {
                Some(value) => self.descend(node, segment, value, &member.value),
                None => {
                    let mismatch =
                        Mismatch::new(MismatchCode::MissingMember, node.path_with(&segment)).with_expected(&member.value);
                    self.report(mismatch);
                }
            }
        }

        self.visiting.remove(&(subject, expectation));
    }

    fn compare_lists(&mut self, subject: &[Value], expectation: &[Value], node: &Node<'_>) {
        if subject.len() != expectation.len() {
            self.report(
                Mismatch::new(MismatchCode::CountMismatch, node.path())
                    .with_comparison(expectation.len(), subject.len()),
            );
        }

        for (index, (s, e)) in subject.iter().zip(expectation).enumerate() {
            self.descend(node, PathSegment::Index(index), s, e);
        }
        for (index, e) in expectation.iter().enumerate().skip(subject.len()) {
            let path = node.path_with(&PathSegment::Index(index));
            self.report(Mismatch::new(MismatchCode::MissingElement, path).with_expected(e));
        }
        for (index, s) in subject.iter().enumerate().skip(expectation.len()) {
            let path = node.path_with(&PathSegment::Index(index));
            self.report(Mismatch::new(MismatchCode::UnexpectedElement, path).with_actual(s));
        }
    }

    pub(crate) fn compare_maps(
        &mut self,
        subject: &BTreeMap<String, Value>,
        expectation: &BTreeMap<String, Value>,
        node: &Node<'_>,
    ) {
        for (key, e) in expectation {
            let segment = PathSegment::Key(key.clone());
            match subject.get(key) {
                Some(s) => self.descend(node, segment, s, e),
                None => {
                    let mismatch = Mismatch::new(MismatchCode::MissingElement, node.path_with(&segment)).with_expected(e);
                    self.report(mismatch);
                }
            }
        }
        for (key, s) in subject {
            if !expectation.contains_key(key) {
                let path = node.path_with(&PathSegment::Key(key.clone()));
                self.report(Mismatch::new(MismatchCode::UnexpectedElement, path).with_actual(s));
            }
        }
    }

    fn compare_leaves(&mut self, subject: &Value, expectation: &Value, node: &Node<'_>) {
        if !leaves_equal(subject, expectation, self.options.allow_mismatched_types()) {
            self.report(
                Mismatch::new(MismatchCode::ValueMismatch, node.path()).with_comparison(expectation, subject),
            );
        }
    }
}

/// Equality of two leaf values
///
/// NaN equals NaN. Integers and floats compare numerically only when
/// mismatched types are allowed.
pub fn leaves_equal(subject: &Value, expectation: &Value, allow_mismatched_types: bool) -> bool {
    match (subject, expectation) {
        (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) if allow_mismatched_types => {
            int_equals_float(*a, *b)
        }
        (a, b) => a == b,
    }
}

/// Exact comparison; `i64 as f64` rounds above 2^53
fn int_equals_float(int: i64, float: f64) -> bool {
    // 2^63 is the first float past i64::MAX
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    float.fract() == 0.0 && float >= i64::MIN as f64 && float < UPPER && float as i64 == int
}
