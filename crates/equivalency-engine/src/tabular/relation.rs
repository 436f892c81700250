//! Relation comparison

use crate::node::Node;
use crate::validator::EquivalencyValidator;
use equivalency_core::DataRelation;

const DATA_RELATION: &str = "DataRelation";

impl EquivalencyValidator<'_> {
    pub(crate) fn compare_data_relations(
        &mut self,
        subject: &DataRelation,
        expectation: &DataRelation,
        node: &Node<'_>,
    ) {
        let (s, e) = (subject, expectation);
        self.compare_member(node, DATA_RELATION, "RelationName", s.relation_name.as_str(), e.relation_name.as_str());
        self.compare_member(node, DATA_RELATION, "ParentTable", s.parent_table.as_str(), e.parent_table.as_str());
        self.compare_member(node, DATA_RELATION, "ChildTable", s.child_table.as_str(), e.child_table.as_str());
        self.compare_column_names(
            node,
            DATA_RELATION,
            "ParentColumns",
            (s.parent_table.as_str(), s.parent_columns.as_slice()),
            (e.parent_table.as_str(), e.parent_columns.as_slice()),
        );
        self.compare_column_names(
            node,
            DATA_RELATION,
            "ChildColumns",
            (s.child_table.as_str(), s.child_columns.as_slice()),
            (e.child_table.as_str(), e.child_columns.as_slice()),
        );
        self.compare_member(node, DATA_RELATION, "Nested", s.nested, e.nested);
        self.compare_extended_properties(node, DATA_RELATION, &s.extended_properties, &e.extended_properties);
    }
}
