//! Data set comparison

use crate::node::Node;
use crate::validator::EquivalencyValidator;
use equivalency_core::{DataRelation, DataSet, DataTable};

const DATA_SET: &str = "DataSet";

impl EquivalencyValidator<'_> {
    pub(crate) fn compare_data_sets(&mut self, subject: &DataSet, expectation: &DataSet, node: &Node<'_>) {
        tracing::trace!(data_set = %expectation.data_set_name, "comparing data set");

        self.compare_member(node, DATA_SET, "DataSetName", subject.data_set_name.as_str(), expectation.data_set_name.as_str());
        self.compare_member(node, DATA_SET, "Namespace", subject.namespace.as_str(), expectation.namespace.as_str());
        self.compare_member(node, DATA_SET, "Prefix", subject.prefix.as_str(), expectation.prefix.as_str());
        self.compare_member(node, DATA_SET, "CaseSensitive", subject.case_sensitive, expectation.case_sensitive);
        self.compare_member(
            node,
            DATA_SET,
            "EnforceConstraints",
            subject.enforce_constraints,
            expectation.enforce_constraints,
        );
        self.compare_extended_properties(
            node,
            DATA_SET,
            &subject.extended_properties,
            &expectation.extended_properties,
        );

        if !self.is_excluded(node, DATA_SET, "Tables") {
            let subject_tables = self.included_tables(&subject.tables);
            let expectation_tables = self.included_tables(&expectation.tables);
            self.compare_keyed(node, "Tables", &subject_tables, &expectation_tables, true, Self::compare_data_tables);
        }

        if !self.is_excluded(node, DATA_SET, "Relations") {
            let subject_relations = self.included_relations(&subject.relations);
            let expectation_relations = self.included_relations(&expectation.relations);
            self.compare_keyed(
                node,
                "Relations",
                &subject_relations,
                &expectation_relations,
                true,
                Self::compare_data_relations,
            );
        }
    }

    fn included_tables<'t>(&self, tables: &'t [DataTable]) -> Vec<&'t DataTable> {
        tables
            .iter()
            .filter(|table| !self.options.is_table_excluded(&table.table_name))
            .collect()
    }

    /// Relations touching an excluded table are left out
    fn included_relations<'r>(&self, relations: &'r [DataRelation]) -> Vec<&'r DataRelation> {
        relations
            .iter()
            .filter(|relation| {
                !self.options.is_table_excluded(&relation.parent_table)
                    && !self.options.is_table_excluded(&relation.child_table)
            })
            .collect()
    }
}
