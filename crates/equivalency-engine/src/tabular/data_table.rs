//! Table comparison

use crate::node::Node;
use crate::validator::EquivalencyValidator;
use equivalency_core::{Constraint, DataColumn, DataTable};

const DATA_TABLE: &str = "DataTable";

impl EquivalencyValidator<'_> {
    pub(crate) fn compare_data_tables(&mut self, subject: &DataTable, expectation: &DataTable, node: &Node<'_>) {
        tracing::trace!(table = %expectation.table_name, "comparing table");

        self.compare_member(node, DATA_TABLE, "TableName", subject.table_name.as_str(), expectation.table_name.as_str());
        self.compare_member(node, DATA_TABLE, "Namespace", subject.namespace.as_str(), expectation.namespace.as_str());
        self.compare_member(node, DATA_TABLE, "Prefix", subject.prefix.as_str(), expectation.prefix.as_str());
        self.compare_member(node, DATA_TABLE, "CaseSensitive", subject.case_sensitive, expectation.case_sensitive);
        self.compare_member(
            node,
            DATA_TABLE,
            "DisplayExpression",
            subject.display_expression.as_str(),
            expectation.display_expression.as_str(),
        );
        self.compare_extended_properties(
            node,
            DATA_TABLE,
            &subject.extended_properties,
            &expectation.extended_properties,
        );

        if !self.is_excluded(node, DATA_TABLE, "Columns") {
            let subject_columns = self.included_columns(subject);
            let expectation_columns = self.included_columns(expectation);
            let report_unmatched = !self.options.ignore_unmatched_columns();
            self.compare_keyed(
                node,
                "Columns",
                &subject_columns,
                &expectation_columns,
                report_unmatched,
                Self::compare_data_columns,
            );
        }

        self.compare_column_names(
            node,
            DATA_TABLE,
            "PrimaryKey",
            (subject.table_name.as_str(), subject.primary_key.as_slice()),
            (expectation.table_name.as_str(), expectation.primary_key.as_slice()),
        );

        if !self.is_excluded(node, DATA_TABLE, "Constraints") {
            let subject_constraints: Vec<&Constraint> = subject.constraints.iter().collect();
            let expectation_constraints: Vec<&Constraint> = expectation.constraints.iter().collect();
            self.compare_keyed(
                node,
                "Constraints",
                &subject_constraints,
                &expectation_constraints,
                true,
                Self::compare_constraints,
            );
        }

        if !self.is_excluded(node, DATA_TABLE, "Rows") {
            self.compare_table_rows(subject, expectation, node);
        }
    }

    fn included_columns<'t>(&self, table: &'t DataTable) -> Vec<&'t DataColumn> {
        table
            .columns
            .iter()
            .filter(|column| !self.options.is_column_excluded(&table.table_name, &column.column_name))
            .collect()
    }
}
