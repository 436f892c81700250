//! Constraint comparison
//!
//! Unique and foreign-key constraints share their base members. The
//! kind-specific members are only compared between constraints of the same
//! kind, which can only differ when mismatched types are allowed.

use crate::node::Node;
use crate::validator::EquivalencyValidator;
use equivalency_core::{Constraint, ConstraintKind};

const CONSTRAINT: &str = "Constraint";

impl EquivalencyValidator<'_> {
    pub(crate) fn compare_constraints(&mut self, subject: &Constraint, expectation: &Constraint, node: &Node<'_>) {
        let (s, e) = (subject, expectation);
        self.compare_member(node, CONSTRAINT, "ConstraintName", s.constraint_name.as_str(), e.constraint_name.as_str());
        self.compare_member(node, CONSTRAINT, "Table", s.table_name.as_str(), e.table_name.as_str());
        self.compare_extended_properties(node, CONSTRAINT, &s.extended_properties, &e.extended_properties);

        let declaring_type = e.kind.type_name();
        self.compare_column_names(
            node,
            declaring_type,
            "Columns",
            (s.table_name.as_str(), s.kind.columns()),
            (e.table_name.as_str(), e.kind.columns()),
        );

        match (&s.kind, &e.kind) {
            (
                ConstraintKind::Unique {
                    is_primary_key: subject_primary,
                    ..
                },
                ConstraintKind::Unique {
                    is_primary_key: expectation_primary,
                    ..
                },
            ) => {
                self.compare_member(node, declaring_type, "IsPrimaryKey", *subject_primary, *expectation_primary);
            }
            (
                ConstraintKind::ForeignKey {
                    related_table: subject_table,
                    related_columns: subject_columns,
                    delete_rule: subject_delete,
                    update_rule: subject_update,
                    accept_reject_rule: subject_accept_reject,
                    ..
                },
                ConstraintKind::ForeignKey {
                    related_table: expectation_table,
                    related_columns: expectation_columns,
                    delete_rule: expectation_delete,
                    update_rule: expectation_update,
                    accept_reject_rule: expectation_accept_reject,
                    ..
                },
            ) => {
                self.compare_member(node, declaring_type, "RelatedTable", subject_table.as_str(), expectation_table.as_str());
                self.compare_column_names(
                    node,
                    declaring_type,
                    "RelatedColumns",
                    (subject_table.as_str(), subject_columns.as_slice()),
                    (expectation_table.as_str(), expectation_columns.as_slice()),
                );
                self.compare_member(
                    node,
                    declaring_type,
                    "DeleteRule",
                    subject_delete.to_string(),
                    expectation_delete.to_string(),
                );
                self.compare_member(
                    node,
                    declaring_type,
                    "UpdateRule",
                    subject_update.to_string(),
                    expectation_update.to_string(),
                );
                self.compare_member(
                    node,
                    declaring_type,
                    "AcceptRejectRule",
                    subject_accept_reject.to_string(),
                    expectation_accept_reject.to_string(),
                );
            }
            _ => {}
        }
    }
}
