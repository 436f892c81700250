//! Row comparison, inside a table or standalone
//!
//! Rows carry up to two versions of each field. Current values are compared
//! when both rows have them; original values are compared when either row is
//! modified or deleted, unless original data is excluded and both rows are
//! merely modified.

use crate::matching::{describe_row, pair_rows, primary_key_columns, PrimaryKeyMismatch};
use crate::node::{Node, PathSegment};
use crate::validator::EquivalencyValidator;
use equivalency_core::{DataRow, DataTable, Mismatch, MismatchCode, RowMatchMode, RowState, RowVersion, Value};

const DATA_ROW: &str = "DataRow";

impl EquivalencyValidator<'_> {
    /// Pair the rows of two tables and compare each pair
    pub(crate) fn compare_table_rows(&mut self, subject: &DataTable, expectation: &DataTable, node: &Node<'_>) {
        let mode = self.options.row_match_mode();
        let pairing = match pair_rows(subject, expectation, self.options) {
            Ok(pairing) => pairing,
            Err(PrimaryKeyMismatch { subject, expectation }) => {
                let mismatch = Mismatch::new(MismatchCode::PrimaryKeyMismatch, node.path()).with_comparison(
                    PrimaryKeyMismatch::describe(&expectation),
                    PrimaryKeyMismatch::describe(&subject),
                );
                self.report(mismatch);
                return;
            }
        };

        let rows = node.member("Rows", "DataRowCollection", "DataRowCollection");
        if !self.enter(&rows) {
            return;
        }
        tracing::trace!(
            table = %expectation.table_name,
            %mode,
            matched = pairing.matched.len(),
            "paired rows"
        );

        if subject.rows.len() != expectation.rows.len() && mode == RowMatchMode::Index {
            let mismatch = Mismatch::new(MismatchCode::CountMismatch, rows.path())
                .with_comparison(expectation.rows.len(), subject.rows.len());
            self.report(mismatch);
        }

        let tables = (subject.table_name.as_str(), expectation.table_name.as_str());
        for &(s, e) in &pairing.matched {
            let child = rows.child(PathSegment::Index(e), DATA_ROW, DATA_ROW);
            if self.enter(&child) {
                self.compare_rows(&subject.rows[s], &expectation.rows[e], &child, tables, true);
            }
        }

        let expectation_key = primary_key_columns(expectation, self.options);
        for &e in &pairing.expectation_only {
            let path = rows.path_with(&PathSegment::Index(e));
            let row = describe_row(&expectation.rows[e], &expectation_key);
            self.report(Mismatch::new(MismatchCode::UnmatchedRow, path).with_expected(row));
        }
        let subject_key = primary_key_columns(subject, self.options);
        for &s in &pairing.subject_only {
            let path = rows.path_with(&PathSegment::Index(s));
            let row = describe_row(&subject.rows[s], &subject_key);
            self.report(Mismatch::new(MismatchCode::UnmatchedRow, path).with_actual(row));
        }
    }

    /// Compare two rows that are not part of a table comparison
    pub(crate) fn compare_data_rows(&mut self, subject: &DataRow, expectation: &DataRow, node: &Node<'_>) {
        let tables = (subject.table_name.as_str(), expectation.table_name.as_str());
        self.compare_rows(subject, expectation, node, tables, false);
    }

    fn compare_rows(
        &mut self,
        subject: &DataRow,
        expectation: &DataRow,
        node: &Node<'_>,
        tables: (&str, &str),
        within_table: bool,
    ) {
        self.compare_member(node, DATA_ROW, "RowState", subject.state.to_string(), expectation.state.to_string());
        self.compare_member(node, DATA_ROW, "RowError", subject.row_error.as_deref(), expectation.row_error.as_deref());

        let report_unmatched = !within_table && !self.options.ignore_unmatched_columns();
        let compare_current = subject.has_version(RowVersion::Current) && expectation.has_version(RowVersion::Current);
        let compare_original = self.compares_original(subject, expectation);
        let original = node.child(PathSegment::Key(RowVersion::Original.to_string()), DATA_ROW, DATA_ROW);

        for field in &expectation.fields {
            let column = field.column.as_str();
            if self.is_row_column_excluded(tables, column) || self.is_excluded(node, DATA_ROW, column) {
                continue;
            }
            let segment = PathSegment::Member(column.to_string());
            let Some(subject_field) = subject.field(column) else {
                if report_unmatched {
                    let mismatch = Mismatch::new(MismatchCode::MissingMember, node.path_with(&segment))
                        .with_expected(field.current.as_ref().or(field.original.as_ref()).unwrap_or(&Value::Null));
                    self.report(mismatch);
                }
                continue;
            };

            if compare_current {
                let (s, e) = (subject_field.current.as_ref(), field.current.as_ref());
                self.descend(node, segment.clone(), s.unwrap_or(&Value::Null), e.unwrap_or(&Value::Null));
            }
            if compare_original {
                let (s, e) = (subject_field.original.as_ref(), field.original.as_ref());
                self.descend(&original, segment, s.unwrap_or(&Value::Null), e.unwrap_or(&Value::Null));
            }
        }

        if report_unmatched {
            for field in &subject.fields {
                let column = field.column.as_str();
                if expectation.field(column).is_some()
                    || self.is_row_column_excluded(tables, column)
                    || self.is_excluded(node, DATA_ROW, column)
                {
                    continue;
                }
                let path = node.path_with(&PathSegment::Member(column.to_string()));
                let value = field.current.as_ref().or(field.original.as_ref()).unwrap_or(&Value::Null);
                self.report(Mismatch::new(MismatchCode::UnexpectedElement, path).with_actual(value));
            }
        }
    }

    fn compares_original(&self, subject: &DataRow, expectation: &DataRow) -> bool {
        let changed = |row: &DataRow| matches!(row.state, RowState::Modified | RowState::Deleted);
        let both_modified = subject.state == RowState::Modified && expectation.state == RowState::Modified;
        (changed(subject) || changed(expectation))
            && !(self.options.exclude_original_data() && both_modified)
            && subject.has_version(RowVersion::Original)
            && expectation.has_version(RowVersion::Original)
    }

    fn is_row_column_excluded(&self, (subject_table, expectation_table): (&str, &str), column: &str) -> bool {
        self.options.is_column_excluded(subject_table, column) || self.options.is_column_excluded(expectation_table, column)
    }
}

#[cfg(test)]
mod tests {
    use crate::validator::EquivalencyValidator;
    use equivalency_core::{
        ColumnType, DataColumn, DataRow, DataTable, EquivalencyOptions, Mismatch, MismatchCode, ObjectGraph,
        RowMatchMode, Value,
    };
    use pretty_assertions::assert_eq;

    fn compare(options: &EquivalencyOptions, subject: impl Into<Value>, expectation: impl Into<Value>) -> Vec<Mismatch> {
        let subject = ObjectGraph::new(subject);
        let expectation = ObjectGraph::new(expectation);
        let mut mismatches = Vec::new();
        EquivalencyValidator::new(options, &subject, &expectation, &mut mismatches)
            .validate_graphs(&|| "orders".to_string());
        mismatches
    }

    fn orders(rows: &[(i64, i64)]) -> DataTable {
        rows.iter().fold(
            DataTable::new("Orders")
                .with_column(DataColumn::new("Id", ColumnType::Int))
                .with_column(DataColumn::new("Total", ColumnType::Int))
                .with_primary_key(["Id"]),
            |table, &(id, total)| table.with_row(vec![id, total]),
        )
    }

    fn paths(mismatches: &[Mismatch]) -> Vec<(MismatchCode, &str)> {
        mismatches.iter().map(|m| (m.code, m.path.as_str())).collect()
    }

    #[test]
    fn differing_field_is_addressed_by_row_and_column() {
        let mismatches = compare(
            &EquivalencyOptions::default(),
            orders(&[(1, 100), (2, 200)]),
            orders(&[(1, 100), (2, 250)]),
        );
        assert_eq!(paths(&mismatches), vec![(MismatchCode::ValueMismatch, "Rows[1].Total")]);
        assert_eq!(mismatches[0].expected.as_deref(), Some("250"));
        assert_eq!(mismatches[0].actual.as_deref(), Some("200"));
    }

    #[test]
    fn index_mode_reports_count_and_excess_rows() {
        let mismatches = compare(
            &EquivalencyOptions::default(),
            orders(&[(1, 100)]),
            orders(&[(1, 100), (2, 200), (3, 300)]),
        );
        assert_eq!(
            paths(&mismatches),
            vec![
                (MismatchCode::CountMismatch, "Rows"),
                (MismatchCode::UnmatchedRow, "Rows[1]"),
                (MismatchCode::UnmatchedRow, "Rows[2]"),
            ]
        );
        assert_eq!(mismatches[1].expected.as_deref(), Some("Unchanged row [Id=2]"));
    }

    #[test]
    fn primary_key_mode_ignores_row_order() {
        let mut options = EquivalencyOptions::default();
        options.using_row_match_mode(RowMatchMode::PrimaryKey);
        let subject = orders(&[(2, 200), (1, 100)]);
        let expectation = orders(&[(1, 100), (2, 200)]);
        assert!(compare(&options, subject.clone(), expectation.clone()).is_empty());

        let by_index = compare(&EquivalencyOptions::default(), subject, expectation);
        assert_eq!(by_index.len(), 4);
    }

    #[test]
    fn primary_key_mode_requires_keys() {
        let mut options = EquivalencyOptions::default();
        options.using_row_match_mode(RowMatchMode::PrimaryKey);
        let mut subject = orders(&[(1, 100)]);
        subject.primary_key.clear();
        let mismatches = compare(&options, subject, orders(&[(1, 100)]));

        let key_mismatches: Vec<_> = mismatches
            .iter()
            .filter(|m| m.code == MismatchCode::PrimaryKeyMismatch)
            .collect();
        assert_eq!(key_mismatches.len(), 1);
        assert_eq!(key_mismatches[0].path, "orders");
        assert_eq!(key_mismatches[0].expected.as_deref(), Some("(Id)"));
        assert_eq!(key_mismatches[0].actual.as_deref(), Some("<no primary key>"));
        assert!(mismatches.iter().all(|m| m.code != MismatchCode::UnmatchedRow));
    }

    #[test]
    fn primary_key_mode_skips_excluded_key_columns() {
        let mut options = EquivalencyOptions::default();
        options
            .using_row_match_mode(RowMatchMode::PrimaryKey)
            .excluding_column("Orders", "Total");
        let subject = orders(&[(1, 100), (2, 200)]).with_primary_key(["Id", "Total"]);
        let expectation = orders(&[(2, 200), (1, 250)]).with_primary_key(["Id", "Total"]);
        assert!(compare(&options, subject.clone(), expectation).is_empty());

        let narrowed = orders(&[(2, 200), (1, 250)]);
        assert!(compare(&options, subject, narrowed).is_empty());
    }

    #[test]
    fn primary_key_mode_keeps_distinct_byte_keys_apart() {
        let mut options = EquivalencyOptions::default();
        options.using_row_match_mode(RowMatchMode::PrimaryKey);
        let blobs = |key: u8| {
            DataTable::new("Blobs")
                .with_column(DataColumn::new("Key", ColumnType::Bytes))
                .with_primary_key(["Key"])
                .with_row(vec![Value::Bytes(vec![key])])
        };

        let mismatches = compare(&options, blobs(1), blobs(2));
        assert_eq!(
            paths(&mismatches),
            vec![(MismatchCode::UnmatchedRow, "Rows[0]"), (MismatchCode::UnmatchedRow, "Rows[0]")]
        );
    }

    #[test]
    fn original_values_are_compared_for_modified_rows() {
        let mut subject = orders(&[(1, 100)]);
        subject.rows[0].fields[1].original = Some(Value::Int(90));
        subject.rows[0].set_value("Total", 300);
        let mut expectation = orders(&[(1, 100)]);
        expectation.rows[0].set_value("Total", 300);

        let mismatches = compare(&EquivalencyOptions::default(), subject.clone(), expectation.clone());
        assert_eq!(paths(&mismatches), vec![(MismatchCode::ValueMismatch, "Rows[0][Original].Total")]);

        let mut options = EquivalencyOptions::default();
        options.excluding_original_data();
        assert!(compare(&options, subject, expectation).is_empty());
    }

    #[test]
    fn deleted_rows_compare_original_values_only() {
        let mut subject = orders(&[(1, 100)]);
        subject.rows[0].delete();
        let mut expectation = orders(&[(1, 100)]);
        expectation.rows[0].delete();
        assert!(compare(&EquivalencyOptions::default(), subject, expectation.clone()).is_empty());

        let mut changed = orders(&[(1, 110)]);
        changed.rows[0].delete();
        let mismatches = compare(&EquivalencyOptions::default(), changed, expectation);
        assert_eq!(paths(&mismatches), vec![(MismatchCode::ValueMismatch, "Rows[0][Original].Total")]);
    }

    #[test]
    fn excluded_columns_are_skipped_in_rows() {
        let mut options = EquivalencyOptions::default();
        options.excluding_column_in_all_tables("Total");
        let mismatches = compare(&options, orders(&[(1, 100)]), orders(&[(1, 999)]));
        assert!(mismatches.is_empty());
    }

    #[test]
    fn standalone_rows_report_missing_fields() {
        let subject = DataRow::new("Orders").with_value("Id", 1);
        let expectation = DataRow::new("Orders").with_value("Id", 1).with_value("Total", 5);
        let mismatches = compare(&EquivalencyOptions::default(), subject.clone(), expectation.clone());
        assert_eq!(paths(&mismatches), vec![(MismatchCode::MissingMember, "Total")]);

        let mut options = EquivalencyOptions::default();
        options.ignoring_unmatched_columns();
        assert!(compare(&options, subject, expectation).is_empty());
    }

    #[test]
    fn row_state_and_error_are_compared() {
        let subject = DataRow::added("Orders").with_value("Id", 1).with_error("bad total");
        let expectation = DataRow::new("Orders").with_value("Id", 1);
        let mismatches = compare(&EquivalencyOptions::default(), subject, expectation);
        assert_eq!(
            paths(&mismatches),
            vec![(MismatchCode::ValueMismatch, "RowState"), (MismatchCode::ExpectedNull, "RowError")]
        );
    }
}
