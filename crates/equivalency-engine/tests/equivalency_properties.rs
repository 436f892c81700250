//! Property-based tests for the comparison engine.
//!
//! Tables are generated with unique integer keys and arbitrary totals, then
//! compared against themselves, permutations of themselves and perturbed
//! copies.

use equivalency_core::{
    ColumnType, DataColumn, DataTable, EquivalencyOptions, ObjectGraph, RowMatchMode, Value,
};
use equivalency_engine::Equivalency;
use proptest::prelude::*;

fn table(totals: &[i64], notes: &[String]) -> DataTable {
    let base = DataTable::new("Orders")
        .with_column(DataColumn::new("Id", ColumnType::Int).not_null())
        .with_column(DataColumn::new("Total", ColumnType::Int))
        .with_column(DataColumn::new("Note", ColumnType::String))
        .with_primary_key(["Id"]);
    totals
        .iter()
        .zip(notes.iter().cycle())
        .enumerate()
        .fold(base, |table, (id, (total, note))| {
            table.with_row(vec![Value::Int(id as i64), Value::Int(*total), Value::from(note.as_str())])
        })
}

fn rows() -> impl Strategy<Value = (Vec<i64>, Vec<String>)> {
    (
        prop::collection::vec(-1_000i64..1_000, 0..20),
        prop::collection::vec("[a-z]{0,6}", 1..4),
    )
}

fn mismatch_count(options: &EquivalencyOptions, subject: &DataTable, expectation: &DataTable) -> usize {
    Equivalency::new(options)
        .compare(&ObjectGraph::from(subject.clone()), &ObjectGraph::from(expectation.clone()))
        .mismatches
        .len()
}

proptest! {
    #[test]
    fn comparison_is_reflexive((totals, notes) in rows()) {
        let t = table(&totals, &notes);
        prop_assert_eq!(mismatch_count(&EquivalencyOptions::default(), &t, &t), 0);
    }

    #[test]
    fn primary_key_matching_ignores_row_order((totals, notes) in rows(), seed in any::<u64>()) {
        let expectation = table(&totals, &notes);
        let mut subject = expectation.clone();
        if !subject.rows.is_empty() {
            let len = subject.rows.len();
            subject.rows.rotate_left((seed as usize) % len);
        }

        let mut options = EquivalencyOptions::default();
        options.using_row_match_mode(RowMatchMode::PrimaryKey);
        prop_assert_eq!(mismatch_count(&options, &subject, &expectation), 0);
    }

    #[test]
    fn changing_one_value_is_detected((totals, notes) in rows(), index in any::<prop::sample::Index>(), delta in 1i64..50) {
        prop_assume!(!totals.is_empty());
        let expectation = table(&totals, &notes);
        let mut changed = totals.clone();
        let i = index.index(changed.len());
        changed[i] += delta;
        let subject = table(&changed, &notes);

        prop_assert_eq!(mismatch_count(&EquivalencyOptions::default(), &subject, &expectation), 1);
    }

    #[test]
    fn excluding_columns_never_adds_mismatches(
        (totals, notes) in rows(),
        (other_totals, other_notes) in rows(),
        excluded in prop::sample::select(vec!["Id", "Total", "Note"]),
    ) {
        let subject = table(&totals, &notes);
        let expectation = table(&other_totals, &other_notes);

        let strict = mismatch_count(&EquivalencyOptions::default(), &subject, &expectation);
        let mut options = EquivalencyOptions::default();
        options.excluding_column_in_all_tables(excluded);
        let relaxed = mismatch_count(&options, &subject, &expectation);

        prop_assert!(relaxed <= strict, "relaxed {} > strict {}", relaxed, strict);
    }
}
