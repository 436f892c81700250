//! Pairing strategies for keyed collections and table rows
//!
//! These are pure functions over the two sides of a collection. The
//! validator consumes the resulting [`Pairing`] and reports anything left
//! unpaired.

use equivalency_core::{DataRow, DataTable, EquivalencyOptions, RowMatchMode, RowVersion, Value};
use std::collections::{HashMap, VecDeque};

/// Outcome of pairing two collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    /// `(subject index, expectation index)` pairs
    pub matched: Vec<(usize, usize)>,

    /// Subject indices with no counterpart
    pub subject_only: Vec<usize>,

    /// Expectation indices with no counterpart
    pub expectation_only: Vec<usize>,
}

impl Pairing {
    /// Whether every element on both sides found a partner
    pub fn is_complete(&self) -> bool {
        self.subject_only.is_empty() && self.expectation_only.is_empty()
    }
}

/// Pair elements by name, in expectation order
///
/// Named elements pair with the first unused subject element carrying the
/// same name. Elements with an empty name pair by position among the
/// unnamed elements of the other side.
pub fn pair_by_name<T>(subject: &[T], expectation: &[T], name: impl Fn(&T) -> &str) -> Pairing {
    let mut named: HashMap<&str, VecDeque<usize>> = HashMap::new();
    let mut unnamed: VecDeque<usize> = VecDeque::new();
    for (index, element) in subject.iter().enumerate() {
        match name(element) {
            "" => unnamed.push_back(index),
            key => named.entry(key).or_default().push_back(index),
        }
    }

    let mut used = vec![false; subject.len()];
    let mut pairing = Pairing::default();
    for (index, element) in expectation.iter().enumerate() {
        let candidate = match name(element) {
            "" => unnamed.pop_front(),
            key => named.get_mut(key).and_then(VecDeque::pop_front),
        };
        match candidate {
            Some(subject_index) => {
                used[subject_index] = true;
                pairing.matched.push((subject_index, index));
            }
            None => pairing.expectation_only.push(index),
        }
    }

    pairing.subject_only = (0..subject.len()).filter(|&i| !used[i]).collect();
    pairing
}

/// Pair by position; the excess on the longer side stays unpaired
pub fn pair_by_index(subject_len: usize, expectation_len: usize) -> Pairing {
    let common = subject_len.min(expectation_len);
    Pairing {
        matched: (0..common).map(|i| (i, i)).collect(),
        subject_only: (common..subject_len).collect(),
        expectation_only: (common..expectation_len).collect(),
    }
}

/// Tables whose primary keys cannot drive row pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyMismatch {
    /// Primary key columns of the subject table
    pub subject: Vec<String>,

    /// Primary key columns of the expectation table
    pub expectation: Vec<String>,
}

impl PrimaryKeyMismatch {
    /// Render a key column list the way mismatches show it
    pub fn describe(columns: &[String]) -> String {
        if columns.is_empty() {
            "<no primary key>".to_string()
        } else {
            format!("({})", columns.join(", "))
        }
    }
}

/// Primary key columns of a table left after column exclusions
pub fn primary_key_columns(table: &DataTable, options: &EquivalencyOptions) -> Vec<String> {
    table
        .primary_key
        .iter()
        .filter(|column| !options.is_column_excluded(&table.table_name, column))
        .cloned()
        .collect()
}

/// Pair the rows of two tables in the configured match mode
pub fn pair_rows(
    subject: &DataTable,
    expectation: &DataTable,
    options: &EquivalencyOptions,
) -> Result<Pairing, PrimaryKeyMismatch> {
    match options.row_match_mode() {
        RowMatchMode::Index => Ok(pair_by_index(subject.rows.len(), expectation.rows.len())),
        RowMatchMode::PrimaryKey => pair_by_primary_key(subject, expectation, options),
    }
}

/// Pair rows whose primary key values are equal
///
/// Excluded columns are dropped from both keys first. What remains must be
/// the same non-empty column list on both sides. Each subject row, in order,
/// takes the first unused expectation row with an equal key.
pub fn pair_by_primary_key(
    subject: &DataTable,
    expectation: &DataTable,
    options: &EquivalencyOptions,
) -> Result<Pairing, PrimaryKeyMismatch> {
    let subject_key = primary_key_columns(subject, options);
    let key_columns = primary_key_columns(expectation, options);
    if subject_key.is_empty() || subject_key != key_columns {
        return Err(PrimaryKeyMismatch {
            subject: subject_key,
            expectation: key_columns,
        });
    }

    let mut candidates: HashMap<Vec<String>, VecDeque<usize>> = HashMap::new();
    for (index, row) in expectation.rows.iter().enumerate() {
        candidates.entry(row_key(row, &key_columns)).or_default().push_back(index);
    }

    let mut used = vec![false; expectation.rows.len()];
    let mut pairing = Pairing::default();
    for (index, row) in subject.rows.iter().enumerate() {
        match candidates.get_mut(&row_key(row, &key_columns)).and_then(VecDeque::pop_front) {
            Some(expectation_index) => {
                used[expectation_index] = true;
                pairing.matched.push((index, expectation_index));
            }
            None => pairing.subject_only.push(index),
        }
    }

    pairing.expectation_only = (0..expectation.rows.len()).filter(|&i| !used[i]).collect();
    Ok(pairing)
}

/// Canonical key tuple of a row
///
/// Deleted rows have no current values and are keyed by their originals.
/// Fragments use the lossless `Debug` rendering, so `1` and `"1"` differ and
/// byte keys of equal length stay distinct.
pub fn row_key(row: &DataRow, key_columns: &[String]) -> Vec<String> {
    let version = if row.has_version(RowVersion::Current) {
        RowVersion::Current
    } else {
        RowVersion::Original
    };
    key_columns
        .iter()
        .map(|column| key_fragment(row.value(column, version).unwrap_or(&Value::Null)))
        .collect()
}

fn key_fragment(value: &Value) -> String {
    match value {
        // -0.0 and 0.0 are equal leaves
        Value::Float(float) if *float == 0.0 => format!("{:?}", Value::Float(0.0)),
        other => format!("{other:?}"),
    }
}

/// Short description of a row for unmatched-row mismatches
pub fn describe_row(row: &DataRow, key_columns: &[String]) -> String {
    if key_columns.is_empty() {
        return format!("{} row", row.state);
    }
    let version = if row.has_version(RowVersion::Current) {
        RowVersion::Current
    } else {
        RowVersion::Original
    };
    let key = key_columns
        .iter()
        .map(|column| {
            let value = row.value(column, version).unwrap_or(&Value::Null);
            format!("{}={}", column, value)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} row [{}]", row.state, key)
}
