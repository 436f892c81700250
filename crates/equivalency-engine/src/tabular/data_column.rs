//! Column definition comparison

use crate::node::Node;
use crate::validator::EquivalencyValidator;
use equivalency_core::DataColumn;

const DATA_COLUMN: &str = "DataColumn";

impl EquivalencyValidator<'_> {
    pub(crate) fn compare_data_columns(&mut self, subject: &DataColumn, expectation: &DataColumn, node: &Node<'_>) {
        let (s, e) = (subject, expectation);
        self.compare_member(node, DATA_COLUMN, "ColumnName", s.column_name.as_str(), e.column_name.as_str());
        self.compare_member(node, DATA_COLUMN, "DataType", s.data_type.to_string(), e.data_type.to_string());
        self.compare_member(node, DATA_COLUMN, "AllowDBNull", s.allow_db_null, e.allow_db_null);
        self.compare_member(node, DATA_COLUMN, "AutoIncrement", s.auto_increment, e.auto_increment);
        self.compare_member(node, DATA_COLUMN, "AutoIncrementSeed", s.auto_increment_seed, e.auto_increment_seed);
        self.compare_member(node, DATA_COLUMN, "AutoIncrementStep", s.auto_increment_step, e.auto_increment_step);
        self.compare_member(node, DATA_COLUMN, "Caption", s.caption.as_str(), e.caption.as_str());
        self.compare_member(node, DATA_COLUMN, "DefaultValue", s.default_value.clone(), e.default_value.clone());
        self.compare_member(node, DATA_COLUMN, "Expression", s.expression.as_str(), e.expression.as_str());
        self.compare_member(node, DATA_COLUMN, "MaxLength", s.max_length, e.max_length);
        self.compare_member(node, DATA_COLUMN, "ReadOnly", s.read_only, e.read_only);
        self.compare_member(node, DATA_COLUMN, "Unique", s.unique, e.unique);
        self.compare_extended_properties(node, DATA_COLUMN, &s.extended_properties, &e.extended_properties);
    }
}

#[cfg(test)]
mod tests {
    use crate::validator::EquivalencyValidator;
    use equivalency_core::{
        ColumnType, DataColumn, EquivalencyOptions, Mismatch, MismatchCode, ObjectGraph, RelatedType, Value,
    };
    use pretty_assertions::assert_eq;

    fn compare(options: &EquivalencyOptions, subject: DataColumn, expectation: DataColumn) -> Vec<Mismatch> {
        let subject = ObjectGraph::new(subject);
        let expectation = ObjectGraph::new(expectation);
        let mut mismatches = Vec::new();
        EquivalencyValidator::new(options, &subject, &expectation, &mut mismatches)
            .validate_graphs(&|| "column".to_string());
        mismatches
    }

    #[test]
    fn column_members_are_compared() {
        let expectation = DataColumn::new("Name", ColumnType::String).with_max_length(40);
        let subject = DataColumn::new("Name", ColumnType::String).with_max_length(80).read_only();
        let mismatches = compare(&EquivalencyOptions::default(), subject, expectation);

        let paths: Vec<_> = mismatches.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["MaxLength", "ReadOnly"]);
        assert_eq!(mismatches[0].expected.as_deref(), Some("40"));
        assert_eq!(mismatches[0].actual.as_deref(), Some("80"));
    }

    #[test]
    fn data_type_is_compared_by_name() {
        let mismatches = compare(
            &EquivalencyOptions::default(),
            DataColumn::new("Id", ColumnType::Int),
            DataColumn::new("Id", ColumnType::String),
        );
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "DataType");
        assert_eq!(mismatches[0].code, MismatchCode::ValueMismatch);
    }

    #[test]
    fn related_member_exclusion_applies() {
        let subject = DataColumn::new("Id", ColumnType::Int).with_caption("Identifier");
        let expectation = DataColumn::new("Id", ColumnType::Int);

        let mut options = EquivalencyOptions::default();
        options.excluding_related(RelatedType::DataColumn, "Caption").unwrap();
        assert!(compare(&options, subject, expectation).is_empty());
    }

    #[test]
    fn default_values_keep_their_kind() {
        let subject = DataColumn::new("Qty", ColumnType::Int).with_default(Value::Int(0));
        let expectation = DataColumn::new("Qty", ColumnType::Int).with_default(Value::Null);
        let mismatches = compare(&EquivalencyOptions::default(), subject, expectation);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].code, MismatchCode::ExpectedNull);
        assert_eq!(mismatches[0].path, "DefaultValue");
    }
}
