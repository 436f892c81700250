//! Integration tests for the equivalency engine

use equivalency_core::{
    ColumnType, Constraint, DataColumn, DataRelation, DataSet, DataTable, EquivalencyOptions, MismatchCode,
    Object, ObjectGraph, RelatedType, RowMatchMode, Value,
};
use equivalency_engine::{Equivalency, EquivalencyError};
use pretty_assertions::assert_eq;

fn orders(totals: &[(i64, i64)]) -> DataTable {
    totals.iter().fold(
        DataTable::new("Orders")
            .with_column(DataColumn::new("Id", ColumnType::Int).not_null())
            .with_column(DataColumn::new("Total", ColumnType::Int))
            .with_primary_key(["Id"])
            .with_constraint(Constraint::primary_key("PK_Orders", ["Id"])),
        |table, &(id, total)| table.with_row(vec![id, total]),
    )
}

fn customers() -> DataTable {
    DataTable::new("Customers")
        .with_column(DataColumn::new("Id", ColumnType::Int).not_null())
        .with_column(DataColumn::new("Name", ColumnType::String))
        .with_column(DataColumn::new("Total", ColumnType::Int))
        .with_primary_key(["Id"])
        .with_row(vec![Value::Int(1), Value::from("Ann"), Value::Int(10)])
}

fn shop(order_totals: &[(i64, i64)]) -> DataSet {
    DataSet::new("Shop")
        .with_table(customers())
        .with_table(orders(order_totals))
        .with_relation(DataRelation::new("CustomerOrders", "Customers", ["Id"], "Orders", ["Id"]))
}

fn defaults() -> EquivalencyOptions {
    EquivalencyOptions::default()
}

#[test]
fn test_identical_data_sets_are_equivalent() {
    let comparison = Equivalency::new(&defaults()).compare(&shop(&[(1, 100)]).into(), &shop(&[(1, 100)]).into());
    assert!(comparison.is_equivalent());
    assert!(comparison.nodes_visited > 10);
}

#[test]
fn test_row_value_difference_is_reported_with_path() {
    let subject = ObjectGraph::from(orders(&[(1, 100), (2, 200)]));
    let expectation = ObjectGraph::from(orders(&[(1, 100), (2, 250)]));
    let comparison = Equivalency::new(&defaults()).compare(&subject, &expectation);

    assert_eq!(comparison.mismatches.len(), 1);
    let mismatch = &comparison.mismatches[0];
    assert_eq!(mismatch.path, "Rows[1].Total");
    assert_eq!(mismatch.expected.as_deref(), Some("250"));
    assert_eq!(mismatch.actual.as_deref(), Some("200"));
}

#[test]
fn test_nested_table_paths_include_table_key() {
    let comparison = Equivalency::new(&defaults()).compare(&shop(&[(1, 100)]).into(), &shop(&[(1, 101)]).into());
    assert_eq!(comparison.mismatches.len(), 1);
    assert_eq!(comparison.mismatches[0].path, "Tables[Orders].Rows[0].Total");
}

#[test]
fn test_column_excluded_in_all_tables() {
    let mut subject = shop(&[(1, 100)]);
    if let Some(customers) = subject.table_mut("Customers") {
        customers.rows[0].set_value("Total", 99);
        customers.rows[0].accept_changes();
    }
    let subject = ObjectGraph::from(subject);
    let expectation = ObjectGraph::from(shop(&[(1, 300)]));

    let strict = Equivalency::new(&defaults()).compare(&subject, &expectation);
    assert_eq!(strict.mismatches.len(), 2);

    let relaxed = Equivalency::new(&defaults())
        .configure(|options| {
            options.excluding_column_in_all_tables("Total");
        })
        .compare(&subject, &expectation);
    assert!(relaxed.is_equivalent(), "{:?}", relaxed.mismatches);
}

#[test]
fn test_excluded_table_drops_its_relations() {
    let mut subject = shop(&[(1, 100)]);
    subject.tables.retain(|table| table.table_name != "Orders");
    subject.relations.clear();
    let subject = ObjectGraph::from(subject);
    let expectation = ObjectGraph::from(shop(&[(1, 100)]));

    let strict = Equivalency::new(&defaults()).compare(&subject, &expectation);
    let codes: Vec<_> = strict.mismatches.iter().map(|m| (m.code, m.path.as_str())).collect();
    assert_eq!(
        codes,
        vec![
            (MismatchCode::MissingElement, "Tables[Orders]"),
            (MismatchCode::MissingElement, "Relations[CustomerOrders]"),
        ]
    );

    let relaxed = Equivalency::new(&defaults())
        .configure(|options| {
            options.excluding_table("Orders");
        })
        .compare(&subject, &expectation);
    assert!(relaxed.is_equivalent());
}

#[test]
fn test_primary_key_matching_requires_declared_keys() {
    let mut subject = orders(&[(1, 100)]);
    subject.primary_key.clear();
    let mut expectation = orders(&[(1, 100)]);
    expectation.primary_key.clear();

    let comparison = Equivalency::new(&defaults())
        .configure(|options| {
            options.using_row_match_mode(RowMatchMode::PrimaryKey);
        })
        .compare(&subject.into(), &expectation.into());

    assert_eq!(comparison.mismatches.len(), 1);
    assert_eq!(comparison.mismatches[0].code, MismatchCode::PrimaryKeyMismatch);
}

#[test]
fn test_primary_key_matching_pairs_permuted_rows() {
    let subject = ObjectGraph::from(orders(&[(3, 300), (1, 100), (2, 200)]));
    let expectation = ObjectGraph::from(orders(&[(1, 100), (2, 200), (3, 300)]));
    let equivalency = Equivalency::new(&defaults()).configure(|options| {
        options.using_row_match_mode(RowMatchMode::PrimaryKey);
    });
    assert!(equivalency.compare(&subject, &expectation).is_equivalent());
}

#[test]
fn test_primary_key_matching_reports_rows_without_partner() {
    let subject = ObjectGraph::from(orders(&[(1, 100), (4, 400)]));
    let expectation = ObjectGraph::from(orders(&[(1, 100), (2, 200)]));
    let comparison = Equivalency::new(&defaults())
        .configure(|options| {
            options.using_row_match_mode(RowMatchMode::PrimaryKey);
        })
        .compare(&subject, &expectation);

    let found: Vec<_> = comparison
        .mismatches
        .iter()
        .map(|m| (m.code, m.path.as_str(), m.expected.as_deref(), m.actual.as_deref()))
        .collect();
    assert_eq!(
        found,
        vec![
            (MismatchCode::UnmatchedRow, "Rows[1]", Some("Unchanged row [Id=2]"), None),
            (MismatchCode::UnmatchedRow, "Rows[1]", None, Some("Unchanged row [Id=4]")),
        ]
    );
}

#[test]
fn test_excluded_data_column_propagates_to_rows() {
    let expectation = orders(&[(1, 100)]);
    let mut subject = orders(&[(1, 500)]);
    subject.columns[1].caption = "Order total".to_string();
    let total = expectation.columns[1].clone();

    let comparison = Equivalency::new(&defaults())
        .configure(|options| {
            options.excluding_data_column(&total);
        })
        .compare(&subject.into(), &expectation.into());
    assert!(comparison.is_equivalent(), "{:?}", comparison.mismatches);
}

#[test]
fn test_related_member_exclusion_for_constraints() {
    let expectation = orders(&[(1, 100)]);
    let mut subject = orders(&[(1, 100)]);
    subject.constraints[0]
        .extended_properties
        .insert("note".to_string(), Value::from("generated"));

    let strict = Equivalency::new(&defaults()).compare(&subject.clone().into(), &expectation.clone().into());
    assert_eq!(strict.mismatches.len(), 1);
    assert_eq!(strict.mismatches[0].path, "Constraints[PK_Orders].ExtendedProperties[note]");

    let relaxed = Equivalency::new(&defaults())
        .try_configure(|options| {
            options.excluding_related(RelatedType::UniqueConstraint, "ExtendedProperties")?;
            Ok(())
        })
        .unwrap()
        .compare(&subject.into(), &expectation.into());
    assert!(relaxed.is_equivalent(), "{:?}", relaxed.mismatches);
}

#[test]
fn test_member_predicate_sees_declaring_type_and_path() {
    let mut subject = shop(&[(1, 100)]);
    subject.namespace = "urn:other".to_string();
    if let Some(table) = subject.table_mut("Orders") {
        table.namespace = "urn:other".to_string();
    }

    let comparison = Equivalency::new(&defaults())
        .configure(|options| {
            options.excluding_members(|member| member.declaring_type == "DataTable" && member.name == "Namespace");
        })
        .compare(&subject.into(), &shop(&[(1, 100)]).into());

    assert_eq!(comparison.mismatches.len(), 1);
    assert_eq!(comparison.mismatches[0].path, "Namespace");
}

#[test]
fn test_cyclic_object_graphs_terminate() {
    fn ring(values: [i64; 2]) -> ObjectGraph {
        let mut graph = ObjectGraph::default();
        let first = graph.add(Object::new("Link").with_member("Value", values[0]));
        let second = graph.add(Object::new("Link").with_member("Value", values[1]).with_member("Next", first));
        graph.set_member(first, "Next", second);
        graph.with_root(first)
    }

    let equivalency = Equivalency::new(&defaults());
    assert!(equivalency.compare(&ring([1, 2]), &ring([1, 2])).is_equivalent());

    let comparison = equivalency.compare(&ring([1, 3]), &ring([1, 2]));
    assert_eq!(comparison.mismatches.len(), 1);
    assert_eq!(comparison.mismatches[0].path, "Next.Value");
}

#[test]
fn test_assert_equivalent_returns_all_mismatches() {
    let err = Equivalency::new(&defaults())
        .assert_equivalent(&orders(&[(1, 1), (2, 2)]).into(), &orders(&[(1, 5), (2, 6)]).into())
        .unwrap_err();
    match err {
        EquivalencyError::NotEquivalent { mismatches } => {
            let paths: Vec<_> = mismatches.iter().map(|m| m.path.clone()).collect();
            assert_eq!(paths, vec!["Rows[0].Total", "Rows[1].Total"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_graphs_round_trip_through_json() {
    let graph = ObjectGraph::from(shop(&[(1, 100), (2, 200)]));
    let json = serde_json::to_string(&graph).unwrap();
    let parsed: ObjectGraph = serde_json::from_str(&json).unwrap();
    assert!(Equivalency::new(&defaults()).compare(&parsed, &graph).is_equivalent());
}
