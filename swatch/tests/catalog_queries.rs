//! Integration tests for filtering, search and facets against a file-backed store.

use std::collections::HashMap;

use swatch::{
    build_filter, criteria_from_query, search_predicate, Column, FilterCriterion, MaterialStore,
    NewMaterial, PageRequest, Predicate, Selection, Sort, CATALOG_FACET_COLUMNS,
    FILTER_OPTION_COLUMNS,
};
use tempfile::TempDir;

fn setup_store() -> (TempDir, MaterialStore) {
    let dir = TempDir::new().unwrap();
    let store = MaterialStore::open(dir.path().join("catalog.db")).unwrap();

    let fixtures = [
        ("MAT-100", "Cotton Knit Blend", "Knit", "Womens", "Acme", &["Red", "White"][..]),
        ("MAT-101", "Polyester Satin", "Woven", "Womens", "Acme", &["Black"][..]),
        ("MAT-102", "Merino Wool Rib", "Knit", "Mens", "Loomcraft", &["Grey", "Red"][..]),
        ("MAT-103", "Linen Canvas", "Woven", "Home", "Loomcraft", &[][..]),
        ("MAT-104", "Recycled Knit Fleece", "Knit", "Kids", "Northmill", &["Blue"][..]),
    ];

    for (id, composition, material_type, segment, vendor, colors) in fixtures {
        store
            .insert(NewMaterial {
                material_composition: composition.into(),
                material_type: material_type.into(),
                segment: segment.into(),
                vendor: vendor.into(),
                colors: colors.iter().map(|c| c.to_string()).collect(),
                ..NewMaterial::with_id(id)
            })
            .unwrap();
    }

    (dir, store)
}

fn ids(store: &MaterialStore, predicate: &Predicate) -> Vec<String> {
    store
        .find_page(predicate, Sort::default(), PageRequest::new(1, 100))
        .unwrap()
        .items
        .into_iter()
        .map(|m| m.material_id)
        .collect()
}

#[test]
fn test_search_is_case_insensitive_substring() {
    let (_dir, store) = setup_store();

    assert_eq!(
        ids(&store, &search_predicate("knit")),
        vec!["MAT-100", "MAT-102", "MAT-104"]
    );
    assert_eq!(ids(&store, &search_predicate("SATIN")), vec!["MAT-101"]);
    assert_eq!(ids(&store, &search_predicate("")).len(), 5);
}

#[test]
fn test_filter_or_within_column_and_across_columns() {
    let (_dir, store) = setup_store();

    let predicate = build_filter(&[
        FilterCriterion::new("segment", "womens"),
        FilterCriterion::new("segment", "kids"),
        FilterCriterion::new("type", "knit"),
    ])
    .unwrap();

    assert_eq!(ids(&store, &predicate), vec!["MAT-100", "MAT-104"]);
}

#[test]
fn test_search_and_filter_combined() {
    let (_dir, store) = setup_store();

    let params: HashMap<String, String> = [("colors".to_string(), "red,blue".to_string())]
        .into_iter()
        .collect();
    let criteria = criteria_from_query(&params).unwrap();
    let predicate = search_predicate("knit").and(build_filter(&criteria).unwrap());

    assert_eq!(
        ids(&store, &predicate),
        vec!["MAT-100", "MAT-102", "MAT-104"]
    );

    let predicate = search_predicate("wool").and(build_filter(&criteria).unwrap());
    assert_eq!(ids(&store, &predicate), vec!["MAT-102"]);
}

#[test]
fn test_pagination_totals() {
    let (_dir, store) = setup_store();
    let request = PageRequest::new(2, 2);

    let page = store
        .find_page(&Predicate::All, Sort::default(), request)
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(request.total_pages(page.total), 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].material_id, "MAT-102");

    let beyond = store
        .find_page(&Predicate::All, Sort::default(), PageRequest::new(4, 2))
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);
}

#[test]
fn test_catalog_facets() {
    let (_dir, store) = setup_store();
    let selection = Selection::from_criteria(&[
        FilterCriterion::new("vendor", "Acme"),
        FilterCriterion::new("colors", "Red"),
    ])
    .unwrap();

    let facets = store
        .facets(CATALOG_FACET_COLUMNS, &selection, None)
        .unwrap();

    assert_eq!(facets.len(), CATALOG_FACET_COLUMNS.len());
    // No material has a style number, but the column is still reported
    assert!(facets["styleNo"].is_empty());

    let vendors: Vec<(&str, bool)> = facets["vendor"]
        .iter()
        .map(|v| (v.value.as_str(), v.selected))
        .collect();
    assert_eq!(
        vendors,
        vec![("Acme", true), ("Loomcraft", false), ("Northmill", false)]
    );

    let colors: Vec<&str> = facets["colors"].iter().map(|v| v.value.as_str()).collect();
    assert_eq!(colors, vec!["Black", "Blue", "Grey", "Red", "White"]);
}

#[test]
fn test_filter_option_columns_all_present() {
    let (_dir, store) = setup_store();
    let facets = store
        .facets(FILTER_OPTION_COLUMNS, &Selection::default(), None)
        .unwrap();

    for column in FILTER_OPTION_COLUMNS {
        assert!(facets.contains_key(column.name()), "missing {}", column);
    }
    assert!(!facets.contains_key(Column::Images.name()));
}
