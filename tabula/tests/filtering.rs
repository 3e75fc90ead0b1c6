use std::rc::Rc;

use tabula::prelude::*;

fn produce() -> Vec<Record> {
    let tags = |items: &[&str]| Value::List(items.iter().map(|tag| Value::from(*tag)).collect());
    vec![
        Record::new()
            .with("name", "Apple")
            .with("category", "fruit")
            .with("price", 3)
            .with("tags", tags(&["red", "sweet"])),
        Record::new()
            .with("name", "Banana")
            .with("category", "fruit")
            .with("price", 1)
            .with("tags", tags(&["yellow", "sweet"])),
        Record::new()
            .with("name", "Carrot")
            .with("category", "veg")
            .with("price", 2)
            .with("tags", tags(&["orange"])),
        Record::new()
            .with("name", "Daikon")
            .with("category", "veg")
            .with("price", 4)
            .with("tags", tags(&["white"])),
        Record::new()
            .with("name", "Eggplant")
            .with("category", "veg")
            .with("price", 6)
            .with("tags", tags(&["purple"])),
    ]
}

fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        ColumnDef::accessor("name"),
        ColumnDef::accessor("category"),
        ColumnDef::accessor("price"),
        ColumnDef::accessor("tags").with_unique_values(|record: &Record, _| {
            record
                .get("tags")
                .and_then(Value::as_list)
                .map(|tags| tags.to_vec())
                .unwrap_or_default()
        }),
        ColumnDef::display("actions"),
    ]
}

fn table_with(options: TableOptions<Record>) -> Table<Record> {
    Table::new(options.with_features(stock_features()).with_row_models(RowModels::all())).unwrap()
}

fn table() -> Table<Record> {
    table_with(TableOptions::new(produce(), columns()))
}

fn filter(table: &Table<Record>, id: &str, value: impl Into<Value>) {
    table.set_column_filters(ColumnFiltersState::from(vec![ColumnFilter::new(id, value)]));
}

fn range(min: impl Into<Value>, max: impl Into<Value>) -> Value {
    Value::List(vec![min.into(), max.into()])
}

fn names(table: &Table<Record>) -> Vec<String> {
    table
        .filtered_row_model()
        .rows
        .iter()
        .map(|row| row.value(table, "name").to_string())
        .collect()
}

// =============================================================================
// Column filters
// =============================================================================

#[test]
fn test_string_filter_ignores_case() {
    let table = table();
    filter(&table, "name", "AN");

    assert_eq!(names(&table), vec!["Banana", "Eggplant"]);
}

#[test]
fn test_number_range_filter() {
    let table = table();
    filter(&table, "price", range(2, 4));
    assert_eq!(names(&table), vec!["Apple", "Carrot", "Daikon"]);

    filter(&table, "price", range(Value::Null, 2));
    assert_eq!(names(&table), vec!["Banana", "Carrot"]);

    // Reversed bounds are swapped.
    filter(&table, "price", range(4, 2));
    assert_eq!(names(&table), vec!["Apple", "Carrot", "Daikon"]);
}

#[test]
fn test_list_filter() {
    let table = table();
    filter(&table, "tags", "sweet");

    assert_eq!(names(&table), vec!["Apple", "Banana"]);
}

#[test]
fn test_filters_combine() {
    let table = table();
    table.set_column_filters(ColumnFiltersState::from(vec![
        ColumnFilter::new("category", "veg"),
        ColumnFilter::new("price", range(3, 10)),
    ]));

    assert_eq!(names(&table), vec!["Daikon", "Eggplant"]);
    assert_eq!(table.pre_filtered_row_model().rows.len(), 5);
}

#[test]
fn test_named_filter_fn() {
    let table = table_with(TableOptions::new(
        produce(),
        vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("category").with_filter_fn("equalsString"),
        ],
    ));
    filter(&table, "category", "FRUIT");
    assert_eq!(names(&table), vec!["Apple", "Banana"]);

    filter(&table, "category", "fru");
    assert!(names(&table).is_empty());
}

#[test]
fn test_registered_filter_fn() {
    let starts_with = FilterFn::new(|cell, filter| cell.to_text().starts_with(&filter.to_text()));
    let table = table_with(
        TableOptions::new(
            produce(),
            vec![ColumnDef::accessor("name").with_filter_fn("startsWith")],
        )
        .with_filter_fn("startsWith", starts_with),
    );
    filter(&table, "name", "Da");

    assert_eq!(names(&table), vec!["Daikon"]);
}

#[test]
fn test_custom_filter_fn() {
    let expensive = FilterFn::new(|cell, _| cell.as_i64().is_some_and(|price| price > 3));
    let table = table_with(TableOptions::new(
        produce(),
        vec![ColumnDef::accessor("name"), ColumnDef::accessor("price").with_filter_fn(expensive)],
    ));
    filter(&table, "price", true);

    assert_eq!(names(&table), vec!["Daikon", "Eggplant"]);
}

#[test]
fn test_set_filter_value() {
    let table = table();
    let name = table.column("name").unwrap();

    name.set_filter_value(&table, Value::from("pl"));
    assert!(name.is_filtered(&table));
    assert_eq!(name.filter_value(&table), Some(Value::from("pl")));
    assert_eq!(name.filter_index(&table), Some(0));
    assert_eq!(names(&table), vec!["Apple", "Eggplant"]);

    name.set_filter_value(
        &table,
        Updater::update(|old: &Value| Value::from(format!("{}a", old.to_text()))),
    );
    assert_eq!(names(&table), vec!["Eggplant"]);

    name.set_filter_value(&table, Value::from(""));
    assert!(!name.is_filtered(&table));
    assert_eq!(names(&table).len(), 5);
}

#[test]
fn test_empty_values_remove_filters() {
    let table = table();
    table.set_column_filters(ColumnFiltersState::from(vec![
        ColumnFilter::new("name", ""),
        ColumnFilter::new("tags", Value::List(Vec::new())),
        ColumnFilter::new("price", range(Value::Null, Value::Null)),
    ]));

    assert!(table.slice::<ColumnFiltersState>().is_empty());
    let core = table.core_row_model();
    assert!(Rc::ptr_eq(&table.filtered_row_model(), &core));
}

#[test]
fn test_unknown_column_filter_ignored() {
    let table = table();
    filter(&table, "color", "red");

    assert_eq!(table.slice::<ColumnFiltersState>().len(), 1);
    assert_eq!(names(&table).len(), 5);
}

#[test]
fn test_can_filter() {
    let table = table_with(TableOptions::new(
        produce(),
        vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("price").with_enable_column_filter(false),
            ColumnDef::display("actions"),
        ],
    ));

    assert!(table.column("name").unwrap().can_filter(&table));
    assert!(!table.column("price").unwrap().can_filter(&table));
    assert!(!table.column("actions").unwrap().can_filter(&table));
}

#[test]
fn test_manual_filtering_skips_stage() {
    let table = table_with(TableOptions::new(produce(), columns()).with_manual_filtering(true));
    filter(&table, "name", "Apple");

    assert_eq!(names(&table).len(), 5);
}

// =============================================================================
// Global filter
// =============================================================================

#[test]
fn test_global_filter() {
    let table = table();
    table.set_global_filter(GlobalFilterState::from(Value::from("car")));
    assert_eq!(names(&table), vec!["Carrot"]);

    table.set_global_filter(GlobalFilterState::from(Value::from("veg")));
    assert_eq!(names(&table), vec!["Carrot", "Daikon", "Eggplant"]);

    table.reset_global_filter(true);
    assert_eq!(names(&table).len(), 5);
}

#[test]
fn test_global_filter_columns() {
    let table = table_with(TableOptions::new(
        produce(),
        vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("category").with_enable_global_filter(false),
            ColumnDef::accessor("tags"),
        ],
    ));

    assert!(table.column("name").unwrap().can_global_filter(&table));
    assert!(!table.column("category").unwrap().can_global_filter(&table));
    // The first value is a list, not text.
    assert!(!table.column("tags").unwrap().can_global_filter(&table));

    table.set_global_filter(GlobalFilterState::from(Value::from("veg")));
    assert!(names(&table).is_empty());
}

#[test]
fn test_global_and_column_filters() {
    let table = table();
    table.set_global_filter(GlobalFilterState::from(Value::from("a")));
    filter(&table, "category", "veg");

    assert_eq!(names(&table), vec!["Carrot", "Daikon", "Eggplant"]);
    filter(&table, "price", range(5, 9));
    assert_eq!(names(&table), vec!["Eggplant"]);
}

#[test]
fn test_named_global_filter_fn() {
    let table = table_with(
        TableOptions::new(produce(), columns()).with_global_filter_fn(Strategy::named("equalsString")),
    );
    table.set_global_filter(GlobalFilterState::from(Value::from("apple")));

    assert_eq!(names(&table), vec!["Apple"]);
}

// =============================================================================
// Nested rows
// =============================================================================

fn groceries() -> Vec<Record> {
    vec![
        Record::new().with("name", "Fruit").with_children(vec![
            Record::new().with("name", "Apple"),
            Record::new().with("name", "Banana"),
        ]),
        Record::new()
            .with("name", "Veg")
            .with_children(vec![Record::new().with("name", "Carrot")]),
    ]
}

fn tree_table(from_leaves: bool) -> Table<Record> {
    table_with(
        TableOptions::new(groceries(), vec![ColumnDef::accessor("name")])
            .with_sub_rows(|record: &Record| Some(record.children()))
            .with_filter_from_leaf_rows(from_leaves),
    )
}

fn flat_ids(model: &RowModel<Record>) -> Vec<&str> {
    model.flat_rows.iter().map(|row| row.id.as_str()).collect()
}

#[test]
fn test_root_filter_drops_subtrees() {
    let table = tree_table(false);
    filter(&table, "name", "apple");
    assert!(table.filtered_row_model().rows.is_empty());

    filter(&table, "name", "fruit");
    let model = table.filtered_row_model();
    assert_eq!(model.ids(), vec!["0"]);
    // Children that fail are removed below a passing parent.
    assert!(model.rows[0].sub_rows.is_empty());
}

#[test]
fn test_leaf_filter_keeps_ancestors() {
    let table = tree_table(true);
    filter(&table, "name", "apple");

    let model = table.filtered_row_model();
    assert_eq!(model.ids(), vec!["0"]);
    assert_eq!(flat_ids(&model), vec!["0", "0.0"]);
    assert_eq!(model.rows[0].sub_rows.len(), 1);
}

#[test]
fn test_leaf_filter_keeps_passing_parent() {
    let table = tree_table(true);
    filter(&table, "name", "veg");

    let model = table.filtered_row_model();
    assert_eq!(flat_ids(&model), vec!["1"]);
}

// =============================================================================
// Faceting
// =============================================================================

#[test]
fn test_faceted_rows_ignore_own_filter() {
    let table = table();
    table.set_column_filters(ColumnFiltersState::from(vec![
        ColumnFilter::new("category", "veg"),
        ColumnFilter::new("price", range(2, 6)),
    ]));

    let category = table.column("category").unwrap();
    assert_eq!(category.faceted_row_model(&table).rows.len(), 4);
    assert_eq!(
        category.faceted_unique_values(&table).to_vec(),
        vec![(Value::from("fruit"), 1), (Value::from("veg"), 3)]
    );

    let price = table.column("price").unwrap();
    assert_eq!(price.faceted_row_model(&table).rows.len(), 3);
    assert_eq!(price.faceted_min_max_values(&table), Some((2.0, 6.0)));
}

#[test]
fn test_facets_without_filters() {
    let table = table();
    let price = table.column("price").unwrap();

    assert!(Rc::ptr_eq(&price.faceted_row_model(&table), &table.pre_filtered_row_model()));
    assert_eq!(price.faceted_min_max_values(&table), Some((1.0, 6.0)));
    assert_eq!(table.column("name").unwrap().faceted_min_max_values(&table), None);
}

#[test]
fn test_unique_values_count_list_items() {
    let table = table();
    let tags = table.column("tags").unwrap();
    let counts = tags.faceted_unique_values(&table);

    assert_eq!(counts.len(), 6);
    assert_eq!(counts[0], (Value::from("red"), 1));
    assert_eq!(counts[1], (Value::from("sweet"), 2));
}

#[test]
fn test_facets_are_cached() {
    let table = table();
    let category = table.column("category").unwrap();
    let first = category.faceted_unique_values(&table);

    table.set_sorting(SortingState::from(vec![ColumnSort::asc("name")]));
    assert!(Rc::ptr_eq(&first, &category.faceted_unique_values(&table)));

    filter(&table, "price", range(5, 10));
    let next = category.faceted_unique_values(&table);
    assert!(!Rc::ptr_eq(&first, &next));
    assert_eq!(next.to_vec(), vec![(Value::from("veg"), 1)]);
}

#[test]
fn test_global_facets() {
    let table = table();
    table.set_global_filter(GlobalFilterState::from(Value::from("car")));
    filter(&table, "category", "veg");

    // The global facet ignores the global filter itself.
    assert_eq!(table.global_faceted_row_model().rows.len(), 3);
    assert_eq!(table.global_faceted_min_max_values(), Some((2.0, 6.0)));

    let values = table.global_faceted_unique_values();
    assert!(values.contains(&(Value::from("veg"), 3)));
    assert!(values.contains(&(Value::from("Daikon"), 1)));
}
