use std::rc::Rc;

use chrono::TimeZone;
use chrono::Utc;
use tabula::prelude::*;

fn items() -> Vec<Record> {
    vec![
        Record::new()
            .with("name", "pear")
            .with("category", "fruit")
            .with("price", 3)
            .with("code", "item10"),
        Record::new()
            .with("name", "Apple")
            .with("category", "fruit")
            .with("price", 5)
            .with("code", "item2"),
        Record::new()
            .with("name", "leek")
            .with("category", "veg")
            .with("price", 3)
            .with("code", "item1"),
        Record::new().with("name", "kale").with("category", "veg").with("code", "item3"),
    ]
}

fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        ColumnDef::accessor("name"),
        ColumnDef::accessor("category"),
        ColumnDef::accessor("price"),
        ColumnDef::accessor("code"),
    ]
}

fn table_with(options: TableOptions<Record>) -> Table<Record> {
    Table::new(options.with_features(stock_features()).with_row_models(RowModels::all())).unwrap()
}

fn table() -> Table<Record> {
    table_with(TableOptions::new(items(), columns()))
}

fn sorted(table: &Table<Record>, column_id: &str) -> Vec<String> {
    table
        .sorted_row_model()
        .rows
        .iter()
        .map(|row| row.value(table, column_id).to_string())
        .collect()
}

fn sorting(table: &Table<Record>) -> Vec<(String, bool)> {
    table
        .slice::<SortingState>()
        .iter()
        .map(|sort| (sort.id.clone(), sort.desc))
        .collect()
}

// =============================================================================
// Toggling
// =============================================================================

#[test]
fn test_number_column_cycles_from_descending() {
    let table = table();
    let price = table.column("price").unwrap();
    assert_eq!(price.first_sort_dir(&table), SortDirection::Desc);

    price.toggle_sorting(&table, None, false);
    assert_eq!(price.is_sorted(&table), Some(SortDirection::Desc));
    price.toggle_sorting(&table, None, false);
    assert_eq!(price.is_sorted(&table), Some(SortDirection::Asc));
    price.toggle_sorting(&table, None, false);
    assert_eq!(price.is_sorted(&table), None);
    assert!(table.slice::<SortingState>().is_empty());
}

#[test]
fn test_string_column_cycles_from_ascending() {
    let table = table();
    let name = table.column("name").unwrap();
    assert_eq!(name.auto_sort_dir(&table), SortDirection::Asc);

    name.toggle_sorting(&table, None, false);
    assert_eq!(sorting(&table), vec![("name".to_string(), false)]);
    assert_eq!(name.next_sorting_order(&table, false), Some(SortDirection::Desc));
    name.toggle_sorting(&table, None, false);
    assert_eq!(sorting(&table), vec![("name".to_string(), true)]);
    assert_eq!(name.next_sorting_order(&table, false), None);
}

#[test]
fn test_forced_direction() {
    let table = table();
    let name = table.column("name").unwrap();

    name.toggle_sorting(&table, Some(true), false);
    assert_eq!(name.is_sorted(&table), Some(SortDirection::Desc));
    name.toggle_sorting(&table, Some(true), false);
    assert_eq!(name.is_sorted(&table), Some(SortDirection::Desc));
}

#[test]
fn test_sorting_removal_disabled() {
    let table = table_with(TableOptions::new(items(), columns()).with_enable_sorting_removal(false));
    let name = table.column("name").unwrap();

    name.toggle_sorting(&table, None, false);
    name.toggle_sorting(&table, None, false);
    name.toggle_sorting(&table, None, false);
    assert_eq!(name.is_sorted(&table), Some(SortDirection::Asc));
}

#[test]
fn test_sort_desc_first() {
    let table = table_with(TableOptions::new(
        items(),
        vec![ColumnDef::accessor("name").with_sort_desc_first(true)],
    ));
    let name = table.column("name").unwrap();

    name.toggle_sorting(&table, None, false);
    assert_eq!(name.is_sorted(&table), Some(SortDirection::Desc));
}

#[test]
fn test_multi_sort_toggle() {
    let table = table();
    let category = table.column("category").unwrap();
    let price = table.column("price").unwrap();

    category.toggle_sorting(&table, None, false);
    price.toggle_sorting(&table, None, true);
    assert_eq!(
        sorting(&table),
        vec![("category".to_string(), false), ("price".to_string(), true)]
    );
    assert_eq!(price.sort_index(&table), Some(1));

    // Without multi, toggling a column replaces the whole sort.
    category.toggle_sorting(&table, None, false);
    assert_eq!(sorting(&table), vec![("category".to_string(), true)]);

    category.clear_sorting(&table);
    assert!(table.slice::<SortingState>().is_empty());
}

#[test]
fn test_max_multi_sort_col_count() {
    let table = table_with(TableOptions::new(items(), columns()).with_max_multi_sort_col_count(2));

    table.column("name").unwrap().toggle_sorting(&table, None, true);
    table.column("category").unwrap().toggle_sorting(&table, None, true);
    table.column("price").unwrap().toggle_sorting(&table, None, true);

    let ids: Vec<String> = sorting(&table).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["category", "price"]);
}

#[test]
fn test_can_sort() {
    let table = table_with(TableOptions::new(
        items(),
        vec![
            ColumnDef::accessor("name").with_enable_sorting(false),
            ColumnDef::accessor("price").with_enable_multi_sort(false),
            ColumnDef::display("actions"),
        ],
    ));

    assert!(!table.column("name").unwrap().can_sort(&table));
    assert!(!table.column("actions").unwrap().can_sort(&table));
    assert!(table.column("price").unwrap().can_sort(&table));
    assert!(!table.column("price").unwrap().can_multi_sort(&table));
}

// =============================================================================
// Sorted rows
// =============================================================================

#[test]
fn test_multi_column_order() {
    let table = table();
    table.set_sorting(SortingState::from(vec![
        ColumnSort::asc("category"),
        ColumnSort::desc("price"),
    ]));

    // The missing price sorts high, so it leads the descending veg group.
    assert_eq!(sorted(&table, "name"), vec!["Apple", "pear", "kale", "leek"]);
}

#[test]
fn test_ties_keep_source_order() {
    let table = table();
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("category")]));

    assert_eq!(sorted(&table, "name"), vec!["pear", "Apple", "leek", "kale"]);
}

#[test]
fn test_text_sort_ignores_case() {
    let table = table();
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("name")]));

    assert_eq!(sorted(&table, "name"), vec!["Apple", "kale", "leek", "pear"]);
}

#[test]
fn test_alphanumeric_sort() {
    let table = table();
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("code")]));

    assert_eq!(sorted(&table, "code"), vec!["item1", "item2", "item3", "item10"]);
}

#[test]
fn test_missing_values_sort_high() {
    let table = table();
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("price")]));
    assert_eq!(sorted(&table, "name"), vec!["pear", "leek", "Apple", "kale"]);

    table.set_sorting(SortingState::from(vec![ColumnSort::desc("price")]));
    assert_eq!(sorted(&table, "name"), vec!["kale", "Apple", "pear", "leek"]);
}

#[test]
fn test_missing_values_placement() {
    let first = table_with(TableOptions::new(
        items(),
        vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("price").with_sort_undefined(SortUndefined::First),
        ],
    ));
    first.set_sorting(SortingState::from(vec![ColumnSort::asc("price")]));
    assert_eq!(sorted(&first, "name")[0], "kale");
    first.set_sorting(SortingState::from(vec![ColumnSort::desc("price")]));
    assert_eq!(sorted(&first, "name")[0], "kale");

    let last = table_with(TableOptions::new(
        items(),
        vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("price").with_sort_undefined(SortUndefined::Last),
        ],
    ));
    last.set_sorting(SortingState::from(vec![ColumnSort::desc("price")]));
    assert_eq!(sorted(&last, "name")[3], "kale");

    let lowest = table_with(TableOptions::new(
        items(),
        vec![
            ColumnDef::accessor("name"),
            ColumnDef::accessor("price").with_sort_undefined(SortUndefined::AsLowest),
        ],
    ));
    lowest.set_sorting(SortingState::from(vec![ColumnSort::asc("price")]));
    assert_eq!(sorted(&lowest, "name")[0], "kale");
}

#[test]
fn test_invert_sorting() {
    let table = table_with(TableOptions::new(
        items(),
        vec![ColumnDef::accessor("name"), ColumnDef::accessor("code").with_invert_sorting(true)],
    ));
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("code")]));

    assert_eq!(sorted(&table, "code"), vec!["item10", "item3", "item2", "item1"]);
}

#[test]
fn test_custom_sorting_fn() {
    let by_length = SortingFn::new(|a, b| a.to_text().len().cmp(&b.to_text().len()));
    let table = table_with(TableOptions::new(
        items(),
        vec![ColumnDef::accessor("name").with_sorting_fn(by_length)],
    ));
    table.set_sorting(SortingState::from(vec![ColumnSort::desc("name")]));

    assert_eq!(sorted(&table, "name"), vec!["Apple", "pear", "leek", "kale"]);
}

#[test]
fn test_registered_sorting_fn() {
    let by_length = SortingFn::new(|a, b| a.to_text().len().cmp(&b.to_text().len()));
    let table = table_with(
        TableOptions::new(items(), vec![ColumnDef::accessor("code").with_sorting_fn("by_length")])
            .with_sorting_fn("by_length", by_length),
    );
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("code")]));

    assert_eq!(sorted(&table, "code"), vec!["item2", "item1", "item3", "item10"]);
}

#[test]
fn test_datetime_sort() {
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();
    let data = vec![
        Record::new().with("name", "b").with("joined", day(9)),
        Record::new().with("name", "a").with("joined", day(2)),
        Record::new().with("name", "c").with("joined", day(20)),
    ];
    let table = table_with(TableOptions::new(
        data,
        vec![ColumnDef::accessor("name"), ColumnDef::accessor("joined")],
    ));
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("joined")]));

    assert_eq!(sorted(&table, "name"), vec!["a", "b", "c"]);
}

#[test]
fn test_unsortable_criteria_skipped() {
    let table = table_with(TableOptions::new(
        items(),
        vec![ColumnDef::accessor("name").with_enable_sorting(false)],
    ));
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("name"), ColumnSort::asc("missing")]));

    assert!(Rc::ptr_eq(&table.sorted_row_model(), &table.core_row_model()));
}

#[test]
fn test_manual_sorting() {
    let table = table_with(TableOptions::new(items(), columns()).with_manual_sorting(true));
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("name")]));

    assert_eq!(sorted(&table, "name"), vec!["pear", "Apple", "leek", "kale"]);
}

#[test]
fn test_sub_rows_sorted_within_parent() {
    let data = vec![
        Record::new().with("name", "b").with_children(vec![
            Record::new().with("name", "z"),
            Record::new().with("name", "x"),
        ]),
        Record::new().with("name", "a"),
    ];
    let table = table_with(
        TableOptions::new(data, vec![ColumnDef::accessor("name")])
            .with_sub_rows(|record: &Record| Some(record.children())),
    );
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("name")]));

    let model = table.sorted_row_model();
    assert_eq!(model.ids(), vec!["1", "0"]);
    let children: Vec<&str> = model.rows[1].sub_rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(children, vec!["0.1", "0.0"]);
    let flat: Vec<&str> = model.flat_rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(flat, vec!["1", "0", "0.1", "0.0"]);
}

#[test]
fn test_sort_with_nan_values() {
    let records = (0..200)
        .map(|index| {
            let x = if index % 3 == 0 { f64::NAN } else { ((index * 37) % 101) as f64 / 4.0 };
            Record::new().with("x", x)
        })
        .collect();
    let table = table_with(TableOptions::new(records, vec![ColumnDef::accessor("x")]));
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("x")]));

    let model = table.sorted_row_model();
    assert_eq!(model.flat_rows.len(), 200);

    let values: Vec<f64> = model
        .rows
        .iter()
        .filter_map(|row| row.value(&table, "x").as_f64())
        .collect();
    let numbers: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    assert_eq!(numbers.len(), 133);
    assert!(numbers.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(values[133..].iter().all(|x| x.is_nan()));
}
