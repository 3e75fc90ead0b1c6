use std::collections::HashMap;
use std::rc::Rc;

use tabula::prelude::*;

fn people() -> Vec<Record> {
    vec![
        Record::new().with("first", "Ada").with("last", "Lovelace").with("age", 36),
        Record::new().with("first", "Alan").with("last", "Turing").with("age", 41),
    ]
}

fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        ColumnDef::group(
            "Name",
            vec![ColumnDef::accessor("first"), ColumnDef::accessor("last")],
        ),
        ColumnDef::accessor("age"),
    ]
}

fn table_with(options: TableOptions<Record>) -> Table<Record> {
    Table::new(options.with_features(stock_features()).with_row_models(RowModels::all())).unwrap()
}

fn table() -> Table<Record> {
    table_with(TableOptions::new(people(), columns()))
}

fn header_ids(headers: &[Rc<Header<Record>>]) -> Vec<&str> {
    headers.iter().map(|header| header.id.as_str()).collect()
}

// =============================================================================
// Header groups
// =============================================================================

#[test]
fn test_header_groups() {
    let table = table();
    let groups = table.header_groups();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, "0");
    assert_eq!(groups[1].id, "1");

    let top = &groups[0].headers;
    assert_eq!(header_ids(top), vec!["1_Name_first", "1_age_age"]);
    assert_eq!(top[0].column.id, "Name");
    assert_eq!(top[0].col_span, 2);
    assert!(!top[0].is_placeholder);
    assert_eq!(top[0].sub_headers.len(), 2);
    assert!(top[1].is_placeholder);
    assert_eq!(top[1].col_span, 1);
    assert_eq!(top[1].column.id, "age");

    let bottom = &groups[1].headers;
    assert_eq!(header_ids(bottom), vec!["first", "last", "age"]);
    assert!(bottom.iter().all(|header| header.col_span == 1 && header.row_span == 1));
    assert_eq!(bottom[2].index, 2);
    assert_eq!(bottom[0].header_group_id, "1");
}

#[test]
fn test_flat_columns_single_group() {
    let table = table_with(TableOptions::new(
        people(),
        vec![ColumnDef::accessor("first"), ColumnDef::accessor("age")],
    ));
    let groups = table.header_groups();

    assert_eq!(groups.len(), 1);
    assert_eq!(header_ids(&groups[0].headers), vec!["first", "age"]);
    assert!(groups[0].headers.iter().all(|header| !header.is_placeholder));
}

#[test]
fn test_footer_groups_reverse() {
    let table = table();
    let footers = table.footer_groups();

    assert_eq!(footers[0].id, "1");
    assert_eq!(footers[1].id, "0");
}

#[test]
fn test_flat_and_leaf_headers() {
    let table = table();

    assert_eq!(
        header_ids(&table.flat_headers()),
        vec!["1_Name_first", "1_age_age", "first", "last", "age"]
    );
    assert_eq!(
        header_ids(&table.leaf_headers()),
        vec!["first", "last", "center_1_Name_first", "age", "center_1_age_age"]
    );
    assert_eq!(header_ids(&table.center_leaf_headers()), vec!["first", "last", "age"]);
}

#[test]
fn test_hidden_column_shrinks_span() {
    let table = table();
    table.column("last").unwrap().toggle_visibility(&table, Some(false));

    let groups = table.header_groups();
    assert_eq!(groups[0].headers[0].col_span, 1);
    assert_eq!(header_ids(&groups[1].headers), vec!["first", "age"]);
}

#[test]
fn test_hidden_group_drops_level() {
    let table = table();
    table.column("first").unwrap().toggle_visibility(&table, Some(false));
    table.column("last").unwrap().toggle_visibility(&table, Some(false));

    let groups = table.header_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(header_ids(&groups[0].headers), vec!["age"]);
}

#[test]
fn test_pinned_header_families() {
    let table = table();
    table.column("age").unwrap().pin(&table, Some(ColumnPinningPosition::Left));

    let left = table.left_header_groups();
    assert_eq!(left.len(), 2);
    assert_eq!(left[0].id, "left_0");
    assert_eq!(header_ids(&left[0].headers), vec!["left_1_age_age"]);
    assert_eq!(header_ids(&left[1].headers), vec!["age"]);

    let center = table.center_header_groups();
    assert_eq!(header_ids(&center[1].headers), vec!["first", "last"]);
    assert!(table.right_header_groups()[0].headers.is_empty());

    // The combined groups put pinned columns first.
    assert_eq!(header_ids(&table.header_groups()[1].headers), vec!["age", "first", "last"]);
}

#[test]
fn test_header_groups_are_cached() {
    let table = table();
    let first = table.header_groups();
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("age")]));

    assert!(Rc::ptr_eq(&first, &table.header_groups()));
    table.column("age").unwrap().toggle_visibility(&table, Some(false));
    assert!(!Rc::ptr_eq(&first, &table.header_groups()));
}

// =============================================================================
// Sizes
// =============================================================================

#[test]
fn test_sizes_and_offsets() {
    let table = table();
    let first = table.column("first").unwrap();
    let age = table.column("age").unwrap();

    assert_eq!(first.size(&table), DEFAULT_COLUMN_SIZE);
    assert_eq!(table.total_size(), 450.0);
    assert_eq!(age.start(&table, ColumnSection::All), 300.0);
    assert_eq!(first.after(&table, ColumnSection::All), 300.0);

    let groups = table.header_groups();
    assert_eq!(groups[0].headers[0].size(&table), 300.0);
    assert_eq!(groups[0].headers[1].start(&table), 300.0);
}

#[test]
fn test_size_clamped_to_bounds() {
    let table = table_with(TableOptions::new(
        people(),
        vec![
            ColumnDef::accessor("first"),
            ColumnDef::accessor("age").with_min_size(50.0).with_max_size(100.0),
        ],
    ));
    let sizes: HashMap<String, f64> = [("first".to_string(), 5.0), ("age".to_string(), 500.0)]
        .into_iter()
        .collect();
    table.set_column_sizing(ColumnSizingState::from(sizes));

    assert_eq!(table.column("first").unwrap().size(&table), DEFAULT_MIN_COLUMN_SIZE);
    assert_eq!(table.column("age").unwrap().size(&table), 100.0);

    table.column("age").unwrap().reset_size(&table);
    assert_eq!(table.column("age").unwrap().size(&table), 100.0);
    table.reset_column_sizing(true);
    assert_eq!(table.column("first").unwrap().size(&table), DEFAULT_COLUMN_SIZE);
}

#[test]
fn test_pinned_total_sizes() {
    let table = table();
    table.column("age").unwrap().pin(&table, Some(ColumnPinningPosition::Right));

    assert_eq!(table.left_total_size(), 0.0);
    assert_eq!(table.center_total_size(), 300.0);
    assert_eq!(table.right_total_size(), 150.0);
}

// =============================================================================
// Resizing
// =============================================================================

#[test]
fn test_resize_on_end() {
    let table = table();
    let header = table.leaf_headers()[0].clone();
    assert_eq!(header.id, "first");

    header.begin_resize(&table, 100.0);
    assert!(header.column.is_resizing(&table));

    table.update_resize(130.0);
    let info = table.slice::<ColumnSizingInfoState>();
    assert_eq!(info.delta_offset, Some(30.0));
    assert_eq!(header.column.size(&table), 150.0);

    table.end_resize(130.0);
    assert_eq!(header.column.size(&table), 180.0);
    assert!(!header.column.is_resizing(&table));
    assert_eq!(*table.slice::<ColumnSizingInfoState>(), ColumnSizingInfoState::default());
}

#[test]
fn test_resize_on_change() {
    let table = table_with(
        TableOptions::new(people(), columns()).with_column_resize_mode(ColumnResizeMode::OnChange),
    );
    let header = table.leaf_headers()[0].clone();

    header.begin_resize(&table, 0.0);
    table.update_resize(-75.0);
    assert_eq!(header.column.size(&table), 75.0);
}

#[test]
fn test_resize_group_header() {
    let table = table();
    let name = table.header_groups()[0].headers[0].clone();

    name.begin_resize(&table, 0.0);
    let info = table.slice::<ColumnSizingInfoState>();
    assert_eq!(info.start_size, Some(300.0));
    assert_eq!(info.column_sizing_start.len(), 2);

    table.end_resize(60.0);
    assert_eq!(table.column("first").unwrap().size(&table), 180.0);
    assert_eq!(table.column("last").unwrap().size(&table), 180.0);
    assert_eq!(table.column("age").unwrap().size(&table), 150.0);
}

#[test]
fn test_resize_disabled() {
    let table = table_with(
        TableOptions::new(people(), vec![ColumnDef::accessor("first").with_enable_resizing(false)]),
    );
    let header = table.leaf_headers()[0].clone();

    assert!(!header.column.can_resize(&table));
    header.begin_resize(&table, 10.0);
    assert_eq!(table.slice::<ColumnSizingInfoState>().is_resizing_column, None);

    // No resize in progress: moving and ending do nothing.
    table.end_resize(50.0);
    assert!(table.slice::<ColumnSizingState>().is_empty());
}
