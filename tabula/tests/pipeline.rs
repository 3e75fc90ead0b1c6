use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use tabula::memo::Memo;
use tabula::prelude::*;
use tabula::table::RowModelFactory;
use tabula::table::RowModelFn;

fn people() -> Vec<Record> {
    vec![
        Record::new().with("id", 1).with("age", 30).with("status", "A"),
        Record::new().with("id", 2).with("age", 20).with("status", "B"),
        Record::new().with("id", 3).with("age", 25).with("status", "A"),
    ]
}

fn numbered(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| Record::new().with("id", i).with("age", 20 + (i % 7)))
        .collect()
}

fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        ColumnDef::accessor("id"),
        ColumnDef::accessor("age"),
        ColumnDef::accessor("status"),
    ]
}

fn table(data: Vec<Record>) -> Table<Record> {
    Table::new(
        TableOptions::new(data, columns())
            .with_features(stock_features())
            .with_row_models(RowModels::all()),
    )
    .unwrap()
}

fn values(table: &Table<Record>, rows: &[Rc<Row<Record>>], column_id: &str) -> Vec<String> {
    rows.iter().map(|row| row.value(table, column_id).to_string()).collect()
}

/// Checks that `flat_rows` is the deduplicated pre-order walk of `rows` and
/// that `rows_by_id` indexes exactly those rows.
fn assert_consistent(model: &RowModel<Record>) {
    fn visit(row: &Rc<Row<Record>>, seen: &mut HashSet<String>, order: &mut Vec<String>) {
        if !seen.insert(row.id.clone()) {
            return;
        }
        order.push(row.id.clone());
        for sub_row in &row.sub_rows {
            visit(sub_row, seen, order);
        }
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for row in &model.rows {
        visit(row, &mut seen, &mut order);
    }
    let flat: Vec<String> = model.flat_rows.iter().map(|row| row.id.clone()).collect();
    assert_eq!(flat, order);
    assert_eq!(model.rows_by_id.len(), model.flat_rows.len());
    for row in &model.flat_rows {
        assert!(Rc::ptr_eq(&model.rows_by_id[&row.id], row));
    }
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[test]
fn test_sorting_by_age_ascending() {
    let table = table(people());
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("age")]));

    let model = table.sorted_row_model();
    assert_eq!(values(&table, &model.rows, "id"), vec!["2", "3", "1"]);
    assert_eq!(model.ids(), vec!["1", "2", "0"]);
}

#[test]
fn test_grouping_by_status() {
    let data = vec![
        Record::new().with("id", 1).with("status", "A"),
        Record::new().with("id", 2).with("status", "B"),
        Record::new().with("id", 3).with("status", "A"),
        Record::new().with("id", 4).with("status", "B"),
    ];
    let table = table(data);
    table.set_grouping(GroupingState::from(vec!["status"]));

    let model = table.grouped_row_model();
    assert_eq!(model.rows.len(), 2);
    assert_eq!(model.ids(), vec!["status:A", "status:B"]);
    assert_eq!(model.rows[0].sub_rows.len(), 2);
    assert_eq!(model.rows[1].sub_rows.len(), 2);
    assert_eq!(model.flat_rows.len(), 6);
}

#[test]
fn test_pagination_pages() {
    let table = table(numbered(25));

    assert_eq!(table.row_model().rows.len(), 10);
    assert_eq!(table.page_count(), Some(3));

    table.set_page_index(2usize);
    let page = table.row_model();
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.rows[0].id, "20");
}

#[test]
fn test_partial_selection() {
    let table = table(people());
    table.set_row_selection(RowSelectionState::from(vec!["0"]));

    assert!(!table.is_all_rows_selected());
    assert!(table.is_some_rows_selected());
    assert_eq!(table.selected_row_model().flat_rows.len(), 1);
}

// =============================================================================
// Stage forwarding and memoization
// =============================================================================

#[test]
fn test_stages_forward_without_state() {
    let table = table(people());
    let core = table.core_row_model();

    assert!(Rc::ptr_eq(&table.filtered_row_model(), &core));
    assert!(Rc::ptr_eq(&table.grouped_row_model(), &core));
    assert!(Rc::ptr_eq(&table.sorted_row_model(), &core));
    assert!(Rc::ptr_eq(&table.expanded_row_model(), &core));
}

#[test]
fn test_missing_stages_forward() {
    let table = Table::new(TableOptions::new(people(), columns()).with_features(stock_features())).unwrap();
    table.set_sorting(SortingState::from(vec![ColumnSort::asc("age")]));

    // No sorted stage configured: the sort state is ignored.
    let model = table.row_model();
    assert!(Rc::ptr_eq(&model, &table.core_row_model()));
    assert_eq!(model.ids(), vec!["0", "1", "2"]);
}

#[test]
fn test_repeated_reads_share_result() {
    let table = table(people());
    table.set_sorting(SortingState::from(vec![ColumnSort::desc("age")]));

    let first = table.sorted_row_model();
    let second = table.sorted_row_model();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn test_unrelated_state_keeps_result() {
    let table = table(people());
    table.set_sorting(SortingState::from(vec![ColumnSort::desc("age")]));
    let before = table.sorted_row_model();

    table.set_column_sizing(ColumnSizingState::from(
        [("age".to_string(), 200.0)].into_iter().collect::<std::collections::HashMap<_, _>>(),
    ));
    let after = table.sorted_row_model();
    assert!(Rc::ptr_eq(&before, &after));

    table.set_sorting(SortingState::from(vec![ColumnSort::asc("age")]));
    assert!(!Rc::ptr_eq(&before, &table.sorted_row_model()));
}

#[test]
fn test_custom_stage_computes_once_per_input() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let reversed: RowModelFactory<Record> = Rc::new(move |_table: &Table<Record>| {
        let memo: Memo<(Rc<RowModel<Record>>,), Rc<RowModel<Record>>> = Memo::new("reversed");
        let counter = counter.clone();
        Rc::new(move |table: &Table<Record>| {
            memo.get((table.pre_sorted_row_model(),), |(model,)| {
                counter.set(counter.get() + 1);
                let mut rows = model.rows.clone();
                rows.reverse();
                Rc::new(RowModel::from_rows(rows))
            })
        }) as RowModelFn<Record>
    });

    let table = Table::new(
        TableOptions::new(people(), columns())
            .with_features(stock_features())
            .with_row_models(RowModels::all().with_sorted(reversed)),
    )
    .unwrap();

    assert_eq!(table.row_model().ids(), vec!["2", "1", "0"]);
    table.row_model();
    table.sorted_row_model();
    assert_eq!(runs.get(), 1);

    table.set_column_visibility(ColumnVisibilityState::from(
        [("age".to_string(), false)].into_iter().collect::<std::collections::HashMap<_, _>>(),
    ));
    table.row_model();
    assert_eq!(runs.get(), 1);

    table.set_column_filters(ColumnFiltersState::from(vec![ColumnFilter::new("status", "A")]));
    assert_eq!(table.row_model().ids(), vec!["2", "0"]);
    assert_eq!(runs.get(), 2);
}

// =============================================================================
// Row model shape
// =============================================================================

fn tree() -> Vec<Record> {
    vec![
        Record::new().with("id", 1).with("age", 40).with("status", "A").with_children(vec![
            Record::new().with("id", 11).with("age", 12).with("status", "A"),
            Record::new().with("id", 12).with("age", 8).with("status", "B"),
        ]),
        Record::new().with("id", 2).with("age", 35).with("status", "B").with_children(vec![
            Record::new().with("id", 21).with("age", 5).with("status", "A"),
        ]),
        Record::new().with("id", 3).with("age", 50).with("status", "A"),
    ]
}

fn tree_table() -> Table<Record> {
    Table::new(
        TableOptions::new(tree(), columns())
            .with_features(stock_features())
            .with_row_models(RowModels::all())
            .with_sub_rows(|record: &Record| Some(record.children())),
    )
    .unwrap()
}

#[test]
fn test_core_rows_follow_source_tree() {
    let table = tree_table();
    let core = table.core_row_model();

    assert_eq!(core.ids(), vec!["0", "1", "2"]);
    let flat: Vec<&str> = core.flat_rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(flat, vec!["0", "0.0", "0.1", "1", "1.0", "2"]);

    let child = core.row("0.1").unwrap();
    assert_eq!(child.depth, 1);
    assert_eq!(child.index, 1);
    assert_eq!(child.parent_id.as_deref(), Some("0"));
    assert_eq!(child.parent_row(&table).unwrap().id, "0");
    assert_consistent(&core);
}

#[test]
fn test_every_stage_keeps_flat_rows_in_pre_order() {
    let table = tree_table();
    table.set_column_filters(ColumnFiltersState::from(vec![ColumnFilter::new("status", "A")]));
    table.set_sorting(SortingState::from(vec![ColumnSort::desc("age")]));
    table.set_expanded(ExpandedState::All);
    table.set_pagination(PaginationState::new(0, 3));

    assert_consistent(&table.core_row_model());
    assert_consistent(&table.filtered_row_model());
    assert_consistent(&table.sorted_row_model());
    assert_consistent(&table.row_model());

    // Root mode: row "1" (status B) is dropped with its subtree.
    let filtered = table.filtered_row_model();
    assert_eq!(filtered.ids(), vec!["0", "2"]);
    let flat: Vec<&str> = filtered.flat_rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(flat, vec!["0", "0.0", "2"]);

    let expanded = table.expanded_row_model();
    let display: Vec<&str> = expanded.rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(display, vec!["2", "0", "0.0"]);
}

#[test]
fn test_row_lookup() {
    let table = tree_table();
    table.set_pagination(PaginationState::new(0, 1));

    assert_eq!(table.row("0.1", false).unwrap().id, "0.1");
    assert_eq!(table.row("1", true).unwrap().id, "1");
    assert_eq!(
        table.row("9", true).unwrap_err(),
        TableError::RowNotFound("9".to_string())
    );
}

#[test]
fn test_custom_row_ids() {
    let table = Table::new(
        TableOptions::new(people(), columns())
            .with_features(stock_features())
            .with_row_models(RowModels::all())
            .with_get_row_id(|record: &Record, _index, _parent| {
                record.get("id").map(|id| format!("p{id}")).unwrap_or_default()
            }),
    )
    .unwrap();

    assert_eq!(table.core_row_model().ids(), vec!["p1", "p2", "p3"]);
}

// =============================================================================
// Data changes and auto reset
// =============================================================================

#[test]
fn test_filter_change_returns_to_first_page() {
    let table = table(numbered(25));
    table.row_model();
    table.set_page_index(2usize);
    assert_eq!(table.row_model().rows.len(), 5);

    table.set_column_filters(ColumnFiltersState::from(vec![ColumnFilter::new(
        "age",
        Value::List(vec![Value::from(20), Value::from(23)]),
    )]));
    table.row_model();
    assert_eq!(table.slice::<PaginationState>().page_index, 0);
}

#[test]
fn test_set_data_returns_to_first_page() {
    let table = table(numbered(25));
    table.row_model();
    table.set_page_index(1usize);

    table.set_data(numbered(30));
    table.row_model();
    assert_eq!(table.slice::<PaginationState>().page_index, 0);
    assert_eq!(table.core_row_model().rows.len(), 30);
}

#[test]
fn test_first_read_does_not_reset() {
    let table = table(numbered(25));
    table.set_page_index(2usize);

    assert_eq!(table.row_model().rows.len(), 5);
    assert_eq!(table.slice::<PaginationState>().page_index, 2);
}

#[test]
fn test_auto_reset_can_be_disabled() {
    let table = Table::new(
        TableOptions::new(numbered(25), columns())
            .with_features(stock_features())
            .with_row_models(RowModels::all())
            .with_auto_reset_page_index(false),
    )
    .unwrap();
    table.row_model();
    table.set_page_index(2usize);

    table.set_data(numbered(24));
    table.row_model();
    assert_eq!(table.slice::<PaginationState>().page_index, 2);
}
