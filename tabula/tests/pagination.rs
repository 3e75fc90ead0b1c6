use tabula::prelude::*;

fn numbered(count: usize) -> Vec<Record> {
    (0..count).map(|n| Record::new().with("n", n)).collect()
}

fn table_with(options: TableOptions<Record>) -> Table<Record> {
    Table::new(options.with_features(stock_features()).with_row_models(RowModels::all())).unwrap()
}

fn table(count: usize) -> Table<Record> {
    table_with(TableOptions::new(numbered(count), vec![ColumnDef::accessor("n")]))
}

fn page_index(table: &Table<Record>) -> usize {
    table.slice::<PaginationState>().page_index
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn test_navigation() {
    let table = table(25);
    assert_eq!(table.page_count(), Some(3));
    assert_eq!(table.page_options(), vec![0, 1, 2]);
    assert!(!table.can_previous_page());
    assert!(table.can_next_page());

    table.next_page();
    assert_eq!(table.row_model().ids()[0], "10");
    assert!(table.can_previous_page());

    table.last_page();
    assert_eq!(page_index(&table), 2);
    assert_eq!(table.row_model().len(), 5);
    assert!(!table.can_next_page());

    table.first_page();
    table.previous_page();
    assert_eq!(page_index(&table), 0);
}

#[test]
fn test_page_past_the_end_is_empty() {
    let table = table(5);
    table.set_page_index(4usize);

    assert_eq!(page_index(&table), 4);
    assert!(table.row_model().rows.is_empty());
}

#[test]
fn test_empty_table() {
    let table = table(0);

    assert_eq!(table.page_count(), Some(0));
    assert!(!table.can_next_page());
    assert!(table.row_model().rows.is_empty());
}

#[test]
fn test_page_size_keeps_top_row() {
    let table = table(25);
    table.set_page_index(2usize);
    table.set_page_size(5usize);

    assert_eq!(*table.slice::<PaginationState>(), PaginationState::new(4, 5));
    assert_eq!(table.row_model().ids()[0], "20");

    table.set_page_size(0usize);
    assert_eq!(*table.slice::<PaginationState>(), PaginationState::new(20, 1));
}

#[test]
fn test_page_index_updater() {
    let table = table(25);
    table.set_page_index(Updater::update(|old: &usize| old + 2));

    assert_eq!(page_index(&table), 2);
}

// =============================================================================
// Resets
// =============================================================================

#[test]
fn test_reset_to_initial_state() {
    let table = table_with(
        TableOptions::new(numbered(25), vec![ColumnDef::accessor("n")])
            .with_initial_state(PartialTableState::new().with(PaginationState::new(1, 5))),
    );
    assert_eq!(table.row_model().ids()[0], "5");

    table.set_pagination(PaginationState::new(3, 2));
    table.reset_page_index(false);
    assert_eq!(page_index(&table), 1);

    table.reset_page_size(false);
    assert_eq!(table.slice::<PaginationState>().page_size, 5);

    table.reset_pagination(true);
    assert_eq!(*table.slice::<PaginationState>(), PaginationState::default());

    table.reset_pagination(false);
    assert_eq!(*table.slice::<PaginationState>(), PaginationState::new(1, 5));
}

#[test]
fn test_reset_page_size_to_default() {
    let table = table(25);
    table.set_page_size(3usize);
    table.reset_page_size(true);

    assert_eq!(table.slice::<PaginationState>().page_size, PaginationState::DEFAULT_PAGE_SIZE);
}

// =============================================================================
// External page counts
// =============================================================================

#[test]
fn test_known_page_count_clamps_index() {
    let table = table_with(
        TableOptions::new(numbered(10), vec![ColumnDef::accessor("n")])
            .with_manual_pagination(true)
            .with_page_count(PageCount::Known(5)),
    );
    table.set_page_index(9usize);

    assert_eq!(page_index(&table), 4);
    assert_eq!(table.page_count(), Some(5));
    // The caller already paged the data.
    assert_eq!(table.row_model().len(), 10);
}

#[test]
fn test_unknown_page_count() {
    let table = table_with(
        TableOptions::new(numbered(10), vec![ColumnDef::accessor("n")])
            .with_manual_pagination(true)
            .with_page_count(PageCount::Unknown),
    );

    assert_eq!(table.page_count(), None);
    assert!(table.page_options().is_empty());
    assert!(table.can_next_page());

    table.set_page_index(7usize);
    table.last_page();
    assert_eq!(page_index(&table), 7);
}

#[test]
fn test_row_count_option() {
    let table = table_with(
        TableOptions::new(numbered(10), vec![ColumnDef::accessor("n")])
            .with_manual_pagination(true)
            .with_row_count(95),
    );

    assert_eq!(table.row_count(), 95);
    assert_eq!(table.page_count(), Some(10));
}

#[test]
fn test_manual_pagination_keeps_page_on_data_change() {
    let table = table_with(
        TableOptions::new(numbered(10), vec![ColumnDef::accessor("n")]).with_manual_pagination(true),
    );
    table.row_model();
    table.set_page_index(3usize);
    table.set_data(numbered(10));
    table.row_model();

    assert_eq!(page_index(&table), 3);
}
