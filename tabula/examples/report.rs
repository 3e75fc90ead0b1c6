//! Prints a grouped, sorted and paginated sales report.
//!
//! Pipeline recomputations are logged to stderr at debug level.

use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use tabula::prelude::*;

fn sales() -> Vec<Record> {
    [
        ("north", "widget", 12, 2.5),
        ("north", "gadget", 4, 10.0),
        ("north", "gizmo", 9, 4.25),
        ("south", "widget", 30, 2.5),
        ("south", "gizmo", 2, 4.25),
        ("east", "gadget", 11, 10.0),
        ("east", "widget", 7, 2.5),
        ("east", "doohickey", 1, 99.0),
        ("west", "gizmo", 15, 4.25),
    ]
    .into_iter()
    .map(|(region, product, units, price)| {
        Record::new()
            .with("region", region)
            .with("product", product)
            .with("units", units)
            .with("price", price)
    })
    .collect()
}

fn columns() -> Vec<ColumnDef<Record>> {
    vec![
        ColumnDef::accessor("region").with_header("Region"),
        ColumnDef::accessor("product").with_header("Product"),
        ColumnDef::accessor("units").with_header("Units"),
        ColumnDef::accessor("price")
            .with_header("Avg price")
            .with_aggregation_fn("mean"),
        ColumnDef::accessor_fn("revenue", |record: &Record, _| {
            let units = record.get("units").and_then(Value::as_f64).unwrap_or(0.0);
            let price = record.get("price").and_then(Value::as_f64).unwrap_or(0.0);
            Value::from(units * price)
        })
        .with_header("Revenue"),
    ]
}

fn print_page(table: &Table<Record>) {
    let headers = table.header_groups().last().map(|group| group.headers.clone()).unwrap_or_default();
    let line = headers
        .iter()
        .map(|header| format!("{:<14}", header.column.header()))
        .collect::<String>();
    println!("{line}");

    for row in table.row_model().rows.iter() {
        let line = row
            .visible_cells(table)
            .iter()
            .map(|cell| {
                let text = if cell.is_placeholder(table) {
                    String::new()
                } else if cell.is_grouped(table) {
                    format!("{} ({})", cell.value(table), row.sub_rows.len())
                } else {
                    cell.value(table).to_string()
                };
                let indent = if cell.is_grouped(table) { 0 } else { row.depth * 2 };
                format!("{:indent$}{:<width$}", "", text, width = 14 - indent.min(14))
            })
            .collect::<String>();
        println!("{line}");
    }
}

fn main() -> Result<(), TableError> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("Failed to initialize logger");

    let table = Table::new(
        TableOptions::new(sales(), columns())
            .with_features(stock_features())
            .with_row_models(RowModels::all())
            .with_initial_state(
                PartialTableState::new()
                    .with(GroupingState::from(vec!["region"]))
                    .with(SortingState::from(vec![ColumnSort::desc("revenue")]))
                    .with(PaginationState::new(0, 6)),
            ),
    )?;
    table.toggle_all_rows_expanded(Some(true));

    loop {
        let pagination = table.slice::<PaginationState>();
        println!(
            "\npage {} of {}",
            pagination.page_index + 1,
            table.page_count().unwrap_or(1)
        );
        print_page(&table);
        if !table.can_next_page() {
            break;
        }
        table.next_page();
    }

    let units = table
        .column("units")
        .ok_or_else(|| TableError::feature("report", "missing units column"))?;
    units.toggle_sorting(&table, Some(true), false);
    table.first_page();
    println!("\nresorted by units:");
    print_page(&table);

    Ok(())
}
