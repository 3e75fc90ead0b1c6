//! The expanding stage

use std::rc::Rc;

use crate::memo::Memo;
use crate::model::RowData;
use crate::state::ExpandedState;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::RowModelFactory;
use crate::table::RowModelFn;
use crate::table::Table;

/// Flattens rows into a display list: each row, followed by the display
/// list of its sub-rows when it is expanded.
pub(crate) fn expand_rows<T: RowData>(table: &Table<T>, rows: &[Rc<Row<T>>]) -> Vec<Rc<Row<T>>> {
    fn visit<T: RowData>(table: &Table<T>, row: &Rc<Row<T>>, display: &mut Vec<Rc<Row<T>>>) {
        display.push(row.clone());
        if !row.sub_rows.is_empty() && row.is_expanded(table) {
            for sub_row in &row.sub_rows {
                visit(table, sub_row, display);
            }
        }
    }

    let mut display = Vec::with_capacity(rows.len());
    for row in rows {
        visit(table, row, &mut display);
    }
    display
}

/// Creates the expanding stage.
///
/// Forwards its input while nothing is expanded, and when expanded rows are
/// not paginated (pagination expands each page instead).
pub fn expanded_row_model<T: RowData>() -> RowModelFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memo: Memo<(Rc<ExpandedState>, Rc<RowModel<T>>, bool), Rc<RowModel<T>>> =
            Memo::new("expanded_row_model");
        Rc::new(move |table: &Table<T>| {
            let deps = (
                table.slice::<ExpandedState>(),
                table.pre_expanded_row_model(),
                table.options().paginate_expanded_rows.unwrap_or(true),
            );
            memo.get(deps, |(expanded, model, paginate_expanded_rows)| {
                if model.rows.is_empty() || expanded.is_empty() || !paginate_expanded_rows {
                    return model.clone();
                }
                Rc::new(RowModel {
                    rows: expand_rows(table, &model.rows),
                    flat_rows: model.flat_rows.clone(),
                    rows_by_id: model.rows_by_id.clone(),
                })
            })
        }) as RowModelFn<T>
    })
}
