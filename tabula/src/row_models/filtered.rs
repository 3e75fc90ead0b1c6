//! The filtering stage

use std::rc::Rc;

use crate::features::GLOBAL_FILTER_ID;
use crate::fns::FilterFn;
use crate::memo::Memo;
use crate::model::RowData;
use crate::model::Value;
use crate::state::ColumnFiltersState;
use crate::state::GlobalFilterState;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::RowModelFactory;
use crate::table::RowModelFn;
use crate::table::Table;

/// Column and global filters with their strategies and resolved values.
pub(crate) struct RowFilters {
    columns: Vec<(String, FilterFn, Value)>,
    global: Option<GlobalFilter>,
}

struct GlobalFilter {
    filter_fn: FilterFn,
    value: Value,
    column_ids: Vec<String>,
}

impl RowFilters {
    /// Resolves the filter state against the table's columns. Filters on
    /// unknown columns are skipped, and the global filter only applies when
    /// some column takes part in it.
    pub(crate) fn resolve<T: RowData>(
        table: &Table<T>,
        filters: &ColumnFiltersState,
        global: &GlobalFilterState,
    ) -> Self {
        let columns = filters
            .iter()
            .filter_map(|filter| {
                let Some(column) = table.find_column(&filter.id) else {
                    log::debug!("[filtering] filter on unknown column '{}' skipped", filter.id);
                    return None;
                };
                let filter_fn = column.filter_fn(table);
                let value = filter_fn.resolve_filter_value(&filter.value);
                Some((filter.id.clone(), filter_fn, value))
            })
            .collect();

        let global = global.is_active().then(|| {
            let filter_fn = table.global_filter_fn();
            let value = filter_fn.resolve_filter_value(global);
            let column_ids: Vec<String> = table
                .all_leaf_columns()
                .iter()
                .filter(|column| column.can_global_filter(table))
                .map(|column| column.id.clone())
                .collect();
            GlobalFilter {
                filter_fn,
                value,
                column_ids,
            }
        });

        Self {
            columns,
            global: global.filter(|global| !global.column_ids.is_empty()),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.global.is_none()
    }

    /// Checks one row against every filter except `exclude`, a column id or
    /// the global filter key.
    pub(crate) fn passes<T: RowData>(&self, table: &Table<T>, row: &Row<T>, exclude: Option<&str>) -> bool {
        let columns_pass = self
            .columns
            .iter()
            .filter(|(id, _, _)| Some(id.as_str()) != exclude)
            .all(|(id, filter_fn, value)| filter_fn.matches(&row.value(table, id), value));
        if !columns_pass {
            return false;
        }

        match &self.global {
            Some(global) if exclude != Some(GLOBAL_FILTER_ID) => global
                .column_ids
                .iter()
                .any(|id| global.filter_fn.matches(&row.value(table, id), &global.value)),
            _ => true,
        }
    }
}

/// Keeps the rows `pass` accepts.
///
/// Root-first (the default) drops a row together with its sub-rows.
/// Leaf-first (`filter_from_leaf_rows`) filters sub-rows first and keeps a
/// parent when it passes or any sub-row survived. Both stop descending at
/// `max_leaf_row_filter_depth`.
pub(crate) fn filter_rows<T: RowData>(
    table: &Table<T>,
    rows: &[Rc<Row<T>>],
    pass: impl Fn(&Row<T>) -> bool,
) -> RowModel<T> {
    let options = table.options();
    let from_leaves = options.filter_from_leaf_rows.unwrap_or(false);
    let max_depth = options
        .max_leaf_row_filter_depth
        .unwrap_or(crate::features::DEFAULT_MAX_LEAF_ROW_FILTER_DEPTH);

    let walk = Walk {
        table,
        pass: &pass,
        max_depth,
    };
    let kept = if from_leaves {
        walk.from_leaves(rows, 0)
    } else {
        walk.from_root(rows, 0)
    };
    RowModel::from_rows(kept)
}

struct Walk<'a, T: RowData, P> {
    table: &'a Table<T>,
    pass: &'a P,
    max_depth: usize,
}

impl<T: RowData, P: Fn(&Row<T>) -> bool> Walk<'_, T, P> {
    fn from_root(&self, rows: &[Rc<Row<T>>], depth: usize) -> Vec<Rc<Row<T>>> {
        let mut kept = Vec::new();
        for row in rows {
            if !(self.pass)(row.as_ref()) {
                continue;
            }
            if row.sub_rows.is_empty() || depth >= self.max_depth {
                kept.push(row.clone());
                continue;
            }
            let sub_rows = self.from_root(&row.sub_rows, depth + 1);
            kept.push(
                self.table
                    .construct_row(row.derive(sub_rows, row.depth, row.parent_id.clone())),
            );
        }
        kept
    }

    fn from_leaves(&self, rows: &[Rc<Row<T>>], depth: usize) -> Vec<Rc<Row<T>>> {
        let mut kept = Vec::new();
        for row in rows {
            let sub_rows = if !row.sub_rows.is_empty() && depth < self.max_depth {
                self.from_leaves(&row.sub_rows, depth + 1)
            } else {
                Vec::new()
            };
            let survived = !sub_rows.is_empty();
            let row = self
                .table
                .construct_row(row.derive(sub_rows, row.depth, row.parent_id.clone()));
            if survived || (self.pass)(row.as_ref()) {
                kept.push(row);
            }
        }
        kept
    }
}

/// Creates the filtering stage.
pub fn filtered_row_model<T: RowData>() -> RowModelFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memo: Memo<(Rc<RowModel<T>>, Rc<ColumnFiltersState>, Rc<GlobalFilterState>), Rc<RowModel<T>>> =
            Memo::new("filtered_row_model");
        Rc::new(move |table: &Table<T>| {
            let deps = (
                table.pre_filtered_row_model(),
                table.slice::<ColumnFiltersState>(),
                table.slice::<GlobalFilterState>(),
            );
            memo.get_with_hook(
                deps,
                |(model, filters, global)| {
                    if model.rows.is_empty() {
                        return model.clone();
                    }
                    let filters = RowFilters::resolve(table, filters, global);
                    if filters.is_empty() {
                        return model.clone();
                    }
                    let filtered = filter_rows(table, &model.rows, |row| filters.passes(table, row, None));
                    log::debug!(
                        "[filtering] {} of {} rows pass",
                        filtered.flat_rows.len(),
                        model.flat_rows.len()
                    );
                    Rc::new(filtered)
                },
                |_| table.auto_reset_page_index(),
            )
        }) as RowModelFn<T>
    })
}
