//! The sorting stage

use std::cmp::Ordering;
use std::rc::Rc;

use crate::features::SortUndefined;
use crate::fns::SortingFn;
use crate::memo::Memo;
use crate::model::RowData;
use crate::state::SortingState;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::RowModelFactory;
use crate::table::RowModelFn;
use crate::table::Table;

/// One sort criterion with its column settings resolved.
struct SortKey {
    column_id: String,
    desc: bool,
    invert: bool,
    sort_undefined: SortUndefined,
    sorting_fn: SortingFn,
}

impl SortKey {
    /// Orders two rows by this key. `Equal` hands over to the next key.
    fn compare<T: RowData>(&self, table: &Table<T>, a: &Row<T>, b: &Row<T>) -> Ordering {
        let a_value = a.value(table, &self.column_id);
        let b_value = b.value(table, &self.column_id);
        let (a_missing, b_missing) = (a_value.is_null(), b_value.is_null());

        let mut ordering = Ordering::Equal;
        if a_missing != b_missing {
            // A missing value sorts high unless placed explicitly.
            let missing_high = if a_missing { Ordering::Greater } else { Ordering::Less };
            match self.sort_undefined {
                SortUndefined::First => return missing_high.reverse(),
                SortUndefined::Last => return missing_high,
                SortUndefined::AsHighest => ordering = missing_high,
                SortUndefined::AsLowest => ordering = missing_high.reverse(),
                SortUndefined::Disabled => {}
            }
        }
        if ordering == Ordering::Equal {
            ordering = self.sorting_fn.compare(&a_value, &b_value);
        }
        if self.desc {
            ordering = ordering.reverse();
        }
        if self.invert {
            ordering = ordering.reverse();
        }
        ordering
    }
}

fn sort_rows<T: RowData>(table: &Table<T>, rows: &[Rc<Row<T>>], keys: &[SortKey]) -> Vec<Rc<Row<T>>> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(table, a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.index.cmp(&b.index))
    });
    sorted
        .into_iter()
        .map(|row| {
            if row.sub_rows.is_empty() {
                return row;
            }
            let sub_rows = sort_rows(table, &row.sub_rows, keys);
            table.construct_row(row.derive(sub_rows, row.depth, row.parent_id.clone()))
        })
        .collect()
}

/// Creates the sorting stage.
///
/// Criteria on unknown or unsortable columns are skipped. Rows that compare
/// equal on every criterion keep their source order, and sub-rows are sorted
/// within their parent.
pub fn sorted_row_model<T: RowData>() -> RowModelFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memo: Memo<(Rc<SortingState>, Rc<RowModel<T>>), Rc<RowModel<T>>> = Memo::new("sorted_row_model");
        Rc::new(move |table: &Table<T>| {
            let deps = (table.slice::<SortingState>(), table.pre_sorted_row_model());
            memo.get_with_hook(
                deps,
                |(sorting, model)| {
                    if model.rows.is_empty() || sorting.is_empty() {
                        return model.clone();
                    }
                    let keys: Vec<SortKey> = sorting
                        .iter()
                        .filter_map(|sort| {
                            let column = table.find_column(&sort.id)?;
                            column.can_sort(table).then(|| SortKey {
                                column_id: sort.id.clone(),
                                desc: sort.desc,
                                invert: column.column_def.invert_sorting.unwrap_or(false),
                                sort_undefined: column.column_def.sort_undefined.unwrap_or_default(),
                                sorting_fn: column.sorting_fn(table),
                            })
                        })
                        .collect();
                    if keys.is_empty() {
                        return model.clone();
                    }

                    log::debug!("[sorting] sorting {} rows by {} criteria", model.flat_rows.len(), keys.len());
                    Rc::new(RowModel::from_rows(sort_rows(table, &model.rows, &keys)))
                },
                |_| table.auto_reset_page_index(),
            )
        }) as RowModelFn<T>
    })
}
