//! Faceting: per-column filtered rows, unique values and numeric ranges

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::RowFilters;
use super::filter_rows;
use crate::feature::FeatureId;
use crate::features::GLOBAL_FILTER_ID;
use crate::memo::Memo;
use crate::model::RowData;
use crate::model::Value;
use crate::state::ColumnFiltersState;
use crate::state::GlobalFilterState;
use crate::table::FacetedMinMax;
use crate::table::FacetedMinMaxFactory;
use crate::table::FacetedMinMaxFn;
use crate::table::FacetedRowModelFactory;
use crate::table::FacetedRowModelFn;
use crate::table::FacetedUniqueValues;
use crate::table::FacetedUniqueValuesFactory;
use crate::table::FacetedUniqueValuesFn;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::Table;

/// One memo per column id, created on first use.
struct MemoMap<D, R> {
    key: &'static str,
    memos: RefCell<HashMap<String, Rc<Memo<D, R>>>>,
}

impl<D: crate::memo::Dependency, R: Clone> MemoMap<D, R> {
    fn new(key: &'static str) -> Self {
        Self {
            key,
            memos: RefCell::new(HashMap::new()),
        }
    }

    fn memo(&self, column_id: &str) -> Rc<Memo<D, R>> {
        self.memos
            .borrow_mut()
            .entry(column_id.to_string())
            .or_insert_with(|| Rc::new(Memo::new(self.key)))
            .clone()
    }
}

/// The faceted rows a column's values are counted over.
fn faceted_rows<T: RowData>(table: &Table<T>, column_id: &str) -> Rc<RowModel<T>> {
    let feature = if column_id == GLOBAL_FILTER_ID {
        FeatureId::GlobalFaceting
    } else {
        FeatureId::ColumnFaceting
    };
    table.faceted_row_model_for(column_id, feature)
}

/// The values a row contributes to a facet. The global facet collects the
/// values of every column that takes part in the global filter.
fn facet_values<T: RowData>(table: &Table<T>, row: &Row<T>, column_id: &str) -> Vec<Value> {
    if column_id != GLOBAL_FILTER_ID {
        return row.unique_values(table, column_id).to_vec();
    }
    table
        .all_leaf_columns()
        .iter()
        .filter(|column| column.can_global_filter(table))
        .flat_map(|column| row.unique_values(table, &column.id).to_vec())
        .collect()
}

/// Creates the faceted row model: pre-filtered rows filtered by every
/// active filter except the faceted column's own (or, for the global facet,
/// except the global filter).
pub fn faceted_row_model<T: RowData>() -> FacetedRowModelFactory<T> {
    type Deps<T> = (Rc<RowModel<T>>, Rc<ColumnFiltersState>, Rc<GlobalFilterState>);

    Rc::new(|_table: &Table<T>| {
        let memos: MemoMap<Deps<T>, Rc<RowModel<T>>> = MemoMap::new("faceted_row_model");
        Rc::new(move |table: &Table<T>, column_id: &str| {
            let deps = (
                table.pre_filtered_row_model(),
                table.slice::<ColumnFiltersState>(),
                table.slice::<GlobalFilterState>(),
            );
            memos.memo(column_id).get(deps, |(model, filters, global)| {
                if model.rows.is_empty() {
                    return model.clone();
                }
                let filters = RowFilters::resolve(table, filters, global);
                if filters.is_empty() {
                    return model.clone();
                }
                Rc::new(filter_rows(table, &model.rows, |row| {
                    filters.passes(table, row, Some(column_id))
                }))
            })
        }) as FacetedRowModelFn<T>
    })
}

/// Creates the unique-values facet: each distinct value among the faceted
/// rows with its number of occurrences, in first-seen order.
pub fn faceted_unique_values<T: RowData>() -> FacetedUniqueValuesFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memos: MemoMap<(Rc<RowModel<T>>,), FacetedUniqueValues> = MemoMap::new("faceted_unique_values");
        Rc::new(move |table: &Table<T>, column_id: &str| {
            let deps = (faceted_rows(table, column_id),);
            memos.memo(column_id).get(deps, |(model,)| {
                let mut counts: Vec<(Value, usize)> = Vec::new();
                let mut positions: HashMap<String, usize> = HashMap::new();
                for row in &model.flat_rows {
                    for value in facet_values(table, row, column_id) {
                        let identity = value.identity();
                        match positions.get(&identity) {
                            Some(&position) => counts[position].1 += 1,
                            None => {
                                positions.insert(identity, counts.len());
                                counts.push((value, 1));
                            }
                        }
                    }
                }
                Rc::from(counts)
            })
        }) as FacetedUniqueValuesFn<T>
    })
}

/// Creates the min/max facet over the numeric values of the faceted rows.
/// Values that are not numbers are skipped; no numbers gives `None`.
pub fn faceted_min_max_values<T: RowData>() -> FacetedMinMaxFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memos: MemoMap<(Rc<RowModel<T>>,), FacetedMinMax> = MemoMap::new("faceted_min_max_values");
        Rc::new(move |table: &Table<T>, column_id: &str| {
            let deps = (faceted_rows(table, column_id),);
            memos.memo(column_id).get(deps, |(model,)| {
                model
                    .flat_rows
                    .iter()
                    .flat_map(|row| facet_values(table, row, column_id))
                    .filter_map(|value| value.to_number())
                    .fold(None, |range, number| match range {
                        None => Some((number, number)),
                        Some((min, max)) => Some((f64::min(min, number), f64::max(max, number))),
                    })
            })
        }) as FacetedMinMaxFn<T>
    })
}
