//! Per-column filtering

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::fns::FilterFn;
use crate::model::RowData;
use crate::model::Value;
use crate::options::TableOptions;
use crate::state::ColumnFilter;
use crate::state::ColumnFiltersState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Column;
use crate::table::RowModel;
use crate::table::Table;

/// Default depth limit of leaf-first filtering.
pub const DEFAULT_MAX_LEAF_ROW_FILTER_DEPTH: usize = 100;

/// Filters rows by per-column filter values.
pub struct ColumnFiltering;

impl<T: RowData> TableFeature<T> for ColumnFiltering {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnFiltering
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(ColumnFiltersState::default());
    }

    fn default_options(&self, options: &mut TableOptions<T>) {
        options.filter_from_leaf_rows.get_or_insert(false);
        options
            .max_leaf_row_filter_depth
            .get_or_insert(DEFAULT_MAX_LEAF_ROW_FILTER_DEPTH);
    }
}

impl<T: RowData> Column<T> {
    /// The filter strategy, inferred from the first core row for `Auto`.
    pub fn filter_fn(&self, table: &Table<T>) -> FilterFn {
        let strategy = self.column_def.filter_fn.clone().unwrap_or_default();
        let options = table.options();
        strategy
            .resolve(&options.filter_fns, FilterFn::builtin, || Some(self.auto_filter_fn(table)))
            .unwrap_or_else(FilterFn::weak_equals)
    }

    /// Picks a strategy from the first core row's value.
    pub fn auto_filter_fn(&self, table: &Table<T>) -> FilterFn {
        let model = table.core_row_model();
        let value = model
            .flat_rows
            .first()
            .map(|row| row.value(table, &self.id))
            .unwrap_or_default();
        match value {
            Value::String(_) => FilterFn::includes_string(),
            Value::Int(_) | Value::Float(_) => FilterFn::in_number_range(),
            Value::Bool(_) | Value::DateTime(_) | Value::Map(_) => FilterFn::equals(),
            Value::List(_) => FilterFn::arr_includes(),
            Value::Null => FilterFn::weak_equals(),
        }
    }

    pub fn can_filter(&self, table: &Table<T>) -> bool {
        let options = table.options();
        self.column_def.enable_column_filter.unwrap_or(true)
            && options.enable_column_filters.unwrap_or(true)
            && options.enable_filters.unwrap_or(true)
            && self.has_accessor()
    }

    pub fn is_filtered(&self, table: &Table<T>) -> bool {
        self.filter_index(table).is_some()
    }

    /// The active filter value for this column.
    pub fn filter_value(&self, table: &Table<T>) -> Option<Value> {
        table
            .slice::<ColumnFiltersState>()
            .iter()
            .find(|filter| filter.id == self.id)
            .map(|filter| filter.value.clone())
    }

    /// Position of this column's filter in the filter list.
    pub fn filter_index(&self, table: &Table<T>) -> Option<usize> {
        table
            .slice::<ColumnFiltersState>()
            .iter()
            .position(|filter| filter.id == self.id)
    }

    /// Sets this column's filter value. The updater sees the current value,
    /// or `Null` when unfiltered; a value the strategy treats as empty
    /// removes the filter.
    pub fn set_filter_value(&self, table: &Table<T>, updater: impl Into<Updater<Value>>) {
        let filter_fn = self.filter_fn(table);
        let id = self.id.clone();
        let updater = updater.into();
        table.set_column_filters(Updater::update(move |old: &ColumnFiltersState| {
            let previous = old.iter().find(|filter| filter.id == id);
            let value = updater.resolve(&previous.map(|filter| filter.value.clone()).unwrap_or_default());

            if filter_fn.should_auto_remove(&value) {
                return ColumnFiltersState::from(
                    old.iter().filter(|filter| filter.id != id).cloned().collect::<Vec<_>>(),
                );
            }
            let next = ColumnFilter { id: id.clone(), value };
            let mut filters = old.to_vec();
            match filters.iter_mut().find(|filter| filter.id == id) {
                Some(existing) => *existing = next,
                None => filters.push(next),
            }
            ColumnFiltersState::from(filters)
        }));
    }
}

impl<T: RowData> Table<T> {
    /// Replaces the column filters. Filters whose value the column's
    /// strategy treats as empty are dropped.
    pub fn set_column_filters(&self, updater: impl Into<Updater<ColumnFiltersState>>) {
        if !self.feature_enabled(FeatureId::ColumnFiltering, "set_column_filters") {
            return;
        }
        let next = updater.into().resolve(&self.slice::<ColumnFiltersState>());
        let leaves = self.all_leaf_columns();
        let kept: Vec<ColumnFilter> = next
            .iter()
            .filter(|filter| {
                match leaves.iter().find(|column| column.id == filter.id) {
                    Some(column) => !column.filter_fn(self).should_auto_remove(&filter.value),
                    None => true,
                }
            })
            .cloned()
            .collect();
        self.update_slice(ColumnFiltersState::from(kept));
    }

    pub fn reset_column_filters(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnFiltering, "reset_column_filters") {
            self.reset_slice::<ColumnFiltersState>(default);
        }
    }

    /// Input of the filtering stage.
    pub fn pre_filtered_row_model(&self) -> Rc<RowModel<T>> {
        self.core_row_model()
    }

    /// Rows passing every column filter and the global filter.
    pub fn filtered_row_model(&self) -> Rc<RowModel<T>> {
        let options = self.options();
        let installed = self.has_feature(FeatureId::ColumnFiltering) || self.has_feature(FeatureId::GlobalFiltering);
        self.stage(
            &self.stages.filtered,
            options.row_models.filtered.clone(),
            options.manual_filtering || !installed,
            Self::pre_filtered_row_model,
        )
    }
}
