//! Table-wide filtering

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::fns::FilterFn;
use crate::model::RowData;
use crate::model::Value;
use crate::options::ColumnPredicate;
use crate::options::TableOptions;
use crate::state::GlobalFilterState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Column;
use crate::table::Table;

/// Filters rows by one value matched against every eligible column.
pub struct GlobalFiltering;

impl<T: RowData> TableFeature<T> for GlobalFiltering {
    fn id(&self) -> FeatureId {
        FeatureId::GlobalFiltering
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(GlobalFilterState::default());
    }

    fn default_options(&self, options: &mut TableOptions<T>) {
        options
            .get_column_can_global_filter
            .get_or_insert_with(|| Rc::new(first_value_is_text_or_number::<T>) as ColumnPredicate<T>);
    }
}

/// Columns whose first core value is a string or a number take part.
fn first_value_is_text_or_number<T: RowData>(column: &Column<T>, table: &Table<T>) -> bool {
    let model = table.core_row_model();
    let value = model.flat_rows.first().map(|row| row.value(table, &column.id));
    matches!(value, Some(Value::String(_) | Value::Int(_) | Value::Float(_)))
}

impl<T: RowData> Column<T> {
    pub fn can_global_filter(&self, table: &Table<T>) -> bool {
        let options = table.options();
        self.column_def.enable_global_filter.unwrap_or(true)
            && options.enable_global_filter.unwrap_or(true)
            && options.enable_filters.unwrap_or(true)
            && options
                .get_column_can_global_filter
                .as_ref()
                .is_none_or(|can_filter| can_filter(self, table))
            && self.has_accessor()
    }
}

impl<T: RowData> Table<T> {
    /// The global filter strategy; `Auto` is a case-insensitive substring
    /// match.
    pub fn global_filter_fn(&self) -> FilterFn {
        let options = self.options();
        options
            .global_filter_fn
            .resolve(&options.filter_fns, FilterFn::builtin, || Some(FilterFn::includes_string()))
            .unwrap_or_else(FilterFn::includes_string)
    }

    pub fn set_global_filter(&self, updater: impl Into<Updater<GlobalFilterState>>) {
        if self.feature_enabled(FeatureId::GlobalFiltering, "set_global_filter") {
            self.update_slice(updater);
        }
    }

    pub fn reset_global_filter(&self, default: bool) {
        if self.feature_enabled(FeatureId::GlobalFiltering, "reset_global_filter") {
            self.reset_slice::<GlobalFilterState>(default);
        }
    }
}
