//! Column grouping and aggregation

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::fns::AggregationFn;
use crate::model::RowData;
use crate::model::Value;
use crate::state::GroupingState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Cell;
use crate::table::Column;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::Table;

/// Groups rows by the values of one or more columns.
pub struct ColumnGrouping;

impl<T: RowData> TableFeature<T> for ColumnGrouping {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnGrouping
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(GroupingState::default());
    }
}

impl<T: RowData> Column<T> {
    /// Adds this column to the grouping, or removes it.
    pub fn toggle_grouping(&self, table: &Table<T>) {
        let id = self.id.clone();
        table.set_grouping(Updater::update(move |old: &GroupingState| {
            let mut next = old.clone();
            match next.iter().position(|grouped| grouped == &id) {
                Some(position) => {
                    next.remove(position);
                }
                None => next.push(id),
            }
            next
        }));
    }

    pub fn can_group(&self, table: &Table<T>) -> bool {
        self.column_def.enable_grouping.unwrap_or(true)
            && table.options().enable_grouping.unwrap_or(true)
            && (self.has_accessor() || self.column_def.get_grouping_value.is_some())
    }

    pub fn is_grouped(&self, table: &Table<T>) -> bool {
        table.slice::<GroupingState>().contains(&self.id)
    }

    /// Position of this column in the grouping.
    pub fn grouped_index(&self, table: &Table<T>) -> Option<usize> {
        table.slice::<GroupingState>().iter().position(|id| id == &self.id)
    }

    /// The aggregation strategy. `Auto` sums numbers and takes the extent
    /// of datetimes; other columns are not aggregated.
    pub fn aggregation_fn(&self, table: &Table<T>) -> Option<AggregationFn> {
        let strategy = self.column_def.aggregation_fn.clone().unwrap_or_default();
        let options = table.options();
        strategy.resolve(&options.aggregation_fns, AggregationFn::builtin, || {
            self.auto_aggregation_fn(table)
        })
    }

    pub fn auto_aggregation_fn(&self, table: &Table<T>) -> Option<AggregationFn> {
        let model = table.core_row_model();
        match model.flat_rows.first().map(|row| row.value(table, &self.id)) {
            Some(Value::Int(_) | Value::Float(_)) => Some(AggregationFn::sum()),
            Some(Value::DateTime(_)) => Some(AggregationFn::extent()),
            _ => None,
        }
    }
}

impl<T: RowData> Row<T> {
    /// Returns `true` for a group row.
    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    /// The column a group row groups by.
    pub fn grouping_column_id(&self) -> Option<&str> {
        self.group.as_ref().map(|group| group.column_id.as_str())
    }

    /// The shared value of a group row.
    pub fn group_value(&self) -> Option<&Value> {
        self.group.as_ref().map(|group| &group.value)
    }

    /// Source rows under a group row, at any depth.
    pub fn group_leaf_rows(&self) -> Vec<Rc<Row<T>>> {
        self.group
            .as_ref()
            .map(|group| group.leaf_rows.clone())
            .unwrap_or_default()
    }

    /// The value rows are grouped by: the column's `get_grouping_value`, or
    /// the cell value.
    pub fn grouping_value(&self, table: &Table<T>, column_id: &str) -> Value {
        let grouping_value = table
            .find_column(column_id)
            .and_then(|column| column.column_def.get_grouping_value.clone());
        match grouping_value {
            Some(grouping_value) => self.cached_grouping_value(column_id, || grouping_value(&self.original)),
            None => self.value(table, column_id),
        }
    }
}

impl<T: RowData> Cell<T> {
    /// The cell showing a group row's grouping value.
    pub fn is_grouped(&self, table: &Table<T>) -> bool {
        self.column.is_grouped(table) && self.row.grouping_column_id() == Some(self.column.id.as_str())
    }

    /// A grouped column's cell on a row grouped by another column.
    pub fn is_placeholder(&self, table: &Table<T>) -> bool {
        !self.is_grouped(table) && self.column.is_grouped(table)
    }

    /// A cell holding an aggregate of the row's sub-rows.
    pub fn is_aggregated(&self, table: &Table<T>) -> bool {
        !self.is_grouped(table) && !self.is_placeholder(table) && !self.row.sub_rows.is_empty()
    }
}

impl<T: RowData> Table<T> {
    pub fn set_grouping(&self, updater: impl Into<Updater<GroupingState>>) {
        if self.feature_enabled(FeatureId::ColumnGrouping, "set_grouping") {
            self.update_slice(updater);
        }
    }

    pub fn reset_grouping(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnGrouping, "reset_grouping") {
            self.reset_slice::<GroupingState>(default);
        }
    }

    /// Input of the grouping stage.
    pub fn pre_grouped_row_model(&self) -> Rc<RowModel<T>> {
        self.filtered_row_model()
    }

    /// Rows nested under one group row per distinct grouping value.
    pub fn grouped_row_model(&self) -> Rc<RowModel<T>> {
        let options = self.options();
        let bypass = options.manual_grouping || !self.has_feature(FeatureId::ColumnGrouping);
        self.stage(
            &self.stages.grouped,
            options.row_models.grouped.clone(),
            bypass,
            Self::pre_grouped_row_model,
        )
    }
}
