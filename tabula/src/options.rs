//! Table configuration

use std::collections::HashMap;
use std::rc::Rc;

use crate::feature::TableFeature;
use crate::fns::AggregationFn;
use crate::fns::FilterFn;
use crate::fns::SortingFn;
use crate::fns::Strategy;
use crate::memo::Dependency;
use crate::model::RowData;
use crate::model::Value;
use crate::state::PartialTableState;
use crate::state::StateControls;
use crate::state::StateSlice;
use crate::state::TableState;
use crate::table::Column;
use crate::table::ColumnDef;
use crate::table::Row;
use crate::table::RowModels;
use crate::table::Table;

/// Builds a row id from the record, its index among its siblings and its
/// parent row.
pub type GetRowId<T> = Rc<dyn Fn(&T, usize, Option<&Row<T>>) -> String>;

/// Returns the child records of a record.
pub type GetSubRows<T> = Rc<dyn for<'a> Fn(&'a T) -> Option<&'a [T]>>;

/// A per-row decision.
pub type RowPredicate<T> = Rc<dyn Fn(&Row<T>) -> bool>;

/// A per-column decision.
pub type ColumnPredicate<T> = Rc<dyn Fn(&Column<T>, &Table<T>) -> bool>;

/// A row capability that is either fixed or decided per row.
pub enum RowFlag<T: RowData> {
    /// Same answer for every row.
    Always(bool),
    /// Decided per row.
    When(RowPredicate<T>),
}

impl<T: RowData> RowFlag<T> {
    /// Creates a per-row flag.
    pub fn when(predicate: impl Fn(&Row<T>) -> bool + 'static) -> Self {
        RowFlag::When(Rc::new(predicate))
    }

    /// Evaluates the flag for a row.
    pub fn eval(&self, row: &Row<T>) -> bool {
        match self {
            RowFlag::Always(value) => *value,
            RowFlag::When(predicate) => predicate(row),
        }
    }
}

impl<T: RowData> Clone for RowFlag<T> {
    fn clone(&self) -> Self {
        match self {
            RowFlag::Always(value) => RowFlag::Always(*value),
            RowFlag::When(predicate) => RowFlag::When(predicate.clone()),
        }
    }
}

impl<T: RowData> From<bool> for RowFlag<T> {
    fn from(value: bool) -> Self {
        RowFlag::Always(value)
    }
}

/// Where grouped columns go in the leaf column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupedColumnMode {
    /// Grouped columns move to the front, in grouping order.
    #[default]
    Reorder,
    /// Grouped columns are removed.
    Remove,
    /// Grouped columns stay where they are.
    Keep,
}

impl Dependency for GroupedColumnMode {
    fn changed(&self, previous: &Self) -> bool {
        self != previous
    }
}

/// When a column resize is written to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnResizeMode {
    /// On every pointer move.
    OnChange,
    /// Once, when the drag ends.
    #[default]
    OnEnd,
}

/// A caller-supplied page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// The total is not known (server-side pagination without a count).
    Unknown,
    /// A fixed number of pages.
    Known(usize),
}

/// Everything a table is built from.
///
/// Plain flags are `Option`s: `None` means "not set", so feature defaults and
/// the table's fallbacks apply. Features fill in their defaults through
/// [`TableFeature::default_options`] without overriding caller values.
///
/// # Example
///
/// ```
/// use tabula::prelude::*;
///
/// let options = TableOptions::new(
///     vec![Record::new().with("name", "Ada")],
///     vec![ColumnDef::accessor("name")],
/// )
/// .with_features(stock_features())
/// .with_row_models(RowModels::all())
/// .with_initial_state(PartialTableState::new().with(PaginationState::new(0, 25)))
/// .with_enable_multi_sort(false);
///
/// assert_eq!(options.data.len(), 1);
/// ```
pub struct TableOptions<T: RowData> {
    // =========================================================================
    // Core
    // =========================================================================
    /// Source records. Never mutated; replace the `Rc` to change data.
    pub data: Rc<[Rc<T>]>,
    /// Column definitions. Replacing the `Rc` rebuilds the column tree.
    pub columns: Rc<[ColumnDef<T>]>,
    /// Defaults merged into every column definition.
    pub default_column: Option<Rc<ColumnDef<T>>>,
    /// Installed features, in installation order.
    pub features: Rc<[Rc<dyn TableFeature<T>>]>,
    /// Row-model stage factories.
    pub row_models: RowModels<T>,
    /// Caller-controlled slices, applied over the internal state.
    pub state: PartialTableState,
    /// Values the `reset_*` methods return to.
    pub initial_state: PartialTableState,
    /// Per-slice change callbacks; a slice with a callback is controlled.
    pub on_change: StateControls,
    /// Called after the table updates its internal state.
    pub on_state_change: Option<Rc<dyn Fn(&TableState)>>,
    /// Row id builder. Defaults to the index path (`0`, `0.1`, ...).
    pub get_row_id: Option<GetRowId<T>>,
    /// Child record accessor.
    pub get_sub_rows: Option<GetSubRows<T>>,
    /// Returned by `render_value` for missing values.
    pub render_fallback_value: Value,
    /// Master switch for every auto-reset.
    pub auto_reset_all: Option<bool>,

    // =========================================================================
    // Column visibility, pinning and sizing
    // =========================================================================
    pub enable_hiding: Option<bool>,
    pub enable_pinning: Option<bool>,
    pub enable_column_pinning: Option<bool>,
    pub enable_column_resizing: Option<bool>,
    pub column_resize_mode: Option<ColumnResizeMode>,
    pub grouped_column_mode: Option<GroupedColumnMode>,

    // =========================================================================
    // Filtering
    // =========================================================================
    pub enable_filters: Option<bool>,
    pub enable_column_filters: Option<bool>,
    pub enable_global_filter: Option<bool>,
    pub manual_filtering: bool,
    /// Filter children first; a parent survives if any child does.
    pub filter_from_leaf_rows: Option<bool>,
    /// Deepest sub-row level the leaf-first filter descends to.
    pub max_leaf_row_filter_depth: Option<usize>,
    pub filter_fns: Rc<HashMap<String, FilterFn>>,
    pub global_filter_fn: Strategy<FilterFn>,
    /// Decides which columns take part in the global filter.
    pub get_column_can_global_filter: Option<ColumnPredicate<T>>,

    // =========================================================================
    // Sorting
    // =========================================================================
    pub enable_sorting: Option<bool>,
    pub enable_multi_sort: Option<bool>,
    pub enable_sorting_removal: Option<bool>,
    pub enable_multi_remove: Option<bool>,
    pub sort_desc_first: Option<bool>,
    pub manual_sorting: bool,
    pub max_multi_sort_col_count: Option<usize>,
    pub sorting_fns: Rc<HashMap<String, SortingFn>>,

    // =========================================================================
    // Grouping and expanding
    // =========================================================================
    pub enable_grouping: Option<bool>,
    pub manual_grouping: bool,
    pub aggregation_fns: Rc<HashMap<String, AggregationFn>>,
    pub enable_expanding: Option<bool>,
    pub manual_expanding: bool,
    /// Expanded sub-rows count towards the page size.
    pub paginate_expanded_rows: Option<bool>,
    pub auto_reset_expanded: Option<bool>,
    pub get_is_row_expanded: Option<RowPredicate<T>>,
    pub get_row_can_expand: Option<RowPredicate<T>>,

    // =========================================================================
    // Pagination
    // =========================================================================
    pub manual_pagination: bool,
    pub page_count: Option<PageCount>,
    pub row_count: Option<usize>,
    pub auto_reset_page_index: Option<bool>,

    // =========================================================================
    // Row pinning and selection
    // =========================================================================
    pub enable_row_pinning: Option<RowFlag<T>>,
    /// Pinned rows stay visible when filtered or paged out.
    pub keep_pinned_rows: Option<bool>,
    pub enable_row_selection: Option<RowFlag<T>>,
    pub enable_multi_row_selection: Option<RowFlag<T>>,
    pub enable_sub_row_selection: Option<RowFlag<T>>,
}

impl<T: RowData> TableOptions<T> {
    /// Creates options for the given records and column definitions, with no
    /// features installed.
    pub fn new(data: Vec<T>, columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            data: data.into_iter().map(Rc::new).collect(),
            columns: columns.into(),
            default_column: None,
            features: Rc::from(Vec::new()),
            row_models: RowModels::default(),
            state: PartialTableState::default(),
            initial_state: PartialTableState::default(),
            on_change: StateControls::default(),
            on_state_change: None,
            get_row_id: None,
            get_sub_rows: None,
            render_fallback_value: Value::Null,
            auto_reset_all: None,
            enable_hiding: None,
            enable_pinning: None,
            enable_column_pinning: None,
            enable_column_resizing: None,
            column_resize_mode: None,
            grouped_column_mode: None,
            enable_filters: None,
            enable_column_filters: None,
            enable_global_filter: None,
            manual_filtering: false,
            filter_from_leaf_rows: None,
            max_leaf_row_filter_depth: None,
            filter_fns: Rc::default(),
            global_filter_fn: Strategy::Auto,
            get_column_can_global_filter: None,
            enable_sorting: None,
            enable_multi_sort: None,
            enable_sorting_removal: None,
            enable_multi_remove: None,
            sort_desc_first: None,
            manual_sorting: false,
            max_multi_sort_col_count: None,
            sorting_fns: Rc::default(),
            enable_grouping: None,
            manual_grouping: false,
            aggregation_fns: Rc::default(),
            enable_expanding: None,
            manual_expanding: false,
            paginate_expanded_rows: None,
            auto_reset_expanded: None,
            get_is_row_expanded: None,
            get_row_can_expand: None,
            manual_pagination: false,
            page_count: None,
            row_count: None,
            auto_reset_page_index: None,
            enable_row_pinning: None,
            keep_pinned_rows: None,
            enable_row_selection: None,
            enable_multi_row_selection: None,
            enable_sub_row_selection: None,
        }
    }

    // -------------------------------------------------------------------------
    // Core
    // -------------------------------------------------------------------------

    /// Replaces the records.
    pub fn with_data(mut self, data: Vec<T>) -> Self {
        self.data = data.into_iter().map(Rc::new).collect();
        self
    }

    /// Replaces the column definitions.
    pub fn with_columns(mut self, columns: Vec<ColumnDef<T>>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Sets the defaults merged into every column definition.
    pub fn with_default_column(mut self, column: ColumnDef<T>) -> Self {
        self.default_column = Some(Rc::new(column));
        self
    }

    /// Installs features, in order.
    pub fn with_features(mut self, features: Vec<Rc<dyn TableFeature<T>>>) -> Self {
        self.features = features.into();
        self
    }

    /// Sets the row-model stage factories.
    pub fn with_row_models(mut self, row_models: RowModels<T>) -> Self {
        self.row_models = row_models;
        self
    }

    /// Sets the caller-controlled slices.
    pub fn with_state(mut self, state: PartialTableState) -> Self {
        self.state = state;
        self
    }

    /// Sets the initial state.
    pub fn with_initial_state(mut self, state: PartialTableState) -> Self {
        self.initial_state = state;
        self
    }

    /// Registers the change callback of a slice, making it controlled.
    pub fn with_on_change<S: StateSlice>(mut self, on_change: impl Fn(S) + 'static) -> Self {
        self.on_change.insert::<S>(on_change);
        self
    }

    /// Sets the internal state observer.
    pub fn with_on_state_change(mut self, on_state_change: impl Fn(&TableState) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(on_state_change));
        self
    }

    /// Sets the row id builder.
    pub fn with_get_row_id(
        mut self,
        get_row_id: impl Fn(&T, usize, Option<&Row<T>>) -> String + 'static,
    ) -> Self {
        self.get_row_id = Some(Rc::new(get_row_id));
        self
    }

    /// Sets the child record accessor.
    pub fn with_sub_rows<F>(mut self, get_sub_rows: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<&'a [T]> + 'static,
    {
        self.get_sub_rows = Some(Rc::new(get_sub_rows));
        self
    }

    /// Sets the value rendered for missing cells.
    pub fn with_render_fallback_value(mut self, value: impl Into<Value>) -> Self {
        self.render_fallback_value = value.into();
        self
    }

    /// Enables or disables every auto-reset at once.
    pub fn with_auto_reset_all(mut self, enabled: bool) -> Self {
        self.auto_reset_all = Some(enabled);
        self
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Enables column hiding.
    pub fn with_enable_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = Some(enabled);
        self
    }

    /// Enables column and row pinning.
    pub fn with_enable_pinning(mut self, enabled: bool) -> Self {
        self.enable_pinning = Some(enabled);
        self
    }

    /// Enables column pinning.
    pub fn with_enable_column_pinning(mut self, enabled: bool) -> Self {
        self.enable_column_pinning = Some(enabled);
        self
    }

    /// Enables column resizing.
    pub fn with_enable_column_resizing(mut self, enabled: bool) -> Self {
        self.enable_column_resizing = Some(enabled);
        self
    }

    /// Sets when resizes are written to state.
    pub fn with_column_resize_mode(mut self, mode: ColumnResizeMode) -> Self {
        self.column_resize_mode = Some(mode);
        self
    }

    /// Sets where grouped columns go.
    pub fn with_grouped_column_mode(mut self, mode: GroupedColumnMode) -> Self {
        self.grouped_column_mode = Some(mode);
        self
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Enables all filtering.
    pub fn with_enable_filters(mut self, enabled: bool) -> Self {
        self.enable_filters = Some(enabled);
        self
    }

    /// Enables per-column filters.
    pub fn with_enable_column_filters(mut self, enabled: bool) -> Self {
        self.enable_column_filters = Some(enabled);
        self
    }

    /// Enables the global filter.
    pub fn with_enable_global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = Some(enabled);
        self
    }

    /// Marks the data as already filtered.
    pub fn with_manual_filtering(mut self, manual: bool) -> Self {
        self.manual_filtering = manual;
        self
    }

    /// Filters children before parents.
    pub fn with_filter_from_leaf_rows(mut self, enabled: bool) -> Self {
        self.filter_from_leaf_rows = Some(enabled);
        self
    }

    /// Limits how deep the leaf-first filter descends.
    pub fn with_max_leaf_row_filter_depth(mut self, depth: usize) -> Self {
        self.max_leaf_row_filter_depth = Some(depth);
        self
    }

    /// Registers a named filter strategy.
    pub fn with_filter_fn(mut self, name: impl Into<String>, filter_fn: FilterFn) -> Self {
        Rc::make_mut(&mut self.filter_fns).insert(name.into(), filter_fn);
        self
    }

    /// Sets the global filter strategy.
    pub fn with_global_filter_fn(mut self, strategy: Strategy<FilterFn>) -> Self {
        self.global_filter_fn = strategy;
        self
    }

    /// Sets which columns take part in the global filter.
    pub fn with_get_column_can_global_filter(
        mut self,
        predicate: impl Fn(&Column<T>, &Table<T>) -> bool + 'static,
    ) -> Self {
        self.get_column_can_global_filter = Some(Rc::new(predicate));
        self
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Enables sorting.
    pub fn with_enable_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = Some(enabled);
        self
    }

    /// Enables multi-column sorting.
    pub fn with_enable_multi_sort(mut self, enabled: bool) -> Self {
        self.enable_multi_sort = Some(enabled);
        self
    }

    /// Lets toggling cycle back to "unsorted".
    pub fn with_enable_sorting_removal(mut self, enabled: bool) -> Self {
        self.enable_sorting_removal = Some(enabled);
        self
    }

    /// Lets multi-sort toggling remove a criterion.
    pub fn with_enable_multi_remove(mut self, enabled: bool) -> Self {
        self.enable_multi_remove = Some(enabled);
        self
    }

    /// Starts every column sort descending.
    pub fn with_sort_desc_first(mut self, enabled: bool) -> Self {
        self.sort_desc_first = Some(enabled);
        self
    }

    /// Marks the data as already sorted.
    pub fn with_manual_sorting(mut self, manual: bool) -> Self {
        self.manual_sorting = manual;
        self
    }

    /// Caps the number of sort criteria.
    pub fn with_max_multi_sort_col_count(mut self, count: usize) -> Self {
        self.max_multi_sort_col_count = Some(count);
        self
    }

    /// Registers a named sorting strategy.
    pub fn with_sorting_fn(mut self, name: impl Into<String>, sorting_fn: SortingFn) -> Self {
        Rc::make_mut(&mut self.sorting_fns).insert(name.into(), sorting_fn);
        self
    }

    // -------------------------------------------------------------------------
    // Grouping and expanding
    // -------------------------------------------------------------------------

    /// Enables grouping.
    pub fn with_enable_grouping(mut self, enabled: bool) -> Self {
        self.enable_grouping = Some(enabled);
        self
    }

    /// Marks the data as already grouped.
    pub fn with_manual_grouping(mut self, manual: bool) -> Self {
        self.manual_grouping = manual;
        self
    }

    /// Registers a named aggregation strategy.
    pub fn with_aggregation_fn(mut self, name: impl Into<String>, aggregation_fn: AggregationFn) -> Self {
        Rc::make_mut(&mut self.aggregation_fns).insert(name.into(), aggregation_fn);
        self
    }

    /// Enables expanding.
    pub fn with_enable_expanding(mut self, enabled: bool) -> Self {
        self.enable_expanding = Some(enabled);
        self
    }

    /// Marks the data as already expanded.
    pub fn with_manual_expanding(mut self, manual: bool) -> Self {
        self.manual_expanding = manual;
        self
    }

    /// Counts expanded sub-rows towards the page size.
    pub fn with_paginate_expanded_rows(mut self, enabled: bool) -> Self {
        self.paginate_expanded_rows = Some(enabled);
        self
    }

    /// Collapses everything when grouping changes.
    pub fn with_auto_reset_expanded(mut self, enabled: bool) -> Self {
        self.auto_reset_expanded = Some(enabled);
        self
    }

    /// Overrides the expansion check.
    pub fn with_get_is_row_expanded(mut self, predicate: impl Fn(&Row<T>) -> bool + 'static) -> Self {
        self.get_is_row_expanded = Some(Rc::new(predicate));
        self
    }

    /// Overrides the expandability check.
    pub fn with_get_row_can_expand(mut self, predicate: impl Fn(&Row<T>) -> bool + 'static) -> Self {
        self.get_row_can_expand = Some(Rc::new(predicate));
        self
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Marks the data as already paginated.
    pub fn with_manual_pagination(mut self, manual: bool) -> Self {
        self.manual_pagination = manual;
        self
    }

    /// Supplies the page count.
    pub fn with_page_count(mut self, page_count: PageCount) -> Self {
        self.page_count = Some(page_count);
        self
    }

    /// Supplies the total row count.
    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    /// Returns to the first page when the rows change.
    pub fn with_auto_reset_page_index(mut self, enabled: bool) -> Self {
        self.auto_reset_page_index = Some(enabled);
        self
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Sets which rows can be pinned.
    pub fn with_enable_row_pinning(mut self, flag: impl Into<RowFlag<T>>) -> Self {
        self.enable_row_pinning = Some(flag.into());
        self
    }

    /// Keeps pinned rows visible when filtered or paged out.
    pub fn with_keep_pinned_rows(mut self, enabled: bool) -> Self {
        self.keep_pinned_rows = Some(enabled);
        self
    }

    /// Sets which rows can be selected.
    pub fn with_enable_row_selection(mut self, flag: impl Into<RowFlag<T>>) -> Self {
        self.enable_row_selection = Some(flag.into());
        self
    }

    /// Sets which rows allow other rows to stay selected.
    pub fn with_enable_multi_row_selection(mut self, flag: impl Into<RowFlag<T>>) -> Self {
        self.enable_multi_row_selection = Some(flag.into());
        self
    }

    /// Sets which rows select their sub-rows along with them.
    pub fn with_enable_sub_row_selection(mut self, flag: impl Into<RowFlag<T>>) -> Self {
        self.enable_sub_row_selection = Some(flag.into());
        self
    }
}

impl<T: RowData> Clone for TableOptions<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            columns: self.columns.clone(),
            default_column: self.default_column.clone(),
            features: self.features.clone(),
            row_models: self.row_models.clone(),
            state: self.state.clone(),
            initial_state: self.initial_state.clone(),
            on_change: self.on_change.clone(),
            on_state_change: self.on_state_change.clone(),
            get_row_id: self.get_row_id.clone(),
            get_sub_rows: self.get_sub_rows.clone(),
            render_fallback_value: self.render_fallback_value.clone(),
            auto_reset_all: self.auto_reset_all,
            enable_hiding: self.enable_hiding,
            enable_pinning: self.enable_pinning,
            enable_column_pinning: self.enable_column_pinning,
            enable_column_resizing: self.enable_column_resizing,
            column_resize_mode: self.column_resize_mode,
            grouped_column_mode: self.grouped_column_mode,
            enable_filters: self.enable_filters,
            enable_column_filters: self.enable_column_filters,
            enable_global_filter: self.enable_global_filter,
            manual_filtering: self.manual_filtering,
            filter_from_leaf_rows: self.filter_from_leaf_rows,
            max_leaf_row_filter_depth: self.max_leaf_row_filter_depth,
            filter_fns: self.filter_fns.clone(),
            global_filter_fn: self.global_filter_fn.clone(),
            get_column_can_global_filter: self.get_column_can_global_filter.clone(),
            enable_sorting: self.enable_sorting,
            enable_multi_sort: self.enable_multi_sort,
            enable_sorting_removal: self.enable_sorting_removal,
            enable_multi_remove: self.enable_multi_remove,
            sort_desc_first: self.sort_desc_first,
            manual_sorting: self.manual_sorting,
            max_multi_sort_col_count: self.max_multi_sort_col_count,
            sorting_fns: self.sorting_fns.clone(),
            enable_grouping: self.enable_grouping,
            manual_grouping: self.manual_grouping,
            aggregation_fns: self.aggregation_fns.clone(),
            enable_expanding: self.enable_expanding,
            manual_expanding: self.manual_expanding,
            paginate_expanded_rows: self.paginate_expanded_rows,
            auto_reset_expanded: self.auto_reset_expanded,
            get_is_row_expanded: self.get_is_row_expanded.clone(),
            get_row_can_expand: self.get_row_can_expand.clone(),
            manual_pagination: self.manual_pagination,
            page_count: self.page_count,
            row_count: self.row_count,
            auto_reset_page_index: self.auto_reset_page_index,
            enable_row_pinning: self.enable_row_pinning.clone(),
            keep_pinned_rows: self.keep_pinned_rows,
            enable_row_selection: self.enable_row_selection.clone(),
            enable_multi_row_selection: self.enable_multi_row_selection.clone(),
            enable_sub_row_selection: self.enable_sub_row_selection.clone(),
        }
    }
}
