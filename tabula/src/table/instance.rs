//! The table instance

use std::cell::Cell as Flag;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::Cell;
use super::Column;
use super::FacetedMinMaxFn;
use super::FacetedRowModelFn;
use super::FacetedUniqueValuesFn;
use super::Header;
use super::Row;
use super::RowModel;
use super::RowModelFactory;
use super::RowModelFn;
use super::build_columns;
use super::build_core_row_model;
use crate::error::TableError;
use crate::extensions::Extensions;
use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::features::LeafOrder;
use crate::memo::Dependency;
use crate::memo::Memo;
use crate::model::RowData;
use crate::options::GroupedColumnMode;
use crate::options::TableOptions;
use crate::state::*;

/// Shared column list.
pub type Columns<T> = Rc<[Rc<Column<T>>]>;

/// Shared row list.
pub type Rows<T> = Rc<[Rc<Row<T>>]>;

/// Shared header group list.
pub type HeaderGroups<T> = Rc<[Rc<super::HeaderGroup<T>>]>;

type QueuedUpdate<T> = Box<dyn FnOnce(&Table<T>)>;

/// A headless table: options, state, and the memoized views derived from them.
///
/// All methods take `&self`. Reads go through memos keyed on the `Rc`s of
/// their inputs, so repeated reads without a state or data change return
/// the same `Rc`. Writes replace one state slice, either internally or by
/// handing the new value to the caller's change callback when the slice is
/// controlled.
///
/// The table is single-threaded; share it by reference or `Rc`.
pub struct Table<T: RowData> {
    options: RefCell<Rc<TableOptions<T>>>,
    features: Rc<[Rc<dyn TableFeature<T>>]>,
    installed: HashSet<FeatureId>,
    internal_state: RefCell<TableState>,
    initial_state: Rc<TableState>,
    columns: RefCell<Columns<T>>,
    extensions: RefCell<Extensions>,
    pub(crate) stages: Stages<T>,
    pub(crate) caches: TableCaches<T>,
    pub(crate) auto_reset: AutoResetFlags,
    queue: RefCell<VecDeque<QueuedUpdate<T>>>,
    read_depth: Flag<usize>,
    draining: Flag<bool>,
}

impl<T: RowData> Table<T> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Builds a table.
    ///
    /// Runs every feature's `default_options` and `initial_state` hooks,
    /// builds the column tree (running `construct_column` for each column),
    /// then runs `construct_table`. Any error leaves no table behind.
    pub fn new(mut options: TableOptions<T>) -> Result<Self, TableError> {
        let features = options.features.clone();
        for feature in features.iter() {
            feature.default_options(&mut options);
        }

        let mut initial = options.initial_state.clone();
        for feature in features.iter() {
            feature.initial_state(&mut initial);
        }
        let initial_state = Rc::new(TableState::from_partial(&initial));

        let table = Self {
            options: RefCell::new(Rc::new(options)),
            installed: features.iter().map(|feature| feature.id()).collect(),
            features,
            internal_state: RefCell::new((*initial_state).clone()),
            initial_state,
            columns: RefCell::new(Rc::from(Vec::new())),
            extensions: RefCell::new(Extensions::new()),
            stages: Stages::default(),
            caches: TableCaches::new(),
            auto_reset: AutoResetFlags::default(),
            queue: RefCell::new(VecDeque::new()),
            read_depth: Flag::new(0),
            draining: Flag::new(false),
        };

        table.rebuild_columns()?;
        for feature in table.features.iter() {
            feature.construct_table(&table)?;
        }

        log::debug!(
            "[table] created: {} features, {} leaf columns, {} records",
            table.features.len(),
            table.all_leaf_columns().len(),
            table.options().data.len()
        );
        Ok(table)
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Current options, with feature defaults filled in.
    pub fn options(&self) -> Rc<TableOptions<T>> {
        self.options.borrow().clone()
    }

    /// Replaces the options.
    ///
    /// Feature defaults are applied to the new options. The column tree is
    /// rebuilt when `columns` or `default_column` changed; if that fails the
    /// previous options stay in place. Installed features are fixed at
    /// construction and are not affected.
    pub fn set_options(&self, updater: impl Into<Updater<TableOptions<T>>>) -> Result<(), TableError> {
        let previous = self.options();
        let mut next = updater.into().resolve(&previous);
        for feature in self.features.iter() {
            feature.default_options(&mut next);
        }

        let columns_changed = next.columns.changed(&previous.columns)
            || next.default_column.changed(&previous.default_column);

        *self.options.borrow_mut() = Rc::new(next);
        if columns_changed && let Err(err) = self.rebuild_columns() {
            *self.options.borrow_mut() = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Replaces the records, keeping every other option.
    pub fn set_data(&self, data: Vec<T>) {
        let mut next = (*self.options()).clone();
        next.data = data.into_iter().map(Rc::new).collect();
        *self.options.borrow_mut() = Rc::new(next);
    }

    // =========================================================================
    // Features
    // =========================================================================

    /// Installed features, in installation order.
    pub fn features(&self) -> &[Rc<dyn TableFeature<T>>] {
        &self.features
    }

    /// Returns `true` if a feature with this id is installed.
    pub fn has_feature(&self, id: FeatureId) -> bool {
        self.installed.contains(&id)
    }

    /// Like [`has_feature`](Self::has_feature), tracing the ignored call
    /// when the feature is missing.
    pub(crate) fn feature_enabled(&self, id: FeatureId, operation: &str) -> bool {
        let installed = self.has_feature(id);
        if !installed {
            log::trace!("[table] {operation} ignored: feature {id} is not installed");
        }
        installed
    }

    /// Table-level data attached by features.
    pub fn extensions(&self) -> std::cell::Ref<'_, Extensions> {
        self.extensions.borrow()
    }

    /// Mutable access to table-level extension data, for `construct_table`
    /// hooks.
    pub fn extensions_mut(&self) -> std::cell::RefMut<'_, Extensions> {
        self.extensions.borrow_mut()
    }

    pub(crate) fn construct_column(&self, column: &mut Column<T>) -> Result<(), TableError> {
        for feature in self.features.iter() {
            feature.construct_column(column, self)?;
        }
        Ok(())
    }

    pub(crate) fn construct_row(&self, mut row: Row<T>) -> Rc<Row<T>> {
        for feature in self.features.iter() {
            feature.construct_row(&mut row, self);
        }
        Rc::new(row)
    }

    pub(crate) fn construct_cell(&self, mut cell: Cell<T>) -> Rc<Cell<T>> {
        for feature in self.features.iter() {
            feature.construct_cell(&mut cell, self);
        }
        Rc::new(cell)
    }

    pub(crate) fn construct_header(&self, mut header: Header<T>) -> Rc<Header<T>> {
        for feature in self.features.iter() {
            feature.construct_header(&mut header, self);
        }
        Rc::new(header)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The effective state: internal state with caller-controlled slices
    /// applied over it.
    pub fn state(&self) -> TableState {
        let mut state = self.internal_state.borrow().clone();
        self.options().state.apply_to(&mut state);
        state
    }

    /// The state `reset_*` returns to.
    pub fn initial_state(&self) -> Rc<TableState> {
        self.initial_state.clone()
    }

    /// Reads one slice of the effective state.
    pub fn slice<S: StateSlice>(&self) -> Rc<S> {
        match S::read_partial(&self.options().state) {
            Some(value) => value,
            None => S::read(&self.internal_state.borrow()),
        }
    }

    /// Replaces the whole internal state.
    pub fn set_state(&self, updater: impl Into<Updater<TableState>>) {
        let next = updater.into().resolve(&self.state());
        *self.internal_state.borrow_mut() = next;
        log::trace!("[state] state replaced");
        self.notify_state_change();
    }

    /// Returns the internal state to the initial state.
    pub fn reset(&self) {
        self.set_state((*self.initial_state).clone());
    }

    /// Updates one slice.
    ///
    /// The updater is resolved against the effective value. A controlled
    /// slice hands the result to its change callback and leaves the internal
    /// state untouched; otherwise the internal state is updated and
    /// `on_state_change` is notified.
    ///
    /// A plain value also converts into an updater, so a closure updater
    /// needs the slice named with a turbofish.
    ///
    /// # Example
    ///
    /// ```
    /// use tabula::prelude::*;
    ///
    /// #[derive(Debug, Clone, Default, PartialEq)]
    /// struct Density(u8);
    ///
    /// impl StateSlice for Density {
    ///     const NAME: &'static str = "density";
    /// }
    ///
    /// let table = Table::new(TableOptions::new(
    ///     vec![Record::new().with("name", "Ada")],
    ///     vec![ColumnDef::accessor("name")],
    /// ))?;
    /// table.update_slice::<Density>(Updater::update(|old: &Density| Density(old.0 + 1)));
    /// assert_eq!(*table.slice::<Density>(), Density(1));
    ///
    /// table.update_slice(Density(5));
    /// assert_eq!(*table.slice::<Density>(), Density(5));
    /// # Ok::<(), TableError>(())
    /// ```
    pub fn update_slice<S: StateSlice>(&self, updater: impl Into<Updater<S>>) {
        let previous = self.slice::<S>();
        let next = updater.into().resolve(&previous);
        match self.options().on_change.control::<S>() {
            StateControl::Controlled(on_change) => {
                log::trace!("[state] {} handed to caller", S::NAME);
                on_change(next);
            }
            StateControl::Uncontrolled => {
                S::write(&mut self.internal_state.borrow_mut(), Rc::new(next));
                log::trace!("[state] {} updated", S::NAME);
                self.notify_state_change();
            }
        }
    }

    /// Resets one slice to its default (`default = true`) or initial value.
    pub fn reset_slice<S: StateSlice>(&self, default: bool) {
        let value = if default {
            S::default()
        } else {
            (*S::read(&self.initial_state)).clone()
        };
        self.update_slice(value);
    }

    fn notify_state_change(&self) {
        let on_state_change = self.options().on_state_change.clone();
        if let Some(on_state_change) = on_state_change {
            on_state_change(&self.state());
        }
    }

    // =========================================================================
    // Queued updates
    // =========================================================================

    /// Schedules an update to run once the current row-model read returns,
    /// or immediately when no read is in progress.
    pub fn queue(&self, update: impl FnOnce(&Table<T>) + 'static) {
        self.queue.borrow_mut().push_back(Box::new(update));
        if self.read_depth.get() == 0 {
            self.drain_queue();
        }
    }

    /// Runs a row-model read; queued updates drain when the outermost read
    /// returns.
    pub(crate) fn reading<R>(&self, read: impl FnOnce(&Self) -> R) -> R {
        self.read_depth.set(self.read_depth.get() + 1);
        let result = read(self);
        self.read_depth.set(self.read_depth.get() - 1);
        if self.read_depth.get() == 0 {
            self.drain_queue();
        }
        result
    }

    fn drain_queue(&self) {
        if self.draining.replace(true) {
            return;
        }
        loop {
            let update = self.queue.borrow_mut().pop_front();
            let Some(update) = update else {
                break;
            };
            log::trace!("[queue] running queued update");
            update(self);
        }
        self.draining.set(false);
    }

    // =========================================================================
    // Columns
    // =========================================================================

    fn rebuild_columns(&self) -> Result<(), TableError> {
        let options = self.options();
        let columns = build_columns(self, &options.columns)?;
        log::debug!("[columns] built {} top-level columns", columns.len());
        *self.columns.borrow_mut() = columns.into();
        Ok(())
    }

    /// Top-level columns, in definition order.
    pub fn all_columns(&self) -> Columns<T> {
        self.columns.borrow().clone()
    }

    /// Every column, parents before their children.
    pub fn all_flat_columns(&self) -> Columns<T> {
        self.caches
            .all_flat_columns
            .get((self.all_columns(),), |(columns,)| {
                columns.iter().flat_map(|column| column.flat_columns()).collect()
            })
    }

    /// Every column by id.
    pub fn all_flat_columns_by_id(&self) -> Rc<HashMap<String, Rc<Column<T>>>> {
        self.caches
            .all_flat_columns_by_id
            .get((self.all_flat_columns(),), |(columns,)| {
                Rc::new(
                    columns
                        .iter()
                        .map(|column| (column.id.clone(), column.clone()))
                        .collect(),
                )
            })
    }

    /// Leaf columns in display order (column order and grouping applied).
    pub fn all_leaf_columns(&self) -> Columns<T> {
        self.caches.all_leaf_columns.get(
            (self.all_columns(), self.leaf_order()),
            |(columns, order)| {
                let leaves = columns
                    .iter()
                    .flat_map(|column| column.leaf_columns(self).iter().cloned().collect::<Vec<_>>())
                    .collect();
                order.apply(leaves).into()
            },
        )
    }

    /// Looks a column up by id, warning when it does not exist.
    pub fn column(&self, id: &str) -> Option<Rc<Column<T>>> {
        let column = self.find_column(id);
        if column.is_none() {
            log::warn!("[columns] column with id '{id}' does not exist");
        }
        column
    }

    pub(crate) fn find_column(&self, id: &str) -> Option<Rc<Column<T>>> {
        self.all_flat_columns_by_id().get(id).cloned()
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Rows built from the data, before any stage.
    pub fn core_row_model(&self) -> Rc<RowModel<T>> {
        self.reading(|table| {
            let data = table.options().data.clone();
            table.caches.core_row_model.get_with_hook(
                (data,),
                |(data,)| Rc::new(build_core_row_model(table, data)),
                |_| table.auto_reset_page_index(),
            )
        })
    }

    /// The final row model: the output of the last stage.
    pub fn row_model(&self) -> Rc<RowModel<T>> {
        self.pagination_row_model()
    }

    /// Finds a row by id.
    ///
    /// Searches the visible rows, or every row before pagination when
    /// `search_all` is set, then falls back to the core rows.
    pub fn row(&self, id: &str, search_all: bool) -> Result<Rc<Row<T>>, TableError> {
        let model = if search_all {
            self.pre_pagination_row_model()
        } else {
            self.row_model()
        };
        if let Some(row) = model.rows_by_id.get(id) {
            return Ok(row.clone());
        }
        self.core_row_model()
            .rows_by_id
            .get(id)
            .cloned()
            .ok_or_else(|| TableError::RowNotFound(id.to_string()))
    }

    /// Reads one pipeline stage. A bypassed stage, or one without a
    /// factory, forwards its input.
    pub(crate) fn stage(
        &self,
        slot: &RefCell<Option<RowModelFn<T>>>,
        factory: Option<RowModelFactory<T>>,
        bypass: bool,
        input: impl FnOnce(&Self) -> Rc<RowModel<T>>,
    ) -> Rc<RowModel<T>> {
        self.reading(|table| {
            if bypass {
                return input(table);
            }
            match instantiate(slot, || factory.map(|create| create(table))) {
                Some(stage) => stage(table),
                None => input(table),
            }
        })
    }
}

impl<T: RowData> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features: Vec<&str> = self.features.iter().map(|feature| feature.id().name()).collect();
        f.debug_struct("Table")
            .field("features", &features)
            .field("columns", &self.columns.borrow().len())
            .field("state", &*self.internal_state.borrow())
            .finish()
    }
}

// =============================================================================
// Internals
// =============================================================================

/// Stage functions, created from the row-model factories on first use.
pub(crate) struct Stages<T: RowData> {
    pub filtered: RefCell<Option<RowModelFn<T>>>,
    pub grouped: RefCell<Option<RowModelFn<T>>>,
    pub sorted: RefCell<Option<RowModelFn<T>>>,
    pub expanded: RefCell<Option<RowModelFn<T>>>,
    pub paginated: RefCell<Option<RowModelFn<T>>>,
    pub faceted: RefCell<Option<FacetedRowModelFn<T>>>,
    pub faceted_unique_values: RefCell<Option<FacetedUniqueValuesFn<T>>>,
    pub faceted_min_max_values: RefCell<Option<FacetedMinMaxFn<T>>>,
}

impl<T: RowData> Default for Stages<T> {
    fn default() -> Self {
        Self {
            filtered: RefCell::new(None),
            grouped: RefCell::new(None),
            sorted: RefCell::new(None),
            expanded: RefCell::new(None),
            paginated: RefCell::new(None),
            faceted: RefCell::new(None),
            faceted_unique_values: RefCell::new(None),
            faceted_min_max_values: RefCell::new(None),
        }
    }
}

/// Returns the cached stage function, creating it on first use.
pub(crate) fn instantiate<F: Clone>(slot: &RefCell<Option<F>>, create: impl FnOnce() -> Option<F>) -> Option<F> {
    if let Some(stage) = slot.borrow().as_ref() {
        return Some(stage.clone());
    }
    let stage = create()?;
    *slot.borrow_mut() = Some(stage.clone());
    Some(stage)
}

type RowModelMemo<T, D> = Memo<D, Rc<RowModel<T>>>;

/// Table-level memos.
pub(crate) struct TableCaches<T: RowData> {
    pub core_row_model: RowModelMemo<T, (Rc<[Rc<T>]>,)>,
    pub all_flat_columns: Memo<(Columns<T>,), Columns<T>>,
    pub all_flat_columns_by_id: Memo<(Columns<T>,), Rc<HashMap<String, Rc<Column<T>>>>>,
    pub leaf_order: Memo<(Rc<ColumnOrderState>, Rc<GroupingState>, GroupedColumnMode), Rc<LeafOrder>>,
    pub all_leaf_columns: Memo<(Columns<T>, Rc<LeafOrder>), Columns<T>>,
    pub visible_flat_columns: Memo<(Columns<T>, Rc<ColumnVisibilityState>), Columns<T>>,
    pub visible_leaf_columns: Memo<(Columns<T>, Rc<ColumnVisibilityState>), Columns<T>>,
    pub left_leaf_columns: Memo<(Columns<T>, Rc<ColumnPinningState>), Columns<T>>,
    pub center_leaf_columns: Memo<(Columns<T>, Rc<ColumnPinningState>), Columns<T>>,
    pub right_leaf_columns: Memo<(Columns<T>, Rc<ColumnPinningState>), Columns<T>>,
    pub header_groups: Memo<(Columns<T>, Columns<T>, Rc<ColumnPinningState>), HeaderGroups<T>>,
    pub left_header_groups: Memo<(Columns<T>, Columns<T>, Rc<ColumnPinningState>), HeaderGroups<T>>,
    pub center_header_groups: Memo<(Columns<T>, Columns<T>, Rc<ColumnPinningState>), HeaderGroups<T>>,
    pub right_header_groups: Memo<(Columns<T>, Columns<T>, Rc<ColumnPinningState>), HeaderGroups<T>>,
    pub selected_row_model: RowModelMemo<T, (Rc<RowSelectionState>, Rc<RowModel<T>>)>,
    pub filtered_selected_row_model: RowModelMemo<T, (Rc<RowSelectionState>, Rc<RowModel<T>>)>,
    pub grouped_selected_row_model: RowModelMemo<T, (Rc<RowSelectionState>, Rc<RowModel<T>>)>,
    pub top_rows: Memo<(Rc<RowModel<T>>, Rc<RowPinningState>, Rc<ExpandedState>, bool), Rows<T>>,
    pub bottom_rows: Memo<(Rc<RowModel<T>>, Rc<RowPinningState>, Rc<ExpandedState>, bool), Rows<T>>,
    pub center_rows: Memo<(Rc<RowModel<T>>, Rc<RowPinningState>), Rows<T>>,
}

impl<T: RowData> TableCaches<T> {
    fn new() -> Self {
        Self {
            core_row_model: Memo::new("core_row_model"),
            all_flat_columns: Memo::new("all_flat_columns"),
            all_flat_columns_by_id: Memo::new("all_flat_columns_by_id"),
            leaf_order: Memo::new("leaf_order"),
            all_leaf_columns: Memo::new("all_leaf_columns"),
            visible_flat_columns: Memo::new("visible_flat_columns"),
            visible_leaf_columns: Memo::new("visible_leaf_columns"),
            left_leaf_columns: Memo::new("left_leaf_columns"),
            center_leaf_columns: Memo::new("center_leaf_columns"),
            right_leaf_columns: Memo::new("right_leaf_columns"),
            header_groups: Memo::new("header_groups"),
            left_header_groups: Memo::new("left_header_groups"),
            center_header_groups: Memo::new("center_header_groups"),
            right_header_groups: Memo::new("right_header_groups"),
            selected_row_model: Memo::new("selected_row_model"),
            filtered_selected_row_model: Memo::new("filtered_selected_row_model"),
            grouped_selected_row_model: Memo::new("grouped_selected_row_model"),
            top_rows: Memo::new("top_rows"),
            bottom_rows: Memo::new("bottom_rows"),
            center_rows: Memo::new("center_rows"),
        }
    }
}

/// Auto-reset bookkeeping: the first trigger only registers, later ones
/// queue a reset unless one is already queued.
#[derive(Debug, Default)]
pub(crate) struct AutoResetFlags {
    pub page_index_registered: Flag<bool>,
    pub page_index_queued: Flag<bool>,
    pub expanded_registered: Flag<bool>,
    pub expanded_queued: Flag<bool>,
}
