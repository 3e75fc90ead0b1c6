//! Whole-table state

use std::rc::Rc;

use serde::Deserialize;
use serde::Serialize;

use super::StateSlice;
use super::slices::*;
use crate::extensions::Extensions;

/// The table's full state: one shared slice per built-in feature, plus
/// custom slices in `extensions`.
///
/// Slices are `Rc`s and are never mutated in place. An update swaps the
/// slice's `Rc`, so memoized derivations detect the change by pointer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    pub column_order: Rc<ColumnOrderState>,
    pub column_visibility: Rc<ColumnVisibilityState>,
    pub column_pinning: Rc<ColumnPinningState>,
    pub column_sizing: Rc<ColumnSizingState>,
    pub column_sizing_info: Rc<ColumnSizingInfoState>,
    pub column_filters: Rc<ColumnFiltersState>,
    pub global_filter: Rc<GlobalFilterState>,
    pub grouping: Rc<GroupingState>,
    pub sorting: Rc<SortingState>,
    pub expanded: Rc<ExpandedState>,
    pub pagination: Rc<PaginationState>,
    pub row_pinning: Rc<RowPinningState>,
    pub row_selection: Rc<RowSelectionState>,
    /// Custom feature slices, keyed by type. Not serialized.
    #[serde(skip)]
    pub extensions: Extensions,
}

impl TableState {
    /// Builds a full state from a partial one; missing slices take their
    /// default value.
    pub fn from_partial(partial: &PartialTableState) -> Self {
        let mut state = TableState::default();
        partial.apply_to(&mut state);
        state
    }

    /// Returns one slice.
    pub fn slice<S: StateSlice>(&self) -> Rc<S> {
        S::read(self)
    }
}

/// A state with only some slices set.
///
/// Used for `TableOptions::state` (caller-controlled slices, applied over the
/// internal state on every read) and `TableOptions::initial_state` (the
/// values `reset_*` returns to).
///
/// # Example
///
/// ```
/// use tabula::state::*;
///
/// let state = PartialTableState::new()
///     .with(SortingState::from(vec![ColumnSort::desc("age")]))
///     .with(PaginationState::new(0, 25));
///
/// assert!(state.sorting.is_some());
/// assert!(state.grouping.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialTableState {
    pub column_order: Option<Rc<ColumnOrderState>>,
    pub column_visibility: Option<Rc<ColumnVisibilityState>>,
    pub column_pinning: Option<Rc<ColumnPinningState>>,
    pub column_sizing: Option<Rc<ColumnSizingState>>,
    pub column_sizing_info: Option<Rc<ColumnSizingInfoState>>,
    pub column_filters: Option<Rc<ColumnFiltersState>>,
    pub global_filter: Option<Rc<GlobalFilterState>>,
    pub grouping: Option<Rc<GroupingState>>,
    pub sorting: Option<Rc<SortingState>>,
    pub expanded: Option<Rc<ExpandedState>>,
    pub pagination: Option<Rc<PaginationState>>,
    pub row_pinning: Option<Rc<RowPinningState>>,
    pub row_selection: Option<Rc<RowSelectionState>>,
    #[serde(skip)]
    pub extensions: Extensions,
}

impl PartialTableState {
    /// Creates an empty partial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a slice, builder style.
    pub fn with<S: StateSlice>(mut self, value: S) -> Self {
        S::write_partial(&mut self, Rc::new(value));
        self
    }

    /// Returns the slice if it is set.
    pub fn get<S: StateSlice>(&self) -> Option<Rc<S>> {
        S::read_partial(self)
    }

    /// Sets a slice only if it is not set yet.
    pub fn set_default<S: StateSlice>(&mut self, value: S) {
        if S::read_partial(self).is_none() {
            S::write_partial(self, Rc::new(value));
        }
    }

    /// Returns `true` if no slice is set.
    pub fn is_empty(&self) -> bool {
        self.column_order.is_none()
            && self.column_visibility.is_none()
            && self.column_pinning.is_none()
            && self.column_sizing.is_none()
            && self.column_sizing_info.is_none()
            && self.column_filters.is_none()
            && self.global_filter.is_none()
            && self.grouping.is_none()
            && self.sorting.is_none()
            && self.expanded.is_none()
            && self.pagination.is_none()
            && self.row_pinning.is_none()
            && self.row_selection.is_none()
            && self.extensions.is_empty()
    }

    /// Overwrites the slices of `state` that are set here.
    pub fn apply_to(&self, state: &mut TableState) {
        fn put<S: Clone>(target: &mut Rc<S>, source: &Option<Rc<S>>) {
            if let Some(value) = source {
                *target = value.clone();
            }
        }

        put(&mut state.column_order, &self.column_order);
        put(&mut state.column_visibility, &self.column_visibility);
        put(&mut state.column_pinning, &self.column_pinning);
        put(&mut state.column_sizing, &self.column_sizing);
        put(&mut state.column_sizing_info, &self.column_sizing_info);
        put(&mut state.column_filters, &self.column_filters);
        put(&mut state.global_filter, &self.global_filter);
        put(&mut state.grouping, &self.grouping);
        put(&mut state.sorting, &self.sorting);
        put(&mut state.expanded, &self.expanded);
        put(&mut state.pagination, &self.pagination);
        put(&mut state.row_pinning, &self.row_pinning);
        put(&mut state.row_selection, &self.row_selection);
        state.extensions.extend(&self.extensions);
    }
}
