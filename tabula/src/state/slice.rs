//! The state slice trait

use std::rc::Rc;

use super::PartialTableState;
use super::TableState;
use super::slices::*;

/// A typed piece of table state.
///
/// Built-in slices map to the named fields of [`TableState`]. Custom
/// features declare their own slice by implementing only [`NAME`](Self::NAME);
/// the default methods keep the value in the state's extension map, and the
/// table gives it the same update and control protocol as built-in slices.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tabula::state::{StateSlice, TableState};
///
/// #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// struct Density(String);
///
/// impl StateSlice for Density {
///     const NAME: &'static str = "density";
/// }
///
/// let state = TableState::default();
/// assert_eq!(*state.slice::<Density>(), Density::default());
/// ```
pub trait StateSlice: Clone + Default + 'static {
    /// Slice key, used in logs.
    const NAME: &'static str;

    /// Reads the slice from a full state.
    fn read(state: &TableState) -> Rc<Self> {
        state.extensions.get::<Self>().unwrap_or_default()
    }

    /// Writes the slice into a full state.
    fn write(state: &mut TableState, value: Rc<Self>) {
        state.extensions.insert_rc(value);
    }

    /// Reads the slice from a partial state.
    fn read_partial(partial: &PartialTableState) -> Option<Rc<Self>> {
        partial.extensions.get::<Self>()
    }

    /// Writes the slice into a partial state.
    fn write_partial(partial: &mut PartialTableState, value: Rc<Self>) {
        partial.extensions.insert_rc(value);
    }
}

macro_rules! builtin_slice {
    ($ty:ty, $field:ident) => {
        impl StateSlice for $ty {
            const NAME: &'static str = stringify!($field);

            fn read(state: &TableState) -> Rc<Self> {
                state.$field.clone()
            }

            fn write(state: &mut TableState, value: Rc<Self>) {
                state.$field = value;
            }

            fn read_partial(partial: &PartialTableState) -> Option<Rc<Self>> {
                partial.$field.clone()
            }

            fn write_partial(partial: &mut PartialTableState, value: Rc<Self>) {
                partial.$field = Some(value);
            }
        }
    };
}

builtin_slice!(ColumnOrderState, column_order);
builtin_slice!(ColumnVisibilityState, column_visibility);
builtin_slice!(ColumnPinningState, column_pinning);
builtin_slice!(ColumnSizingState, column_sizing);
builtin_slice!(ColumnSizingInfoState, column_sizing_info);
builtin_slice!(ColumnFiltersState, column_filters);
builtin_slice!(GlobalFilterState, global_filter);
builtin_slice!(GroupingState, grouping);
builtin_slice!(SortingState, sorting);
builtin_slice!(ExpandedState, expanded);
builtin_slice!(PaginationState, pagination);
builtin_slice!(RowPinningState, row_pinning);
builtin_slice!(RowSelectionState, row_selection);
