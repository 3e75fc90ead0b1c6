//! State slice shapes owned by the built-in features

use std::collections::HashMap;
use std::ops::Deref;
use std::ops::DerefMut;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Value;

macro_rules! newtype_slice {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl Deref for $name {
            type Target = $inner;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

newtype_slice!(
    /// Explicit leaf column order by id. Unlisted columns keep their
    /// definition order after the listed ones.
    ColumnOrderState(Vec<String>)
);

newtype_slice!(
    /// Column id to visibility. Missing ids are visible.
    ColumnVisibilityState(HashMap<String, bool>)
);

newtype_slice!(
    /// Column id to user-set width.
    ColumnSizingState(HashMap<String, f64>)
);

newtype_slice!(
    /// Active per-column filters, in application order.
    ColumnFiltersState(Vec<ColumnFilter>)
);

newtype_slice!(
    /// Value of the table-wide filter. `Null` means no global filter.
    GlobalFilterState(Value)
);

newtype_slice!(
    /// Grouping column ids, outermost first.
    GroupingState(Vec<String>)
);

newtype_slice!(
    /// Sort criteria, highest priority first.
    SortingState(Vec<ColumnSort>)
);

newtype_slice!(
    /// Row id to selection flag.
    RowSelectionState(HashMap<String, bool>)
);

impl From<Vec<&str>> for ColumnOrderState {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(String::from).collect())
    }
}

impl From<Vec<&str>> for GroupingState {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(String::from).collect())
    }
}

impl From<Vec<&str>> for RowSelectionState {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(|id| (id.to_string(), true)).collect())
    }
}

impl RowSelectionState {
    /// Returns `true` if the row id is selected.
    pub fn is_selected(&self, row_id: &str) -> bool {
        self.0.get(row_id).copied().unwrap_or(false)
    }
}

impl GlobalFilterState {
    /// Returns `true` when a global filter value is set.
    pub fn is_active(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    /// Column id.
    pub id: String,
    /// Descending order.
    pub desc: bool,
}

impl ColumnSort {
    /// Ascending sort on a column.
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    /// Descending sort on a column.
    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// One column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column id.
    pub id: String,
    /// Filter value handed to the column's filter strategy.
    pub value: Value,
}

impl ColumnFilter {
    /// Creates a filter for a column.
    pub fn new(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Columns pinned to either edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPinningState {
    /// Leaf ids pinned left, in display order.
    pub left: Vec<String>,
    /// Leaf ids pinned right, in display order.
    pub right: Vec<String>,
}

/// Rows pinned to the top or bottom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPinningState {
    /// Row ids pinned to the top.
    pub top: Vec<String>,
    /// Row ids pinned to the bottom.
    pub bottom: Vec<String>,
}

/// Current page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Zero-based page.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl PaginationState {
    /// Default rows per page.
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    /// Creates a pagination state.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Which rows show their sub-rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpandedState {
    /// Every row is expanded.
    All,
    /// Row id to expansion flag.
    Rows(HashMap<String, bool>),
}

impl Default for ExpandedState {
    fn default() -> Self {
        ExpandedState::Rows(HashMap::new())
    }
}

impl ExpandedState {
    /// Returns `true` for [`ExpandedState::All`].
    pub fn is_all(&self) -> bool {
        matches!(self, ExpandedState::All)
    }

    /// Returns `true` if the row id is expanded.
    pub fn is_expanded(&self, row_id: &str) -> bool {
        match self {
            ExpandedState::All => true,
            ExpandedState::Rows(rows) => rows.get(row_id).copied().unwrap_or(false),
        }
    }

    /// Returns `true` if nothing is expanded.
    pub fn is_empty(&self) -> bool {
        match self {
            ExpandedState::All => false,
            ExpandedState::Rows(rows) => rows.is_empty(),
        }
    }
}

impl From<Vec<&str>> for ExpandedState {
    fn from(ids: Vec<&str>) -> Self {
        ExpandedState::Rows(ids.into_iter().map(|id| (id.to_string(), true)).collect())
    }
}

/// In-progress column resize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSizingInfoState {
    /// Pointer offset at the start of the drag.
    pub start_offset: Option<f64>,
    /// Header size at the start of the drag.
    pub start_size: Option<f64>,
    /// Pointer movement since the start.
    pub delta_offset: Option<f64>,
    /// Movement relative to the start size.
    pub delta_percentage: Option<f64>,
    /// Column being resized.
    pub is_resizing_column: Option<String>,
    /// Leaf column sizes at the start of the drag.
    pub column_sizing_start: Vec<(String, f64)>,
}
