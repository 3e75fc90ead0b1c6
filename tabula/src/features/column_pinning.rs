//! Column pinning

use std::collections::HashSet;
use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::state::ColumnPinningState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Cell;
use crate::table::Column;
use crate::table::Columns;
use crate::table::Row;
use crate::table::Table;

/// Pins columns to the left or right edge.
pub struct ColumnPinning;

impl<T: RowData> TableFeature<T> for ColumnPinning {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnPinning
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(ColumnPinningState::default());
    }
}

/// The edge a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPinningPosition {
    Left,
    Right,
}

/// A horizontal section of the table, for position-dependent queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSection {
    /// Every visible leaf column.
    #[default]
    All,
    Left,
    Center,
    Right,
}

impl<T: RowData> Column<T> {
    /// Pins this column's leaves to an edge, or unpins them with `None`.
    pub fn pin(self: &Rc<Self>, table: &Table<T>, position: Option<ColumnPinningPosition>) {
        let ids: Vec<String> = self
            .leaf_columns(table)
            .iter()
            .map(|column| column.id.clone())
            .collect();
        table.set_column_pinning(Updater::update(move |old: &ColumnPinningState| {
            let keep = |list: &[String]| -> Vec<String> {
                list.iter().filter(|id| !ids.contains(id)).cloned().collect()
            };
            let mut next = ColumnPinningState {
                left: keep(&old.left),
                right: keep(&old.right),
            };
            match position {
                Some(ColumnPinningPosition::Left) => next.left.extend(ids.iter().cloned()),
                Some(ColumnPinningPosition::Right) => next.right.extend(ids.iter().cloned()),
                None => {}
            }
            next
        }));
    }

    /// A column can be pinned if any of its leaves allows it.
    pub fn can_pin(self: &Rc<Self>, table: &Table<T>) -> bool {
        let options = table.options();
        let table_allows = options
            .enable_column_pinning
            .or(options.enable_pinning)
            .unwrap_or(true);
        table_allows
            && self
                .leaf_columns(table)
                .iter()
                .any(|column| column.column_def.enable_pinning.unwrap_or(true))
    }

    /// The edge any of this column's leaves is pinned to.
    pub fn pinned(self: &Rc<Self>, table: &Table<T>) -> Option<ColumnPinningPosition> {
        let pinning = table.slice::<ColumnPinningState>();
        let leaves = self.leaf_columns(table);
        if leaves.iter().any(|column| pinning.left.contains(&column.id)) {
            Some(ColumnPinningPosition::Left)
        } else if leaves.iter().any(|column| pinning.right.contains(&column.id)) {
            Some(ColumnPinningPosition::Right)
        } else {
            None
        }
    }

    /// Position of this column's id in its pinned list.
    pub fn pinned_index(self: &Rc<Self>, table: &Table<T>) -> Option<usize> {
        let pinning = table.slice::<ColumnPinningState>();
        let list = match self.pinned(table)? {
            ColumnPinningPosition::Left => &pinning.left,
            ColumnPinningPosition::Right => &pinning.right,
        };
        list.iter().position(|id| id == &self.id)
    }
}

impl<T: RowData> Row<T> {
    /// Visible cells of left-pinned columns, in pinning order.
    pub fn left_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Vec<Rc<Cell<T>>> {
        let pinning = table.slice::<ColumnPinningState>();
        pinned_cells(self.all_visible_cells(table), &pinning.left)
    }

    /// Visible cells of unpinned columns.
    pub fn center_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Vec<Rc<Cell<T>>> {
        let pinning = table.slice::<ColumnPinningState>();
        let pinned: HashSet<&String> = pinning.left.iter().chain(pinning.right.iter()).collect();
        self.all_visible_cells(table)
            .into_iter()
            .filter(|cell| !pinned.contains(&cell.column.id))
            .collect()
    }

    /// Visible cells of right-pinned columns, in pinning order.
    pub fn right_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Vec<Rc<Cell<T>>> {
        let pinning = table.slice::<ColumnPinningState>();
        pinned_cells(self.all_visible_cells(table), &pinning.right)
    }
}

fn pinned_cells<T: RowData>(cells: Vec<Rc<Cell<T>>>, ids: &[String]) -> Vec<Rc<Cell<T>>> {
    ids.iter()
        .filter_map(|id| cells.iter().find(|cell| &cell.column.id == id).cloned())
        .collect()
}

impl<T: RowData> Table<T> {
    /// Left-pinned leaf columns, in pinning order.
    pub fn left_leaf_columns(&self) -> Columns<T> {
        let deps = (self.all_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.left_leaf_columns.get(deps, |(columns, pinning)| {
            pick(columns, &pinning.left)
        })
    }

    /// Unpinned leaf columns.
    pub fn center_leaf_columns(&self) -> Columns<T> {
        let deps = (self.all_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.center_leaf_columns.get(deps, |(columns, pinning)| {
            columns
                .iter()
                .filter(|column| !pinning.left.contains(&column.id) && !pinning.right.contains(&column.id))
                .cloned()
                .collect()
        })
    }

    /// Right-pinned leaf columns, in pinning order.
    pub fn right_leaf_columns(&self) -> Columns<T> {
        let deps = (self.all_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.right_leaf_columns.get(deps, |(columns, pinning)| {
            pick(columns, &pinning.right)
        })
    }

    pub fn left_visible_leaf_columns(&self) -> Columns<T> {
        self.only_visible(&self.left_leaf_columns())
    }

    pub fn center_visible_leaf_columns(&self) -> Columns<T> {
        self.only_visible(&self.center_leaf_columns())
    }

    pub fn right_visible_leaf_columns(&self) -> Columns<T> {
        self.only_visible(&self.right_leaf_columns())
    }

    /// Visible leaf columns of one section.
    pub fn visible_leaf_columns_in(&self, section: ColumnSection) -> Columns<T> {
        match section {
            ColumnSection::All => self.visible_leaf_columns(),
            ColumnSection::Left => self.left_visible_leaf_columns(),
            ColumnSection::Center => self.center_visible_leaf_columns(),
            ColumnSection::Right => self.right_visible_leaf_columns(),
        }
    }

    fn only_visible(&self, columns: &[Rc<Column<T>>]) -> Columns<T> {
        columns
            .iter()
            .filter(|column| column.is_visible(self))
            .cloned()
            .collect()
    }

    /// Returns `true` if any column is pinned to `position`, or to either
    /// edge when `position` is `None`.
    pub fn is_some_columns_pinned(&self, position: Option<ColumnPinningPosition>) -> bool {
        let pinning = self.slice::<ColumnPinningState>();
        match position {
            Some(ColumnPinningPosition::Left) => !pinning.left.is_empty(),
            Some(ColumnPinningPosition::Right) => !pinning.right.is_empty(),
            None => !pinning.left.is_empty() || !pinning.right.is_empty(),
        }
    }

    pub fn set_column_pinning(&self, updater: impl Into<Updater<ColumnPinningState>>) {
        if self.feature_enabled(FeatureId::ColumnPinning, "set_column_pinning") {
            self.update_slice(updater);
        }
    }

    pub fn reset_column_pinning(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnPinning, "reset_column_pinning") {
            self.reset_slice::<ColumnPinningState>(default);
        }
    }
}

fn pick<T: RowData>(columns: &[Rc<Column<T>>], ids: &[String]) -> Columns<T> {
    ids.iter()
        .filter_map(|id| columns.iter().find(|column| &column.id == id).cloned())
        .collect()
}
