//! Column visibility

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::options::TableOptions;
use crate::state::ColumnVisibilityState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Cell;
use crate::table::Column;
use crate::table::Columns;
use crate::table::Row;
use crate::table::Table;

/// Shows and hides columns.
pub struct ColumnVisibility;

impl<T: RowData> TableFeature<T> for ColumnVisibility {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnVisibility
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(ColumnVisibilityState::default());
    }

    fn default_options(&self, options: &mut TableOptions<T>) {
        options.enable_hiding.get_or_insert(true);
    }
}

impl<T: RowData> Column<T> {
    /// A leaf column is visible unless its id maps to `false`; a group
    /// column is visible if any child is.
    pub fn is_visible(&self, table: &Table<T>) -> bool {
        if !self.columns.is_empty() {
            return self.columns.iter().any(|column| column.is_visible(table));
        }
        table
            .slice::<ColumnVisibilityState>()
            .get(&self.id)
            .copied()
            .unwrap_or(true)
    }

    pub fn can_hide(&self, table: &Table<T>) -> bool {
        self.column_def.enable_hiding.unwrap_or(true) && table.options().enable_hiding.unwrap_or(true)
    }

    /// Sets visibility, or flips it when `value` is `None`. Ignored for
    /// columns that cannot be hidden.
    pub fn toggle_visibility(&self, table: &Table<T>, value: Option<bool>) {
        if !self.can_hide(table) {
            return;
        }
        let visible = value.unwrap_or(!self.is_visible(table));
        let id = self.id.clone();
        table.set_column_visibility(Updater::update(move |old: &ColumnVisibilityState| {
            let mut next = old.clone();
            next.insert(id, visible);
            next
        }));
    }
}

impl<T: RowData> Row<T> {
    /// Cells of visible columns: left pinned, center, right pinned.
    pub fn visible_cells(self: &Rc<Self>, table: &Table<T>) -> Vec<Rc<Cell<T>>> {
        let mut cells = self.left_visible_cells(table);
        cells.extend(self.center_visible_cells(table));
        cells.extend(self.right_visible_cells(table));
        cells
    }

    pub(crate) fn all_visible_cells(self: &Rc<Self>, table: &Table<T>) -> Vec<Rc<Cell<T>>> {
        self.all_cells(table)
            .into_iter()
            .filter(|cell| cell.column.is_visible(table))
            .collect()
    }
}

impl<T: RowData> Table<T> {
    /// Visible columns, parents before children.
    pub fn visible_flat_columns(&self) -> Columns<T> {
        let deps = (self.all_flat_columns(), self.slice::<ColumnVisibilityState>());
        self.caches.visible_flat_columns.get(deps, |(columns, _)| {
            columns
                .iter()
                .filter(|column| column.is_visible(self))
                .cloned()
                .collect()
        })
    }

    /// Visible leaf columns in display order.
    pub fn visible_leaf_columns(&self) -> Columns<T> {
        let deps = (self.all_leaf_columns(), self.slice::<ColumnVisibilityState>());
        self.caches.visible_leaf_columns.get(deps, |(columns, _)| {
            columns
                .iter()
                .filter(|column| column.is_visible(self))
                .cloned()
                .collect()
        })
    }

    pub fn is_all_columns_visible(&self) -> bool {
        self.all_leaf_columns().iter().all(|column| column.is_visible(self))
    }

    pub fn is_some_columns_visible(&self) -> bool {
        self.all_leaf_columns().iter().any(|column| column.is_visible(self))
    }

    /// Shows every leaf column, or hides every hideable one. `None` flips
    /// between the two.
    pub fn toggle_all_columns_visible(&self, value: Option<bool>) {
        let value = value.unwrap_or(!self.is_all_columns_visible());
        let visibility: ColumnVisibilityState = self
            .all_leaf_columns()
            .iter()
            .map(|column| (column.id.clone(), if value { true } else { !column.can_hide(self) }))
            .collect::<std::collections::HashMap<_, _>>()
            .into();
        self.set_column_visibility(visibility);
    }

    pub fn set_column_visibility(&self, updater: impl Into<Updater<ColumnVisibilityState>>) {
        if self.feature_enabled(FeatureId::ColumnVisibility, "set_column_visibility") {
            self.update_slice(updater);
        }
    }

    pub fn reset_column_visibility(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnVisibility, "reset_column_visibility") {
            self.reset_slice::<ColumnVisibilityState>(default);
        }
    }
}
