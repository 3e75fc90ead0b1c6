//! Column sizing and headless resizing
//!
//! Sizes are plain numbers; the table never measures anything. A resize is
//! driven by pointer offsets the caller passes to [`Header::begin_resize`],
//! [`Table::update_resize`] and [`Table::end_resize`].

use std::rc::Rc;

use super::ColumnSection;
use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::options::ColumnResizeMode;
use crate::options::TableOptions;
use crate::state::ColumnSizingInfoState;
use crate::state::ColumnSizingState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Column;
use crate::table::Header;
use crate::table::HeaderGroups;
use crate::table::Table;

/// Size of a column without an explicit size.
pub const DEFAULT_COLUMN_SIZE: f64 = 150.0;
/// Smallest size a column shrinks to by default.
pub const DEFAULT_MIN_COLUMN_SIZE: f64 = 20.0;
/// Largest size a column grows to by default.
pub const DEFAULT_MAX_COLUMN_SIZE: f64 = f64::MAX;

/// Column widths and resize tracking.
pub struct ColumnSizing;

impl<T: RowData> TableFeature<T> for ColumnSizing {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnSizing
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(ColumnSizingState::default());
        state.set_default(ColumnSizingInfoState::default());
    }

    fn default_options(&self, options: &mut TableOptions<T>) {
        options.column_resize_mode.get_or_insert_default();
    }
}

impl<T: RowData> Column<T> {
    /// The sized width: the state value or the definition's size, clamped
    /// to the column's bounds.
    pub fn size(&self, table: &Table<T>) -> f64 {
        let def = &self.column_def;
        let size = table
            .slice::<ColumnSizingState>()
            .get(&self.id)
            .copied()
            .or(def.size)
            .unwrap_or(DEFAULT_COLUMN_SIZE);
        size.max(def.min_size.unwrap_or(DEFAULT_MIN_COLUMN_SIZE))
            .min(def.max_size.unwrap_or(DEFAULT_MAX_COLUMN_SIZE))
    }

    /// Sum of the sizes of the visible columns before this one.
    pub fn start(self: &Rc<Self>, table: &Table<T>, section: ColumnSection) -> f64 {
        let columns = table.visible_leaf_columns_in(section);
        match self.index(table, section) {
            Some(index) => columns[..index].iter().map(|column| column.size(table)).sum(),
            None => 0.0,
        }
    }

    /// Sum of the sizes of the visible columns after this one.
    pub fn after(self: &Rc<Self>, table: &Table<T>, section: ColumnSection) -> f64 {
        let columns = table.visible_leaf_columns_in(section);
        match self.index(table, section) {
            Some(index) => columns[index + 1..].iter().map(|column| column.size(table)).sum(),
            None => 0.0,
        }
    }

    /// Drops the user-set size.
    pub fn reset_size(&self, table: &Table<T>) {
        let id = self.id.clone();
        table.set_column_sizing(Updater::update(move |old: &ColumnSizingState| {
            let mut next = old.clone();
            next.remove(&id);
            next
        }));
    }

    pub fn can_resize(&self, table: &Table<T>) -> bool {
        self.column_def.enable_resizing.unwrap_or(true)
            && table.options().enable_column_resizing.unwrap_or(true)
    }

    pub fn is_resizing(&self, table: &Table<T>) -> bool {
        table.slice::<ColumnSizingInfoState>().is_resizing_column.as_deref() == Some(self.id.as_str())
    }
}

impl<T: RowData> Header<T> {
    /// Sum of the sizes of the leaf columns under this header.
    pub fn size(&self, table: &Table<T>) -> f64 {
        if self.sub_headers.is_empty() {
            return self.column.size(table);
        }
        self.sub_headers.iter().map(|header| header.size(table)).sum()
    }

    /// Offset of this header within its group.
    pub fn start(&self, table: &Table<T>) -> f64 {
        match &self.previous {
            Some(previous) => previous.start(table) + previous.size(table),
            None => 0.0,
        }
    }

    /// Starts resizing this header's column at pointer offset `offset`.
    /// Ignored when the column cannot be resized.
    pub fn begin_resize(self: &Rc<Self>, table: &Table<T>, offset: f64) {
        if !table.feature_enabled(FeatureId::ColumnSizing, "begin_resize") || !self.column.can_resize(table) {
            return;
        }
        let column_sizing_start = self
            .leaf_headers()
            .iter()
            .filter(|header| header.sub_headers.is_empty())
            .map(|header| (header.column.id.clone(), header.column.size(table)))
            .collect();
        let info = ColumnSizingInfoState {
            start_offset: Some(offset),
            start_size: Some(self.size(table)),
            delta_offset: Some(0.0),
            delta_percentage: Some(0.0),
            is_resizing_column: Some(self.column.id.clone()),
            column_sizing_start,
        };
        log::trace!("[sizing] resize of '{}' started", self.column.id);
        table.update_slice(info);
    }
}

impl<T: RowData> Table<T> {
    /// Total width of the header row.
    pub fn total_size(&self) -> f64 {
        total(self, &self.header_groups())
    }

    pub fn left_total_size(&self) -> f64 {
        total(self, &self.left_header_groups())
    }

    pub fn center_total_size(&self) -> f64 {
        total(self, &self.center_header_groups())
    }

    pub fn right_total_size(&self) -> f64 {
        total(self, &self.right_header_groups())
    }

    /// Moves an in-progress resize to pointer offset `offset`. Sizes are
    /// written to state right away in [`ColumnResizeMode::OnChange`].
    pub fn update_resize(&self, offset: f64) {
        self.move_resize(offset, false);
    }

    /// Finishes an in-progress resize at pointer offset `offset`, writing
    /// the final sizes and clearing the resize info.
    pub fn end_resize(&self, offset: f64) {
        if self.move_resize(offset, true) {
            log::trace!("[sizing] resize ended");
            self.update_slice(ColumnSizingInfoState::default());
        }
    }

    fn move_resize(&self, offset: f64, end: bool) -> bool {
        let info = self.slice::<ColumnSizingInfoState>();
        if info.is_resizing_column.is_none() {
            return false;
        }

        let delta_offset = offset - info.start_offset.unwrap_or(0.0);
        let start_size = info.start_size.unwrap_or(0.0);
        let delta_percentage = if start_size == 0.0 {
            0.0
        } else {
            (delta_offset / start_size).max(-0.999999)
        };
        let sizes: Vec<(String, f64)> = info
            .column_sizing_start
            .iter()
            .map(|(id, size)| {
                let next = (size + size * delta_percentage).max(0.0);
                (id.clone(), (next * 100.0).round() / 100.0)
            })
            .collect();

        let mut next_info = (*info).clone();
        next_info.delta_offset = Some(delta_offset);
        next_info.delta_percentage = Some(delta_percentage);
        self.update_slice(next_info);

        let mode = self.options().column_resize_mode.unwrap_or_default();
        if end || mode == ColumnResizeMode::OnChange {
            self.set_column_sizing(Updater::update(move |old: &ColumnSizingState| {
                let mut next = old.clone();
                next.extend(sizes);
                next
            }));
        }
        true
    }

    pub fn set_column_sizing(&self, updater: impl Into<Updater<ColumnSizingState>>) {
        if self.feature_enabled(FeatureId::ColumnSizing, "set_column_sizing") {
            self.update_slice(updater);
        }
    }

    pub fn reset_column_sizing(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnSizing, "reset_column_sizing") {
            self.reset_slice::<ColumnSizingState>(default);
        }
    }

    pub fn set_column_sizing_info(&self, updater: impl Into<Updater<ColumnSizingInfoState>>) {
        if self.feature_enabled(FeatureId::ColumnSizing, "set_column_sizing_info") {
            self.update_slice(updater);
        }
    }

    /// Resets the resize info.
    pub fn reset_header_size_info(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnSizing, "reset_header_size_info") {
            self.reset_slice::<ColumnSizingInfoState>(default);
        }
    }
}

fn total<T: RowData>(table: &Table<T>, groups: &HeaderGroups<T>) -> f64 {
    groups
        .first()
        .map(|group| group.headers.iter().map(|header| header.size(table)).sum())
        .unwrap_or(0.0)
}
