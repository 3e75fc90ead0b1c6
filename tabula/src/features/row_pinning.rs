//! Row pinning

use std::collections::HashSet;
use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::state::ExpandedState;
use crate::state::PartialTableState;
use crate::state::RowPinningState;
use crate::state::Updater;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::Rows;
use crate::table::Table;

/// Edge a row is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowPinningPosition {
    Top,
    Bottom,
}

/// Keeps rows at the top or bottom of the table.
pub struct RowPinning;

impl<T: RowData> TableFeature<T> for RowPinning {
    fn id(&self) -> FeatureId {
        FeatureId::RowPinning
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(RowPinningState::default());
    }
}

impl<T: RowData> Row<T> {
    /// Pins this row, or unpins it with `None`. Descendants and ancestors
    /// can be moved along with it.
    pub fn pin(
        &self,
        table: &Table<T>,
        position: Option<RowPinningPosition>,
        include_leaf_rows: bool,
        include_parent_rows: bool,
    ) {
        let mut ids: Vec<String> = Vec::new();
        if include_parent_rows {
            ids.extend(self.parent_rows(table).iter().map(|row| row.id.clone()));
        }
        ids.push(self.id.clone());
        if include_leaf_rows {
            ids.extend(self.leaf_rows().iter().map(|row| row.id.clone()));
        }
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));

        table.set_row_pinning(Updater::update(move |old: &RowPinningState| {
            let keep = |pinned: &Vec<String>| -> Vec<String> {
                pinned.iter().filter(|id| !seen.contains(*id)).cloned().collect()
            };
            let mut next = RowPinningState {
                top: keep(&old.top),
                bottom: keep(&old.bottom),
            };
            match position {
                Some(RowPinningPosition::Top) => next.top.extend(ids),
                Some(RowPinningPosition::Bottom) => next.bottom.extend(ids),
                None => {}
            }
            next
        }));
    }

    pub fn can_pin(&self, table: &Table<T>) -> bool {
        let options = table.options();
        match &options.enable_row_pinning {
            Some(flag) => flag.eval(self),
            None => options.enable_pinning.unwrap_or(true),
        }
    }

    pub fn pinned(&self, table: &Table<T>) -> Option<RowPinningPosition> {
        let pinning = table.slice::<RowPinningState>();
        if pinning.top.contains(&self.id) {
            Some(RowPinningPosition::Top)
        } else if pinning.bottom.contains(&self.id) {
            Some(RowPinningPosition::Bottom)
        } else {
            None
        }
    }

    /// Position among the displayed rows of its edge.
    pub fn pinned_index(&self, table: &Table<T>) -> Option<usize> {
        let rows = match self.pinned(table)? {
            RowPinningPosition::Top => table.top_rows(),
            RowPinningPosition::Bottom => table.bottom_rows(),
        };
        rows.iter().position(|row| row.id == self.id)
    }
}

impl<T: RowData> Table<T> {
    pub fn set_row_pinning(&self, updater: impl Into<Updater<RowPinningState>>) {
        if self.feature_enabled(FeatureId::RowPinning, "set_row_pinning") {
            self.update_slice(updater);
        }
    }

    pub fn reset_row_pinning(&self, default: bool) {
        if self.feature_enabled(FeatureId::RowPinning, "reset_row_pinning") {
            self.reset_slice::<RowPinningState>(default);
        }
    }

    /// With no position, whether any row is pinned.
    pub fn is_some_rows_pinned(&self, position: Option<RowPinningPosition>) -> bool {
        let pinning = self.slice::<RowPinningState>();
        match position {
            Some(RowPinningPosition::Top) => !pinning.top.is_empty(),
            Some(RowPinningPosition::Bottom) => !pinning.bottom.is_empty(),
            None => !pinning.top.is_empty() || !pinning.bottom.is_empty(),
        }
    }

    /// Rows pinned to the top, in pinning order.
    pub fn top_rows(&self) -> Rows<T> {
        let deps = self.pinned_rows_deps();
        self.caches.top_rows.get(deps, |(model, pinning, _, keep)| {
            self.pinned_rows(model, &pinning.top, *keep)
        })
    }

    /// Rows pinned to the bottom, in pinning order.
    pub fn bottom_rows(&self) -> Rows<T> {
        let deps = self.pinned_rows_deps();
        self.caches.bottom_rows.get(deps, |(model, pinning, _, keep)| {
            self.pinned_rows(model, &pinning.bottom, *keep)
        })
    }

    /// Displayed rows that are not pinned.
    pub fn center_rows(&self) -> Rows<T> {
        let deps = (self.row_model(), self.slice::<RowPinningState>());
        self.caches.center_rows.get(deps, |(model, pinning)| {
            let pinned: HashSet<&String> = pinning.top.iter().chain(&pinning.bottom).collect();
            model
                .rows
                .iter()
                .filter(|row| !pinned.contains(&row.id))
                .cloned()
                .collect()
        })
    }

    fn pinned_rows_deps(&self) -> (Rc<RowModel<T>>, Rc<RowPinningState>, Rc<ExpandedState>, bool) {
        (
            self.row_model(),
            self.slice::<RowPinningState>(),
            self.slice::<ExpandedState>(),
            self.options().keep_pinned_rows.unwrap_or(true),
        )
    }

    /// Resolves pinned ids. Kept rows are looked up among every row and shown
    /// while their parents are expanded; otherwise only displayed rows count.
    fn pinned_rows(&self, model: &RowModel<T>, ids: &[String], keep: bool) -> Rows<T> {
        ids.iter()
            .filter_map(|id| {
                if !keep {
                    return model.rows.iter().find(|row| &row.id == id).cloned();
                }
                match self.row(id, true) {
                    Ok(row) => row.is_all_parents_expanded(self).then_some(row),
                    Err(err) => {
                        log::warn!("[pinning] pinned row skipped: {err}");
                        None
                    }
                }
            })
            .collect()
    }
}
