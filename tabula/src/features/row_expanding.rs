//! Row expanding

use std::collections::HashMap;
use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::options::TableOptions;
use crate::state::ExpandedState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::Table;

/// Shows the sub-rows of expanded rows.
pub struct RowExpanding;

impl<T: RowData> TableFeature<T> for RowExpanding {
    fn id(&self) -> FeatureId {
        FeatureId::RowExpanding
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(ExpandedState::default());
    }

    fn default_options(&self, options: &mut TableOptions<T>) {
        options.paginate_expanded_rows.get_or_insert(true);
    }
}

impl<T: RowData> Row<T> {
    /// Expands or collapses this row; `None` flips it.
    ///
    /// Collapsing one row while everything is expanded turns the state into
    /// an explicit list of every other row of the current row model.
    pub fn toggle_expanded(&self, table: &Table<T>, expanded: Option<bool>) {
        let old = table.slice::<ExpandedState>();
        let exists = old.is_expanded(&self.id);
        let expanded = expanded.unwrap_or(!exists);
        if exists == expanded {
            return;
        }

        let mut rows = match &*old {
            ExpandedState::All => table
                .row_model()
                .rows_by_id
                .keys()
                .map(|id| (id.clone(), true))
                .collect(),
            ExpandedState::Rows(rows) => rows.clone(),
        };
        if expanded {
            rows.insert(self.id.clone(), true);
        } else {
            rows.remove(&self.id);
        }
        table.set_expanded(ExpandedState::Rows(rows));
    }

    pub fn is_expanded(&self, table: &Table<T>) -> bool {
        match &table.options().get_is_row_expanded {
            Some(get_is_row_expanded) => get_is_row_expanded(self),
            None => table.slice::<ExpandedState>().is_expanded(&self.id),
        }
    }

    pub fn can_expand(&self, table: &Table<T>) -> bool {
        let options = table.options();
        match &options.get_row_can_expand {
            Some(get_row_can_expand) => get_row_can_expand(self),
            None => options.enable_expanding.unwrap_or(true) && !self.sub_rows.is_empty(),
        }
    }

    /// Returns `true` if every ancestor is expanded.
    pub fn is_all_parents_expanded(&self, table: &Table<T>) -> bool {
        self.parent_rows(table)
            .iter()
            .all(|parent| parent.is_expanded(table))
    }
}

impl<T: RowData> Table<T> {
    pub fn set_expanded(&self, updater: impl Into<Updater<ExpandedState>>) {
        if self.feature_enabled(FeatureId::RowExpanding, "set_expanded") {
            self.update_slice(updater);
        }
    }

    pub fn reset_expanded(&self, default: bool) {
        if self.feature_enabled(FeatureId::RowExpanding, "reset_expanded") {
            self.reset_slice::<ExpandedState>(default);
        }
    }

    /// Expands every row, or collapses every row; `None` flips between the
    /// two.
    pub fn toggle_all_rows_expanded(&self, expanded: Option<bool>) {
        if expanded.unwrap_or_else(|| !self.is_all_rows_expanded()) {
            self.set_expanded(ExpandedState::All);
        } else {
            self.set_expanded(ExpandedState::Rows(HashMap::new()));
        }
    }

    pub fn can_some_rows_expand(&self) -> bool {
        self.pre_pagination_row_model()
            .flat_rows
            .iter()
            .any(|row| row.can_expand(self))
    }

    pub fn is_some_rows_expanded(&self) -> bool {
        match &*self.slice::<ExpandedState>() {
            ExpandedState::All => true,
            ExpandedState::Rows(rows) => rows.values().any(|expanded| *expanded),
        }
    }

    pub fn is_all_rows_expanded(&self) -> bool {
        let expanded = self.slice::<ExpandedState>();
        match &*expanded {
            ExpandedState::All => true,
            ExpandedState::Rows(rows) if rows.is_empty() => false,
            ExpandedState::Rows(_) => self
                .row_model()
                .flat_rows
                .iter()
                .all(|row| row.is_expanded(self)),
        }
    }

    /// Deepest expanded level: the most `.`-separated segments of any
    /// expanded row id.
    pub fn expanded_depth(&self) -> usize {
        let expanded = self.slice::<ExpandedState>();
        let ids: Vec<String> = match &*expanded {
            ExpandedState::All => self.row_model().rows_by_id.keys().cloned().collect(),
            ExpandedState::Rows(rows) => rows
                .iter()
                .filter(|(_, expanded)| **expanded)
                .map(|(id, _)| id.clone())
                .collect(),
        };
        ids.iter()
            .map(|id| id.split('.').count())
            .max()
            .unwrap_or(0)
    }

    /// Input of the expanding stage.
    pub fn pre_expanded_row_model(&self) -> Rc<RowModel<T>> {
        self.sorted_row_model()
    }

    /// The display list: top-level rows with the sub-rows of expanded rows
    /// inserted after their parent.
    pub fn expanded_row_model(&self) -> Rc<RowModel<T>> {
        let options = self.options();
        let bypass = options.manual_expanding || !self.has_feature(FeatureId::RowExpanding);
        self.stage(
            &self.stages.expanded,
            options.row_models.expanded.clone(),
            bypass,
            Self::pre_expanded_row_model,
        )
    }

    /// Collapses every row after a grouping change.
    ///
    /// The first call only registers, so building the table does not reset
    /// its initial state. Later calls queue one reset at a time.
    pub(crate) fn auto_reset_expanded(&self) {
        if !self.has_feature(FeatureId::RowExpanding) {
            return;
        }
        let flags = &self.auto_reset;
        if !flags.expanded_registered.get() {
            self.queue(|table| table.auto_reset.expanded_registered.set(true));
            return;
        }

        let options = self.options();
        let enabled = options
            .auto_reset_all
            .or(options.auto_reset_expanded)
            .unwrap_or(!options.manual_expanding);
        if enabled && !flags.expanded_queued.replace(true) {
            log::debug!("[expanding] grouping changed, collapsing rows");
            self.queue(|table| {
                table.reset_expanded(false);
                table.auto_reset.expanded_queued.set(false);
            });
        }
    }
}
