//! Row selection
//!
//! Selection is a map of row ids. Selecting a row selects its selectable
//! sub-rows too unless the caller opts out or the row disallows it; a row
//! whose `enable_multi_row_selection` is off clears every other selection
//! when it is selected.

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::state::PartialTableState;
use crate::state::RowSelectionState;
use crate::state::Updater;
use crate::table::Row;
use crate::table::RowModel;
use crate::table::Table;

/// Lets rows be selected.
pub struct RowSelection;

impl<T: RowData> TableFeature<T> for RowSelection {
    fn id(&self) -> FeatureId {
        FeatureId::RowSelection
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(RowSelectionState::default());
    }
}

/// How much of a row's subtree is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubRowSelection {
    None,
    Some,
    All,
}

impl<T: RowData> Row<T> {
    /// Selects or deselects this row; `None` flips it. With
    /// `select_children`, selectable descendants follow.
    pub fn toggle_selected(&self, table: &Table<T>, value: Option<bool>, select_children: bool) {
        let is_selected = self.is_selected(table);
        let value = value.unwrap_or(!is_selected);
        if self.can_select(table) && is_selected == value {
            return;
        }

        let mut selection = (*table.slice::<RowSelectionState>()).clone();
        mutate_row_is_selected(table, &mut selection, &self.id, value, select_children);
        table.set_row_selection(selection);
    }

    pub fn is_selected(&self, table: &Table<T>) -> bool {
        table.slice::<RowSelectionState>().is_selected(&self.id)
    }

    /// Some, but not all, selectable descendants are selected.
    pub fn is_some_selected(&self, table: &Table<T>) -> bool {
        let selection = table.slice::<RowSelectionState>();
        sub_row_selection(table, self, &selection) == SubRowSelection::Some
    }

    /// Every selectable descendant is selected.
    pub fn is_all_sub_rows_selected(&self, table: &Table<T>) -> bool {
        let selection = table.slice::<RowSelectionState>();
        sub_row_selection(table, self, &selection) == SubRowSelection::All
    }

    pub fn can_select(&self, table: &Table<T>) -> bool {
        table
            .options()
            .enable_row_selection
            .as_ref()
            .is_none_or(|flag| flag.eval(self))
    }

    /// Selecting this row keeps other rows selected.
    pub fn can_multi_select(&self, table: &Table<T>) -> bool {
        table
            .options()
            .enable_multi_row_selection
            .as_ref()
            .is_none_or(|flag| flag.eval(self))
    }

    /// Selecting this row selects its sub-rows.
    pub fn can_select_sub_rows(&self, table: &Table<T>) -> bool {
        table
            .options()
            .enable_sub_row_selection
            .as_ref()
            .is_none_or(|flag| flag.eval(self))
    }
}

fn mutate_row_is_selected<T: RowData>(
    table: &Table<T>,
    selection: &mut RowSelectionState,
    row_id: &str,
    value: bool,
    include_children: bool,
) {
    let row = match table.row(row_id, true) {
        Ok(row) => row,
        Err(err) => {
            log::warn!("[selection] {err}");
            return;
        }
    };

    if value {
        if !row.can_multi_select(table) {
            selection.clear();
        }
        if row.can_select(table) {
            selection.insert(row_id.to_string(), true);
        }
    } else {
        selection.remove(row_id);
    }

    if include_children && !row.sub_rows.is_empty() && row.can_select_sub_rows(table) {
        for sub_row in &row.sub_rows {
            mutate_row_is_selected(table, selection, &sub_row.id, value, include_children);
        }
    }
}

fn sub_row_selection<T: RowData>(table: &Table<T>, row: &Row<T>, selection: &RowSelectionState) -> SubRowSelection {
    if row.sub_rows.is_empty() {
        return SubRowSelection::None;
    }

    let mut all_selected = true;
    let mut some_selected = false;
    for sub_row in &row.sub_rows {
        if some_selected && !all_selected {
            break;
        }
        if sub_row.can_select(table) {
            if selection.is_selected(&sub_row.id) {
                some_selected = true;
            } else {
                all_selected = false;
            }
        }
        if !sub_row.sub_rows.is_empty() {
            match sub_row_selection(table, sub_row, selection) {
                SubRowSelection::All => some_selected = true,
                SubRowSelection::Some => {
                    some_selected = true;
                    all_selected = false;
                }
                SubRowSelection::None => all_selected = false,
            }
        }
    }

    if all_selected {
        SubRowSelection::All
    } else if some_selected {
        SubRowSelection::Some
    } else {
        SubRowSelection::None
    }
}

/// Keeps selected rows, at any depth. A row survives when it is selected
/// itself; `flat_rows` lists every selected row of the input.
fn select_rows<T: RowData>(table: &Table<T>, model: &RowModel<T>, selection: &RowSelectionState) -> RowModel<T> {
    fn recurse<T: RowData>(
        table: &Table<T>,
        rows: &[Rc<Row<T>>],
        selection: &RowSelectionState,
        flat: &mut Vec<Rc<Row<T>>>,
    ) -> Vec<Rc<Row<T>>> {
        let mut kept = Vec::new();
        for row in rows {
            let selected = selection.is_selected(&row.id);
            if selected {
                flat.push(row.clone());
            }
            let row = if row.sub_rows.is_empty() {
                row.clone()
            } else {
                let sub_rows = recurse(table, &row.sub_rows, selection, flat);
                table.construct_row(row.derive(sub_rows, row.depth, row.parent_id.clone()))
            };
            if selected {
                kept.push(row);
            }
        }
        kept
    }

    let mut flat_rows = Vec::new();
    let rows = recurse(table, &model.rows, selection, &mut flat_rows);
    let rows_by_id = flat_rows
        .iter()
        .map(|row| (row.id.clone(), row.clone()))
        .collect();
    RowModel {
        rows,
        flat_rows,
        rows_by_id,
    }
}

impl<T: RowData> Table<T> {
    pub fn set_row_selection(&self, updater: impl Into<Updater<RowSelectionState>>) {
        if self.feature_enabled(FeatureId::RowSelection, "set_row_selection") {
            self.update_slice(updater);
        }
    }

    pub fn reset_row_selection(&self, default: bool) {
        if self.feature_enabled(FeatureId::RowSelection, "reset_row_selection") {
            self.reset_slice::<RowSelectionState>(default);
        }
    }

    /// Selects or deselects every row before grouping; `None` flips between
    /// the two.
    pub fn toggle_all_rows_selected(&self, value: Option<bool>) {
        let value = value.unwrap_or_else(|| !self.is_all_rows_selected());
        let mut selection = (*self.slice::<RowSelectionState>()).clone();
        for row in &self.pre_grouped_row_model().flat_rows {
            if !value {
                selection.remove(&row.id);
            } else if row.can_select(self) {
                selection.insert(row.id.clone(), true);
            }
        }
        self.set_row_selection(selection);
    }

    /// Selects or deselects the rows of the current page and their
    /// sub-rows; `None` flips between the two.
    pub fn toggle_all_page_rows_selected(&self, value: Option<bool>) {
        let value = value.unwrap_or_else(|| !self.is_all_page_rows_selected());
        let mut selection = (*self.slice::<RowSelectionState>()).clone();
        for row in &self.row_model().rows {
            mutate_row_is_selected(self, &mut selection, &row.id, value, true);
        }
        self.set_row_selection(selection);
    }

    /// Every selectable filtered row is selected.
    pub fn is_all_rows_selected(&self) -> bool {
        let selection = self.slice::<RowSelectionState>();
        let rows = self.filtered_row_model();
        !rows.flat_rows.is_empty()
            && !selection.is_empty()
            && !rows
                .flat_rows
                .iter()
                .any(|row| row.can_select(self) && !selection.is_selected(&row.id))
    }

    /// Every selectable row of the current page is selected.
    pub fn is_all_page_rows_selected(&self) -> bool {
        let selection = self.slice::<RowSelectionState>();
        let page = self.pagination_row_model();
        let selectable: Vec<&Rc<Row<T>>> = page
            .flat_rows
            .iter()
            .filter(|row| row.can_select(self))
            .collect();
        !selectable.is_empty() && selectable.iter().all(|row| selection.is_selected(&row.id))
    }

    /// Some, but not all, filtered rows are selected.
    pub fn is_some_rows_selected(&self) -> bool {
        let selected = self.slice::<RowSelectionState>().len();
        selected > 0 && selected < self.filtered_row_model().flat_rows.len()
    }

    /// Some rows of the current page, or their sub-rows, are selected while
    /// not all of them are.
    pub fn is_some_page_rows_selected(&self) -> bool {
        if self.is_all_page_rows_selected() {
            return false;
        }
        self.pagination_row_model()
            .flat_rows
            .iter()
            .filter(|row| row.can_select(self))
            .any(|row| row.is_selected(self) || row.is_some_selected(self))
    }

    /// Input of the selected row models.
    pub fn pre_selected_row_model(&self) -> Rc<RowModel<T>> {
        self.core_row_model()
    }

    /// Selected core rows.
    pub fn selected_row_model(&self) -> Rc<RowModel<T>> {
        self.reading(|table| {
            let deps = (table.slice::<RowSelectionState>(), table.pre_selected_row_model());
            table
                .caches
                .selected_row_model
                .get(deps, |(selection, model)| table.selected_rows(model, selection))
        })
    }

    /// Selected rows that pass the filters.
    pub fn filtered_selected_row_model(&self) -> Rc<RowModel<T>> {
        self.reading(|table| {
            let deps = (table.slice::<RowSelectionState>(), table.filtered_row_model());
            table
                .caches
                .filtered_selected_row_model
                .get(deps, |(selection, model)| table.selected_rows(model, selection))
        })
    }

    /// Selected rows after grouping and sorting.
    pub fn grouped_selected_row_model(&self) -> Rc<RowModel<T>> {
        self.reading(|table| {
            let deps = (table.slice::<RowSelectionState>(), table.sorted_row_model());
            table
                .caches
                .grouped_selected_row_model
                .get(deps, |(selection, model)| table.selected_rows(model, selection))
        })
    }

    fn selected_rows(&self, model: &RowModel<T>, selection: &RowSelectionState) -> Rc<RowModel<T>> {
        if selection.is_empty() {
            return Rc::new(RowModel::empty());
        }
        Rc::new(select_rows(self, model, selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::stock_features;
    use crate::model::Record;
    use crate::options::TableOptions;
    use crate::table::ColumnDef;
    use crate::table::RowModels;

    fn tree_table() -> Table<Record> {
        let data = vec![
            Record::new()
                .with("name", "parent")
                .with_children(vec![Record::new().with("name", "a"), Record::new().with("name", "b")]),
            Record::new().with("name", "single"),
        ];
        Table::new(
            TableOptions::new(data, vec![ColumnDef::accessor("name")])
                .with_features(stock_features())
                .with_row_models(RowModels::all())
                .with_sub_rows(|record| Some(record.children())),
        )
        .unwrap()
    }

    #[test]
    fn test_sub_row_selection_levels() {
        let table = tree_table();
        let parent = table.row("0", true).unwrap();
        assert_eq!(
            sub_row_selection(&table, &parent, &table.slice::<RowSelectionState>()),
            SubRowSelection::None
        );

        table.set_row_selection(RowSelectionState::from(vec!["0.0"]));
        let selection = table.slice::<RowSelectionState>();
        assert_eq!(sub_row_selection(&table, &parent, &selection), SubRowSelection::Some);

        table.set_row_selection(RowSelectionState::from(vec!["0.0", "0.1"]));
        let selection = table.slice::<RowSelectionState>();
        assert_eq!(sub_row_selection(&table, &parent, &selection), SubRowSelection::All);
    }

    #[test]
    fn test_select_rows_keeps_only_selected() {
        let table = tree_table();
        let selection = RowSelectionState::from(vec!["0.1", "1"]);
        let selected = select_rows(&table, &table.core_row_model(), &selection);

        assert_eq!(selected.ids(), vec!["1"]);
        let mut flat: Vec<&str> = selected.flat_rows.iter().map(|row| row.id.as_str()).collect();
        flat.sort();
        assert_eq!(flat, vec!["0.1", "1"]);
    }
}
