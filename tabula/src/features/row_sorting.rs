//! Row sorting

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::fns::DIGIT_RUNS;
use crate::fns::SortingFn;
use crate::model::RowData;
use crate::model::Value;
use crate::state::ColumnSort;
use crate::state::PartialTableState;
use crate::state::SortingState;
use crate::state::Updater;
use crate::table::Column;
use crate::table::RowModel;
use crate::table::Table;

/// Rows looked at when picking a sorting strategy from the data.
const AUTO_SORT_SAMPLE: usize = 10;

/// Multi-column sorting of rows and sub-rows.
pub struct RowSorting;

impl<T: RowData> TableFeature<T> for RowSorting {
    fn id(&self) -> FeatureId {
        FeatureId::RowSorting
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(SortingState::default());
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        self == SortDirection::Desc
    }
}

/// Where rows with a missing (`Null`) value go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortUndefined {
    /// Missing values go to the sorting strategy like any other value.
    Disabled,
    /// Always first, whatever the direction.
    First,
    /// Always last, whatever the direction.
    Last,
    /// Below every value; flips with the direction.
    AsLowest,
    /// Above every value; flips with the direction.
    #[default]
    AsHighest,
}

impl<T: RowData> Column<T> {
    /// The sorting strategy, inferred from the data for `Auto`.
    pub fn sorting_fn(&self, table: &Table<T>) -> SortingFn {
        let strategy = self.column_def.sorting_fn.clone().unwrap_or_default();
        let options = table.options();
        strategy
            .resolve(&options.sorting_fns, SortingFn::builtin, || Some(self.auto_sorting_fn(table)))
            .unwrap_or_else(SortingFn::basic)
    }

    /// Picks a strategy from the first filtered rows: datetime for dates,
    /// alphanumeric for strings with digits, text for other strings, basic
    /// otherwise.
    pub fn auto_sorting_fn(&self, table: &Table<T>) -> SortingFn {
        let model = table.filtered_row_model();
        let mut is_string = false;
        for row in model.flat_rows.iter().take(AUTO_SORT_SAMPLE) {
            match row.value(table, &self.id) {
                Value::DateTime(_) => return SortingFn::datetime(),
                Value::String(text) => {
                    if DIGIT_RUNS.is_match(&text) {
                        return SortingFn::alphanumeric();
                    }
                    is_string = true;
                }
                _ => {}
            }
        }
        if is_string {
            SortingFn::text()
        } else {
            SortingFn::basic()
        }
    }

    /// Ascending for string columns, descending otherwise.
    pub fn auto_sort_dir(&self, table: &Table<T>) -> SortDirection {
        let model = table.filtered_row_model();
        match model.flat_rows.first().map(|row| row.value(table, &self.id)) {
            Some(Value::String(_)) => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    /// Direction of the first toggle.
    pub fn first_sort_dir(&self, table: &Table<T>) -> SortDirection {
        let desc_first = self
            .column_def
            .sort_desc_first
            .or(table.options().sort_desc_first)
            .unwrap_or_else(|| self.auto_sort_dir(table).is_desc());
        if desc_first {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// The direction the next toggle moves to; `None` removes the sort.
    pub fn next_sorting_order(&self, table: &Table<T>, multi: bool) -> Option<SortDirection> {
        let first = self.first_sort_dir(table);
        let Some(current) = self.is_sorted(table) else {
            return Some(first);
        };
        let options = table.options();
        let removal = options.enable_sorting_removal.unwrap_or(true)
            && (!multi || options.enable_multi_remove.unwrap_or(true));
        if current != first && removal {
            return None;
        }
        Some(match current {
            SortDirection::Desc => SortDirection::Asc,
            SortDirection::Asc => SortDirection::Desc,
        })
    }

    /// Cycles this column's sort.
    ///
    /// `desc` forces a direction. With `multi`, the column is added to or
    /// toggled within the existing sort; otherwise it replaces it.
    pub fn toggle_sorting(&self, table: &Table<T>, desc: Option<bool>, multi: bool) {
        let next_order = self.next_sorting_order(table, multi);
        let multi = multi && self.can_multi_sort(table);
        let max = table.options().max_multi_sort_col_count.unwrap_or(usize::MAX);
        let id = self.id.clone();

        table.set_sorting(Updater::update(move |old: &SortingState| {
            let existing = old.iter().position(|sort| sort.id == id);
            let next_desc = desc.unwrap_or(next_order == Some(SortDirection::Desc));

            let action = if !old.is_empty() && multi {
                if existing.is_some() { SortAction::Toggle } else { SortAction::Add }
            } else if !old.is_empty() && existing != Some(old.len() - 1) {
                SortAction::Replace
            } else if existing.is_some() {
                SortAction::Toggle
            } else {
                SortAction::Replace
            };
            let action = match action {
                SortAction::Toggle if desc.is_none() && next_order.is_none() => SortAction::Remove,
                action => action,
            };

            let sorts = match action {
                SortAction::Add => {
                    let mut sorts = old.to_vec();
                    sorts.push(ColumnSort { id, desc: next_desc });
                    let overflow = sorts.len().saturating_sub(max);
                    sorts.drain(..overflow);
                    sorts
                }
                SortAction::Toggle => old
                    .iter()
                    .map(|sort| {
                        if sort.id == id {
                            ColumnSort { id: sort.id.clone(), desc: next_desc }
                        } else {
                            sort.clone()
                        }
                    })
                    .collect(),
                SortAction::Remove => old.iter().filter(|sort| sort.id != id).cloned().collect(),
                SortAction::Replace => vec![ColumnSort { id, desc: next_desc }],
            };
            SortingState::from(sorts)
        }));
    }

    /// Removes this column from the sort.
    pub fn clear_sorting(&self, table: &Table<T>) {
        let id = self.id.clone();
        table.set_sorting(Updater::update(move |old: &SortingState| {
            SortingState::from(old.iter().filter(|sort| sort.id != id).cloned().collect::<Vec<_>>())
        }));
    }

    pub fn can_sort(&self, table: &Table<T>) -> bool {
        self.column_def.enable_sorting.unwrap_or(true)
            && table.options().enable_sorting.unwrap_or(true)
            && self.has_accessor()
    }

    pub fn can_multi_sort(&self, table: &Table<T>) -> bool {
        self.column_def
            .enable_multi_sort
            .or(table.options().enable_multi_sort)
            .unwrap_or_else(|| self.has_accessor())
    }

    pub fn is_sorted(&self, table: &Table<T>) -> Option<SortDirection> {
        table
            .slice::<SortingState>()
            .iter()
            .find(|sort| sort.id == self.id)
            .map(|sort| if sort.desc { SortDirection::Desc } else { SortDirection::Asc })
    }

    /// Priority of this column in the sort.
    pub fn sort_index(&self, table: &Table<T>) -> Option<usize> {
        table.slice::<SortingState>().iter().position(|sort| sort.id == self.id)
    }
}

enum SortAction {
    Add,
    Toggle,
    Remove,
    Replace,
}

impl<T: RowData> Table<T> {
    pub fn set_sorting(&self, updater: impl Into<Updater<SortingState>>) {
        if self.feature_enabled(FeatureId::RowSorting, "set_sorting") {
            self.update_slice(updater);
        }
    }

    pub fn reset_sorting(&self, default: bool) {
        if self.feature_enabled(FeatureId::RowSorting, "reset_sorting") {
            self.reset_slice::<SortingState>(default);
        }
    }

    /// Input of the sorting stage.
    pub fn pre_sorted_row_model(&self) -> Rc<RowModel<T>> {
        self.grouped_row_model()
    }

    /// Rows sorted by the sorting state, sub-rows sorted within their
    /// parent.
    pub fn sorted_row_model(&self) -> Rc<RowModel<T>> {
        let options = self.options();
        let bypass = options.manual_sorting || !self.has_feature(FeatureId::RowSorting);
        self.stage(
            &self.stages.sorted,
            options.row_models.sorted.clone(),
            bypass,
            Self::pre_sorted_row_model,
        )
    }
}
