//! Column ordering
//!
//! The leaf column order is the definition order, rearranged by the
//! `column_order` slice and then by the grouped column mode.

use std::rc::Rc;

use super::ColumnSection;
use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::options::GroupedColumnMode;
use crate::options::TableOptions;
use crate::state::ColumnOrderState;
use crate::state::GroupingState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::Column;
use crate::table::Table;

/// Reorders columns by explicit id order and moves grouped columns.
pub struct ColumnOrdering;

impl<T: RowData> TableFeature<T> for ColumnOrdering {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnOrdering
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(ColumnOrderState::default());
    }

    fn default_options(&self, options: &mut TableOptions<T>) {
        options.grouped_column_mode.get_or_insert_default();
    }
}

/// The inputs of the leaf column order, shared by every column list that
/// derives from it.
#[derive(Debug)]
pub struct LeafOrder {
    column_order: Rc<ColumnOrderState>,
    grouping: Rc<GroupingState>,
    mode: GroupedColumnMode,
}

impl LeafOrder {
    /// Arranges `columns`: ids listed in the column order first, in that
    /// order, then the rest in their current order; grouped columns are
    /// then moved to the front or removed.
    pub(crate) fn apply<T: RowData>(&self, mut columns: Vec<Rc<Column<T>>>) -> Vec<Rc<Column<T>>> {
        if !self.column_order.is_empty() {
            let mut ordered = Vec::with_capacity(columns.len());
            for id in self.column_order.iter() {
                if let Some(position) = columns.iter().position(|column| &column.id == id) {
                    ordered.push(columns.remove(position));
                }
            }
            ordered.append(&mut columns);
            columns = ordered;
        }

        if self.grouping.is_empty() {
            return columns;
        }
        match self.mode {
            GroupedColumnMode::Keep => columns,
            GroupedColumnMode::Remove => columns
                .into_iter()
                .filter(|column| !self.grouping.contains(&column.id))
                .collect(),
            GroupedColumnMode::Reorder => {
                let mut grouped = Vec::new();
                for id in self.grouping.iter() {
                    if let Some(position) = columns.iter().position(|column| &column.id == id) {
                        grouped.push(columns.remove(position));
                    }
                }
                grouped.append(&mut columns);
                grouped
            }
        }
    }
}

impl<T: RowData> Column<T> {
    /// Position among the visible leaf columns of a section.
    pub fn index(self: &Rc<Self>, table: &Table<T>, section: ColumnSection) -> Option<usize> {
        table
            .visible_leaf_columns_in(section)
            .iter()
            .position(|column| Rc::ptr_eq(column, self))
    }

    pub fn is_first_column(self: &Rc<Self>, table: &Table<T>, section: ColumnSection) -> bool {
        table
            .visible_leaf_columns_in(section)
            .first()
            .is_some_and(|column| column.id == self.id)
    }

    pub fn is_last_column(self: &Rc<Self>, table: &Table<T>, section: ColumnSection) -> bool {
        table
            .visible_leaf_columns_in(section)
            .last()
            .is_some_and(|column| column.id == self.id)
    }
}

impl<T: RowData> Table<T> {
    /// The current leaf order inputs. Grouping only affects the order when
    /// the grouping feature is installed.
    pub(crate) fn leaf_order(&self) -> Rc<LeafOrder> {
        let mode = if self.has_feature(FeatureId::ColumnGrouping) {
            self.options().grouped_column_mode.unwrap_or_default()
        } else {
            GroupedColumnMode::Keep
        };
        let deps = (self.slice::<ColumnOrderState>(), self.slice::<GroupingState>(), mode);
        self.caches.leaf_order.get(deps, |(column_order, grouping, mode)| {
            Rc::new(LeafOrder {
                column_order: column_order.clone(),
                grouping: grouping.clone(),
                mode: *mode,
            })
        })
    }

    pub fn set_column_order(&self, updater: impl Into<Updater<ColumnOrderState>>) {
        if self.feature_enabled(FeatureId::ColumnOrdering, "set_column_order") {
            self.update_slice(updater);
        }
    }

    pub fn reset_column_order(&self, default: bool) {
        if self.feature_enabled(FeatureId::ColumnOrdering, "reset_column_order") {
            self.reset_slice::<ColumnOrderState>(default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::options::TableOptions;
    use crate::table::ColumnDef;

    fn columns(ids: &[&str]) -> Vec<Rc<Column<Record>>> {
        let defs: Vec<ColumnDef<Record>> = ids.iter().map(|id| ColumnDef::accessor(*id)).collect();
        let table = Table::new(TableOptions::new(Vec::new(), defs)).unwrap();
        table.all_leaf_columns().to_vec()
    }

    fn ids(columns: &[Rc<Column<Record>>]) -> Vec<&str> {
        columns.iter().map(|column| column.id.as_str()).collect()
    }

    fn order(column_order: &[&str], grouping: &[&str], mode: GroupedColumnMode) -> LeafOrder {
        LeafOrder {
            column_order: Rc::new(ColumnOrderState::from(column_order.to_vec())),
            grouping: Rc::new(GroupingState::from(grouping.to_vec())),
            mode,
        }
    }

    #[test]
    fn test_explicit_order_then_rest() {
        let ordered = order(&["c", "a"], &[], GroupedColumnMode::Reorder).apply(columns(&["a", "b", "c", "d"]));
        assert_eq!(ids(&ordered), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let ordered = order(&["x", "b"], &[], GroupedColumnMode::Reorder).apply(columns(&["a", "b"]));
        assert_eq!(ids(&ordered), vec!["b", "a"]);
    }

    #[test]
    fn test_grouped_column_modes() {
        let cols = columns(&["a", "b", "c"]);
        let reorder = order(&[], &["c"], GroupedColumnMode::Reorder).apply(cols.clone());
        assert_eq!(ids(&reorder), vec!["c", "a", "b"]);
        let remove = order(&[], &["c"], GroupedColumnMode::Remove).apply(cols.clone());
        assert_eq!(ids(&remove), vec!["a", "b"]);
        let keep = order(&[], &["c"], GroupedColumnMode::Keep).apply(cols);
        assert_eq!(ids(&keep), vec!["a", "b", "c"]);
    }
}
