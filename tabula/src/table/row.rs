//! Rows

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::Cell;
use super::Table;
use crate::extensions::Extensions;
use crate::model::RowData;
use crate::model::Value;

/// A row produced by a row model.
///
/// Leaf rows wrap one source record. Group rows (from the grouping stage)
/// carry the first leaf's record as `original`, and answer `value` for
/// grouped columns with the shared group value and for other columns with
/// the column's aggregation.
///
/// Stages that reorder or filter children derive new rows that keep the id,
/// the value caches and the extensions of the row they came from.
pub struct Row<T: RowData> {
    pub id: String,
    /// Position among the siblings in the source data.
    pub index: usize,
    pub depth: usize,
    pub parent_id: Option<String>,
    pub original: Rc<T>,
    pub sub_rows: Vec<Rc<Row<T>>>,
    pub extensions: Extensions,
    pub(crate) group: Option<Rc<RowGroup<T>>>,
    values: RefCell<HashMap<String, Value>>,
    unique_values: RefCell<HashMap<String, Rc<[Value]>>>,
    grouping_values: RefCell<HashMap<String, Value>>,
}

/// What a group row groups.
pub(crate) struct RowGroup<T: RowData> {
    pub column_id: String,
    pub value: Value,
    /// Every grouping column id at the time the group was built.
    pub grouped_column_ids: Rc<[String]>,
    /// Source rows in the group, with their descendants.
    pub leaf_rows: Vec<Rc<Row<T>>>,
    /// Source rows in this group.
    pub member_rows: Vec<Rc<Row<T>>>,
}

impl<T: RowData> Row<T> {
    pub(crate) fn new(
        id: String,
        original: Rc<T>,
        index: usize,
        depth: usize,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id,
            index,
            depth,
            parent_id,
            original,
            sub_rows: Vec::new(),
            extensions: Extensions::new(),
            group: None,
            values: RefCell::new(HashMap::new()),
            unique_values: RefCell::new(HashMap::new()),
            grouping_values: RefCell::new(HashMap::new()),
        }
    }

    /// A copy of this row with other children, depth or parent.
    pub(crate) fn derive(&self, sub_rows: Vec<Rc<Row<T>>>, depth: usize, parent_id: Option<String>) -> Self {
        Self {
            id: self.id.clone(),
            index: self.index,
            depth,
            parent_id,
            original: self.original.clone(),
            sub_rows,
            extensions: self.extensions.clone(),
            group: self.group.clone(),
            values: RefCell::new(self.values.borrow().clone()),
            unique_values: RefCell::new(self.unique_values.borrow().clone()),
            grouping_values: RefCell::new(self.grouping_values.borrow().clone()),
        }
    }

    /// The row's value for a column; `Null` if the column does not exist or
    /// has no accessor.
    pub fn value(&self, table: &Table<T>, column_id: &str) -> Value {
        if let Some(value) = self.values.borrow().get(column_id) {
            return value.clone();
        }

        let value = match &self.group {
            Some(group) => self.aggregate_group_value(table, group, column_id),
            None => match table.find_column(column_id) {
                Some(column) => column.access(&self.original, self.index),
                None => Value::Null,
            },
        };
        self.values
            .borrow_mut()
            .insert(column_id.to_string(), value.clone());
        value
    }

    fn aggregate_group_value(&self, table: &Table<T>, group: &RowGroup<T>, column_id: &str) -> Value {
        if group.grouped_column_ids.iter().any(|id| id == column_id) {
            return group
                .member_rows
                .first()
                .map(|row| row.value(table, column_id))
                .unwrap_or_default();
        }

        let Some(aggregation_fn) = table
            .find_column(column_id)
            .and_then(|column| column.aggregation_fn(table))
        else {
            return Value::Null;
        };
        let leaf_values: Vec<Value> = group
            .leaf_rows
            .iter()
            .map(|row| row.value(table, column_id))
            .collect();
        let member_values: Vec<Value> = group
            .member_rows
            .iter()
            .map(|row| row.value(table, column_id))
            .collect();
        aggregation_fn.aggregate(&leaf_values, &member_values)
    }

    /// Values used for faceting: the column's `get_unique_values`, or the
    /// single cell value.
    pub fn unique_values(&self, table: &Table<T>, column_id: &str) -> Rc<[Value]> {
        if let Some(values) = self.unique_values.borrow().get(column_id) {
            return values.clone();
        }

        let unique = table
            .find_column(column_id)
            .and_then(|column| column.column_def.get_unique_values.clone());
        let values: Rc<[Value]> = match unique {
            Some(unique) if self.group.is_none() => unique(&self.original, self.index).into(),
            _ => Rc::from(vec![self.value(table, column_id)]),
        };
        self.unique_values
            .borrow_mut()
            .insert(column_id.to_string(), values.clone());
        values
    }

    /// The value, or the table's fallback when it is missing.
    pub fn render_value(&self, table: &Table<T>, column_id: &str) -> Value {
        match self.value(table, column_id) {
            Value::Null => table.options().render_fallback_value.clone(),
            value => value,
        }
    }

    /// Cached grouping value for a column, computed once by `compute`.
    pub(crate) fn cached_grouping_value(&self, column_id: &str, compute: impl FnOnce() -> Value) -> Value {
        if let Some(value) = self.grouping_values.borrow().get(column_id) {
            return value.clone();
        }
        let value = compute();
        self.grouping_values
            .borrow_mut()
            .insert(column_id.to_string(), value.clone());
        value
    }

    /// Every descendant row, depth first.
    pub fn leaf_rows(&self) -> Vec<Rc<Row<T>>> {
        let mut rows = Vec::new();
        for row in &self.sub_rows {
            rows.push(row.clone());
            rows.extend(row.leaf_rows());
        }
        rows
    }

    /// The parent row.
    pub fn parent_row(&self, table: &Table<T>) -> Option<Rc<Row<T>>> {
        let parent_id = self.parent_id.as_deref()?;
        table.row(parent_id, true).ok()
    }

    /// Every ancestor, outermost first.
    pub fn parent_rows(&self, table: &Table<T>) -> Vec<Rc<Row<T>>> {
        let mut parents = Vec::new();
        let mut current = self.parent_row(table);
        while let Some(parent) = current {
            current = parent.parent_row(table);
            parents.push(parent);
        }
        parents.reverse();
        parents
    }

    /// One cell per leaf column, in display order.
    pub fn all_cells(self: &Rc<Self>, table: &Table<T>) -> Vec<Rc<Cell<T>>> {
        table
            .all_leaf_columns()
            .iter()
            .map(|column| table.construct_cell(Cell::new(self.clone(), column.clone())))
            .collect()
    }

    /// Cells by column id.
    pub fn all_cells_by_column_id(self: &Rc<Self>, table: &Table<T>) -> HashMap<String, Rc<Cell<T>>> {
        self.all_cells(table)
            .into_iter()
            .map(|cell| (cell.column.id.clone(), cell))
            .collect()
    }
}

impl<T: RowData> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("depth", &self.depth)
            .field("parent_id", &self.parent_id)
            .field("sub_rows", &self.sub_rows)
            .finish_non_exhaustive()
    }
}
