//! Row models and the stage factories

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use super::Row;
use super::Table;
use crate::model::RowData;
use crate::model::Value;
use crate::options::TableOptions;
use crate::row_models;

/// The output of one pipeline stage.
///
/// `rows` is the top-level (or display) list, `flat_rows` every row reachable
/// from it in pre-order, and `rows_by_id` indexes `flat_rows`.
pub struct RowModel<T: RowData> {
    pub rows: Vec<Rc<Row<T>>>,
    pub flat_rows: Vec<Rc<Row<T>>>,
    pub rows_by_id: HashMap<String, Rc<Row<T>>>,
}

impl<T: RowData> RowModel<T> {
    /// A model with no rows.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            flat_rows: Vec::new(),
            rows_by_id: HashMap::new(),
        }
    }

    /// Builds a model from its top-level rows. Rows reachable more than once
    /// (a display list that already contains expanded children) are listed
    /// once in `flat_rows`.
    pub fn from_rows(rows: Vec<Rc<Row<T>>>) -> Self {
        fn visit<T: RowData>(row: &Rc<Row<T>>, seen: &mut HashSet<String>, flat: &mut Vec<Rc<Row<T>>>) {
            if !seen.insert(row.id.clone()) {
                return;
            }
            flat.push(row.clone());
            for sub_row in &row.sub_rows {
                visit(sub_row, seen, flat);
            }
        }

        let mut seen = HashSet::new();
        let mut flat_rows = Vec::new();
        for row in &rows {
            visit(row, &mut seen, &mut flat_rows);
        }
        let rows_by_id = flat_rows
            .iter()
            .map(|row| (row.id.clone(), row.clone()))
            .collect();
        Self {
            rows,
            flat_rows,
            rows_by_id,
        }
    }

    /// Number of top-level rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks a row up by id.
    pub fn row(&self, id: &str) -> Option<&Rc<Row<T>>> {
        self.rows_by_id.get(id)
    }

    /// Ids of the top-level rows, in order.
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id.as_str()).collect()
    }
}

impl<T: RowData> fmt::Debug for RowModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowModel")
            .field("rows", &self.rows.len())
            .field("flat_rows", &self.flat_rows.len())
            .finish()
    }
}

// =============================================================================
// Factories
// =============================================================================

/// A pipeline stage: reads its input stage and state from the table.
pub type RowModelFn<T> = Rc<dyn Fn(&Table<T>) -> Rc<RowModel<T>>>;

/// Creates a stage for a table. Runs once, on the stage's first read; the
/// stage keeps its memo in the returned closure.
pub type RowModelFactory<T> = Rc<dyn Fn(&Table<T>) -> RowModelFn<T>>;

/// Per-column faceted rows.
pub type FacetedRowModelFn<T> = Rc<dyn Fn(&Table<T>, &str) -> Rc<RowModel<T>>>;
pub type FacetedRowModelFactory<T> = Rc<dyn Fn(&Table<T>) -> FacetedRowModelFn<T>>;

/// Distinct values with their counts, in first-seen order.
pub type FacetedUniqueValues = Rc<[(Value, usize)]>;
pub type FacetedUniqueValuesFn<T> = Rc<dyn Fn(&Table<T>, &str) -> FacetedUniqueValues>;
pub type FacetedUniqueValuesFactory<T> = Rc<dyn Fn(&Table<T>) -> FacetedUniqueValuesFn<T>>;

/// Smallest and largest numeric value.
pub type FacetedMinMax = Option<(f64, f64)>;
pub type FacetedMinMaxFn<T> = Rc<dyn Fn(&Table<T>, &str) -> FacetedMinMax>;
pub type FacetedMinMaxFactory<T> = Rc<dyn Fn(&Table<T>) -> FacetedMinMaxFn<T>>;

/// The stage factories a table uses. A missing factory makes its stage
/// forward its input.
pub struct RowModels<T: RowData> {
    pub filtered: Option<RowModelFactory<T>>,
    pub grouped: Option<RowModelFactory<T>>,
    pub sorted: Option<RowModelFactory<T>>,
    pub expanded: Option<RowModelFactory<T>>,
    pub paginated: Option<RowModelFactory<T>>,
    pub faceted: Option<FacetedRowModelFactory<T>>,
    pub faceted_unique_values: Option<FacetedUniqueValuesFactory<T>>,
    pub faceted_min_max_values: Option<FacetedMinMaxFactory<T>>,
}

impl<T: RowData> RowModels<T> {
    /// Every built-in stage.
    pub fn all() -> Self {
        Self::default()
            .with_filtered(row_models::filtered_row_model())
            .with_grouped(row_models::grouped_row_model())
            .with_sorted(row_models::sorted_row_model())
            .with_expanded(row_models::expanded_row_model())
            .with_paginated(row_models::paginated_row_model())
            .with_faceted(row_models::faceted_row_model())
            .with_faceted_unique_values(row_models::faceted_unique_values())
            .with_faceted_min_max_values(row_models::faceted_min_max_values())
    }

    pub fn with_filtered(mut self, factory: RowModelFactory<T>) -> Self {
        self.filtered = Some(factory);
        self
    }

    pub fn with_grouped(mut self, factory: RowModelFactory<T>) -> Self {
        self.grouped = Some(factory);
        self
    }

    pub fn with_sorted(mut self, factory: RowModelFactory<T>) -> Self {
        self.sorted = Some(factory);
        self
    }

    pub fn with_expanded(mut self, factory: RowModelFactory<T>) -> Self {
        self.expanded = Some(factory);
        self
    }

    pub fn with_paginated(mut self, factory: RowModelFactory<T>) -> Self {
        self.paginated = Some(factory);
        self
    }

    pub fn with_faceted(mut self, factory: FacetedRowModelFactory<T>) -> Self {
        self.faceted = Some(factory);
        self
    }

    pub fn with_faceted_unique_values(mut self, factory: FacetedUniqueValuesFactory<T>) -> Self {
        self.faceted_unique_values = Some(factory);
        self
    }

    pub fn with_faceted_min_max_values(mut self, factory: FacetedMinMaxFactory<T>) -> Self {
        self.faceted_min_max_values = Some(factory);
        self
    }
}

impl<T: RowData> Default for RowModels<T> {
    fn default() -> Self {
        Self {
            filtered: None,
            grouped: None,
            sorted: None,
            expanded: None,
            paginated: None,
            faceted: None,
            faceted_unique_values: None,
            faceted_min_max_values: None,
        }
    }
}

impl<T: RowData> Clone for RowModels<T> {
    fn clone(&self) -> Self {
        Self {
            filtered: self.filtered.clone(),
            grouped: self.grouped.clone(),
            sorted: self.sorted.clone(),
            expanded: self.expanded.clone(),
            paginated: self.paginated.clone(),
            faceted: self.faceted.clone(),
            faceted_unique_values: self.faceted_unique_values.clone(),
            faceted_min_max_values: self.faceted_min_max_values.clone(),
        }
    }
}

// =============================================================================
// Core rows
// =============================================================================

/// Builds one row per record, recursing into sub-records.
pub(crate) fn build_core_row_model<T: RowData>(table: &Table<T>, data: &[Rc<T>]) -> RowModel<T> {
    let options = table.options();
    let mut flat: Vec<Option<Rc<Row<T>>>> = Vec::new();
    let rows = access_rows(table, &options, data, 0, None, &mut flat);
    let flat_rows: Vec<Rc<Row<T>>> = flat.into_iter().flatten().collect();
    let rows_by_id = flat_rows
        .iter()
        .map(|row| (row.id.clone(), row.clone()))
        .collect();
    log::debug!(
        "[rows] core row model: {} rows, {} in total",
        rows.len(),
        flat_rows.len()
    );
    RowModel {
        rows,
        flat_rows,
        rows_by_id,
    }
}

fn access_rows<T: RowData>(
    table: &Table<T>,
    options: &TableOptions<T>,
    originals: &[Rc<T>],
    depth: usize,
    parent: Option<&Row<T>>,
    flat: &mut Vec<Option<Rc<Row<T>>>>,
) -> Vec<Rc<Row<T>>> {
    let mut rows = Vec::with_capacity(originals.len());
    for (index, original) in originals.iter().enumerate() {
        let id = match (&options.get_row_id, parent) {
            (Some(get_row_id), _) => get_row_id(original, index, parent),
            (None, Some(parent)) => format!("{}.{index}", parent.id),
            (None, None) => index.to_string(),
        };
        let mut row = Row::new(
            id,
            original.clone(),
            index,
            depth,
            parent.map(|parent| parent.id.clone()),
        );

        // Pre-order: reserve the slot before the children claim theirs.
        let slot = flat.len();
        flat.push(None);

        let children: Vec<Rc<T>> = options
            .get_sub_rows
            .as_ref()
            .and_then(|get_sub_rows| get_sub_rows(original))
            .map(|children| children.iter().cloned().map(Rc::new).collect())
            .unwrap_or_default();
        if !children.is_empty() {
            row.sub_rows = access_rows(table, options, &children, depth + 1, Some(&row), flat);
        }

        let row = table.construct_row(row);
        flat[slot] = Some(row.clone());
        rows.push(row);
    }
    rows
}
