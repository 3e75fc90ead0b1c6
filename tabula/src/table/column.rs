//! Column definitions and the column tree

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use super::Columns;
use super::Table;
use crate::error::TableError;
use crate::extensions::Extensions;
use crate::features::LeafOrder;
use crate::features::SortUndefined;
use crate::fns::AggregationFn;
use crate::fns::FilterFn;
use crate::fns::SortingFn;
use crate::fns::Strategy;
use crate::memo::Memo;
use crate::model::RowData;
use crate::model::Value;

/// Reads a column value from a record and its index.
pub type AccessorFn<T> = Rc<dyn Fn(&T, usize) -> Value>;

/// Reads several values from a record, for faceting.
pub type UniqueValuesFn<T> = Rc<dyn Fn(&T, usize) -> Vec<Value>>;

/// Reads the value a record is grouped by.
pub type GroupingValueFn<T> = Rc<dyn Fn(&T) -> Value>;

/// Caller-facing description of a column.
///
/// Unset (`None`) fields fall back to the table's `default_column`, then to
/// the built-in defaults.
pub struct ColumnDef<T: RowData> {
    pub id: Option<String>,
    /// Field key; dots walk into nested maps (`"address.city"`).
    pub accessor_key: Option<String>,
    pub accessor_fn: Option<AccessorFn<T>>,
    pub header: Option<String>,
    pub footer: Option<String>,
    /// Child definitions; a column with children is a group column.
    pub columns: Vec<ColumnDef<T>>,

    pub enable_hiding: Option<bool>,
    pub enable_pinning: Option<bool>,

    pub size: Option<f64>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub enable_resizing: Option<bool>,

    pub filter_fn: Option<Strategy<FilterFn>>,
    pub enable_column_filter: Option<bool>,
    pub enable_global_filter: Option<bool>,
    pub get_unique_values: Option<UniqueValuesFn<T>>,

    pub sorting_fn: Option<Strategy<SortingFn>>,
    pub enable_sorting: Option<bool>,
    pub enable_multi_sort: Option<bool>,
    pub invert_sorting: Option<bool>,
    pub sort_desc_first: Option<bool>,
    pub sort_undefined: Option<SortUndefined>,

    pub aggregation_fn: Option<Strategy<AggregationFn>>,
    pub enable_grouping: Option<bool>,
    pub get_grouping_value: Option<GroupingValueFn<T>>,
}

impl<T: RowData> Default for ColumnDef<T> {
    fn default() -> Self {
        Self {
            id: None,
            accessor_key: None,
            accessor_fn: None,
            header: None,
            footer: None,
            columns: Vec::new(),
            enable_hiding: None,
            enable_pinning: None,
            size: None,
            min_size: None,
            max_size: None,
            enable_resizing: None,
            filter_fn: None,
            enable_column_filter: None,
            enable_global_filter: None,
            get_unique_values: None,
            sorting_fn: None,
            enable_sorting: None,
            enable_multi_sort: None,
            invert_sorting: None,
            sort_desc_first: None,
            sort_undefined: None,
            aggregation_fn: None,
            enable_grouping: None,
            get_grouping_value: None,
        }
    }
}

impl<T: RowData> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            accessor_key: self.accessor_key.clone(),
            accessor_fn: self.accessor_fn.clone(),
            header: self.header.clone(),
            footer: self.footer.clone(),
            columns: self.columns.clone(),
            enable_hiding: self.enable_hiding,
            enable_pinning: self.enable_pinning,
            size: self.size,
            min_size: self.min_size,
            max_size: self.max_size,
            enable_resizing: self.enable_resizing,
            filter_fn: self.filter_fn.clone(),
            enable_column_filter: self.enable_column_filter,
            enable_global_filter: self.enable_global_filter,
            get_unique_values: self.get_unique_values.clone(),
            sorting_fn: self.sorting_fn.clone(),
            enable_sorting: self.enable_sorting,
            enable_multi_sort: self.enable_multi_sort,
            invert_sorting: self.invert_sorting,
            sort_desc_first: self.sort_desc_first,
            sort_undefined: self.sort_undefined,
            aggregation_fn: self.aggregation_fn.clone(),
            enable_grouping: self.enable_grouping,
            get_grouping_value: self.get_grouping_value.clone(),
        }
    }
}

impl<T: RowData> ColumnDef<T> {
    /// A column reading the field `key`. Dots in the key walk into nested
    /// maps; the column id is the key with dots replaced by `_`.
    pub fn accessor(key: impl Into<String>) -> Self {
        Self {
            accessor_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// A column computed by a function. Needs an explicit id.
    pub fn accessor_fn(id: impl Into<String>, accessor: impl Fn(&T, usize) -> Value + 'static) -> Self {
        Self {
            id: Some(id.into()),
            accessor_fn: Some(Rc::new(accessor)),
            ..Self::default()
        }
    }

    /// A group column. Its id defaults to the header.
    pub fn group(header: impl Into<String>, columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            header: Some(header.into()),
            columns,
            ..Self::default()
        }
    }

    /// A column without data (actions, checkboxes).
    pub fn display(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn with_enable_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = Some(enabled);
        self
    }

    pub fn with_enable_pinning(mut self, enabled: bool) -> Self {
        self.enable_pinning = Some(enabled);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_min_size(mut self, size: f64) -> Self {
        self.min_size = Some(size);
        self
    }

    pub fn with_max_size(mut self, size: f64) -> Self {
        self.max_size = Some(size);
        self
    }

    pub fn with_enable_resizing(mut self, enabled: bool) -> Self {
        self.enable_resizing = Some(enabled);
        self
    }

    pub fn with_filter_fn(mut self, strategy: impl Into<Strategy<FilterFn>>) -> Self {
        self.filter_fn = Some(strategy.into());
        self
    }

    pub fn with_enable_column_filter(mut self, enabled: bool) -> Self {
        self.enable_column_filter = Some(enabled);
        self
    }

    pub fn with_enable_global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = Some(enabled);
        self
    }

    /// Supplies the values faceting counts for each record.
    pub fn with_unique_values(mut self, f: impl Fn(&T, usize) -> Vec<Value> + 'static) -> Self {
        self.get_unique_values = Some(Rc::new(f));
        self
    }

    pub fn with_sorting_fn(mut self, strategy: impl Into<Strategy<SortingFn>>) -> Self {
        self.sorting_fn = Some(strategy.into());
        self
    }

    pub fn with_enable_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = Some(enabled);
        self
    }

    pub fn with_enable_multi_sort(mut self, enabled: bool) -> Self {
        self.enable_multi_sort = Some(enabled);
        self
    }

    pub fn with_invert_sorting(mut self, invert: bool) -> Self {
        self.invert_sorting = Some(invert);
        self
    }

    pub fn with_sort_desc_first(mut self, enabled: bool) -> Self {
        self.sort_desc_first = Some(enabled);
        self
    }

    pub fn with_sort_undefined(mut self, placement: SortUndefined) -> Self {
        self.sort_undefined = Some(placement);
        self
    }

    pub fn with_aggregation_fn(mut self, strategy: impl Into<Strategy<AggregationFn>>) -> Self {
        self.aggregation_fn = Some(strategy.into());
        self
    }

    pub fn with_enable_grouping(mut self, enabled: bool) -> Self {
        self.enable_grouping = Some(enabled);
        self
    }

    /// Groups by a derived value instead of the cell value.
    pub fn with_grouping_value(mut self, f: impl Fn(&T) -> Value + 'static) -> Self {
        self.get_grouping_value = Some(Rc::new(f));
        self
    }

    /// Copies unset settings from `defaults`. Identity, accessors, headers
    /// and children are never inherited.
    fn merged(&self, defaults: Option<&ColumnDef<T>>) -> ColumnDef<T> {
        let mut def = self.clone();
        let Some(defaults) = defaults else {
            return def;
        };

        macro_rules! inherit {
            ($($field:ident),+) => {
                $(def.$field = def.$field.take().or_else(|| defaults.$field.clone());)+
            };
        }
        macro_rules! inherit_copy {
            ($($field:ident),+) => {
                $(def.$field = def.$field.or(defaults.$field);)+
            };
        }

        inherit_copy!(
            enable_hiding,
            enable_pinning,
            size,
            min_size,
            max_size,
            enable_resizing,
            enable_column_filter,
            enable_global_filter,
            enable_sorting,
            enable_multi_sort,
            invert_sorting,
            sort_desc_first,
            sort_undefined,
            enable_grouping
        );
        inherit!(filter_fn, get_unique_values, sorting_fn, aggregation_fn, get_grouping_value);
        def
    }
}

impl<T: RowData> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("accessor_key", &self.accessor_key)
            .field("header", &self.header)
            .field("columns", &self.columns.len())
            .finish_non_exhaustive()
    }
}

/// A built column.
///
/// Immutable once built; per-column state lives in the table state and is
/// read through the column's feature methods.
pub struct Column<T: RowData> {
    pub id: String,
    /// Nesting level; top-level columns are 0.
    pub depth: usize,
    pub parent_id: Option<String>,
    /// Child columns of a group column.
    pub columns: Vec<Rc<Column<T>>>,
    /// The definition merged with the table's default column.
    pub column_def: ColumnDef<T>,
    pub accessor_fn: Option<AccessorFn<T>>,
    pub extensions: Extensions,
    leaf_columns: Memo<(Rc<LeafOrder>,), Columns<T>>,
}

impl<T: RowData> Column<T> {
    fn new(
        table: &Table<T>,
        def: &ColumnDef<T>,
        depth: usize,
        parent_id: Option<&str>,
        path: &str,
    ) -> Result<Self, TableError> {
        let options = table.options();
        let column_def = def.merged(options.default_column.as_deref());

        let id = def
            .id
            .clone()
            .or_else(|| def.accessor_key.as_ref().map(|key| key.replace('.', "_")))
            .or_else(|| def.header.clone());
        let Some(id) = id else {
            let path = path.to_string();
            return Err(if def.accessor_fn.is_some() {
                TableError::MissingAccessorColumnId { path }
            } else {
                TableError::MissingColumnId { path }
            });
        };

        let accessor_fn = match (&def.accessor_fn, &def.accessor_key) {
            (Some(accessor), _) => Some(accessor.clone()),
            (None, Some(key)) if key.contains('.') => {
                let key = key.clone();
                Some(Rc::new(move |original: &T, _index: usize| access_path(original, &key)) as AccessorFn<T>)
            }
            (None, Some(key)) => {
                let key = key.clone();
                Some(Rc::new(move |original: &T, _index: usize| original.field(&key).unwrap_or_default())
                    as AccessorFn<T>)
            }
            (None, None) => None,
        };

        Ok(Self {
            id,
            depth,
            parent_id: parent_id.map(String::from),
            columns: Vec::new(),
            column_def,
            accessor_fn,
            extensions: Extensions::new(),
            leaf_columns: Memo::new("column_leaf_columns"),
        })
    }

    /// Header text: the definition's header, or the id.
    pub fn header(&self) -> &str {
        self.column_def.header.as_deref().unwrap_or(&self.id)
    }

    /// Returns `true` if the column reads data.
    pub fn has_accessor(&self) -> bool {
        self.accessor_fn.is_some()
    }

    /// Reads this column's value from a record.
    pub fn access(&self, original: &T, index: usize) -> Value {
        match &self.accessor_fn {
            Some(accessor) => accessor(original, index),
            None => Value::Null,
        }
    }

    /// This column and all its descendants, parents first.
    pub fn flat_columns(self: &Rc<Self>) -> Vec<Rc<Column<T>>> {
        let mut flat = vec![self.clone()];
        for child in &self.columns {
            flat.extend(child.flat_columns());
        }
        flat
    }

    /// The leaf columns under this column, in display order. A leaf column
    /// returns itself.
    pub fn leaf_columns(self: &Rc<Self>, table: &Table<T>) -> Columns<T> {
        if self.columns.is_empty() {
            return Rc::from(vec![self.clone()]);
        }
        self.leaf_columns.get((table.leaf_order(),), |(order,)| {
            let leaves = self
                .columns
                .iter()
                .flat_map(|child| child.leaf_columns(table).iter().cloned().collect::<Vec<_>>())
                .collect();
            order.apply(leaves).into()
        })
    }

    /// The parent group column.
    pub fn parent(&self, table: &Table<T>) -> Option<Rc<Column<T>>> {
        self.parent_id.as_deref().and_then(|id| table.find_column(id))
    }
}

impl<T: RowData> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("parent_id", &self.parent_id)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// Builds the column tree, running the column hooks parents first.
pub(crate) fn build_columns<T: RowData>(
    table: &Table<T>,
    defs: &[ColumnDef<T>],
) -> Result<Vec<Rc<Column<T>>>, TableError> {
    let mut seen = HashSet::new();
    build_level(table, defs, 0, None, "", &mut seen)
}

fn build_level<T: RowData>(
    table: &Table<T>,
    defs: &[ColumnDef<T>],
    depth: usize,
    parent_id: Option<&str>,
    parent_path: &str,
    seen: &mut HashSet<String>,
) -> Result<Vec<Rc<Column<T>>>, TableError> {
    let mut columns = Vec::with_capacity(defs.len());
    for (index, def) in defs.iter().enumerate() {
        let path = if parent_path.is_empty() {
            index.to_string()
        } else {
            format!("{parent_path}.{index}")
        };

        let mut column = Column::new(table, def, depth, parent_id, &path)?;
        if !seen.insert(column.id.clone()) {
            return Err(TableError::DuplicateColumnId(column.id));
        }
        table.construct_column(&mut column)?;
        column.columns = build_level(table, &def.columns, depth + 1, Some(&column.id), &path, seen)?;
        columns.push(Rc::new(column));
    }
    Ok(columns)
}

/// Walks a dotted accessor path. The first segment is a record field, the
/// rest index into nested maps.
fn access_path<T: RowData>(original: &T, path: &str) -> Value {
    let mut segments = path.split('.');
    let first = segments.next().unwrap_or_default();
    let Some(mut value) = original.field(first) else {
        warn_missing_segment(first, path);
        return Value::Null;
    };
    for segment in segments {
        match value.get(segment) {
            Some(next) => value = next.clone(),
            None => {
                warn_missing_segment(segment, path);
                return Value::Null;
            }
        }
    }
    value
}

fn warn_missing_segment(segment: &str, path: &str) {
    if cfg!(debug_assertions) {
        log::warn!("[columns] \"{segment}\" in accessor path \"{path}\" resolved to undefined");
    }
}
