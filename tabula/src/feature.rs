//! Feature registry
//!
//! A feature bundles a state slice, option defaults and construct hooks for
//! the table and its entities. Features run in installation order; hooks of a
//! later feature see everything earlier features attached.

use std::fmt;
use std::rc::Rc;

use crate::error::TableError;
use crate::features::*;
use crate::model::RowData;
use crate::options::TableOptions;
use crate::state::PartialTableState;
use crate::table::Cell;
use crate::table::Column;
use crate::table::Header;
use crate::table::Row;
use crate::table::Table;

/// Identifies an installed feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    ColumnVisibility,
    ColumnOrdering,
    ColumnPinning,
    ColumnFaceting,
    ColumnFiltering,
    GlobalFaceting,
    GlobalFiltering,
    RowSorting,
    ColumnGrouping,
    RowExpanding,
    RowPagination,
    RowPinning,
    RowSelection,
    ColumnSizing,
    /// A feature defined outside this crate.
    Custom(&'static str),
}

impl FeatureId {
    /// Feature name, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureId::ColumnVisibility => "columnVisibility",
            FeatureId::ColumnOrdering => "columnOrdering",
            FeatureId::ColumnPinning => "columnPinning",
            FeatureId::ColumnFaceting => "columnFaceting",
            FeatureId::ColumnFiltering => "columnFiltering",
            FeatureId::GlobalFaceting => "globalFaceting",
            FeatureId::GlobalFiltering => "globalFiltering",
            FeatureId::RowSorting => "rowSorting",
            FeatureId::ColumnGrouping => "columnGrouping",
            FeatureId::RowExpanding => "rowExpanding",
            FeatureId::RowPagination => "rowPagination",
            FeatureId::RowPinning => "rowPinning",
            FeatureId::RowSelection => "rowSelection",
            FeatureId::ColumnSizing => "columnSizing",
            FeatureId::Custom(name) => name,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pluggable table capability.
///
/// Every hook has a no-op default. Hooks receive the entity being built
/// mutably and the table for reading options and state; data attached through
/// an entity's `extensions` stays with it for its lifetime.
///
/// # Example
///
/// ```
/// use tabula::prelude::*;
///
/// struct Stripes;
///
/// impl<T: RowData> TableFeature<T> for Stripes {
///     fn id(&self) -> FeatureId {
///         FeatureId::Custom("stripes")
///     }
///
///     fn construct_row(&self, row: &mut Row<T>, _table: &Table<T>) {
///         row.extensions.insert(row.index % 2 == 1);
///     }
/// }
///
/// let mut features = stock_features();
/// features.push(std::rc::Rc::new(Stripes));
/// let table = Table::new(
///     TableOptions::new(vec![Record::new(), Record::new()], vec![]).with_features(features),
/// )
/// .unwrap();
///
/// let rows = table.core_row_model();
/// assert_eq!(rows.rows[1].extensions.get::<bool>().as_deref(), Some(&true));
/// ```
pub trait TableFeature<T: RowData> {
    /// Feature identity. Installing two features with the same id is allowed;
    /// both run.
    fn id(&self) -> FeatureId;

    /// Seeds this feature's slices in the initial state. Use
    /// [`PartialTableState::set_default`] so caller values win.
    fn initial_state(&self, _state: &mut PartialTableState) {}

    /// Fills option defaults. Only unset (`None`) options may be written.
    fn default_options(&self, _options: &mut TableOptions<T>) {}

    /// Runs once, after the column tree is built.
    fn construct_table(&self, _table: &Table<T>) -> Result<(), TableError> {
        Ok(())
    }

    /// Runs for every column, parents before children.
    fn construct_column(&self, _column: &mut Column<T>, _table: &Table<T>) -> Result<(), TableError> {
        Ok(())
    }

    /// Runs for every row a row model creates.
    fn construct_row(&self, _row: &mut Row<T>, _table: &Table<T>) {}

    /// Runs for every cell.
    fn construct_cell(&self, _cell: &mut Cell<T>, _table: &Table<T>) {}

    /// Runs for every header.
    fn construct_header(&self, _header: &mut Header<T>, _table: &Table<T>) {}
}

/// Every built-in feature, in their canonical order.
pub fn stock_features<T: RowData>() -> Vec<Rc<dyn TableFeature<T>>> {
    vec![
        Rc::new(ColumnVisibility),
        Rc::new(ColumnOrdering),
        Rc::new(ColumnPinning),
        Rc::new(ColumnFaceting),
        Rc::new(ColumnFiltering),
        Rc::new(GlobalFaceting),
        Rc::new(GlobalFiltering),
        Rc::new(RowSorting),
        Rc::new(ColumnGrouping),
        Rc::new(RowExpanding),
        Rc::new(RowPagination),
        Rc::new(RowPinning),
        Rc::new(RowSelection),
        Rc::new(ColumnSizing),
    ]
}
