//! Headless table engine
//!
//! `tabula` turns row data and column definitions into memoized, derived
//! views ("row models"): filtered, grouped, sorted, expanded and paginated
//! rows, plus the column, header and cell structure a grid renderer needs.
//! Nothing here renders; the table only answers structural questions.
//!
//! Features (sorting, filtering, grouping, selection, ...) are installed as an
//! ordered list of [`TableFeature`](feature::TableFeature) objects. Each one
//! contributes its state slice, option defaults and construct hooks, and the
//! matching query/mutation API lives on [`Table`], [`Column`], [`Row`],
//! [`Cell`] and [`Header`].
//!
//! # Example
//!
//! ```
//! use tabula::prelude::*;
//!
//! let data = vec![
//!     Record::new().with("id", 1).with("age", 30),
//!     Record::new().with("id", 2).with("age", 20),
//! ];
//! let columns = vec![ColumnDef::accessor("id"), ColumnDef::accessor("age")];
//!
//! let table = Table::new(
//!     TableOptions::new(data, columns)
//!         .with_features(stock_features())
//!         .with_row_models(RowModels::all()),
//! )
//! .unwrap();
//!
//! table.set_sorting(SortingState::from(vec![ColumnSort::asc("age")]));
//! let ids: Vec<String> = table
//!     .row_model()
//!     .rows
//!     .iter()
//!     .map(|row| row.value(&table, "id").to_string())
//!     .collect();
//! assert_eq!(ids, vec!["2", "1"]);
//! ```

pub mod error;
pub mod extensions;
pub mod feature;
pub mod features;
pub mod fns;
pub mod memo;
pub mod model;
pub mod options;
pub mod row_models;
pub mod state;
pub mod table;

pub use error::TableError;
pub use feature::FeatureId;
pub use feature::TableFeature;
pub use model::Record;
pub use model::RowData;
pub use model::Value;
pub use options::TableOptions;
pub use table::*;

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::table::Cell;
    pub use crate::table::Column;
    pub use crate::table::ColumnDef;
    pub use crate::table::Header;
    pub use crate::table::HeaderGroup;
    pub use crate::table::Row;
    pub use crate::table::RowModel;
    pub use crate::table::RowModels;
    pub use crate::table::Rows;
    pub use crate::table::Table;
    pub use crate::error::TableError;
    pub use crate::feature::FeatureId;
    pub use crate::feature::TableFeature;
    pub use crate::feature::stock_features;
    pub use crate::features::*;
    pub use crate::fns::AggregationFn;
    pub use crate::fns::FilterFn;
    pub use crate::fns::SortingFn;
    pub use crate::fns::Strategy;
    pub use crate::model::Record;
    pub use crate::model::RowData;
    pub use crate::model::Value;
    pub use crate::options::*;
    pub use crate::state::*;
}
