//! Built-in features
//!
//! Each module defines a unit struct implementing
//! [`TableFeature`](crate::feature::TableFeature) (state slice, option
//! defaults) and the feature's API as inherent methods on the table and its
//! entities. Mutators of a feature that is not installed do nothing.

mod column_faceting;
mod column_filtering;
mod column_grouping;
mod column_ordering;
mod column_pinning;
mod column_sizing;
mod column_visibility;
mod global_faceting;
mod global_filtering;
mod row_expanding;
mod row_pagination;
mod row_pinning;
mod row_selection;
mod row_sorting;

pub use column_faceting::*;
pub use column_filtering::*;
pub use column_grouping::*;
pub use column_ordering::*;
pub use column_pinning::*;
pub use column_sizing::*;
pub use column_visibility::*;
pub use global_faceting::*;
pub use global_filtering::*;
pub use row_expanding::*;
pub use row_pagination::*;
pub use row_pinning::*;
pub use row_selection::*;
pub use row_sorting::*;
