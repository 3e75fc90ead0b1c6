//! Facets of the global filter

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::table::FacetedMinMax;
use crate::table::FacetedUniqueValues;
use crate::table::RowModel;
use crate::table::Table;

/// Key the global filter uses in place of a column id.
pub const GLOBAL_FILTER_ID: &str = "__global__";

/// Facets for a global search widget.
pub struct GlobalFaceting;

impl<T: RowData> TableFeature<T> for GlobalFaceting {
    fn id(&self) -> FeatureId {
        FeatureId::GlobalFaceting
    }
}

impl<T: RowData> Table<T> {
    /// Pre-filtered rows filtered by every column filter, ignoring the
    /// global filter.
    pub fn global_faceted_row_model(&self) -> Rc<RowModel<T>> {
        self.faceted_row_model_for(GLOBAL_FILTER_ID, FeatureId::GlobalFaceting)
    }

    pub fn global_faceted_unique_values(&self) -> FacetedUniqueValues {
        self.faceted_unique_values_for(GLOBAL_FILTER_ID, FeatureId::GlobalFaceting)
    }

    pub fn global_faceted_min_max_values(&self) -> FacetedMinMax {
        self.faceted_min_max_values_for(GLOBAL_FILTER_ID, FeatureId::GlobalFaceting)
    }
}
