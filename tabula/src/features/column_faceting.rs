//! Per-column facets: the rows every other filter lets through, and their
//! distinct values and numeric range.

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::table::Column;
use crate::table::FacetedMinMax;
use crate::table::FacetedUniqueValues;
use crate::table::RowModel;
use crate::table::Table;
use crate::table::instantiate;

/// Facets for filter widgets.
pub struct ColumnFaceting;

impl<T: RowData> TableFeature<T> for ColumnFaceting {
    fn id(&self) -> FeatureId {
        FeatureId::ColumnFaceting
    }
}

impl<T: RowData> Column<T> {
    /// Pre-filtered rows filtered by every active filter except this
    /// column's own.
    pub fn faceted_row_model(&self, table: &Table<T>) -> Rc<RowModel<T>> {
        table.faceted_row_model_for(&self.id, FeatureId::ColumnFaceting)
    }

    /// Distinct values of this column among its faceted rows, with counts.
    pub fn faceted_unique_values(&self, table: &Table<T>) -> FacetedUniqueValues {
        table.faceted_unique_values_for(&self.id, FeatureId::ColumnFaceting)
    }

    /// Smallest and largest numeric value among the faceted rows.
    pub fn faceted_min_max_values(&self, table: &Table<T>) -> FacetedMinMax {
        table.faceted_min_max_values_for(&self.id, FeatureId::ColumnFaceting)
    }
}

impl<T: RowData> Table<T> {
    pub(crate) fn faceted_row_model_for(&self, column_id: &str, feature: FeatureId) -> Rc<RowModel<T>> {
        self.reading(|table| {
            let stage = table
                .has_feature(feature)
                .then(|| {
                    instantiate(&table.stages.faceted, || {
                        table.options().row_models.faceted.clone().map(|create| create(table))
                    })
                })
                .flatten();
            match stage {
                Some(stage) => stage(table, column_id),
                None => table.pre_filtered_row_model(),
            }
        })
    }

    pub(crate) fn faceted_unique_values_for(&self, column_id: &str, feature: FeatureId) -> FacetedUniqueValues {
        self.reading(|table| {
            let stage = table
                .has_feature(feature)
                .then(|| {
                    instantiate(&table.stages.faceted_unique_values, || {
                        table
                            .options()
                            .row_models
                            .faceted_unique_values
                            .clone()
                            .map(|create| create(table))
                    })
                })
                .flatten();
            match stage {
                Some(stage) => stage(table, column_id),
                None => Rc::from(Vec::new()),
            }
        })
    }

    pub(crate) fn faceted_min_max_values_for(&self, column_id: &str, feature: FeatureId) -> FacetedMinMax {
        self.reading(|table| {
            let stage = table
                .has_feature(feature)
                .then(|| {
                    instantiate(&table.stages.faceted_min_max_values, || {
                        table
                            .options()
                            .row_models
                            .faceted_min_max_values
                            .clone()
                            .map(|create| create(table))
                    })
                })
                .flatten();
            stage.and_then(|stage| stage(table, column_id))
        })
    }
}
