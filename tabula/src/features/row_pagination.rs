//! Row pagination

use std::rc::Rc;

use crate::feature::FeatureId;
use crate::feature::TableFeature;
use crate::model::RowData;
use crate::options::PageCount;
use crate::state::PaginationState;
use crate::state::PartialTableState;
use crate::state::Updater;
use crate::table::RowModel;
use crate::table::Table;

/// Splits the rows into pages.
pub struct RowPagination;

impl<T: RowData> TableFeature<T> for RowPagination {
    fn id(&self) -> FeatureId {
        FeatureId::RowPagination
    }

    fn initial_state(&self, state: &mut PartialTableState) {
        state.set_default(PaginationState::default());
    }
}

impl<T: RowData> Table<T> {
    // =========================================================================
    // State
    // =========================================================================

    pub fn set_pagination(&self, updater: impl Into<Updater<PaginationState>>) {
        if self.feature_enabled(FeatureId::RowPagination, "set_pagination") {
            self.update_slice(updater);
        }
    }

    pub fn reset_pagination(&self, default: bool) {
        if self.feature_enabled(FeatureId::RowPagination, "reset_pagination") {
            self.reset_slice::<PaginationState>(default);
        }
    }

    /// Moves to a page. The index is clamped to the last page when the page
    /// count is supplied through the options.
    pub fn set_page_index(&self, updater: impl Into<Updater<usize>>) {
        let updater = updater.into();
        let max_page_index = match self.options().page_count {
            Some(PageCount::Known(count)) => count.saturating_sub(1),
            Some(PageCount::Unknown) | None => usize::MAX,
        };
        self.set_pagination(Updater::update(move |old: &PaginationState| {
            let page_index = updater.resolve(&old.page_index).min(max_page_index);
            PaginationState { page_index, ..*old }
        }));
    }

    pub fn reset_page_index(&self, default: bool) {
        let page_index = if default {
            0
        } else {
            self.initial_state().slice::<PaginationState>().page_index
        };
        self.set_page_index(page_index);
    }

    /// Changes the page size, keeping the first row of the current page on
    /// screen. Sizes below one are raised to one.
    pub fn set_page_size(&self, updater: impl Into<Updater<usize>>) {
        let updater = updater.into();
        self.set_pagination(Updater::update(move |old: &PaginationState| {
            let page_size = updater.resolve(&old.page_size).max(1);
            let top_row_index = old.page_size * old.page_index;
            PaginationState {
                page_index: top_row_index / page_size,
                page_size,
            }
        }));
    }

    pub fn reset_page_size(&self, default: bool) {
        let page_size = if default {
            PaginationState::DEFAULT_PAGE_SIZE
        } else {
            self.initial_state().slice::<PaginationState>().page_size
        };
        self.set_page_size(page_size);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Every page index, or nothing when the page count is unknown.
    pub fn page_options(&self) -> Vec<usize> {
        match self.page_count() {
            Some(count) => (0..count).collect(),
            None => Vec::new(),
        }
    }

    pub fn can_previous_page(&self) -> bool {
        self.slice::<PaginationState>().page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        let page_index = self.slice::<PaginationState>().page_index;
        match self.page_count() {
            None => true,
            Some(0) => false,
            Some(count) => page_index < count - 1,
        }
    }

    pub fn previous_page(&self) {
        self.set_page_index(Updater::update(|old: &usize| old.saturating_sub(1)));
    }

    pub fn next_page(&self) {
        self.set_page_index(Updater::update(|old: &usize| old + 1));
    }

    pub fn first_page(&self) {
        self.set_page_index(0usize);
    }

    /// Moves to the last page. Does nothing while the page count is unknown.
    pub fn last_page(&self) {
        match self.page_count() {
            Some(count) => self.set_page_index(count.saturating_sub(1)),
            None => log::trace!("[pagination] last_page ignored: page count is unknown"),
        }
    }

    // =========================================================================
    // Counts
    // =========================================================================

    /// Number of pages; `None` when the caller declared it unknown.
    pub fn page_count(&self) -> Option<usize> {
        match self.options().page_count {
            Some(PageCount::Known(count)) => Some(count),
            Some(PageCount::Unknown) => None,
            None => {
                let page_size = self.slice::<PaginationState>().page_size.max(1);
                Some(self.row_count().div_ceil(page_size))
            }
        }
    }

    /// Total rows: the `row_count` option, or the rows before pagination.
    pub fn row_count(&self) -> usize {
        match self.options().row_count {
            Some(count) => count,
            None => self.pre_pagination_row_model().rows.len(),
        }
    }

    // =========================================================================
    // Row models
    // =========================================================================

    /// Input of the pagination stage.
    pub fn pre_pagination_row_model(&self) -> Rc<RowModel<T>> {
        self.expanded_row_model()
    }

    /// The rows of the current page.
    pub fn pagination_row_model(&self) -> Rc<RowModel<T>> {
        let options = self.options();
        let bypass = options.manual_pagination || !self.has_feature(FeatureId::RowPagination);
        self.stage(
            &self.stages.paginated,
            options.row_models.paginated.clone(),
            bypass,
            Self::pre_pagination_row_model,
        )
    }

    /// Returns to the first page after the rows changed.
    ///
    /// The first call only registers, so building the table keeps its
    /// initial page. Later calls queue one reset at a time.
    pub(crate) fn auto_reset_page_index(&self) {
        if !self.has_feature(FeatureId::RowPagination) {
            return;
        }
        let flags = &self.auto_reset;
        if !flags.page_index_registered.get() {
            self.queue(|table| table.auto_reset.page_index_registered.set(true));
            return;
        }

        let options = self.options();
        let enabled = options
            .auto_reset_all
            .or(options.auto_reset_page_index)
            .unwrap_or(!options.manual_pagination);
        if enabled && !flags.page_index_queued.replace(true) {
            log::debug!("[pagination] rows changed, returning to the first page");
            self.queue(|table| {
                table.reset_page_index(false);
                table.auto_reset.page_index_queued.set(false);
            });
        }
    }
}
