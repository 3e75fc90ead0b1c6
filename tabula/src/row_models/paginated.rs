//! The pagination stage

use std::rc::Rc;

use super::expand_rows;
use crate::memo::Memo;
use crate::model::RowData;
use crate::state::ExpandedState;
use crate::state::PaginationState;
use crate::table::RowModel;
use crate::table::RowModelFactory;
use crate::table::RowModelFn;
use crate::table::Table;

type PaginationDeps<T> = (Rc<RowModel<T>>, Rc<PaginationState>, bool, Option<Rc<ExpandedState>>);

/// Creates the pagination stage.
///
/// Takes `page_size` top-level rows starting at `page_index * page_size`.
/// When expanded rows are not paginated, the sub-rows of expanded rows on
/// the page are added after slicing. `flat_rows` holds the page rows and
/// all their descendants.
pub fn paginated_row_model<T: RowData>() -> RowModelFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memo: Memo<PaginationDeps<T>, Rc<RowModel<T>>> = Memo::new("paginated_row_model");
        Rc::new(move |table: &Table<T>| {
            let paginate_expanded_rows = table.options().paginate_expanded_rows.unwrap_or(true);
            let deps = (
                table.pre_pagination_row_model(),
                table.slice::<PaginationState>(),
                paginate_expanded_rows,
                (!paginate_expanded_rows).then(|| table.slice::<ExpandedState>()),
            );
            memo.get(deps, |(model, pagination, paginate_expanded_rows, _)| {
                if model.rows.is_empty() {
                    return model.clone();
                }
                let start = pagination.page_index.saturating_mul(pagination.page_size);
                let end = start.saturating_add(pagination.page_size).min(model.rows.len());
                let page = model.rows.get(start..end).unwrap_or_default().to_vec();
                let rows = if *paginate_expanded_rows {
                    page
                } else {
                    expand_rows(table, &page)
                };
                log::trace!("[pagination] page {} holds {} rows", pagination.page_index, rows.len());
                Rc::new(RowModel::from_rows(rows))
            })
        }) as RowModelFn<T>
    })
}
