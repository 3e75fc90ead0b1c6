//! Headers and header groups

use std::fmt;
use std::rc::Rc;

use super::Column;
use super::HeaderGroups;
use super::Table;
use crate::extensions::Extensions;
use crate::model::RowData;
use crate::state::ColumnPinningState;

/// One header cell: a column at one header depth.
///
/// A placeholder header repeats a column that has no parent at this depth,
/// so every header row spans the full width.
pub struct Header<T: RowData> {
    /// `family_depth_column_subheader`, empty parts skipped. Bottom headers
    /// use the column id.
    pub id: String,
    /// Position in the header group.
    pub index: usize,
    pub depth: usize,
    pub column: Rc<Column<T>>,
    pub header_group_id: String,
    pub is_placeholder: bool,
    pub placeholder_id: Option<String>,
    /// Number of visible leaf headers under this one.
    pub col_span: usize,
    pub row_span: usize,
    pub sub_headers: Vec<Rc<Header<T>>>,
    pub extensions: Extensions,
    /// Preceding header in the same group.
    pub(crate) previous: Option<Rc<Header<T>>>,
}

/// One row of headers.
pub struct HeaderGroup<T: RowData> {
    pub id: String,
    pub depth: usize,
    pub headers: Vec<Rc<Header<T>>>,
}

impl<T: RowData> Header<T> {
    /// This header and every header below it, children before parents.
    pub fn leaf_headers(self: &Rc<Self>) -> Vec<Rc<Header<T>>> {
        let mut headers = Vec::new();
        for sub_header in &self.sub_headers {
            headers.extend(sub_header.leaf_headers());
        }
        headers.push(self.clone());
        headers
    }
}

impl<T: RowData> fmt::Debug for Header<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("id", &self.id)
            .field("column", &self.column.id)
            .field("depth", &self.depth)
            .field("is_placeholder", &self.is_placeholder)
            .field("col_span", &self.col_span)
            .field("sub_headers", &self.sub_headers)
            .finish_non_exhaustive()
    }
}

impl<T: RowData> fmt::Debug for HeaderGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderGroup")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("headers", &self.headers)
            .finish()
    }
}

// =============================================================================
// Table API
// =============================================================================

impl<T: RowData> Table<T> {
    /// Header rows for all visible leaf columns: left pinned, center, right
    /// pinned.
    pub fn header_groups(&self) -> HeaderGroups<T> {
        let deps = (self.all_columns(), self.visible_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.header_groups.get(deps, |(all_columns, _, _)| {
            let mut leaves = self.left_visible_leaf_columns().to_vec();
            leaves.extend(self.center_visible_leaf_columns().iter().cloned());
            leaves.extend(self.right_visible_leaf_columns().iter().cloned());
            build_header_groups(self, all_columns, &leaves, None)
        })
    }

    /// Header rows for the left-pinned columns.
    pub fn left_header_groups(&self) -> HeaderGroups<T> {
        let deps = (self.all_columns(), self.visible_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.left_header_groups.get(deps, |(all_columns, _, _)| {
            build_header_groups(self, all_columns, &self.left_visible_leaf_columns(), Some("left"))
        })
    }

    /// Header rows for the unpinned columns.
    pub fn center_header_groups(&self) -> HeaderGroups<T> {
        let deps = (self.all_columns(), self.visible_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.center_header_groups.get(deps, |(all_columns, _, _)| {
            build_header_groups(self, all_columns, &self.center_visible_leaf_columns(), Some("center"))
        })
    }

    /// Header rows for the right-pinned columns.
    pub fn right_header_groups(&self) -> HeaderGroups<T> {
        let deps = (self.all_columns(), self.visible_leaf_columns(), self.slice::<ColumnPinningState>());
        self.caches.right_header_groups.get(deps, |(all_columns, _, _)| {
            build_header_groups(self, all_columns, &self.right_visible_leaf_columns(), Some("right"))
        })
    }

    /// Header groups bottom to top.
    pub fn footer_groups(&self) -> Vec<Rc<HeaderGroup<T>>> {
        self.header_groups().iter().rev().cloned().collect()
    }

    pub fn left_footer_groups(&self) -> Vec<Rc<HeaderGroup<T>>> {
        self.left_header_groups().iter().rev().cloned().collect()
    }

    pub fn center_footer_groups(&self) -> Vec<Rc<HeaderGroup<T>>> {
        self.center_header_groups().iter().rev().cloned().collect()
    }

    pub fn right_footer_groups(&self) -> Vec<Rc<HeaderGroup<T>>> {
        self.right_header_groups().iter().rev().cloned().collect()
    }

    /// Every header of every group, top group first.
    pub fn flat_headers(&self) -> Vec<Rc<Header<T>>> {
        flatten(&self.header_groups())
    }

    pub fn left_flat_headers(&self) -> Vec<Rc<Header<T>>> {
        flatten(&self.left_header_groups())
    }

    pub fn center_flat_headers(&self) -> Vec<Rc<Header<T>>> {
        flatten(&self.center_header_groups())
    }

    pub fn right_flat_headers(&self) -> Vec<Rc<Header<T>>> {
        flatten(&self.right_header_groups())
    }

    /// Every header under the top headers of the left, center and right
    /// groups, children before parents.
    pub fn leaf_headers(&self) -> Vec<Rc<Header<T>>> {
        [
            self.left_header_groups(),
            self.center_header_groups(),
            self.right_header_groups(),
        ]
        .iter()
        .filter_map(|groups| groups.first().cloned())
        .flat_map(|group| group.headers.clone())
        .flat_map(|header| header.leaf_headers())
        .collect()
    }

    pub fn left_leaf_headers(&self) -> Vec<Rc<Header<T>>> {
        bottom(self.left_flat_headers())
    }

    pub fn center_leaf_headers(&self) -> Vec<Rc<Header<T>>> {
        bottom(self.center_flat_headers())
    }

    pub fn right_leaf_headers(&self) -> Vec<Rc<Header<T>>> {
        bottom(self.right_flat_headers())
    }
}

fn flatten<T: RowData>(groups: &[Rc<HeaderGroup<T>>]) -> Vec<Rc<Header<T>>> {
    groups.iter().flat_map(|group| group.headers.clone()).collect()
}

fn bottom<T: RowData>(headers: Vec<Rc<Header<T>>>) -> Vec<Rc<Header<T>>> {
    headers
        .into_iter()
        .filter(|header| header.sub_headers.is_empty())
        .collect()
}

// =============================================================================
// Building
// =============================================================================

/// A header under construction; children are indices into the draft list.
struct Draft<T: RowData> {
    column: Rc<Column<T>>,
    id: String,
    depth: usize,
    index: usize,
    is_placeholder: bool,
    placeholder_id: Option<String>,
    sub_headers: Vec<usize>,
    group_id: String,
    col_span: usize,
    row_span: usize,
}

impl<T: RowData> Draft<T> {
    fn new(column: Rc<Column<T>>, id: String, depth: usize, index: usize) -> Self {
        Self {
            column,
            id,
            depth,
            index,
            is_placeholder: false,
            placeholder_id: None,
            sub_headers: Vec::new(),
            group_id: String::new(),
            col_span: 0,
            row_span: 0,
        }
    }
}

/// Builds header rows bottom-up from `leaves`.
///
/// Each pass wraps the previous row's headers in their parent columns.
/// Consecutive headers with the same parent share one parent header; a
/// header whose column has no parent at this depth gets a placeholder
/// wrapping its own column.
pub(crate) fn build_header_groups<T: RowData>(
    table: &Table<T>,
    all_columns: &[Rc<Column<T>>],
    leaves: &[Rc<Column<T>>],
    family: Option<&str>,
) -> HeaderGroups<T> {
    let max_depth = max_depth(table, all_columns, 1);

    let mut drafts: Vec<Draft<T>> = leaves
        .iter()
        .enumerate()
        .map(|(index, column)| Draft::new(column.clone(), column.id.clone(), max_depth, index))
        .collect();
    let mut to_group: Vec<usize> = (0..drafts.len()).collect();
    let mut groups: Vec<(usize, String, Vec<usize>)> = Vec::new();
    let mut depth = max_depth - 1;

    loop {
        let group_id = match family {
            Some(family) => format!("{family}_{depth}"),
            None => depth.to_string(),
        };
        let mut pending: Vec<usize> = Vec::new();

        for &child in &to_group {
            let child_column = drafts[child].column.clone();
            let parent = if child_column.depth == depth {
                child_column.parent(table)
            } else {
                None
            };
            let (column, is_placeholder) = match parent {
                Some(parent) => (parent, false),
                None => (child_column, true),
            };

            match pending.last() {
                Some(&last) if Rc::ptr_eq(&drafts[last].column, &column) => {
                    drafts[last].sub_headers.push(child);
                }
                _ => {
                    let id = header_id(family, depth, &column.id, &drafts[child].id);
                    let placeholder_id = is_placeholder.then(|| {
                        pending
                            .iter()
                            .filter(|&&p| Rc::ptr_eq(&drafts[p].column, &column))
                            .count()
                            .to_string()
                    });
                    let mut draft = Draft::new(column, id, depth, pending.len());
                    draft.is_placeholder = is_placeholder;
                    draft.placeholder_id = placeholder_id;
                    draft.sub_headers.push(child);
                    drafts.push(draft);
                    pending.push(drafts.len() - 1);
                }
            }
            drafts[child].group_id = group_id.clone();
        }

        groups.push((depth, group_id, to_group));
        if depth == 0 {
            break;
        }
        to_group = pending;
        depth -= 1;
    }

    groups.reverse();
    if let Some((_, _, top)) = groups.first() {
        let top = top.clone();
        assign_spans(table, &mut drafts, &top);
    }

    let mut built: Vec<Option<Rc<Header<T>>>> = vec![None; drafts.len()];
    let mut header_groups = Vec::with_capacity(groups.len());
    for (depth, id, members) in groups.into_iter().rev() {
        let mut previous: Option<Rc<Header<T>>> = None;
        let mut headers = Vec::with_capacity(members.len());
        for index in members {
            let draft = &drafts[index];
            let header = table.construct_header(Header {
                id: draft.id.clone(),
                index: draft.index,
                depth: draft.depth,
                column: draft.column.clone(),
                header_group_id: draft.group_id.clone(),
                is_placeholder: draft.is_placeholder,
                placeholder_id: draft.placeholder_id.clone(),
                col_span: draft.col_span,
                row_span: draft.row_span,
                sub_headers: draft
                    .sub_headers
                    .iter()
                    .filter_map(|&sub| built[sub].clone())
                    .collect(),
                extensions: Extensions::new(),
                previous: previous.clone(),
            });
            built[index] = Some(header.clone());
            previous = Some(header.clone());
            headers.push(header);
        }
        header_groups.push(Rc::new(HeaderGroup { id, depth, headers }));
    }
    header_groups.reverse();
    header_groups.into()
}

fn max_depth<T: RowData>(table: &Table<T>, columns: &[Rc<Column<T>>], depth: usize) -> usize {
    columns
        .iter()
        .filter(|column| column.is_visible(table))
        .fold(depth, |deepest, column| {
            if column.columns.is_empty() {
                deepest
            } else {
                deepest.max(max_depth(table, &column.columns, depth + 1))
            }
        })
}

fn header_id(family: Option<&str>, depth: usize, column_id: &str, sub_header_id: &str) -> String {
    let depth = (depth > 0).then(|| depth.to_string());
    [family, depth.as_deref(), Some(column_id), Some(sub_header_id)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Sets column and row spans from the top headers down. Returns the spans
/// of `headers`.
fn assign_spans<T: RowData>(table: &Table<T>, drafts: &mut [Draft<T>], headers: &[usize]) -> Vec<(usize, usize)> {
    let mut spans = Vec::with_capacity(headers.len());
    for &index in headers {
        let (col_span, child_row_span) = if !drafts[index].column.is_visible(table) {
            (0, 0)
        } else if drafts[index].sub_headers.is_empty() {
            (1, 0)
        } else {
            let sub_headers = drafts[index].sub_headers.clone();
            let child_spans = assign_spans(table, drafts, &sub_headers);
            (
                child_spans.iter().map(|(col_span, _)| col_span).sum(),
                child_spans.iter().map(|(_, row_span)| *row_span).min().unwrap_or(0),
            )
        };
        let row_span = 1 + child_row_span;
        drafts[index].col_span = col_span;
        drafts[index].row_span = row_span;
        spans.push((col_span, row_span));
    }
    spans
}
