//! The grouping stage

use std::collections::HashMap;
use std::rc::Rc;

use crate::memo::Memo;
use crate::model::RowData;
use crate::model::Value;
use crate::state::GroupingState;
use crate::table::Row;
use crate::table::RowGroup;
use crate::table::RowModel;
use crate::table::RowModelFactory;
use crate::table::RowModelFn;
use crate::table::Table;

/// Creates the grouping stage.
///
/// Rows are grouped by the first grouping column, each group again by the
/// next one, and so on. Groups keep the order in which their first member
/// appears. A group row's id is `column:value`, prefixed with its parent
/// group's id and `>` below the first level.
pub fn grouped_row_model<T: RowData>() -> RowModelFactory<T> {
    Rc::new(|_table: &Table<T>| {
        let memo: Memo<(Rc<GroupingState>, Rc<RowModel<T>>), Rc<RowModel<T>>> = Memo::new("grouped_row_model");
        Rc::new(move |table: &Table<T>| {
            let deps = (table.slice::<GroupingState>(), table.pre_grouped_row_model());
            memo.get_with_hook(
                deps,
                |(grouping, model)| {
                    if model.rows.is_empty() || grouping.is_empty() {
                        return model.clone();
                    }
                    let grouping: Rc<[String]> = grouping
                        .iter()
                        .filter(|id| table.find_column(id).is_some())
                        .cloned()
                        .collect();
                    if grouping.is_empty() {
                        return model.clone();
                    }

                    let rows = group_rows(table, &model.rows, &grouping, 0, None);
                    log::debug!(
                        "[grouping] {} rows in {} top-level groups",
                        model.flat_rows.len(),
                        rows.len()
                    );
                    Rc::new(RowModel::from_rows(rows))
                },
                |_| {
                    table.auto_reset_expanded();
                    table.auto_reset_page_index();
                },
            )
        }) as RowModelFn<T>
    })
}

fn group_rows<T: RowData>(
    table: &Table<T>,
    rows: &[Rc<Row<T>>],
    grouping: &Rc<[String]>,
    depth: usize,
    parent_id: Option<&str>,
) -> Vec<Rc<Row<T>>> {
    let Some(column_id) = grouping.get(depth) else {
        return rows
            .iter()
            .map(|row| place_member(table, row, depth, parent_id))
            .collect();
    };

    let mut groups: Vec<(String, Value, Vec<Rc<Row<T>>>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let value = row.grouping_value(table, column_id);
        let key = value.to_string();
        match positions.get(&key) {
            Some(&position) => groups[position].2.push(row.clone()),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, value, vec![row.clone()]));
            }
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(index, (key, value, members))| {
            let id = match parent_id {
                Some(parent_id) => format!("{parent_id}>{column_id}:{key}"),
                None => format!("{column_id}:{key}"),
            };
            let sub_rows = group_rows(table, &members, grouping, depth + 1, Some(&id));
            let leaf_rows = members
                .iter()
                .flat_map(|row| std::iter::once(row.clone()).chain(row.leaf_rows()))
                .collect();

            let mut row = Row::new(
                id,
                members[0].original.clone(),
                index,
                depth,
                parent_id.map(String::from),
            );
            row.sub_rows = sub_rows;
            row.group = Some(Rc::new(RowGroup {
                column_id: column_id.clone(),
                value,
                grouped_column_ids: grouping.clone(),
                leaf_rows,
                member_rows: members,
            }));
            table.construct_row(row)
        })
        .collect()
}

/// Re-parents a source row under its group, shifting its subtree down to
/// the group's depth.
fn place_member<T: RowData>(table: &Table<T>, row: &Rc<Row<T>>, depth: usize, parent_id: Option<&str>) -> Rc<Row<T>> {
    let sub_rows = row
        .sub_rows
        .iter()
        .map(|sub_row| place_member(table, sub_row, depth + 1, Some(&row.id)))
        .collect();
    table.construct_row(row.derive(sub_rows, depth, parent_id.map(String::from)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::stock_features;
    use crate::model::Record;
    use crate::options::TableOptions;
    use crate::table::ColumnDef;
    use crate::table::RowModels;

    fn table() -> Table<Record> {
        let data = vec![
            Record::new().with("team", "red").with("city", "Oslo").with("score", 3),
            Record::new().with("team", "blue").with("city", "Oslo").with("score", 5),
            Record::new().with("team", "red").with("city", "Bergen").with("score", 4),
        ];
        let columns = vec![
            ColumnDef::accessor("team"),
            ColumnDef::accessor("city"),
            ColumnDef::accessor("score"),
        ];
        Table::new(
            TableOptions::new(data, columns)
                .with_features(stock_features())
                .with_row_models(RowModels::all()),
        )
        .unwrap()
    }

    #[test]
    fn test_group_ids_chain_parent_ids() {
        let table = table();
        let grouping: Rc<[String]> = Rc::from(vec!["team".to_string(), "city".to_string()]);
        let rows = group_rows(&table, &table.core_row_model().rows, &grouping, 0, None);

        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["team:red", "team:blue"]);

        let nested: Vec<&str> = rows[0].sub_rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(nested, vec!["team:red>city:Oslo", "team:red>city:Bergen"]);
        assert_eq!(rows[0].sub_rows[0].depth, 1);
        assert_eq!(rows[0].sub_rows[0].parent_id.as_deref(), Some("team:red"));
    }

    #[test]
    fn test_members_move_under_their_group() {
        let table = table();
        let grouping: Rc<[String]> = Rc::from(vec!["team".to_string()]);
        let rows = group_rows(&table, &table.core_row_model().rows, &grouping, 0, None);

        let members: Vec<&str> = rows[0].sub_rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(members, vec!["0", "2"]);
        assert_eq!(rows[0].sub_rows[0].depth, 1);
        assert_eq!(rows[0].sub_rows[0].parent_id.as_deref(), Some("team:red"));
        assert_eq!(rows[0].group_leaf_rows().len(), 2);
    }
}
