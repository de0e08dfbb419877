//! Equi-joins between the FROM table and the joined table.
//!
//! All join kinds are a nested probe: for every row on the driving side, we scan the other side for
//! rows with the same key. Tables are small enough that this beats building an index.
//!
//! The rows we build carry the requested fields first, under their own keys, then every column of
//! both tables as `table.column`, then every column again under its bare name. WHERE, GROUP BY and
//! aggregates can use those even when they're not selected, projection drops them at the end.
use crate::engine::rows::{Row, Table, Value};
use crate::engine::structure::{FieldSpec, JoinKind, JoinSpec};
use log::debug;

pub fn join(spec: &JoinSpec, main: &Table, joined: &Table, fields: &[FieldSpec]) -> Vec<Row> {
    let keys = JoinKeys::orient(spec, joined);
    let builder = RowBuilder {
        fields,
        main,
        joined,
    };

    let rows = match spec.kind {
        JoinKind::Inner => inner_join(&keys, &builder),
        JoinKind::Left => left_join(&keys, &builder),
        JoinKind::Right => right_join(&keys, &builder),
    };

    debug!(
        "{} join of {} ({} rows) and {} ({} rows) produced {} rows",
        spec.kind,
        main.name,
        main.rows.len(),
        joined.name,
        joined.rows.len(),
        rows.len()
    );

    rows
}

fn inner_join(keys: &JoinKeys, builder: &RowBuilder) -> Vec<Row> {
    let mut result = Vec::new();

    for main_row in &builder.main.rows {
        for joined_row in keys.matches_in_joined(main_row, builder.joined) {
            result.push(builder.build(Some(main_row), Some(joined_row)));
        }
    }

    result
}

fn left_join(keys: &JoinKeys, builder: &RowBuilder) -> Vec<Row> {
    let mut result = Vec::new();

    for main_row in &builder.main.rows {
        let mut matched = false;
        for joined_row in keys.matches_in_joined(main_row, builder.joined) {
            result.push(builder.build(Some(main_row), Some(joined_row)));
            matched = true;
        }

        if !matched {
            result.push(builder.build(Some(main_row), None));
        }
    }

    result
}

fn right_join(keys: &JoinKeys, builder: &RowBuilder) -> Vec<Row> {
    let mut result = Vec::new();

    for joined_row in &builder.joined.rows {
        let mut matched = false;
        for main_row in keys.matches_in_main(joined_row, builder.main) {
            result.push(builder.build(Some(main_row), Some(joined_row)));
            matched = true;
        }

        if !matched {
            result.push(builder.build(None, Some(joined_row)));
        }
    }

    result
}

/// The key column for each side, by bare column name.
struct JoinKeys<'a> {
    main: &'a str,
    joined: &'a str,
}

impl<'a> JoinKeys<'a> {
    /// `ON enrollment.student_id = student.id` works the same as the other way around: the key
    /// qualified with the joined table's name is the joined side.
    ///
    /// Unqualified keys are read left = main, right = joined.
    fn orient(spec: &'a JoinSpec, joined: &Table) -> Self {
        let (left, right) = (&spec.left_key, &spec.right_key);

        if left.belongs_to(&joined.name) && !right.belongs_to(&joined.name) {
            JoinKeys {
                main: &right.column,
                joined: &left.column,
            }
        } else {
            JoinKeys {
                main: &left.column,
                joined: &right.column,
            }
        }
    }

    fn matches_in_joined<'r>(
        &'r self,
        main_row: &'r Row,
        joined: &'r Table,
    ) -> impl Iterator<Item = &'r Row> + 'r {
        let key = main_row.get(self.main);

        joined
            .rows
            .iter()
            .filter(move |joined_row| same_key(key, joined_row.get(self.joined)))
    }

    fn matches_in_main<'r>(
        &'r self,
        joined_row: &'r Row,
        main: &'r Table,
    ) -> impl Iterator<Item = &'r Row> + 'r {
        let key = joined_row.get(self.joined);

        main.rows
            .iter()
            .filter(move |main_row| same_key(main_row.get(self.main), key))
    }
}

/// Exact equality. NULLs and missing cells never match anything.
fn same_key(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => !left.is_null() && left == right,
        _ => false,
    }
}

struct RowBuilder<'a> {
    fields: &'a [FieldSpec],
    main: &'a Table,
    joined: &'a Table,
}

impl RowBuilder<'_> {
    /// A missing side (outer joins) gives NULL for all of its fields.
    fn build(&self, main_row: Option<&Row>, joined_row: Option<&Row>) -> Row {
        let mut row = Row::with_capacity(
            self.fields.len() + self.main.columns.len() + self.joined.columns.len(),
        );

        for field in self.fields {
            // aggregates are computed later, when grouping
            let Some(column) = field.column_ref() else {
                continue;
            };

            let from_main = match &column.table {
                Some(table) => *table == self.main.name,
                None => self.main.has_column(&column.column),
            };
            let source = if from_main { main_row } else { joined_row };

            row.set(field.key(), cell(source, &column.column));
        }

        let sides = [(self.main, main_row), (self.joined, joined_row)];
        for (table, source) in sides {
            for column in &table.columns {
                let key = format!("{}.{}", table.name, column);
                if !row.contains(&key) {
                    row.set(key, cell(source, column));
                }
            }
        }

        // Bare names last, the main table wins when both tables have the column.
        for (table, source) in sides {
            for column in &table.columns {
                if !row.contains(column) {
                    row.set(column.as_str(), cell(source, column));
                }
            }
        }

        row
    }
}

fn cell(row: Option<&Row>, column: &str) -> Value {
    row.and_then(|row| row.get(column))
        .cloned()
        .unwrap_or(Value::Null)
}
