//! GROUP BY and aggregates.
use crate::engine::execution::EvaluationError;
use crate::engine::rows::{Row, Value};
use crate::engine::structure::{ColumnRef, FieldSpec};
use log::debug;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

/// Partitions rows by their values at `group_by`, and computes one output row per partition.
///
/// Partitions come out in the order their first row appeared in. Output rows have the group by
/// columns, taken from the first row of their partition, followed by the aggregate fields. Any
/// other field from the SELECT list is left out.
pub fn group(
    rows: Vec<Row>,
    group_by: &[ColumnRef],
    fields: &[FieldSpec],
) -> Result<Vec<Row>, crate::Error> {
    // Resolve the functions first, so an unknown one fails even when there are no rows.
    let aggregates = fields
        .iter()
        .filter_map(|field| match field {
            FieldSpec::Aggregate {
                function,
                column,
                text,
            } => Some((text, function, column)),
            _ => None,
        })
        .map(|(text, function, column)| {
            let function: AggregateFunction = function.parse()?;
            Ok((text.as_str(), function, column.key()))
        })
        .collect::<Result<Vec<_>, EvaluationError>>()?;

    let group_keys: Vec<String> = group_by.iter().map(ColumnRef::key).collect();
    let partitions = partition(rows, &group_keys);
    debug!("grouped rows into {} partitions", partitions.len());

    let grouped = partitions
        .into_iter()
        .map(|partition| {
            let mut result = Row::with_capacity(group_keys.len() + aggregates.len());
            let first = &partition[0];

            for key in &group_keys {
                result.set(key.as_str(), first.get(key).cloned().unwrap_or(Value::Null));
            }

            for (text, function, column) in &aggregates {
                result.set(*text, function.apply(&partition, column));
            }

            result
        })
        .collect();

    Ok(grouped)
}

/// Never returns an empty partition.
fn partition(rows: Vec<Row>, group_keys: &[String]) -> Vec<Vec<Row>> {
    let mut partitions: Vec<Vec<Row>> = Vec::new();
    // A key tuple instead of a joined string: no separator can ever clash with the data.
    let mut index: HashMap<Vec<Option<String>>, usize> = HashMap::new();

    for row in rows {
        let key = group_keys
            .iter()
            .map(|column| {
                row.get(column)
                    .filter(|value| !value.is_null())
                    .map(Value::to_string)
            })
            .collect::<Vec<_>>();

        match index.get(&key) {
            Some(&position) => partitions[position].push(row),
            None => {
                index.insert(key, partitions.len());
                partitions.push(vec![row]);
            }
        }
    }

    partitions
}

impl AggregateFunction {
    /// SUM, AVG, MAX and MIN only look at values that read as numbers, everything else is
    /// skipped. AVG still divides by the number of rows.
    pub fn apply(&self, rows: &[Row], column: &str) -> Value {
        let numbers = || {
            rows.iter()
                .filter_map(|row| row.get(column))
                .filter_map(Value::as_number)
        };

        match self {
            AggregateFunction::Count => Value::Integer(rows.len() as i64),
            // Not sum(): an empty f64 sum is -0.0.
            AggregateFunction::Sum => Value::Number(numbers().fold(0.0, |total, n| total + n)),
            AggregateFunction::Avg => {
                if rows.is_empty() {
                    Value::Null
                } else {
                    Value::Number(numbers().fold(0.0, |total, n| total + n) / rows.len() as f64)
                }
            }
            AggregateFunction::Max => numbers()
                .reduce(f64::max)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AggregateFunction::Min => numbers()
                .reduce(f64::min)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = EvaluationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let function = match name.to_ascii_uppercase().as_str() {
            "COUNT" => AggregateFunction::Count,
            "SUM" => AggregateFunction::Sum,
            "AVG" => AggregateFunction::Avg,
            "MAX" => AggregateFunction::Max,
            "MIN" => AggregateFunction::Min,
            _ => return Err(EvaluationError::UnsupportedAggregate(name.to_owned())),
        };

        Ok(function)
    }
}
