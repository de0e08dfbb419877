/// WHERE condition evaluation.
pub mod conditions;
/// GROUP BY partitioning and aggregate functions.
pub mod grouping;
/// INNER, LEFT and RIGHT joins.
pub mod join;

use crate::engine::rows::{Row, Value};
use crate::engine::structure::{FieldSpec, Query};
use crate::engine::syntax::parse;
use crate::source::RowSource;
use log::debug;
use thiserror::Error;

/// The query parsed fine, but something in it can't be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    #[error("Unsupported aggregate function: {0}")]
    UnsupportedAggregate(String),
}

/// Runs queries against the tables of a [RowSource].
///
/// The executor keeps no state between queries, so a single one can run any number of them at the
/// same time, as long as the source allows it.
///
/// ```no_run
/// # async fn run() -> Result<(), rusty_select::Error> {
/// use rusty_select::source::CsvDirectory;
/// use rusty_select::QueryExecutor;
///
/// let executor = QueryExecutor::new(CsvDirectory::new("data"));
/// let rows = executor.execute("SELECT id, name FROM student WHERE age > 22").await?;
/// # Ok(())
/// # }
/// ```
pub struct QueryExecutor<S> {
    source: S,
}

impl<S: RowSource> QueryExecutor<S> {
    pub fn new(source: S) -> Self {
        QueryExecutor { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn execute(&self, input: &str) -> Result<Vec<Row>, crate::Error> {
        let query = parse(input)?;

        self.execute_query(&query).await
    }

    /// Join, then filter, then group, then project.
    pub async fn execute_query(&self, query: &Query) -> Result<Vec<Row>, crate::Error> {
        let keep = |row: &Row| {
            query
                .conditions
                .iter()
                .all(|condition| conditions::evaluate(row, condition))
        };

        let rows: Vec<Row> = match &query.join {
            Some(spec) => {
                // Independent loads, no need to wait for one before starting the other.
                let (main, joined) = tokio::try_join!(
                    self.source.load(&query.table),
                    self.source.load(&spec.table)
                )?;

                let mut rows = join::join(spec, &main, &joined, &query.fields);
                rows.retain(keep);
                rows
            }
            None => {
                let table = self.source.load(&query.table).await?;

                table.rows.iter().filter(|&row| keep(row)).cloned().collect()
            }
        };
        debug!("{} rows left after filtering", rows.len());

        let rows = match &query.group_by {
            Some(group_by) => grouping::group(rows, group_by, &query.fields)?,
            None => rows,
        };

        Ok(project(&rows, &query.fields))
    }
}

/// Picks the requested fields out of each row, in SELECT order.
///
/// The rows already have everything under the right keys, joins and grouping made sure of that.
/// Fields a row doesn't have come out as NULL.
pub fn project(rows: &[Row], fields: &[FieldSpec]) -> Vec<Row> {
    let keys: Vec<String> = fields.iter().map(FieldSpec::key).collect();

    rows.iter()
        .map(|row| {
            keys.iter()
                .map(|key| {
                    let value = row.get(key).cloned().unwrap_or(Value::Null);
                    (key.as_str(), value)
                })
                .collect()
        })
        .collect()
}
