/// Runs parsed queries against row sources.
mod execution;
mod rendering;
/// Cells, rows and tables.
mod rows;
/// The parsed query.
mod structure;
/// Query text parsing.
mod syntax;


pub use execution::conditions::evaluate;
pub use execution::grouping::{group, AggregateFunction};
pub use execution::join::join;
pub use execution::{project, EvaluationError, QueryExecutor};
pub use rendering::{render_json_lines, render_table};
pub use rows::{Row, Table, Value};
pub use structure::{ColumnRef, Condition, FieldSpec, JoinKind, JoinSpec, Operator, Query};
pub use syntax::{parse, ParseError, PestError, Rule};
