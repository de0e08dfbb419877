//! A small SQL SELECT engine over row sources.
//!
//! Queries go through [parse] into a [Query], which the [QueryExecutor] runs against a
//! [RowSource](source::RowSource): join, filter, group, then project.

// I don't really care, and it's not important for this project
#![allow(clippy::result_large_err)]

pub mod cache;
pub mod context;
mod engine;
mod error;
pub mod source;

pub use engine::{
    evaluate, group, join, parse, project, render_json_lines, render_table, AggregateFunction,
    ColumnRef, Condition, EvaluationError, FieldSpec, JoinKind, JoinSpec, Operator, ParseError,
    PestError, Query, QueryExecutor, Row, Rule, Table, Value,
};
pub use error::{Error, ErrorKind, InternalError};
