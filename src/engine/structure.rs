//! The parsed form of a query.
//!
//! Everything here owns its strings. A query is built once by the parser and then handed to the
//! executor, which only ever reads it.
use crate::engine::execution::EvaluationError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Never empty, the grammar requires at least one field.
    pub fields: Vec<FieldSpec>,
    pub table: String,
    pub join: Option<JoinSpec>,
    /// All of these have to hold for a row to be kept, even if they were joined with OR.
    pub conditions: Vec<Condition>,
    pub group_by: Option<Vec<ColumnRef>>,
}

/// Something from the SELECT list.
///
/// Every field is looked up, and shows up in the output, under its literal text. For aggregates
/// that includes the alias: `COUNT(age) AS ageCount` stays `COUNT(age) AS ageCount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    Column {
        name: String,
    },
    QualifiedColumn {
        table: String,
        column: String,
    },
    Aggregate {
        /// Exactly as written. It's only checked against the known functions when grouping.
        function: String,
        column: ColumnRef,
        text: String,
    },
}

/// A plain or `table.column` reference, as used in conditions, join keys and GROUP BY.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub table: String,
    pub left_key: ColumnRef,
    pub right_key: ColumnRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: ColumnRef,
    pub operator: Operator,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LesserThan,
    GreaterOrEqual,
    LesserOrEqual,
}

impl FieldSpec {
    /// The key this field has in rows, and in the output.
    pub fn key(&self) -> String {
        match self {
            FieldSpec::Column { name } => name.clone(),
            FieldSpec::QualifiedColumn { table, column } => format!("{table}.{column}"),
            FieldSpec::Aggregate { text, .. } => text.clone(),
        }
    }

    /// Plain and qualified columns point at a table column, aggregates don't.
    pub fn column_ref(&self) -> Option<ColumnRef> {
        match self {
            FieldSpec::Column { name } => Some(ColumnRef::named(name)),
            FieldSpec::QualifiedColumn { table, column } => {
                Some(ColumnRef::qualified(table, column))
            }
            FieldSpec::Aggregate { .. } => None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, FieldSpec::Aggregate { .. })
    }
}

impl From<ColumnRef> for FieldSpec {
    fn from(value: ColumnRef) -> Self {
        match value.table {
            Some(table) => FieldSpec::QualifiedColumn {
                table,
                column: value.column,
            },
            None => FieldSpec::Column { name: value.column },
        }
    }
}

impl ColumnRef {
    pub fn named<S: Into<String>>(column: S) -> Self {
        ColumnRef {
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified<T: Into<String>, C: Into<String>>(table: T, column: C) -> Self {
        ColumnRef {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Same as the Display output, `column` or `table.column`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn belongs_to(&self, table: &str) -> bool {
        self.table.as_deref() == Some(table)
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

impl FromStr for Operator {
    type Err = EvaluationError;

    fn from_str(symbol: &str) -> Result<Self, Self::Err> {
        let operator = match symbol {
            "=" => Operator::Equals,
            "!=" => Operator::NotEquals,
            ">" => Operator::GreaterThan,
            "<" => Operator::LesserThan,
            ">=" => Operator::GreaterOrEqual,
            "<=" => Operator::LesserOrEqual,
            unknown => return Err(EvaluationError::UnsupportedOperator(unknown.to_owned())),
        };

        Ok(operator)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LesserThan => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LesserOrEqual => "<=",
        };

        write!(f, "{symbol}")
    }
}

impl Display for JoinKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        };

        write!(f, "{name}")
    }
}
