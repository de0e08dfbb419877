//! WHERE conditions.
//!
//! Comparison policy:
//! - `=` and `!=` compare the raw text.
//! - `>`, `<`, `>=` and `<=` compare as numbers when both sides look like numbers, and fall back
//!   to comparing the text otherwise. So `age > 22` is numeric, `name > J` is lexicographic.
//! - A missing cell, or a NULL from an outer join, only ever satisfies `!=`.
use crate::engine::rows::{parse_number, Row, Value};
use crate::engine::structure::{Condition, Operator};
use std::borrow::Cow;
use std::cmp::Ordering;

pub fn evaluate(row: &Row, condition: &Condition) -> bool {
    let cell = row.get(&condition.field.key()).and_then(cell_text);

    let Some(cell) = cell else {
        return condition.operator == Operator::NotEquals;
    };
    let expected = condition.value.as_str();

    match condition.operator {
        Operator::Equals => cell == expected,
        Operator::NotEquals => cell != expected,
        Operator::GreaterThan => compare(&cell, expected) == Ordering::Greater,
        Operator::LesserThan => compare(&cell, expected) == Ordering::Less,
        Operator::GreaterOrEqual => compare(&cell, expected) != Ordering::Less,
        Operator::LesserOrEqual => compare(&cell, expected) != Ordering::Greater,
    }
}

fn cell_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Text(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Null => None,
        number => Some(Cow::Owned(number.to_string())),
    }
}

fn compare(cell: &str, expected: &str) -> Ordering {
    match (parse_number(cell), parse_number(expected)) {
        (Some(cell), Some(expected)) => cell.total_cmp(&expected),
        _ => cell.cmp(expected),
    }
}
