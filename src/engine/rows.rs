//! Row data as the engine sees it.
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A single cell.
///
/// Row sources only ever produce [Value::Text]. Numbers show up when aggregates are computed,
/// and [Value::Null] marks the missing side of an outer join.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Number(f64),
    Null,
}

/// An ordered, string keyed record.
///
/// Column order is the insertion order, which is what the output uses. Lookups are linear, rows
/// are a handful of columns wide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    /// Header, in source order. Every row has a cell for each of these.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The raw text behind the value, if there is any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Best effort numeric reading, used by the aggregates and ordering comparisons.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Text(text) => parse_number(text),
            Value::Integer(integer) => Some(*integer as f64),
            Value::Number(number) => Some(*number),
            Value::Null => None,
        }
    }
}

/// Only finite numbers count: "NaN" and "inf" are text like any other word.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
            Value::Integer(integer) => write!(f, "{integer}"),
            Value::Number(number) => write!(f, "{number}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Text(text) => serializer.serialize_str(text),
            Value::Integer(integer) => serializer.serialize_i64(*integer),
            Value::Number(number) => serializer.serialize_f64(*number),
            Value::Null => serializer.serialize_none(),
        }
    }
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a new cell at the end, or replaces the value of an existing one in place.
    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();

        match self.cells.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.set(key, value);
        }

        row
    }
}

/// Rows serialize as JSON objects, keeping the column order.
impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Table {
    pub fn new<S: Into<String>>(name: S, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_insertion_order() {
        let mut row = Row::new();
        row.set("b", "1");
        row.set("a", "2");
        row.set("b", "3");

        assert_eq!(vec!["b", "a"], row.keys().collect::<Vec<_>>());
        assert_eq!(Some(&Value::from("3")), row.get("b"));
        assert!(row.contains("a"));
        assert!(!row.contains("c"));
    }

    #[test]
    fn test_numeric_reading() {
        assert_eq!(Some(30.0), Value::from("30").as_number());
        assert_eq!(Some(2.5), Value::from(" 2.5 ").as_number());
        assert_eq!(None, Value::from("John").as_number());
        assert_eq!(None, Value::Null.as_number());
        assert_eq!(Some(4.0), Value::Integer(4).as_number());
        assert_eq!(None, Value::from("NaN").as_number());
        assert_eq!(None, Value::from("inf").as_number());
        assert_eq!(None, Value::from("-Infinity").as_number());
    }

    #[test]
    fn test_json_serialization() {
        let row: Row = [
            ("name", Value::from("John")),
            ("COUNT(age)", Value::Integer(2)),
            ("AVG(age)", Value::Number(27.5)),
            ("enrollment.course", Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            r#"{"name":"John","COUNT(age)":2,"AVG(age)":27.5,"enrollment.course":null}"#,
            serde_json::to_string(&row).unwrap()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!("100", Value::Number(100.0).to_string());
        assert_eq!("NULL", Value::Null.to_string());
    }
}
