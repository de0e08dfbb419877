//! CSV files as tables.
//!
//! A table named `student` is read from `student.csv` in the source's directory. The first line
//! is the header. Fields are separated by commas and can be wrapped in double quotes, with `""`
//! standing for a literal quote inside a quoted field.
use super::RowSource;
use crate::engine::{Row, Table};
use crate::Error;
use async_trait::async_trait;
use log::debug;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("{table}: quoted field starting on line {line} is never closed")]
    UnterminatedQuote { table: String, line: usize },
}

/// Reads `<table>.csv` files from a directory, every time a table is requested.
///
/// Wrap it in a [CachedSource](super::CachedSource) to only read each file once.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        CsvDirectory { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: &str) -> Result<PathBuf, Error> {
        // Table names come from queries, they must not be able to leave the directory.
        let is_plain_name = !table.is_empty()
            && !table.contains(['/', '\\'])
            && table != "."
            && table != "..";

        if !is_plain_name {
            return Err(Error::table_unavailable(
                table,
                IoError::new(IoErrorKind::InvalidInput, "not a valid table name"),
            ));
        }

        Ok(self.root.join(format!("{table}.csv")))
    }
}

#[async_trait]
impl RowSource for CsvDirectory {
    async fn load(&self, table: &str) -> Result<Arc<Table>, Error> {
        let path = self.table_path(table)?;
        debug!("reading table {} from {}", table, path.display());

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| Error::table_unavailable(table, error))?;

        Ok(Arc::new(parse_csv(table, &content)?))
    }
}

/// Parses CSV text into a table.
///
/// Blank lines are skipped. Unquoted fields are trimmed, quoted ones are kept as they are. Rows
/// shorter than the header get empty cells for the missing columns, extra cells are dropped.
pub fn parse_csv(table: &str, content: &str) -> Result<Table, CsvError> {
    let mut records = RecordReader::new(content);

    let columns = match records.next() {
        Some(header) => header.map_err(|line| unterminated(table, line))?,
        None => return Ok(Table::new(table, vec![], vec![])),
    };

    let mut rows = Vec::new();
    for record in records {
        let mut values = record.map_err(|line| unterminated(table, line))?.into_iter();

        let row: Row = columns
            .iter()
            .map(|column| (column.as_str(), values.next().unwrap_or_default()))
            .collect();
        rows.push(row);
    }

    debug!("parsed {} rows for table {}", rows.len(), table);

    Ok(Table::new(table, columns, rows))
}

fn unterminated(table: &str, line: usize) -> CsvError {
    CsvError::UnterminatedQuote {
        table: table.to_owned(),
        line,
    }
}

/// Emits one record per non-blank line. Errors carry the line of the unterminated quote.
struct RecordReader<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> RecordReader<'a> {
    fn new(content: &'a str) -> Self {
        RecordReader {
            chars: content.chars().peekable(),
            line: 1,
        }
    }

    fn read_record(&mut self) -> Result<Vec<String>, usize> {
        let mut record = Vec::new();
        let mut field = String::new();
        let mut quoted = false;

        while let Some(c) = self.chars.next() {
            match c {
                '"' if !quoted && field.trim().is_empty() => {
                    field.clear();
                    quoted = true;
                    self.read_quoted(&mut field)?;
                }
                ',' => record.push(finish_field(&mut field, &mut quoted)),
                '\r' if self.chars.peek() == Some(&'\n') => {}
                '\n' => {
                    self.line += 1;
                    break;
                }
                _ => field.push(c),
            }
        }

        record.push(finish_field(&mut field, &mut quoted));

        Ok(record)
    }

    /// Reads up to, and including, the closing quote.
    fn read_quoted(&mut self, field: &mut String) -> Result<(), usize> {
        let start_line = self.line;

        while let Some(c) = self.chars.next() {
            match c {
                '"' if self.chars.peek() == Some(&'"') => {
                    self.chars.next();
                    field.push('"');
                }
                '"' => return Ok(()),
                '\n' => {
                    self.line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
        }

        Err(start_line)
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Vec<String>, usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.chars.peek().is_some() {
            match self.read_record() {
                Ok(record) if is_blank(&record) => continue,
                result => return Some(result),
            }
        }

        None
    }
}

fn finish_field(field: &mut String, quoted: &mut bool) -> String {
    let value = std::mem::take(field);

    if std::mem::replace(quoted, false) {
        value
    } else {
        value.trim().to_owned()
    }
}

fn is_blank(record: &[String]) -> bool {
    record.len() == 1 && record[0].is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Value;
    use crate::error::ErrorKind;
    use std::fs;

    fn cells(table: &Table, column: &str) -> Vec<String> {
        table
            .rows
            .iter()
            .map(|row| row.get(column).map(Value::to_string).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_header_and_rows() {
        let table = parse_csv("student", "id,name,age\n1,John,30\n2,Jane,25\n").unwrap();

        assert_eq!(vec!["id", "name", "age"], table.columns);
        assert_eq!(2, table.rows.len());
        assert_eq!(vec!["John", "Jane"], cells(&table, "name"));
        assert_eq!(Some(&Value::from("30")), table.rows[0].get("age"));
    }

    #[test]
    fn test_quoting() {
        let content = "id,quote\r\n1,\"Hello, \"\"world\"\"\"\r\n2, plain \r\n";

        let table = parse_csv("quotes", content).unwrap();

        assert_eq!(vec!["Hello, \"world\"", "plain"], cells(&table, "quote"));
    }

    #[test]
    fn test_quoted_newlines_and_blank_lines() {
        let content = "id,text\n\n1,\"two\nlines\"\n\n2,x";

        let table = parse_csv("notes", content).unwrap();

        assert_eq!(vec!["two\nlines", "x"], cells(&table, "text"));
    }

    #[test]
    fn test_ragged_rows() {
        let table = parse_csv("ragged", "a,b,c\n1\n1,2,3,4\n").unwrap();

        assert_eq!(vec!["", "3"], cells(&table, "c"));
        assert_eq!(3, table.rows[1].len());
    }

    #[test]
    fn test_empty_file() {
        let table = parse_csv("empty", "").unwrap();

        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_unterminated_quote() {
        let error = parse_csv("broken", "id,name\n1,\"John\n2,Jane\n").unwrap_err();

        assert!(matches!(
            error,
            CsvError::UnterminatedQuote { line: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(
            directory.path().join("student.csv"),
            "id,name,age\n1,John,30\n2,Jane,25\n",
        )
        .unwrap();

        let source = CsvDirectory::new(directory.path());
        let table = source.load("student").await.unwrap();

        assert_eq!("student", table.name);
        assert_eq!(vec!["1", "2"], cells(&table, "id"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let directory = tempfile::tempdir().unwrap();

        let error = CsvDirectory::new(directory.path())
            .load("student")
            .await
            .unwrap_err();

        match error.into_inner() {
            ErrorKind::TableUnavailable { table, source } => {
                assert_eq!("student", table);
                assert_eq!(IoErrorKind::NotFound, source.kind());
            }
            other => panic!("Expected a missing table, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_names_cannot_escape_the_directory() {
        let directory = tempfile::tempdir().unwrap();

        let error = CsvDirectory::new(directory.path())
            .load("../student")
            .await
            .unwrap_err();

        assert!(matches!(
            error.kind(),
            ErrorKind::TableUnavailable { source, .. } if source.kind() == IoErrorKind::InvalidInput
        ));
    }
}
