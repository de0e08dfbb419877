//! Reads an .sql file that contains our integration tests.
//!
//! These files start with the tables the tests run against, as CSV:
//! ```sql
//! -- Table: student
//! id,name,age
//! 1,John,30
//! 2,Jane,25
//! ```
//! A table ends at the first blank line.
//!
//! After the tables come the tests:
//! ```sql
//! --       v___________________________________v--- this is the input
//! -- Test: SELECT name FROM student WHERE age > 26
//! {"name":"John"}
//! ```
//! All tests start with "-- Test:" followed by the query on the same line. The next lines
//! until a blank line are the expected output, one JSON object per row. A test with no output
//! lines expects no rows. Expected errors are written as `error: <first line of the message>`.
//!
//! Tables declared after the first test are ignored.
use crate::engine::Table;
use crate::source::{parse_csv, MemorySource};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::{Enumerate, Peekable};
use std::path::PathBuf;

type TestLineIterator = Peekable<Enumerate<Lines<BufReader<File>>>>;

pub struct SqlTestFileReader {
    /// Built from the tables at the top of the file, shared by all the tests in the file.
    pub source: MemorySource,
    lines: TestLineIterator,
}

pub struct Test {
    pub line_nr: usize,
    pub input: String,
    pub expected: String,
}

impl Iterator for SqlTestFileReader {
    type Item = Result<Test, crate::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        for (line_nr, line_res) in self.lines.by_ref() {
            match line_res {
                Ok(line) if line.starts_with("-- Test: ") => {
                    return Some(self.create_test(line_nr, line));
                }
                Ok(_) => {
                    // Ignore this line: any line not in a -- Test: block is ignored.
                }
                Err(err) => {
                    return Some(Err(err.into()));
                }
            }
        }

        None
    }
}

impl SqlTestFileReader {
    pub fn new(file_path: PathBuf) -> Result<Self, crate::Error> {
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);

        let mut lines = reader.lines().enumerate().peekable();
        let source = read_tables(&mut lines)?;

        Ok(SqlTestFileReader { source, lines })
    }

    fn create_test(&mut self, line_nr: usize, input_line: String) -> Result<Test, crate::Error> {
        let input = input_line["-- Test: ".len()..].trim().to_owned();
        let expected = read_block(&mut self.lines)?.join("\n");

        Ok(Test {
            line_nr,
            input,
            expected,
        })
    }
}

/// Stops right before the first test.
fn read_tables(lines: &mut TestLineIterator) -> Result<MemorySource, crate::Error> {
    let mut source = MemorySource::new();

    while let Some((_, next_line)) = lines.peek() {
        let is_test = matches!(next_line, Ok(line) if line.starts_with("-- Test: "));
        if is_test {
            break;
        }

        let (_, line) = lines.next().expect("lines.peek() is checked above");
        let line = line?;

        if let Some(name) = line.strip_prefix("-- Table: ") {
            let csv = read_block(lines)?.join("\n");
            let table: Table = parse_csv(name.trim(), &csv)?;
            source.insert(table);
        }
    }

    Ok(source)
}

/// All lines until the next blank line, or the end of the file.
fn read_block(lines: &mut TestLineIterator) -> Result<Vec<String>, crate::Error> {
    let mut block = Vec::new();

    for (_, line) in lines.by_ref() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }

        block.push(line);
    }

    Ok(block)
}
