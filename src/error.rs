use crate::engine::{EvaluationError, ParseError};
use crate::source::CsvError;
use std::env::VarError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(value: E) -> Self {
        Error(Box::new(value.into()))
    }
}

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// The query text does not follow the grammar.
    #[error(transparent)]
    ParseError(#[from] ParseError),
    /// The query is well-formed but can't be run against the data.
    #[error(transparent)]
    EvaluationError(#[from] EvaluationError),
    /// Row sources report missing or unreadable tables with this.
    #[error("Cannot load table {table}:\n{source}")]
    TableUnavailable {
        table: String,
        source: std::io::Error,
    },
    #[error("Malformed CSV data:\n{0}")]
    CsvError(#[from] CsvError),
    #[error("Internal error:\n{0}")]
    InternalError(#[from] InternalError),
    #[error("Could not find environment variable: \n{0}")]
    EnvVarError(#[from] VarError),
    #[error("IO error:\n{0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error:\n{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Error reading data from stdin")]
    DialogueError(#[from] dialoguer::Error),
}

#[derive(Error, Debug)]
pub struct InternalError(pub String);

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    pub fn into_inner(self) -> ErrorKind {
        *self.0
    }

    pub(crate) fn table_unavailable(table: &str, source: std::io::Error) -> Self {
        ErrorKind::TableUnavailable {
            table: table.to_owned(),
            source,
        }
        .into()
    }
}
