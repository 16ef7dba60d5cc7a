use thiserror::Error;

use crate::model::Column;

/// A row that could not be turned into a bar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("line {line}: missing column `{column}`")]
    MissingColumn { line: usize, column: Column },
    #[error("line {line}: column `{column}` is not a valid number: {value:?}")]
    UnparseableNumeric {
        line: usize,
        column: Column,
        value: String,
    },
    #[error("line {line}: timestamp does not match `{format}`: {value:?}")]
    UnparseableTimestamp {
        line: usize,
        value: String,
        format: String,
    },
}

impl NormalizeError {
    pub fn line(&self) -> usize {
        match self {
            NormalizeError::MissingColumn { line, .. }
            | NormalizeError::UnparseableNumeric { line, .. }
            | NormalizeError::UnparseableTimestamp { line, .. } => *line,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("header is missing required column `{0}`")]
    MissingHeader(Column),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("bar time {0} is outside the representable date range")]
    TimeOutOfRange(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("utc offset out of range: {0} seconds")]
    InvalidOffset(i64),
}
