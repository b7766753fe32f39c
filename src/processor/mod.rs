use thiserror::Error;

pub mod aggregates;
pub mod column;
pub mod employee;
pub mod employee_table;
pub mod export;
pub mod filter_options;
pub mod report;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Source is not delimited text, or a required column is absent
    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Outcome of a load: how many rows were read and which cells were filled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseSummary {
    pub rows_processed: usize,
    pub filled: Vec<FilledCell>,
}

/// A missing source cell that was replaced with a default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledCell {
    /// 1-based line in the source, header is line 1
    pub line: usize,
    pub column: String,
    pub value: String,
}

/// Row restriction predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterPredicate {
    /// Categorical value is one of the listed values
    OneOf(Vec<String>),
    /// Integer value lies in the inclusive range
    Between(i64, i64),
}
