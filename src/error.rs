use std::{io, path::PathBuf};

/// Run-level failures: each of these aborts the analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("cannot read `{}`", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid budget configuration: {0}")]
    InvalidBudgetConfig(String),

    #[error("no interval readings found in {n_files} file(s)")]
    EmptySeries { n_files: usize },
}

/// File-level failures: the file is skipped, the run continues.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("unexpected root element `{0}`, expected an Atom feed or entry")]
    UnexpectedRoot(String),

    #[error("no ESPI interval blocks found")]
    NoIntervalBlocks,
}

/// Entry-level failures: the interval reading is skipped and counted.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing `{0}` element")]
    MissingElement(&'static str),

    #[error("`{element}` is not an integer: `{text}`")]
    InvalidNumber { element: &'static str, text: String },

    #[error("non-positive duration: {0} s")]
    NonPositiveDuration(i64),

    #[error("negative value: {0}")]
    NegativeValue(i64),

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}
