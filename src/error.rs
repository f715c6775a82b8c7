use std::fmt;

use thiserror::Error;

use crate::data::classify::Bucket;
use crate::data::model::LogicalType;

/// Every failure the EDA pipeline reports back to a session.
///
/// None of these are fatal: the session's dataset stays usable after any of
/// them, and the message is meant to be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum Error {
    /// The input looked like an archive but could not be used as one.
    #[error("invalid archive: {0}")]
    Format(String),

    /// The delimited text could not be parsed into a table.
    #[error("could not parse CSV: {0}")]
    Parse(String),

    #[error("column '{0}' does not exist")]
    ColumnNotFound(String),

    /// At least one value of the column is not representable in the target
    /// type. The column was left untouched.
    #[error("{}", describe_coercion_failure(.column, .target, .failures, .total))]
    TypeCoercion {
        column: String,
        target: LogicalType,
        /// First offenders, in row order.
        failures: Vec<CellFailure>,
        /// Number of offending cells in the whole column.
        total: usize,
    },

    /// A selected column is no longer a member of the requested bucket.
    #[error("column '{column}' is not a {bucket} column any more; re-select columns")]
    StaleSelection { bucket: Bucket, column: String },

    /// A user-facing name (type or bucket label) was not recognised.
    #[error("unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One cell that failed to convert during a coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFailure {
    /// 0-based row position.
    pub row: usize,
    /// The original value, rendered as text.
    pub value: String,
    pub reason: String,
}

impl fmt::Display for CellFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: '{}' ({})", self.row, self.value, self.reason)
    }
}

fn describe_coercion_failure(
    column: &str,
    target: &LogicalType,
    failures: &[CellFailure],
    total: &usize,
) -> String {
    let total = *total;
    let listed: Vec<String> = failures.iter().map(|c| c.to_string()).collect();
    let mut msg = format!(
        "cannot convert column '{column}' to {target}: {}",
        listed.join(", ")
    );
    if total > failures.len() {
        msg.push_str(&format!(" and {} more", total - failures.len()));
    }
    msg
}
