use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the dashboard core.
///
/// An empty filtered range is not an error. It shows up as `None` bounds
/// and is handled by the chart composer.
#[derive(Debug, Error)]
pub enum DashError {
    /// The store is missing or could not be parsed.
    #[error("Data unavailable at {}: {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// A ticker or column is not present in the COT table.
    #[error("{kind} not found: {key}")]
    KeyNotFound { kind: KeyKind, key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Ticker,
    Column,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                KeyKind::Ticker => "Ticker",
                KeyKind::Column => "Column",
            }
        )
    }
}

impl DashError {
    pub fn data_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DashError::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_key_not_found(&self) -> bool {
        matches!(self, DashError::KeyNotFound { .. })
    }
}

pub type Result<T, E = DashError> = std::result::Result<T, E>;
