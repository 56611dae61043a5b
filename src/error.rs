use polars::prelude::PolarsError;
use std::path::PathBuf;

/// Errors raised while loading, validating or rendering the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// None of the candidate locations holds the dataset
    #[error("dataset file not found (searched {} location(s))", searched.len())]
    DatasetNotFound { searched: Vec<PathBuf> },

    /// The user deselected every seller group
    #[error("choose at least one seller group")]
    EmptySelection,

    /// A required source column is absent
    #[error("required column '{header}' ({field}) is missing from the dataset")]
    MissingColumn { field: &'static str, header: String },

    /// The order timestamp column could not be parsed for every row
    #[error("order timestamps could not be parsed: {message}")]
    InvalidTimestamp { message: String },

    /// A currency column contains text that is not a number once separators are removed
    #[error("column '{column}' contains values that are not amounts: {message}")]
    InvalidAmount { column: String, message: String },

    /// A normalized table does not carry the expected column types
    #[error("unexpected table layout: {0}")]
    InvalidSchema(String),

    /// Strict validation found suspicious rows
    #[error("dataset failed validation: {0}")]
    Validation(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Conditions the UI turns into a notice rather than a crash.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            DashboardError::DatasetNotFound { .. } | DashboardError::EmptySelection
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
