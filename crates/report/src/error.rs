//! Error types for report assembly.

use thiserror::Error;
use xtab_core::CoreError;
use xtab_viz::VizError;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while building, saving or replaying a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Crosstab error: {0}")]
    Crosstab(#[from] CoreError),

    #[error("Render error: {0}")]
    Render(#[from] VizError),

    #[error("Detection error: {0}")]
    Detect(#[from] xtab_detect::DetectError),

    #[error("Invalid template: {0}")]
    Template(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Report is empty")]
    EmptyReport,

    #[error("Replay failed at entry {index}: {source}")]
    Replay {
        index: usize,
        #[source]
        source: Box<ReportError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
