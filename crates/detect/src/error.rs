use std::ops::Range;
use thiserror::Error;

/// Errors raised while recovering table structure from a grid.
///
/// Both structural variants are local to one block: the scan reports them
/// and moves on to the next separator boundary.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Cannot detect block '{block}' at row {row}: {reason}")]
    DetectionFailure {
        block: String,
        row: usize,
        reason: String,
    },

    #[error("Header span mismatch in block '{block}': node '{label}' spans {span:?} but its children cover {children:?}")]
    HeaderSpanMismatch {
        block: String,
        label: String,
        span: Range<usize>,
        children: Vec<Range<usize>>,
    },

    #[error("No tables found in grid")]
    NoTablesFound,

    #[error("Grid error: {0}")]
    Grid(#[from] xtab_grid::GridError),
}

impl DetectError {
    /// Create a detection failure.
    pub fn failure(block: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Self::DetectionFailure {
            block: block.into(),
            row,
            reason: reason.into(),
        }
    }

    /// Name of the block the error belongs to, if any.
    #[must_use]
    pub fn block(&self) -> Option<&str> {
        match self {
            Self::DetectionFailure { block, .. } | Self::HeaderSpanMismatch { block, .. } => {
                Some(block)
            }
            Self::NoTablesFound | Self::Grid(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;
