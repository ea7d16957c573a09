use thiserror::Error;

/// Errors raised while turning a crosstab into a rendered fragment.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Unsupported chart type '{chart}': {reason}")]
    UnsupportedChart { chart: String, reason: String },

    #[error("Chart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl VizError {
    pub fn unsupported(chart: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedChart {
            chart: chart.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VizError>;
