//! Plot configurations: everything needed to reproduce one report entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use xtab_core::CrosstabRequest;
use xtab_viz::{ChartType, StyleOptions};

/// Series colors used when a configuration names none.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#0068c9", "#83c9ff", "#ff2b2b", "#ffabab", "#29b09d", "#7defa1", "#ff8700", "#ffd16a",
    "#6d3fc0", "#d5dae5",
];

/// The default series colors as owned strings.
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect()
}

/// Optional axis titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl AxisLabels {
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// One report entry's crosstab and presentation settings.
///
/// Older templates used `row_index`, `col_index_array` and `color_sequence`;
/// those names are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(alias = "row_index")]
    pub row_dimension: String,
    #[serde(alias = "col_index_array")]
    pub column_dimensions: Vec<String>,
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "AxisLabels::is_empty")]
    pub axis_labels: AxisLabels,
    #[serde(alias = "color_sequence", default = "default_palette")]
    pub color_palette: Vec<String>,
    #[serde(default, alias = "drop_categories")]
    pub dropped_categories: BTreeSet<String>,
}

impl PlotConfig {
    /// A bar chart of `row_dimension` against `column_dimensions`.
    pub fn new(row_dimension: impl Into<String>, column_dimensions: Vec<String>) -> Self {
        Self {
            row_dimension: row_dimension.into(),
            column_dimensions,
            chart_type: ChartType::default(),
            title: String::new(),
            subtitle: String::new(),
            axis_labels: AxisLabels::default(),
            color_palette: default_palette(),
            dropped_categories: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = chart_type;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    #[must_use]
    pub fn with_axis_labels(mut self, x: Option<String>, y: Option<String>) -> Self {
        self.axis_labels = AxisLabels { x, y };
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        self.color_palette = palette;
        self
    }

    #[must_use]
    pub fn with_dropped<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropped_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// The crosstab this entry runs.
    pub fn request(&self) -> CrosstabRequest {
        CrosstabRequest {
            row_dimension: self.row_dimension.clone(),
            column_dimensions: self.column_dimensions.clone(),
            dropped_categories: self.dropped_categories.clone(),
        }
    }

    /// Presentation settings handed to the renderer.
    pub fn style(&self) -> StyleOptions {
        StyleOptions {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            x_label: self.axis_labels.x.clone(),
            y_label: self.axis_labels.y.clone(),
            palette: self.color_palette.clone(),
        }
    }

    /// Entry heading, e.g. `gender vs answer region`.
    pub fn heading(&self) -> String {
        format!(
            "{} vs {}",
            self.row_dimension,
            self.column_dimensions.join(" ")
        )
    }
}
