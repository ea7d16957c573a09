//! Chart types, render requests and the Chart.js specification.

use crate::error::{Result, VizError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use xtab_core::{round2, CrosstabResult};

/// How one report entry is drawn.
///
/// The spaced names (`"horizontal bar"`, `"multi bar"`,
/// `"horizontal multi bar"`) are accepted when reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    /// Stacked vertical bars.
    #[default]
    Bar,
    #[serde(alias = "horizontal bar")]
    HorizontalBar,
    /// Grouped vertical bars.
    #[serde(alias = "multi bar")]
    MultiBar,
    #[serde(alias = "horizontal multi bar")]
    HorizontalMultiBar,
    Line,
    Area,
    Radar,
    Donut,
    Pie,
    /// Percentage table with the `n` row; not a chart.
    Table,
}

impl ChartType {
    pub const ALL: [ChartType; 10] = [
        ChartType::Bar,
        ChartType::HorizontalBar,
        ChartType::MultiBar,
        ChartType::HorizontalMultiBar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Radar,
        ChartType::Donut,
        ChartType::Pie,
        ChartType::Table,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::HorizontalBar => "horizontal-bar",
            ChartType::MultiBar => "multi-bar",
            ChartType::HorizontalMultiBar => "horizontal-multi-bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Radar => "radar",
            ChartType::Donut => "donut",
            ChartType::Pie => "pie",
            ChartType::Table => "table",
        }
    }

    /// False only for [`ChartType::Table`].
    pub fn is_chart(self) -> bool {
        self != ChartType::Table
    }

    fn is_horizontal(self) -> bool {
        matches!(self, ChartType::HorizontalBar | ChartType::HorizontalMultiBar)
    }

    fn is_stacked(self) -> bool {
        matches!(
            self,
            ChartType::Bar | ChartType::HorizontalBar | ChartType::Area
        )
    }

    fn is_circular(self) -> bool {
        matches!(self, ChartType::Donut | ChartType::Pie)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                VizError::unsupported(s, "expected one of bar, horizontal-bar, multi-bar, horizontal-multi-bar, line, area, radar, donut, pie, table")
            })
    }
}

/// Presentation settings for one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOptions {
    pub title: String,
    pub subtitle: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Colors assigned to series in order, cycling when exhausted.
    pub palette: Vec<String>,
}

impl StyleOptions {
    fn color(&self, index: usize) -> Option<String> {
        if self.palette.is_empty() {
            None
        } else {
            Some(self.palette[index % self.palette.len()].clone())
        }
    }
}

/// One melted crosstab cell: a row category, a column category and the
/// row-normalized percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecord {
    pub row_category: String,
    pub variable: String,
    pub value: f64,
}

impl ChartRecord {
    /// Melt the percentages of `result`, one column category at a time.
    pub fn melt(result: &CrosstabResult) -> Vec<ChartRecord> {
        let mut records = Vec::new();
        for (c, variable) in result.column_categories().iter().enumerate() {
            for (r, row) in result.row_categories().iter().enumerate() {
                records.push(ChartRecord {
                    row_category: row.clone(),
                    variable: variable.clone(),
                    value: round2(result.percentages()[r][c]),
                });
            }
        }
        records
    }
}

/// Everything a [`ChartRenderer`] needs to draw one report entry.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    /// Position of the entry in its report; renderers derive element ids
    /// from it.
    pub index: usize,
    pub chart_type: ChartType,
    pub result: &'a CrosstabResult,
    pub records: Vec<ChartRecord>,
    pub style: &'a StyleOptions,
}

impl<'a> RenderRequest<'a> {
    pub fn new(
        index: usize,
        chart_type: ChartType,
        result: &'a CrosstabResult,
        style: &'a StyleOptions,
    ) -> Self {
        Self {
            index,
            chart_type,
            result,
            records: ChartRecord::melt(result),
            style,
        }
    }
}

/// What a rendered fragment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Chart,
    Table,
}

/// A rendered report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub element_id: String,
    pub html: String,
}

/// Turns crosstab results into displayable fragments.
pub trait ChartRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Fragment>;
}

/// Chart.js chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Radar,
    Pie,
    Doughnut,
}

/// Chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// A series in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub fill: bool,
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub show_legend: bool,
    pub stacked: bool,
    pub horizontal: bool,
}

/// Chart specification consumed by Chart.js.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartSpec {
    /// Build the chart for a render request.
    ///
    /// Series charts plot one dataset per column category over the row
    /// categories. Pie and donut charts plot the `n` totals per column
    /// category, so slices are raw counts rather than percentages summed
    /// per column. Tables are not charts and are rejected.
    pub fn from_request(request: &RenderRequest<'_>) -> Result<Self> {
        let chart_type = request.chart_type;
        let style = request.style;
        let result = request.result;

        let kind = match chart_type {
            ChartType::Table => {
                return Err(VizError::unsupported(
                    chart_type.as_str(),
                    "tables render as markup, not as a chart",
                ))
            }
            ChartType::Bar
            | ChartType::HorizontalBar
            | ChartType::MultiBar
            | ChartType::HorizontalMultiBar => ChartKind::Bar,
            ChartType::Line | ChartType::Area => ChartKind::Line,
            ChartType::Radar => ChartKind::Radar,
            ChartType::Donut => ChartKind::Doughnut,
            ChartType::Pie => ChartKind::Pie,
        };

        let data = if chart_type.is_circular() {
            let colors: Vec<String> = (0..result.column_categories().len())
                .filter_map(|i| style.color(i))
                .collect();
            ChartData {
                labels: result.column_categories().to_vec(),
                datasets: vec![ChartDataset {
                    label: result.total_label().to_string(),
                    data: result.totals_row().iter().map(|&n| n as f64).collect(),
                    background_color: (!colors.is_empty()).then(|| json!(colors)),
                    border_color: None,
                    fill: false,
                }],
            }
        } else {
            let labels = result.row_categories().to_vec();
            let datasets = result
                .column_categories()
                .iter()
                .enumerate()
                .map(|(i, variable)| {
                    let data = labels
                        .iter()
                        .map(|row| {
                            request
                                .records
                                .iter()
                                .find(|r| &r.variable == variable && &r.row_category == row)
                                .map_or(0.0, |r| r.value)
                        })
                        .collect();
                    let color = style.color(i);
                    ChartDataset {
                        label: variable.clone(),
                        data,
                        background_color: color.clone().map(serde_json::Value::String),
                        border_color: color,
                        fill: chart_type == ChartType::Area,
                    }
                })
                .collect();
            ChartData { labels, datasets }
        };

        Ok(Self {
            chart_type: kind,
            title: style.title.clone(),
            data,
            options: ChartOptions {
                subtitle: (!style.subtitle.is_empty()).then(|| style.subtitle.clone()),
                x_axis_label: style.x_label.clone(),
                y_axis_label: style.y_label.clone(),
                show_legend: true,
                stacked: chart_type.is_stacked(),
                horizontal: chart_type.is_horizontal(),
            },
        })
    }

    /// Convert to a Chart.js configuration object.
    pub fn to_config(&self) -> serde_json::Value {
        let mut options = json!({
            "responsive": true,
            "plugins": {
                "title": { "display": !self.title.is_empty(), "text": self.title },
                "subtitle": {
                    "display": self.options.subtitle.is_some(),
                    "text": self.options.subtitle.clone().unwrap_or_default(),
                },
                "legend": { "display": self.options.show_legend },
            },
        });

        if matches!(self.chart_type, ChartKind::Bar | ChartKind::Line) {
            let axis = |label: &Option<String>| {
                json!({
                    "stacked": self.options.stacked,
                    "title": {
                        "display": label.is_some(),
                        "text": label.clone().unwrap_or_default(),
                    },
                })
            };
            options["indexAxis"] = json!(if self.options.horizontal { "y" } else { "x" });
            options["scales"] = json!({
                "x": axis(&self.options.x_axis_label),
                "y": axis(&self.options.y_axis_label),
            });
        }

        json!({
            "type": self.chart_type,
            "data": self.data,
            "options": options,
        })
    }

    /// Convert to a JSON string safe to embed in a `<script>` element.
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string(&self.to_config())?;
        Ok(json.replace("</", "<\\/"))
    }
}
