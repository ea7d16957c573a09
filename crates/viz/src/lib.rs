//! # xtab-viz
//!
//! Chart dispatch for xtab report entries.
//!
//! A [`ChartRenderer`] turns a crosstab result plus a [`ChartType`] and
//! [`StyleOptions`] into a [`Fragment`] of markup. The default
//! [`HtmlChartRenderer`] emits:
//! - a `<canvas>` and a Chart.js configuration for chart types
//! - an HTML percentage table for [`ChartType::Table`]
//!
//! Drawing is left to Chart.js, which the report document loads.

mod chart;
mod error;
pub mod html;

pub use chart::{
    ChartData, ChartDataset, ChartKind, ChartOptions, ChartRecord, ChartRenderer, ChartSpec,
    ChartType, Fragment, FragmentKind, RenderRequest, StyleOptions,
};
pub use error::{Result, VizError};
pub use html::HtmlChartRenderer;
