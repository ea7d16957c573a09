//! Reports: ordered, append-only lists of rendered entries.

use crate::config::PlotConfig;
use crate::error::{ReportError, Result};
use crate::template::Template;
use serde::Serialize;
use tracing::{debug, info, warn};
use xtab_core::{crosstab, Dataset};
use xtab_viz::{ChartRenderer, Fragment, RenderRequest};

/// A plot configuration with its rendered fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub config: PlotConfig,
    pub fragment: Fragment,
}

impl ReportEntry {
    pub fn heading(&self) -> String {
        self.config.heading()
    }
}

/// An ordered sequence of report entries. Entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a rendered entry.
    pub fn append(&mut self, config: PlotConfig, fragment: Fragment) -> &ReportEntry {
        debug!(index = self.entries.len(), heading = %config.heading(), "appending entry");
        let index = self.entries.len();
        self.entries.push(ReportEntry { config, fragment });
        &self.entries[index]
    }

    /// The plot configurations of this report, in order.
    pub fn to_template(&self) -> Template {
        self.entries.iter().map(|e| e.config.clone()).collect()
    }
}

/// Run the crosstab of `config` over `dataset` and render it as entry
/// number `index`.
pub fn render_entry(
    index: usize,
    config: &PlotConfig,
    dataset: &Dataset,
    renderer: &dyn ChartRenderer,
) -> Result<Fragment> {
    let result = crosstab(dataset, &config.request())?;
    let style = config.style();
    let request = RenderRequest::new(index, config.chart_type, &result, &style);
    Ok(renderer.render(&request)?)
}

/// Rebuild a report from a template against `dataset`.
///
/// Entries are recomputed in template order. The first failing entry aborts
/// the replay with [`ReportError::Replay`] naming its index.
pub fn replay(
    template: &Template,
    dataset: &Dataset,
    renderer: &dyn ChartRenderer,
) -> Result<Report> {
    let mut report = Report::new();
    for (index, config) in template.configs().iter().enumerate() {
        let fragment = render_entry(index, config, dataset, renderer).map_err(|e| {
            warn!(index, heading = %config.heading(), "replay failed: {}", e);
            ReportError::Replay {
                index,
                source: Box::new(e),
            }
        })?;
        report.append(config.clone(), fragment);
    }
    info!(entries = report.len(), dataset = dataset.name(), "replayed template");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtab_grid::Grid;
    use xtab_viz::{ChartType, FragmentKind, HtmlChartRenderer};

    fn dataset() -> Dataset {
        Dataset::from_grid(
            &Grid::from_csv_str("gender,answer\nMale,Yes\nFemale,No\nMale,No").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_append_and_template() {
        let renderer = HtmlChartRenderer::default();
        let dataset = dataset();
        let mut report = Report::new();

        for chart_type in [ChartType::Bar, ChartType::Table] {
            let config =
                PlotConfig::new("gender", vec!["answer".to_string()]).with_chart_type(chart_type);
            let fragment = render_entry(report.len(), &config, &dataset, &renderer).unwrap();
            report.append(config, fragment);
        }

        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[1].fragment.kind, FragmentKind::Table);
        assert_eq!(report.entries()[1].fragment.element_id, "xtab-chart-1");

        let template = report.to_template();
        assert_eq!(template.len(), 2);
        assert_eq!(template.configs()[1].chart_type, ChartType::Table);
    }

    #[test]
    fn test_replay_names_failing_entry() {
        let template = Template::new(vec![
            PlotConfig::new("gender", vec!["answer".to_string()]),
            PlotConfig::new("gender", vec!["Unknown".to_string()]),
        ]);

        let err = replay(&template, &dataset(), &HtmlChartRenderer::default()).unwrap_err();
        match err {
            ReportError::Replay { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, ReportError::Crosstab(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_replay_empty_template() {
        let report = replay(&Template::default(), &dataset(), &HtmlChartRenderer::default())
            .unwrap();

        assert!(report.is_empty());
    }
}
