//! Report-building sessions.
//!
//! A [`Session`] owns everything one user works with: the loaded grid, the
//! tables detected in it, the dataset crosstabs run on, the report under
//! construction and the renderer. Nothing is shared between sessions.

use crate::config::PlotConfig;
use crate::document::DocumentOptions;
use crate::error::{ReportError, Result};
use crate::report::{render_entry, replay, Report, ReportEntry};
use crate::template::Template;
use std::path::Path;
use tracing::{debug, info};
use xtab_core::{Dataset, TableAxes};
use xtab_detect::{detect_tables, DetectOptions, DetectedTables};
use xtab_grid::Grid;
use xtab_viz::{ChartRenderer, Fragment, HtmlChartRenderer};

/// Where a session is in the report lifecycle.
///
/// ```text
/// Empty --append--> Building --save_html--> Saved
///                       \------save_template--> Templated
/// Saved / Templated --append--> Building
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Building,
    Saved,
    Templated,
}

/// One user's working state.
#[derive(Debug)]
pub struct Session<R: ChartRenderer = HtmlChartRenderer> {
    grid: Grid,
    detect_options: DetectOptions,
    detected: DetectedTables,
    dataset: Dataset,
    report: Report,
    renderer: R,
    state: SessionState,
}

impl Session<HtmlChartRenderer> {
    /// Open a session over `grid` with the default HTML renderer.
    pub fn open(grid: Grid) -> Result<Self> {
        Self::with_renderer(grid, HtmlChartRenderer::default())
    }
}

impl<R: ChartRenderer> Session<R> {
    /// Open a session over `grid`.
    ///
    /// Tables are detected up front; the initial dataset treats the first
    /// grid row as field names, suffixing repeated ones.
    pub fn with_renderer(grid: Grid, renderer: R) -> Result<Self> {
        let detect_options = DetectOptions::default();
        let detected = detect_tables(&grid, &detect_options);
        let dataset = Dataset::from_grid(&grid)?;
        Ok(Self {
            grid,
            detect_options,
            detected,
            dataset,
            report: Report::new(),
            renderer,
            state: SessionState::Empty,
        })
    }

    /// Set the detection options and re-detect tables
    #[must_use]
    pub fn with_detect_options(mut self, options: DetectOptions) -> Self {
        self.detected = detect_tables(&self.grid, &options);
        self.detect_options = options;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn detected(&self) -> &DetectedTables {
        &self.detected
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Replace the grid. Detected tables and the dataset are rebuilt; the
    /// report is kept.
    pub fn load_grid(&mut self, grid: Grid) -> Result<()> {
        let dataset = Dataset::from_grid(&grid)?;
        self.detected = detect_tables(&grid, &self.detect_options);
        self.dataset = dataset;
        self.grid = grid;
        info!(grid = self.grid.name(), tables = self.detected.len(), "loaded grid");
        Ok(())
    }

    /// Run crosstabs over the detected table `name` instead of raw rows.
    ///
    /// Without `axes` the row labels are named `row` and the header levels
    /// `level_0`, `level_1`, ...
    pub fn use_table(&mut self, name: &str, axes: Option<TableAxes>) -> Result<()> {
        let table = self
            .detected
            .get(name)
            .ok_or_else(|| ReportError::TableNotFound(name.to_string()))?;
        let axes = axes.unwrap_or_else(|| TableAxes::for_table(table));
        self.dataset = Dataset::from_table(table, &axes)?;
        debug!(table = name, fields = ?self.dataset.fields(), "switched dataset");
        Ok(())
    }

    /// Render `config` as the next entry would be, without appending it.
    pub fn preview(&self, config: &PlotConfig) -> Result<Fragment> {
        render_entry(self.report.len(), config, &self.dataset, &self.renderer)
    }

    /// Render `config` and append it to the report.
    pub fn append(&mut self, config: PlotConfig) -> Result<&ReportEntry> {
        let fragment = self.preview(&config)?;
        self.state = SessionState::Building;
        Ok(self.report.append(config, fragment))
    }

    /// Write the report document.
    pub fn save_html<P: AsRef<Path>>(&mut self, path: P, options: &DocumentOptions) -> Result<()> {
        self.report.save_html(path, options)?;
        self.state = SessionState::Saved;
        Ok(())
    }

    /// Project the report to a template and write it.
    pub fn save_template<P: AsRef<Path>>(&mut self, path: P) -> Result<Template> {
        if self.report.is_empty() {
            return Err(ReportError::EmptyReport);
        }
        let template = self.report.to_template();
        template.save(path)?;
        self.state = SessionState::Templated;
        Ok(template)
    }

    /// Replace the report with a replay of `template` over the current
    /// dataset. On failure the current report is left untouched.
    pub fn run_template(&mut self, template: &Template) -> Result<&Report> {
        let report = replay(template, &self.dataset, &self.renderer)?;
        self.state = if report.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Building
        };
        self.report = report;
        Ok(&self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtab_viz::ChartType;

    const EXPORT: &str = "Q1,,\n,Yes,No\nMale,10,5\nFemale,8,12";

    fn session() -> Session {
        let mut session = Session::open(Grid::from_csv_str(EXPORT).unwrap()).unwrap();
        session.use_table("Q1", None).unwrap();
        session
    }

    fn config() -> PlotConfig {
        PlotConfig::new("row", vec!["level_0".to_string()])
    }

    #[test]
    fn test_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        assert_eq!(session.state(), SessionState::Empty);

        session.append(config()).unwrap();
        assert_eq!(session.state(), SessionState::Building);

        session
            .save_html(dir.path().join("r.html"), &DocumentOptions::default())
            .unwrap();
        assert_eq!(session.state(), SessionState::Saved);

        session.append(config().with_chart_type(ChartType::Table)).unwrap();
        assert_eq!(session.state(), SessionState::Building);

        let template = session.save_template(dir.path().join("t.json")).unwrap();
        assert_eq!(session.state(), SessionState::Templated);
        assert_eq!(template.len(), 2);
    }

    #[test]
    fn test_failed_append_leaves_report_untouched() {
        let mut session = session();
        let bad = PlotConfig::new("row", vec!["Unknown".to_string()]);

        assert!(session.append(bad).is_err());
        assert!(session.report().is_empty());
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_preview_does_not_append() {
        let session = session();
        let fragment = session.preview(&config()).unwrap();

        assert_eq!(fragment.element_id, "xtab-chart-0");
        assert!(session.report().is_empty());
    }

    #[test]
    fn test_unknown_table() {
        let mut session = session();

        assert!(matches!(
            session.use_table("Q9", None),
            Err(ReportError::TableNotFound(name)) if name == "Q9"
        ));
    }

    #[test]
    fn test_save_template_of_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();

        assert!(matches!(
            session.save_template(dir.path().join("t.json")),
            Err(ReportError::EmptyReport)
        ));
    }

    #[test]
    fn test_repeated_first_row_labels() {
        let grid = Grid::from_csv_str("Wave,Wave,\n,,\nQ1,,\n,Yes,No\nMale,1,2").unwrap();
        let mut session = Session::open(grid).unwrap();

        assert_eq!(session.dataset().fields(), ["Wave", "Wave_1", "column_2"]);
        assert_eq!(session.detected().names(), vec!["Q1"]);

        session.use_table("Q1", None).unwrap();
        session.append(config()).unwrap();
        assert_eq!(session.report().len(), 1);
    }

    #[test]
    fn test_load_grid_keeps_report() {
        let mut session = session();
        session.append(config()).unwrap();

        session
            .load_grid(Grid::from_csv_str("Q2,,\n,A,B\nx,1,2").unwrap())
            .unwrap();

        assert_eq!(session.detected().names(), vec!["Q2"]);
        assert_eq!(session.report().len(), 1);
    }
}
