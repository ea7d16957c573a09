//! # xtab-report
//!
//! Report assembly on top of crosstabs and chart rendering.
//!
//! - [`PlotConfig`] describes one report entry: the crosstab to run and how
//!   to draw it.
//! - [`Report`] is the append-only list of rendered entries, written out as
//!   a standalone HTML document.
//! - [`Template`] is the configuration list of a report. [`replay`] rebuilds
//!   a report from it against another dataset.
//! - [`Session`] ties a grid, its detected tables, a dataset and a report
//!   together for one user.
//!
//! ```
//! use xtab_grid::Grid;
//! use xtab_report::{PlotConfig, Session, SessionState};
//!
//! let grid = Grid::from_csv_str("Q1,,\n,Yes,No\nMale,10,5\nFemale,8,12").unwrap();
//! let mut session = Session::open(grid).unwrap();
//! session.use_table("Q1", None).unwrap();
//! session
//!     .append(PlotConfig::new("row", vec!["level_0".to_string()]).with_title("Q1"))
//!     .unwrap();
//!
//! assert_eq!(session.state(), SessionState::Building);
//! assert_eq!(session.report().to_template().len(), 1);
//! ```

/// Plot configurations.
pub mod config;
mod document;
/// Error types and result aliases.
pub mod error;
mod report;
mod session;
/// Template files.
pub mod template;

pub use config::{default_palette, AxisLabels, PlotConfig, DEFAULT_PALETTE};
pub use document::{report_file_name, DocumentOptions};
pub use error::{ReportError, Result};
pub use report::{render_entry, replay, Report, ReportEntry};
pub use session::{Session, SessionState};
pub use template::{template_file_name, Template, TemplateFormat};
