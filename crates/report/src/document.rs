//! Standalone HTML documents for reports.

use crate::error::{ReportError, Result};
use crate::report::Report;
use chrono::{DateTime, Local, NaiveDate};
use std::fs;
use std::path::Path;
use tracing::info;
use xtab_viz::html::escape_html;

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";

const TABLE_STYLE: &str = r"table {
    border-collapse: collapse;
    width: 100%;
    font-family: Arial, sans-serif;
}
th, td {
    border: 1px solid #ddd;
    padding: 8px;
}
th {
    background-color: #f2f2f2;
    font-weight: bold;
    text-align: left;
}
td {
    text-align: center;
}
tr:nth-child(even) {
    background-color: #f2f2f2;
}
tr:hover {
    background-color: #ddd;
}";

/// Document wrapper options
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub title: String,
    /// Printed under the title when set; entries never carry a timestamp.
    pub generated_at: Option<DateTime<Local>>,
    pub chart_js_url: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            title: "Report".to_string(),
            generated_at: None,
            chart_js_url: CHART_JS_URL.to_string(),
        }
    }
}

impl DocumentOptions {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_generated_at(mut self, at: DateTime<Local>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Stamp the document with the current local time
    #[must_use]
    pub fn with_timestamp(self) -> Self {
        self.with_generated_at(Local::now())
    }
}

impl Report {
    /// Render the whole report as a standalone HTML document.
    pub fn to_html(&self, options: &DocumentOptions) -> String {
        let title = escape_html(&options.title);
        let mut body = String::new();

        if let Some(at) = &options.generated_at {
            body.push_str(&format!(
                "<p class=\"xtab-generated\">Generated {}</p>\n",
                at.format("%Y-%m-%d %H:%M")
            ));
        }
        for entry in self.entries() {
            body.push_str(&format!(
                "<section class=\"xtab-entry\">\n<h1>{}</h1>\n{}\n</section>\n",
                escape_html(&entry.heading()),
                entry.fragment.html
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="{chart_js}"></script>
    <style>
{TABLE_STYLE}
    </style>
</head>
<body>
<header><h1 class="xtab-title">{title}</h1></header>
{body}</body>
</html>
"#,
            chart_js = escape_html(&options.chart_js_url),
        )
    }

    /// Write the report document to `path`.
    pub fn save_html<P: AsRef<Path>>(&self, path: P, options: &DocumentOptions) -> Result<()> {
        if self.is_empty() {
            return Err(ReportError::EmptyReport);
        }
        let path = path.as_ref();
        fs::write(path, self.to_html(options))?;
        info!(path = %path.display(), entries = self.len(), "saved report");
        Ok(())
    }
}

/// Download name of a report: `{name}_{ddmmyyyy}.html`.
pub fn report_file_name(name: &str, date: NaiveDate) -> String {
    format!("{name}_{}.html", date.format("%d%m%Y"))
}
