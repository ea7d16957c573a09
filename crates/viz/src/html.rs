//! HTML markup: crosstab tables, detected tables and Chart.js canvases.

use crate::chart::{ChartRenderer, ChartSpec, Fragment, FragmentKind, RenderRequest};
use crate::error::Result;
use tracing::debug;
use xtab_core::{round2, CrosstabResult, RowKind};
use xtab_detect::Table;
use xtab_grid::format_number;

/// Escape HTML special characters to prevent XSS.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render a crosstab as a table: percentages rounded to two decimals, then
/// the `n` row of raw column totals.
pub fn crosstab_table(result: &CrosstabResult, caption: &str) -> String {
    let mut html = String::from("<table class=\"xtab-crosstab\">\n");
    if !caption.is_empty() {
        html.push_str(&format!("<caption>{}</caption>\n", escape_html(caption)));
    }

    html.push_str("<thead><tr>");
    html.push_str(&format!(
        "<th scope=\"col\">{}</th>",
        escape_html(result.row_dimension())
    ));
    for col in result.column_categories() {
        html.push_str(&format!("<th scope=\"col\">{}</th>", escape_html(col)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in result.rows() {
        match row.kind {
            RowKind::Category => html.push_str("<tr>"),
            RowKind::Total => html.push_str("<tr class=\"xtab-total\">"),
        }
        html.push_str(&format!(
            "<th scope=\"row\">{}</th>",
            escape_html(row.label)
        ));
        for value in &row.values {
            let text = match row.kind {
                RowKind::Category => format!("{:.2}", round2(*value)),
                RowKind::Total => format_number(*value),
            };
            html.push_str(&format!("<td>{text}</td>"));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

/// Render a detected table: row labels as row headers, column paths joined
/// with `" / "` as column headers. Cells left out of the table stay blank.
pub fn table_markup(table: &Table) -> String {
    let mut html = format!(
        "<table class=\"xtab-table\">\n<caption>{}</caption>\n<thead><tr><th></th>",
        escape_html(table.name())
    );
    for path in table.column_paths() {
        html.push_str(&format!(
            "<th scope=\"col\">{}</th>",
            escape_html(&path.join(" / "))
        ));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (row, label) in table.row_labels().iter().enumerate() {
        html.push_str(&format!("<tr><th scope=\"row\">{}</th>", escape_html(label)));
        for col in 0..table.col_count() {
            let text = table
                .value(row, col)
                .map(|v| escape_html(&v.to_string()))
                .unwrap_or_default();
            html.push_str(&format!("<td>{text}</td>"));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

/// Default renderer: Chart.js canvases and HTML tables.
///
/// Element ids are `{prefix}-{index}`, so the same request always yields
/// the same markup.
#[derive(Debug, Clone)]
pub struct HtmlChartRenderer {
    id_prefix: String,
}

impl Default for HtmlChartRenderer {
    fn default() -> Self {
        Self {
            id_prefix: "xtab-chart".to_string(),
        }
    }
}

impl HtmlChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom element id prefix
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    fn element_id(&self, index: usize) -> String {
        format!("{}-{index}", self.id_prefix)
    }
}

impl ChartRenderer for HtmlChartRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Fragment> {
        let element_id = self.element_id(request.index);
        debug!(id = %element_id, chart = %request.chart_type, "rendering fragment");

        if !request.chart_type.is_chart() {
            let table = crosstab_table(request.result, &request.style.title);
            return Ok(Fragment {
                kind: FragmentKind::Table,
                html: format!("<div class=\"xtab-table\" id=\"{element_id}\">\n{table}\n</div>"),
                element_id,
            });
        }

        let json = ChartSpec::from_request(request)?.to_json()?;
        let html = format!(
            r#"<div class="xtab-chart">
<canvas id="{element_id}"></canvas>
<script>
new Chart(document.getElementById('{element_id}'), {json});
</script>
</div>"#
        );
        Ok(Fragment {
            kind: FragmentKind::Chart,
            element_id,
            html,
        })
    }
}
