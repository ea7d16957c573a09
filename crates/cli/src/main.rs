//! # xtab-cli
//!
//! Command-line interface for xtab: inspect the tables in a survey export,
//! run crosstabs and build or replay HTML reports.

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::util::pretty::pretty_format_batches;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xtab_core::{crosstab, CrosstabRequest, CrosstabResult, RowKind, TableAxes};
use xtab_detect::{detect_tables, DetectOptions, Table};
use xtab_grid::{format_number, Grid};
use xtab_report::{report_file_name, DocumentOptions, PlotConfig, Session, Template};
use xtab_viz::html::table_markup;
use xtab_viz::ChartType;

/// xtab - crosstab reports from survey exports
#[derive(Parser)]
#[command(name = "xtab")]
#[command(author, version, about = "Crosstab reports from survey exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the tables detected in a file
    Blocks {
        /// CSV, TSV or workbook file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print one detected table
    Table {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Table name (first cell of its name row)
        #[arg(short, long)]
        name: String,

        /// Output format (table, json, html)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: TableFormat,
    },

    /// Run a single crosstab
    Crosstab {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Row dimension
        #[arg(short, long)]
        row: String,

        /// Column dimension (repeat for combined categories)
        #[arg(short, long = "col", required = true)]
        cols: Vec<String>,

        /// Category to drop (repeatable)
        #[arg(short, long)]
        drop: Vec<String>,

        /// Output format (table, json, csv)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },

    /// Rebuild a report from a template
    Replay {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Template file (JSON or YAML)
        #[arg(short, long)]
        template: PathBuf,

        #[command(flatten)]
        document: DocumentArgs,

        /// Report file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build a report from plot specifications
    Build {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Plot, e.g. "row=gender;cols=answer;chart=bar;title=Q1"
        #[arg(short, long = "plot", value_name = "SPEC", required = true, value_parser = parse_plot)]
        plots: Vec<PlotConfig>,

        /// Also save the report's template
        #[arg(long)]
        template_out: Option<PathBuf>,

        #[command(flatten)]
        document: DocumentArgs,

        /// Report file to write [default: <file stem>_<ddmmyyyy>.html]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where crosstab records come from.
#[derive(Args, Default)]
struct SourceArgs {
    /// Use a detected table instead of raw rows
    #[arg(short, long)]
    block: Option<String>,

    /// Field name for the table's row labels
    #[arg(long, default_value = "row")]
    row_axis: String,

    /// Field name for each header level, outermost first
    #[arg(long = "col-axis")]
    col_axes: Vec<String>,
}

#[derive(Args, Default)]
struct DocumentArgs {
    /// Document title [default: file stem]
    #[arg(long)]
    title: Option<String>,

    /// Print the generation time under the title
    #[arg(long)]
    timestamp: bool,
}

/// Output format for crosstab results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Aligned text table (default)
    #[default]
    Table,
}

/// Output format for detected tables.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum TableFormat {
    /// JSON records
    Json,
    /// HTML table markup
    Html,
    /// Aligned text table (default)
    #[default]
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match cli.command {
        Command::Blocks { file } => run_blocks(&file),
        Command::Table { file, name, format } => run_table(&file, &name, format),
        Command::Crosstab {
            file,
            source,
            row,
            cols,
            drop,
            format,
        } => {
            let request = CrosstabRequest::new(row, cols).with_dropped(drop);
            run_crosstab(&file, &source, &request, format)
        }
        Command::Replay {
            file,
            source,
            template,
            document,
            output,
        } => run_replay(&file, &source, &template, &document, &output),
        Command::Build {
            file,
            source,
            plots,
            template_out,
            document,
            output,
        } => {
            let output = output.unwrap_or_else(|| {
                PathBuf::from(report_file_name(&file_stem(&file), Local::now().date_naive()))
            });
            run_build(
                &file,
                &source,
                plots,
                template_out.as_deref(),
                &document,
                &output,
            )
        }
    }
}

fn load_grid(file: &Path) -> Result<Grid> {
    Grid::open(file).with_context(|| format!("Failed to load file: {}", file.display()))
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report")
        .to_string()
}

/// Open a session over `file`, switched to the requested table if any.
fn open_session(file: &Path, source: &SourceArgs) -> Result<Session> {
    let mut session = Session::open(load_grid(file)?)?;

    if let Some(name) = &source.block {
        let axes = session.detected().get(name).map(|table| {
            let mut axes = TableAxes::for_table(table);
            axes.row.clone_from(&source.row_axis);
            if !source.col_axes.is_empty() {
                axes.columns.clone_from(&source.col_axes);
            }
            axes
        });
        session
            .use_table(name, axes)
            .with_context(|| format!("Cannot use table '{name}' from {}", file.display()))?;
        info!(table = %name, fields = ?session.dataset().fields(), "using detected table");
    }
    Ok(session)
}

fn document_options(file: &Path, args: &DocumentArgs) -> DocumentOptions {
    let title = args.title.clone().unwrap_or_else(|| file_stem(file));
    let options = DocumentOptions::default().with_title(title);
    if args.timestamp {
        options.with_timestamp()
    } else {
        options
    }
}

/// List detected tables and the blocks that were skipped.
fn run_blocks(file: &Path) -> Result<()> {
    let detected = detect_tables(&load_grid(file)?, &DetectOptions::default());

    if detected.is_empty() {
        println!("{}", "no tables found".yellow());
    }
    for table in &detected.tables {
        let block = table.block();
        println!(
            "{}  rows {}-{}  {} x {}  header depth {}",
            table.name().cyan().bold(),
            block.name_row + 1,
            block.data_rows.end,
            table.row_count(),
            table.col_count(),
            block.header_depth()
        );
    }
    for failure in &detected.failures {
        println!("{} {failure}", "Skipped:".red().bold());
    }
    Ok(())
}

fn run_table(file: &Path, name: &str, format: TableFormat) -> Result<()> {
    let detected = detect_tables(&load_grid(file)?, &DetectOptions::default());
    let Some(table) = detected.get(name) else {
        bail!(
            "No table named '{name}' in {}. Available: {}",
            file.display(),
            detected.names().join(", ")
        );
    };

    match format {
        TableFormat::Table => {
            let (header, rows) = table_cells(table);
            println!("{}", format_cells(&header, &rows)?);
        }
        TableFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&table.records())?);
        }
        TableFormat::Html => println!("{}", table_markup(table)),
    }
    Ok(())
}

fn run_crosstab(
    file: &Path,
    source: &SourceArgs,
    request: &CrosstabRequest,
    format: OutputFormat,
) -> Result<()> {
    let session = open_session(file, source)?;
    let result = crosstab(session.dataset(), request).with_context(|| {
        format!(
            "Crosstab of '{}' against '{}' failed",
            request.row_dimension,
            request.column_dimensions.join(", ")
        )
    })?;

    let (header, rows) = crosstab_cells(&result);
    match format {
        OutputFormat::Table => println!("{}", format_cells(&header, &rows)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record(&header)?;
            for row in &rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn run_replay(
    file: &Path,
    source: &SourceArgs,
    template: &Path,
    document: &DocumentArgs,
    output: &Path,
) -> Result<()> {
    let mut session = open_session(file, source)?;
    let template = Template::load(template)
        .with_context(|| format!("Failed to read template: {}", template.display()))?;

    let entries = session.run_template(&template)?.len();
    session
        .save_html(output, &document_options(file, document))
        .with_context(|| format!("Failed to write report: {}", output.display()))?;
    info!(entries, output = %output.display(), "replayed template");

    println!(
        "{} {entries} entries to {}",
        "Wrote".green().bold(),
        output.display()
    );
    Ok(())
}

fn run_build(
    file: &Path,
    source: &SourceArgs,
    plots: Vec<PlotConfig>,
    template_out: Option<&Path>,
    document: &DocumentArgs,
    output: &Path,
) -> Result<()> {
    let mut session = open_session(file, source)?;

    for (index, plot) in plots.into_iter().enumerate() {
        let heading = plot.heading();
        session
            .append(plot)
            .with_context(|| format!("Plot {} ({heading}) failed", index + 1))?;
        info!(index, heading = %heading, "added plot");
    }

    session
        .save_html(output, &document_options(file, document))
        .with_context(|| format!("Failed to write report: {}", output.display()))?;
    println!(
        "{} {} entries to {}",
        "Wrote".green().bold(),
        session.report().len(),
        output.display()
    );

    if let Some(path) = template_out {
        session
            .save_template(path)
            .with_context(|| format!("Failed to write template: {}", path.display()))?;
        println!("{} template to {}", "Wrote".green().bold(), path.display());
    }
    Ok(())
}

/// Parse a `--plot` specification.
///
/// `key=value` pairs separated by `;`. `row` and `cols` are required; list
/// values (`cols`, `drop`, `palette`) are comma separated.
fn parse_plot(spec: &str) -> std::result::Result<PlotConfig, String> {
    let mut row = None;
    let mut cols = Vec::new();
    let mut chart_type = ChartType::default();
    let mut title = String::new();
    let mut subtitle = String::new();
    let mut dropped = Vec::new();
    let mut palette = None;
    let (mut x_label, mut y_label) = (None, None);

    for part in spec.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("Invalid plot setting '{part}'. Expected KEY=VALUE"))?;
        let value = value.trim();
        match key.trim() {
            "row" => row = Some(value.to_string()),
            "cols" => cols = split_list(value),
            "chart" => chart_type = value.parse().map_err(|e| format!("{e}"))?,
            "title" => title = value.to_string(),
            "subtitle" => subtitle = value.to_string(),
            "drop" => dropped = split_list(value),
            "palette" => palette = Some(split_list(value)),
            "x" => x_label = Some(value.to_string()),
            "y" => y_label = Some(value.to_string()),
            other => return Err(format!("Unknown plot setting '{other}'")),
        }
    }

    let row = row.ok_or("Plot needs a row dimension (row=...)")?;
    if cols.is_empty() {
        return Err("Plot needs at least one column dimension (cols=...)".to_string());
    }

    let mut config = PlotConfig::new(row, cols)
        .with_chart_type(chart_type)
        .with_title(title)
        .with_subtitle(subtitle)
        .with_axis_labels(x_label, y_label)
        .with_dropped(dropped);
    if let Some(palette) = palette {
        config = config.with_palette(palette);
    }
    Ok(config)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Header and body cells of a crosstab: percentages to two decimals, then
/// the `n` row of totals.
fn crosstab_cells(result: &CrosstabResult) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header = vec![result.row_dimension().to_string()];
    header.extend(result.column_categories().iter().cloned());

    let rows = result
        .rows()
        .into_iter()
        .map(|row| {
            let mut cells = vec![row.label.to_string()];
            cells.extend(row.values.iter().map(|value| match row.kind {
                RowKind::Category => format!("{value:.2}"),
                RowKind::Total => format_number(*value),
            }));
            cells
        })
        .collect();
    (header, rows)
}

/// Header and body cells of a detected table; column paths are joined with
/// `" / "`.
fn table_cells(table: &Table) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header = vec![String::new()];
    header.extend(table.column_paths().iter().map(|path| path.join(" / ")));

    let rows = table
        .row_labels()
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let mut cells = vec![label.clone()];
            cells.extend(
                (0..table.col_count())
                    .map(|col| table.value(row, col).map(ToString::to_string).unwrap_or_default()),
            );
            cells
        })
        .collect();
    (header, rows)
}

/// Format cells as a bordered text table.
fn format_cells(header: &[String], rows: &[Vec<String>]) -> Result<String> {
    let schema = Schema::new(
        header
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    );
    let columns: Vec<ArrayRef> = (0..header.len())
        .map(|col| {
            let values = rows.iter().map(|row| row.get(col).map_or("", String::as_str));
            Arc::new(StringArray::from_iter_values(values)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}
