use crate::error::OutputError;
use crate::types::{
    Cell, ChartData, MetricRow, MetricUnit, Report, ReportState, SeriesRow, SignalRow, Table, Trend,
};
use crate::util::{display_number, format_int, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table as TextTable, Tabled};

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> OutputError + '_ {
    move |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err(path))?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the raw table back out as CSV.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err(path))?;
    wtr.write_record(&table.columns).map_err(csv_err(path))?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(cell_text))
            .map_err(csv_err(path))?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One CSV per available chart, named after the chart. Returns the files
/// written.
pub fn export_charts(dir: &Path, report: &Report) -> Result<Vec<PathBuf>, OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut written = Vec::new();
    for chart in &report.charts {
        let path = dir.join(format!("{}.csv", file_stem(&chart.name)));
        match &chart.data {
            ChartData::Categories(rows) => write_csv(&path, rows)?,
            ChartData::Series(rows) => write_csv(&path, rows)?,
            ChartData::Words(rows) => write_csv(&path, rows)?,
            ChartData::Unavailable { .. } => continue,
        }
        written.push(path);
    }
    Ok(written)
}

fn file_stem(name: &str) -> String {
    let mut stem = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('_') && !stem.is_empty() {
            stem.push('_');
        }
    }
    stem.trim_end_matches('_').to_string()
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => display_number(*n),
        Cell::Missing => String::new(),
    }
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    TextTable::new(rows).with(Style::markdown()).to_string()
}

/// First `max_rows` raw rows as a markdown table.
pub fn preview_table(table: &Table, max_rows: usize) -> String {
    if table.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(table.columns.iter().map(|c| c.trim().to_string()));
    for row in table.rows.iter().take(max_rows) {
        builder.push_record(row.iter().map(cell_text));
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn print_preview(table: &Table, max_rows: usize) {
    println!("Data Preview\n");
    println!("{}\n", preview_table(table, max_rows));
}

fn trend_label(trend: Trend) -> &'static str {
    match trend {
        Trend::Improved => "improved",
        Trend::Declined => "declined",
        Trend::FlatOrEqual => "flat",
    }
}

/// Render the whole report as console text.
pub fn render_report(report: &Report) -> String {
    let mut out = format!("{} Dashboard\n\n", report.view.title());
    if report.state == ReportState::EmptyTable {
        out.push_str("No data available.\n");
        return out;
    }

    out.push_str("Key Metrics\n\n");
    let metrics: Vec<MetricRow> = report
        .metrics
        .iter()
        .map(|m| MetricRow {
            name: m.name.clone(),
            value: match m.unit {
                MetricUnit::Count => format_int(m.value.round() as i64),
                MetricUnit::Currency | MetricUnit::Percent => format_number(m.value, 2),
            },
        })
        .collect();
    out.push_str(&render(metrics));
    out.push_str("\n\n");

    if !report.signals.is_empty() {
        out.push_str("Week over Week\n\n");
        let rows: Vec<SignalRow> = report
            .signals
            .iter()
            .map(|s| SignalRow {
                metric: s.metric.clone(),
                current: format_number(s.current, 2),
                previous: format_number(s.previous, 2),
                trend: trend_label(s.trend).to_string(),
            })
            .collect();
        out.push_str(&render(rows));
        out.push_str("\n\n");
        for s in &report.signals {
            out.push_str(&format!("- {}: {}\n", s.metric, s.advice.text()));
        }
        out.push('\n');
    }

    for chart in &report.charts {
        out.push_str(&format!("{}\n\n", chart.name));
        match &chart.data {
            ChartData::Categories(rows) => out.push_str(&render(rows.clone())),
            ChartData::Words(rows) => out.push_str(&render(rows.clone())),
            ChartData::Series(points) => {
                let rows: Vec<SeriesRow> = points
                    .iter()
                    .map(|p| SeriesRow {
                        bucket: p.bucket.clone(),
                        value: format_number(p.value, 2),
                    })
                    .collect();
                out.push_str(&render(rows));
            }
            ChartData::Unavailable { reason } => {
                out.push_str(&format!("(unavailable: {})", reason));
            }
        }
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "Based on {} responses.\n",
        format_int(report.responses as u64)
    ));
    out
}

pub fn print_report(report: &Report) {
    print!("{}", render_report(report));
}
