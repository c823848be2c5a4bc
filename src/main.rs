// Command-line entry point.
//
// One run = one report: load the export, optionally preview or save it,
// build the report for the chosen view, then print and write outputs.
use chrono::{Local, NaiveDate};
use clap::Parser;
use salon_report::config::AppConfig;
use salon_report::output;
use salon_report::types::Granularity;
use salon_report::util::format_int;
use salon_report::{build_report, logging, CsvSource, DataSource, ReportRequest, ViewKind};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Summaries and charts for salon survey and financial exports.
#[derive(Debug, Parser)]
#[command(name = "salon-report", version)]
struct Cli {
    /// TOML config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// CSV export to report on.
    #[arg(long)]
    source: Option<PathBuf>,
    #[arg(long, value_enum)]
    view: Option<ViewKind>,
    /// Time bucket for financial series.
    #[arg(long, value_enum)]
    granularity: Option<Granularity>,
    /// Limit for both top responses and top words.
    #[arg(long)]
    top_n: Option<usize>,
    /// Date inside the week treated as "this week" (default: today).
    #[arg(long)]
    as_of: Option<NaiveDate>,
    /// Write the report as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write one CSV per chart into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Save the loaded table as CSV.
    #[arg(long)]
    save_table: Option<PathBuf>,
    /// Print the first N loaded rows.
    #[arg(long)]
    preview: Option<usize>,
    #[arg(long)]
    no_week_over_week: bool,
}

/// Fold command-line flags over the file configuration.
fn merge(cli: &Cli, mut cfg: AppConfig) -> AppConfig {
    if let Some(s) = &cli.source {
        cfg.source = Some(s.clone());
    }
    if let Some(v) = cli.view {
        cfg.view = v;
    }
    if let Some(g) = cli.granularity {
        cfg.granularity = g;
    }
    if let Some(n) = cli.top_n {
        cfg.top_responses = n;
        cfg.top_words = n;
    }
    if let Some(p) = &cli.json {
        cfg.json_output = Some(p.clone());
    }
    if let Some(d) = &cli.export_dir {
        cfg.export_dir = Some(d.clone());
    }
    if let Some(n) = cli.preview {
        cfg.preview_rows = n;
    }
    if cli.no_week_over_week {
        cfg.week_over_week = false;
    }
    cfg
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file_cfg = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let cfg = merge(&cli, file_cfg);
    logging::init(&cfg.log_level);

    let Some(source) = cfg.source.as_ref() else {
        return Err("no data source given (use --source or `source` in the config)".into());
    };
    let handle = CsvSource::new(".");
    let table = handle.load(&source.to_string_lossy())?;
    println!(
        "Processing dataset... ({} rows, {} columns)\n",
        format_int(table.len() as u64),
        format_int(table.columns.len() as u64)
    );

    if cfg.preview_rows > 0 {
        output::print_preview(&table, cfg.preview_rows);
    }
    if let Some(path) = &cli.save_table {
        output::write_table_csv(path, &table)?;
        println!("(Full table exported to {})\n", path.display());
    }

    let request = ReportRequest {
        view: cfg.view,
        granularity: cfg.granularity,
        top_responses: cfg.top_responses,
        top_words: cfg.top_words,
        week_over_week: cfg.week_over_week,
        as_of: cli.as_of.unwrap_or_else(|| Local::now().date_naive()),
    };
    let report = build_report(&table, &request)?;
    output::print_report(&report);

    if let Some(path) = &cfg.json_output {
        output::write_json(path, &report)?;
        println!("Report saved to {}", path.display());
    }
    if let Some(dir) = &cfg.export_dir {
        let files = output::export_charts(dir, &report)?;
        println!("{} charts exported to {}", files.len(), dir.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "salon-report",
            "--view",
            "financial",
            "--top-n",
            "3",
            "--no-week-over-week",
        ]);
        let cfg = merge(
            &cli,
            AppConfig {
                source: Some("a.csv".into()),
                granularity: Granularity::Day,
                ..AppConfig::default()
            },
        );
        assert_eq!(cfg.view, ViewKind::FinancialTracking);
        assert_eq!(cfg.source, Some(PathBuf::from("a.csv")));
        assert_eq!(cfg.granularity, Granularity::Day);
        assert_eq!((cfg.top_responses, cfg.top_words), (3, 3));
        assert!(!cfg.week_over_week);
    }

    #[test]
    fn parses_as_of_date() {
        let cli = Cli::parse_from(["salon-report", "--as-of", "2024-03-14"]);
        assert_eq!(cli.as_of, NaiveDate::from_ymd_opt(2024, 3, 14));
    }
}
