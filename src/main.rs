use anyhow::{Context, Result};
use clap::Parser;

use smsbill::cli::{Cli, OutputFormat};
use smsbill::source::{self, FileSource, HttpSource, UsageSource};
use smsbill::{aggregate, config, output, BillingError, DateRange};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = config::load_config();

    let range = DateRange::new(cli.from, cli.to)?;

    let source: Box<dyn UsageSource> = match cli.input {
        Some(ref path) => Box::new(FileSource::new(path)),
        None => {
            let url = cli
                .url
                .or(config.api_url)
                .unwrap_or_else(|| source::DEFAULT_API_URL.to_string());
            let timeout = cli
                .timeout
                .or(config.timeout_secs)
                .unwrap_or(source::DEFAULT_TIMEOUT_SECS);
            Box::new(HttpSource::new(url, timeout))
        }
    };

    let report = match source::fetch_report(source.as_ref(), &range) {
        Ok(report) => report,
        Err(BillingError::DataUnavailable { .. }) => {
            eprintln!("No data found for the selected date range.");
            return Ok(());
        }
        Err(e) => return Err(e).context("An error occurred while fetching data"),
    };

    let report = match cli.company {
        Some(ref needle) => report.retain_companies(needle),
        None => report,
    };

    if report.is_empty() {
        eprintln!("No companies found.");
        return Ok(());
    }

    eprintln!("Found {} companies.", report.len());

    let summary = aggregate::aggregate_report(&report);
    if !summary.notes.is_empty() {
        eprintln!(
            "{} value(s) were missing or malformed and counted as 0.",
            summary.notes.len()
        );
    }

    match cli.format.or(config.format).unwrap_or(OutputFormat::Table) {
        OutputFormat::Json => output::print_json(&report, &summary, cli.breakdown),
        OutputFormat::Table => output::print_table(&report, &summary, cli.breakdown),
    }

    Ok(())
}
