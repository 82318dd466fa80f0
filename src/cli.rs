use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "smsbill",
    about = "SMS billing usage by company and country for a date range"
)]
pub struct Cli {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// End date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// Output format: table (default), json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Show per-country, per-rate-tier rows under each company
    #[arg(long)]
    pub breakdown: bool,

    /// Filter by company name (substring match)
    #[arg(long)]
    pub company: Option<String>,

    /// Read a saved response from this file instead of calling the API
    #[arg(long, conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Billing API endpoint
    #[arg(long)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_range_and_flags() {
        let cli = Cli::try_parse_from([
            "smsbill",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--format",
            "json",
            "--breakdown",
            "--company",
            "acme",
        ])
        .unwrap();
        assert_eq!(cli.from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(cli.to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.breakdown);
        assert_eq!(cli.company.as_deref(), Some("acme"));
    }

    #[test]
    fn test_both_dates_required() {
        assert!(Cli::try_parse_from(["smsbill", "--from", "2024-01-01"]).is_err());
        assert!(Cli::try_parse_from(["smsbill", "--to", "2024-01-01"]).is_err());
    }

    #[test]
    fn test_input_conflicts_with_url() {
        let res = Cli::try_parse_from([
            "smsbill",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-02",
            "--input",
            "saved.json",
            "--url",
            "http://localhost",
        ]);
        assert!(res.is_err());
    }
}
