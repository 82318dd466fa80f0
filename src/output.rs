use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};

use crate::aggregate::company_detail_rows;
use crate::types::{BillingReport, DetailRow, ReportSummary, Totals};

const HEADERS: [&str; 7] = [
    "Company",
    "Country",
    "Rate Tier",
    "Total Cost",
    "Delivered",
    "Failed",
    "Other",
];

fn format_cost(cost: f64) -> String {
    format!("{:.2}", cost)
}

fn numeric(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn totals_row(label: &str, totals: &Totals) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(""),
        Cell::new(""),
        numeric(format_cost(totals.total_cost)),
        numeric(totals.total_delivered.to_string()),
        Cell::new(""),
        Cell::new(""),
    ]
}

fn detail_row(row: &DetailRow) -> Vec<Cell> {
    vec![
        Cell::new(""),
        Cell::new(&row.country_code),
        Cell::new(row.rate_tier_key.as_deref().unwrap_or("-")),
        numeric(format_cost(row.total_cost)),
        numeric(row.delivered.to_string()),
        numeric(row.failed.to_string()),
        numeric(row.other.to_string()),
    ]
}

/// Build the report table. Detail rows are only computed when `breakdown`
/// is set.
pub fn render_table(report: &BillingReport, summary: &ReportSummary, breakdown: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(HEADERS.iter().map(Cell::new));

    for (key, totals) in &summary.per_company {
        table.add_row(totals_row(key, totals));

        if breakdown {
            if let Some(company) = report.company(key) {
                for row in company_detail_rows(company).rows {
                    table.add_row(detail_row(&row));
                }
            }
        }
    }

    table.add_row(totals_row("TOTAL", &summary.grand_totals));
    table
}

pub fn print_table(report: &BillingReport, summary: &ReportSummary, breakdown: bool) {
    println!("{}", render_table(report, summary, breakdown));
}

pub fn render_json(
    report: &BillingReport,
    summary: &ReportSummary,
    breakdown: bool,
) -> serde_json::Value {
    let mut json = serde_json::json!({
        "grandTotals": summary.grand_totals,
        "perCompany": summary.per_company,
    });

    if breakdown {
        let details: BTreeMap<&str, Vec<DetailRow>> = report
            .companies()
            .filter(|company| summary.per_company.contains_key(company.key))
            .map(|company| (company.key, company_detail_rows(company).rows))
            .collect();
        json["details"] = serde_json::json!(details);
    }

    json
}

pub fn print_json(report: &BillingReport, summary: &ReportSummary, breakdown: bool) {
    let json = render_json(report, summary, breakdown);
    println!(
        "{}",
        serde_json::to_string_pretty(&json).expect("JSON serialization failed")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_report;
    use serde_json::json;

    fn sample() -> BillingReport {
        BillingReport::from_value(json!({
            "Acme": {
                "US": {"totalcost": 10.5, "delivered": "8", "failed": 1, "other": 0},
                "IN": {"0.01": {"totalcost": 0.25, "delivered": 25}}
            },
            "Globex": {"DE": {"totalcost": 3, "delivered": 2}}
        }))
        .unwrap()
    }

    #[test]
    fn test_table_has_company_and_total_rows() {
        let report = sample();
        let summary = aggregate_report(&report);
        let text = render_table(&report, &summary, false).to_string();
        assert!(text.contains("Acme"));
        assert!(text.contains("10.75"));
        assert!(text.contains("Globex"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("13.75"));
        assert!(!text.contains("0.01"));
    }

    #[test]
    fn test_table_breakdown_adds_detail_rows() {
        let report = sample();
        let summary = aggregate_report(&report);
        let text = render_table(&report, &summary, true).to_string();
        assert!(text.contains("IN"));
        assert!(text.contains("0.01"));
        assert!(text.contains("DE"));
    }

    #[test]
    fn test_json_shape() {
        let report = sample();
        let summary = aggregate_report(&report);
        let json = render_json(&report, &summary, false);
        assert_eq!(
            json,
            json!({
                "grandTotals": {"totalCost": 13.75, "totalDelivered": 35},
                "perCompany": {
                    "Acme": {"totalCost": 10.75, "totalDelivered": 33},
                    "Globex": {"totalCost": 3.0, "totalDelivered": 2}
                }
            })
        );
    }

    #[test]
    fn test_json_breakdown() {
        let report = sample();
        let summary = aggregate_report(&report);
        let json = render_json(&report, &summary, true);
        let acme = json["details"]["Acme"].as_array().unwrap();
        assert_eq!(acme.len(), 2);
        assert_eq!(acme[0]["countryCode"], "IN");
        assert_eq!(acme[0]["rateTierKey"], "0.01");
        assert_eq!(acme[1]["countryCode"], "US");
        assert_eq!(acme[1]["rateTierKey"], serde_json::Value::Null);
    }
}
