//! SMS billing usage aggregation.
//!
//! A [`BillingReport`] is the nested company → country → usage structure
//! returned by the billing API for one date range. The functions in
//! [`aggregate`] roll it up into [`Totals`] per country, per company and
//! for the whole report, substituting 0 for missing or malformed leaf
//! values instead of failing.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod schema;
pub mod source;
pub mod types;

pub use aggregate::{
    aggregate_company, aggregate_country, aggregate_report, company_detail_rows, detail_rows,
};
pub use error::{BillingError, Result};
pub use schema::{DataQualityNote, LeafField, Problem};
pub use types::{
    BillingReport, CompanyDetail, CompanyNode, CountryNode, CountryShape, DateRange, DetailRow,
    ReportSummary, Totals,
};
