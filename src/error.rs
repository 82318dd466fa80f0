use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    /// The source answered, but has nothing for the requested range.
    #[error("No data found for {from} to {to}")]
    DataUnavailable { from: NaiveDate, to: NaiveDate },

    #[error("Failed to fetch billing data: {message}")]
    TransportFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to parse JSON: {context}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The top-level report is not a mapping of company → usage.
    #[error("Invalid report shape: expected an object of companies, found {found}")]
    InvalidReportShape { found: &'static str },

    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Failed to read file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BillingError {
    pub fn transport(message: impl Into<String>) -> Self {
        BillingError::TransportFailure {
            message: message.into(),
            source: None,
        }
    }
}

impl From<ureq::Error> for BillingError {
    fn from(err: ureq::Error) -> Self {
        BillingError::TransportFailure {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, BillingError>;
