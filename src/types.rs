use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BillingError, Result};
use crate::schema::{self, DataQualityNote};

/// Cost and delivery totals for one node of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_cost: f64,
    pub total_delivered: u64,
}

impl Totals {
    pub fn new(total_cost: f64, total_delivered: u64) -> Self {
        Self {
            total_cost,
            total_delivered,
        }
    }
}

/// Delivered counts saturate at `u64::MAX` instead of overflowing.
impl Add for Totals {
    type Output = Totals;

    fn add(self, rhs: Totals) -> Totals {
        Totals {
            total_cost: self.total_cost + rhs.total_cost,
            total_delivered: self.total_delivered.saturating_add(rhs.total_delivered),
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        *self = *self + rhs;
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::default(), Add::add)
    }
}

/// Inclusive calendar-date range for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(BillingError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }
}

/// Full usage structure for one queried range: company → country → usage.
///
/// Construction only checks the top level; anything below it is read
/// leniently by the aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingReport {
    companies: Map<String, Value>,
}

impl BillingReport {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(companies) => Ok(Self { companies }),
            other => Err(BillingError::InvalidReportShape {
                found: schema::kind_name(&other),
            }),
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data).map_err(|source| BillingError::JsonParse {
            context: "billing report".to_string(),
            source,
        })?;
        Self::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Companies in key order.
    pub fn companies(&self) -> impl Iterator<Item = CompanyNode<'_>> {
        self.companies
            .iter()
            .map(|(key, value)| CompanyNode { key, value })
    }

    pub fn company(&self, key: &str) -> Option<CompanyNode<'_>> {
        self.companies
            .get_key_value(key)
            .map(|(key, value)| CompanyNode { key, value })
    }

    /// Keep only companies whose key contains `needle` (case-insensitive).
    pub fn retain_companies(self, needle: &str) -> Self {
        let needle = needle.to_lowercase();
        let companies = self
            .companies
            .into_iter()
            .filter(|(key, _)| key.to_lowercase().contains(&needle))
            .collect();
        Self { companies }
    }
}

/// Read-only view of one company's usage: country code → CountryNode.
#[derive(Debug, Clone, Copy)]
pub struct CompanyNode<'a> {
    pub key: &'a str,
    value: &'a Value,
}

impl<'a> CompanyNode<'a> {
    pub fn new(key: &'a str, value: &'a Value) -> Self {
        Self { key, value }
    }

    /// Country entries, or `None` if the company value is not a mapping.
    pub fn countries(&self) -> Option<impl Iterator<Item = CountryNode<'a>> + 'a> {
        let company = self.key;
        let map = self.value.as_object()?;
        Some(map.iter().map(move |(code, value)| CountryNode {
            company: Some(company),
            code,
            value,
        }))
    }

    pub fn country(&self, code: &str) -> Option<CountryNode<'a>> {
        self.value
            .as_object()?
            .get_key_value(code)
            .map(|(code, value)| CountryNode {
                company: Some(self.key),
                code,
                value,
            })
    }

    pub fn raw(&self) -> &'a Value {
        self.value
    }
}

/// Read-only view of one country's usage within a company.
///
/// `company` is set when the node was reached through a [`CompanyNode`];
/// a node built with [`CountryNode::new`] has no company context and its
/// data-quality notes name only the country.
#[derive(Debug, Clone, Copy)]
pub struct CountryNode<'a> {
    pub company: Option<&'a str>,
    pub code: &'a str,
    value: &'a Value,
}

/// The two accepted layouts of a country's usage, plus the fallback.
#[derive(Debug, Clone, Copy)]
pub enum CountryShape<'a> {
    /// A single usage record.
    Flat(&'a Map<String, Value>),
    /// Rate-tier key → usage record.
    Tiered(&'a Map<String, Value>),
    /// Neither; contributes nothing.
    Malformed(&'a Value),
}

impl<'a> CountryNode<'a> {
    pub fn new(code: &'a str, value: &'a Value) -> Self {
        Self {
            company: None,
            code,
            value,
        }
    }

    pub fn with_company(self, company: &'a str) -> Self {
        Self {
            company: Some(company),
            ..self
        }
    }

    /// Flat when any recognised leaf key holds a scalar (non-null,
    /// non-object) value, tiered otherwise.
    pub fn shape(&self) -> CountryShape<'a> {
        let Some(map) = self.value.as_object() else {
            return CountryShape::Malformed(self.value);
        };
        let flat = map
            .iter()
            .any(|(key, value)| {
                schema::is_leaf_key(key) && !value.is_object() && !value.is_null()
            });
        if flat {
            CountryShape::Flat(map)
        } else {
            CountryShape::Tiered(map)
        }
    }

    pub fn raw(&self) -> &'a Value {
        self.value
    }
}

/// One flattened line of the on-demand detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub country_code: String,
    pub rate_tier_key: Option<String>,
    pub total_cost: f64,
    pub delivered: u64,
    pub failed: u64,
    pub other: u64,
}

/// Detail rows of one company and the notes raised while reading them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyDetail {
    pub rows: Vec<DetailRow>,
    pub notes: Vec<DataQualityNote>,
}

/// Output of report aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub grand_totals: Totals,
    pub per_company: BTreeMap<String, Totals>,
    #[serde(skip)]
    pub notes: Vec<DataQualityNote>,
}
