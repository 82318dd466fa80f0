use std::time::Duration;

use serde_json::Value;

use super::{parse_envelope, UsageSource};
use crate::error::Result;
use crate::types::DateRange;

pub const DEFAULT_API_URL: &str = "https://napi.authkey.io/api/react_test";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Billing API reached over HTTP GET with `from_date`/`to_date` query
/// parameters.
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn fetch_body(&self, range: &DateRange) -> Result<String> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();
        let body = agent
            .get(&self.url)
            .query("from_date", range.from.format(DATE_FORMAT).to_string())
            .query("to_date", range.to.format(DATE_FORMAT).to_string())
            .call()?
            .body_mut()
            .read_to_string()?;
        Ok(body)
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS)
    }
}

impl UsageSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self, range: &DateRange) -> Result<Value> {
        let body = self.fetch_body(range)?;
        log::debug!("received {} bytes", body.len());
        parse_envelope(&body, range)
    }
}
