mod file;
mod http;

pub use file::FileSource;
pub use http::{HttpSource, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

use serde_json::Value;

use crate::error::{BillingError, Result};
use crate::types::{BillingReport, DateRange};

/// Something that can produce the raw usage payload for a date range.
///
/// Implementations return the report payload only; whether it has the
/// right shape is decided by [`fetch_report`].
pub trait UsageSource {
    fn name(&self) -> &str;

    fn fetch(&self, range: &DateRange) -> Result<Value>;
}

/// Fetch and validate a report in one step.
pub fn fetch_report(source: &dyn UsageSource, range: &DateRange) -> Result<BillingReport> {
    log::debug!(
        "fetching usage from {} for {} to {}",
        source.name(),
        range.from,
        range.to
    );
    let data = source.fetch(range)?;
    BillingReport::from_value(data)
}

/// Parse a response body and unwrap its envelope.
///
/// A body that is not JSON means there is nothing to show for the range.
pub fn parse_envelope(body: &str, range: &DateRange) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(envelope) => unwrap_envelope(envelope, range),
        Err(e) => {
            log::debug!("response body is not JSON: {e}");
            Err(BillingError::DataUnavailable {
                from: range.from,
                to: range.to,
            })
        }
    }
}

/// Unwrap the `{"success": true, "data": {...}}` envelope. An unsuccessful
/// envelope or an absent/null `data` means there is nothing to show.
pub fn unwrap_envelope(mut envelope: Value, range: &DateRange) -> Result<Value> {
    let unavailable = || BillingError::DataUnavailable {
        from: range.from,
        to: range.to,
    };

    if envelope.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(unavailable());
    }

    match envelope.get_mut("data").map(Value::take) {
        None | Some(Value::Null) => Err(unavailable()),
        Some(data) => Ok(data),
    }
}
