use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use super::{unwrap_envelope, UsageSource};
use crate::error::{BillingError, Result};
use crate::types::DateRange;

/// A saved API response (or a bare report) on disk.
///
/// The range is not applied to the contents; the file is taken to hold
/// exactly the range it was saved for.
pub struct FileSource {
    path: PathBuf,
    label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

impl UsageSource for FileSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self, range: &DateRange) -> Result<Value> {
        let data = fs::read_to_string(&self.path).map_err(|source| BillingError::Io {
            path: self.path.clone(),
            source,
        })?;

        // Envelopes carry `success`; anything else is the report itself.
        let value: Value =
            serde_json::from_str(&data).map_err(|source| BillingError::JsonParse {
                context: self.label.clone(),
                source,
            })?;
        if value.get("success").is_some() {
            unwrap_envelope(value, range)
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::io::Write;

    fn range() -> DateRange {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        DateRange::new(d, d).unwrap()
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_envelope() {
        let file = write_temp(r#"{"success": true, "data": {"A": {}}}"#);
        let value = FileSource::new(file.path()).fetch(&range()).unwrap();
        assert_eq!(value, json!({"A": {}}));
    }

    #[test]
    fn test_reads_bare_report() {
        let file = write_temp(r#"{"A": {"US": {"totalcost": 2}}}"#);
        let value = FileSource::new(file.path()).fetch(&range()).unwrap();
        assert_eq!(value, json!({"A": {"US": {"totalcost": 2}}}));
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let file = write_temp(r#"{"success": false}"#);
        assert!(matches!(
            FileSource::new(file.path()).fetch(&range()),
            Err(BillingError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let file = write_temp("{\"success\": tru");
        assert!(matches!(
            FileSource::new(file.path()).fetch(&range()),
            Err(BillingError::JsonParse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.json"));
        assert!(matches!(
            source.fetch(&range()),
            Err(BillingError::Io { .. })
        ));
    }
}
