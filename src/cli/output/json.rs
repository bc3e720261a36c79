//! JSON output formatting
//!
//! One self-contained JSON object per finding, one per line.

use serde_json::{Map, Value};

use super::{record_fields, ReportRenderer};
use crate::error::RenderError;
use crate::rules::results::Finding;

pub struct JsonOutput {
    timestamp: String,
}

impl JsonOutput {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
        }
    }

    fn record(&self, finding: &Finding) -> Map<String, Value> {
        let mut record: Map<String, Value> = record_fields(finding)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        record.insert("level".to_string(), finding.severity.as_str().into());
        record.insert("msg".to_string(), finding.message.clone().into());
        record.insert("time".to_string(), self.timestamp.clone().into());
        record
    }
}

impl ReportRenderer for JsonOutput {
    fn render_report(&self, findings: &[&Finding]) -> Result<String, RenderError> {
        let mut output = String::new();
        for finding in findings {
            let line = serde_json::to_string(&self.record(finding)).map_err(RenderError::Json)?;
            output.push_str(&line);
            output.push('\n');
        }
        Ok(output)
    }
}
