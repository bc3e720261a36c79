//! Structured-log text output
//!
//! One logfmt line per finding: `time`, `level` and `msg` first, then the
//! finding fields sorted by key.

use super::{record_fields, ReportRenderer};
use crate::error::RenderError;
use crate::rules::results::Finding;

pub struct LogfmtOutput {
    timestamp: String,
}

impl LogfmtOutput {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
        }
    }

    fn format_line(&self, finding: &Finding) -> String {
        let mut pairs = vec![
            format!("time={}", quote(&self.timestamp)),
            format!("level={}", finding.severity),
            format!("msg={}", quote(&finding.message)),
        ];
        pairs.extend(
            record_fields(finding)
                .into_iter()
                .map(|(key, value)| format!("{key}={}", quote(&value))),
        );
        pairs.join(" ")
    }
}

impl ReportRenderer for LogfmtOutput {
    fn render_report(&self, findings: &[&Finding]) -> Result<String, RenderError> {
        Ok(findings
            .iter()
            .map(|finding| self.format_line(finding) + "\n")
            .collect())
    }
}

/// Quote a value unless it only holds characters safe in a bare logfmt value.
fn quote(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._/@^+:".contains(c));
    if bare {
        value.to_string()
    } else {
        format!("{value:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::results::Severity;

    #[test]
    fn test_quote() {
        assert_eq!(quote("PrivilegedTrue"), "PrivilegedTrue");
        assert_eq!(quote("apps/v1"), "apps/v1");
        assert_eq!(quote("has space"), "\"has space\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_format_line() {
        let output = LogfmtOutput::new("2024-01-01T00:00:00Z");
        let finding = Finding::new("PrivilegedTrue", Severity::Error, "privileged is true")
            .with_auditor("privileged")
            .with_metadata("Container", "app");

        assert_eq!(
            output.format_line(&finding),
            "time=2024-01-01T00:00:00Z level=error msg=\"privileged is true\" AuditResultName=PrivilegedTrue Auditor=privileged Container=app"
        );
    }

    #[test]
    fn test_render_report_lines() {
        let output = LogfmtOutput::new("now");
        let findings = [
            Finding::new("A", Severity::Info, "a"),
            Finding::new("B", Severity::Warning, "b"),
        ];
        let refs: Vec<&Finding> = findings.iter().collect();
        let rendered = output.render_report(&refs).unwrap();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.ends_with('\n'));
    }
}
