//! Report rendering
//!
//! Rendering takes one of two branches:
//!
//! - **SARIF** bypasses the generic renderer. The whole report is encoded as
//!   one document regardless of `--minseverity` and `--no-color`, and the run
//!   ends without consulting the exit-code policy (see [`RenderOutcome`]).
//! - **pretty / json / logrus** keep findings at or above the minimum
//!   severity and write them with the selected encoding. Report colors only
//!   apply to `pretty`.
//!
//! Both branches first write the override-label deprecation warning to the
//! diagnostic stream.

pub mod json;
pub mod logfmt;
pub mod sarif;
pub mod terminal;

pub use json::JsonOutput;
pub use logfmt::LogfmtOutput;
pub use sarif::SarifOutput;
pub use terminal::TerminalOutput;

use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::RenderError;
use crate::rules::results::{Finding, Report, Severity};

/// Warning printed before every report.
pub const DEPRECATION_WARNING: &str =
    "[WARNING]: kubernetes.io for override labels will soon be deprecated. Please, update them to use kubeaudit.io instead.";

/// Output encoding selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// SARIF 2.1.0 document
    Sarif,
    /// Colorized human readable output
    #[default]
    Pretty,
    /// logfmt-style text records, one per finding
    Logrus,
    /// JSON records, one per line
    Json,
}

/// Presentation settings for the generic renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub min_severity: Severity,
    pub color: bool,
    pub format: OutputFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            color: true,
            format: OutputFormat::Pretty,
        }
    }
}

/// Which rendering branch ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A SARIF document was written; the exit-code policy does not apply.
    SarifDocument,
    /// Filtered findings were written; the exit-code policy applies.
    Findings,
}

/// Trait for rendering filtered findings
pub trait ReportRenderer {
    fn render_report(&self, findings: &[&Finding]) -> Result<String, RenderError>;
}

/// Write the deprecation warning, then the report, to their streams.
///
/// `title` is the manifest path when auditing a file.
pub fn render(
    report: &Report,
    options: &RenderOptions,
    title: Option<&Path>,
    out: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<RenderOutcome, RenderError> {
    let warning = if options.color {
        DEPRECATION_WARNING.yellow()
    } else {
        DEPRECATION_WARNING.clear()
    };
    writeln!(diag, "\n{}", warning)?;

    if options.format == OutputFormat::Sarif {
        let document = SarifOutput::new(title).render_document(report)?;
        out.write_all(document.as_bytes())?;
        out.flush()?;
        debug!(findings = report.findings().len(), "Wrote SARIF document");
        return Ok(RenderOutcome::SarifDocument);
    }

    let findings: Vec<&Finding> = report.findings_at_least(options.min_severity).collect();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let renderer: Box<dyn ReportRenderer> = match options.format {
        OutputFormat::Json => Box::new(JsonOutput::new(timestamp)),
        OutputFormat::Logrus => Box::new(LogfmtOutput::new(timestamp)),
        OutputFormat::Pretty | OutputFormat::Sarif => Box::new(TerminalOutput::new(options.color)),
    };

    let rendered = renderer.render_report(&findings)?;
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    debug!(
        shown = findings.len(),
        total = report.findings().len(),
        min_severity = %options.min_severity,
        "Wrote report"
    );

    Ok(RenderOutcome::Findings)
}

/// Flatten a finding into the key/value fields shared by record encodings.
pub(crate) fn record_fields(finding: &Finding) -> Vec<(String, String)> {
    let field = |key: &str, value: &str| (key.to_string(), value.to_string());

    let mut fields = vec![field("AuditResultName", &finding.name)];
    if !finding.auditor.is_empty() {
        fields.push(field("Auditor", &finding.auditor));
    }
    if let Some(resource) = &finding.resource {
        fields.push(field("ResourceApiVersion", &resource.api_version));
        fields.push(field("ResourceKind", &resource.kind));
        fields.push(field("ResourceName", &resource.name));
        if let Some(namespace) = &resource.namespace {
            fields.push(field("ResourceNamespace", namespace));
        }
    }
    for (key, value) in &finding.metadata {
        fields.push(field(key, value));
    }
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::ResourceRef;

    fn report() -> Report {
        let resource = ResourceRef {
            api_version: "v1".to_string(),
            kind: "Pod".to_string(),
            name: "web".to_string(),
            namespace: Some("prod".to_string()),
        };
        Report::new(vec![
            Finding::new("InfoFinding", Severity::Info, "just so you know")
                .with_resource(resource.clone()),
            Finding::new("WarningFinding", Severity::Warning, "look at this")
                .with_resource(resource.clone()),
            Finding::new("ErrorFinding", Severity::Error, "fix this").with_resource(resource),
        ])
    }

    fn render_to_strings(options: &RenderOptions) -> (RenderOutcome, String, String) {
        let mut out = Vec::new();
        let mut diag = Vec::new();
        let outcome = render(&report(), options, None, &mut out, &mut diag).unwrap();
        (
            outcome,
            String::from_utf8(out).unwrap(),
            String::from_utf8(diag).unwrap(),
        )
    }

    #[test]
    fn test_deprecation_warning_for_every_format() {
        for format in [
            OutputFormat::Sarif,
            OutputFormat::Pretty,
            OutputFormat::Logrus,
            OutputFormat::Json,
        ] {
            let options = RenderOptions {
                format,
                color: false,
                ..Default::default()
            };
            let (_, out, diag) = render_to_strings(&options);
            assert!(diag.contains(DEPRECATION_WARNING), "format {format:?}");
            assert!(!out.contains(DEPRECATION_WARNING), "format {format:?}");
        }
    }

    #[test]
    fn test_min_severity_filters_each_generic_format() {
        let all = ["InfoFinding", "WarningFinding", "ErrorFinding"];
        for format in [
            OutputFormat::Pretty,
            OutputFormat::Logrus,
            OutputFormat::Json,
        ] {
            for (min_severity, expected) in [
                (Severity::Info, &all[..]),
                (Severity::Warning, &all[1..]),
                (Severity::Error, &all[2..]),
            ] {
                let options = RenderOptions {
                    min_severity,
                    color: false,
                    format,
                };
                let (outcome, out, _) = render_to_strings(&options);
                assert_eq!(outcome, RenderOutcome::Findings);
                for name in all {
                    assert_eq!(
                        out.contains(name),
                        expected.contains(&name),
                        "{name} with {format:?} at {min_severity}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_json_warning_threshold_scenario() {
        let resource = ResourceRef {
            api_version: "v1".to_string(),
            kind: "Pod".to_string(),
            name: "web".to_string(),
            namespace: None,
        };
        let report = Report::new(vec![
            Finding::new("InfoOnly", Severity::Info, "info").with_resource(resource.clone()),
            Finding::new("WarnOnly", Severity::Warning, "warn").with_resource(resource),
        ]);
        let options = RenderOptions {
            min_severity: Severity::Warning,
            color: true,
            format: OutputFormat::Json,
        };

        let mut out = Vec::new();
        render(&report, &options, None, &mut out, &mut std::io::sink()).unwrap();
        let out = String::from_utf8(out).unwrap();

        let records: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["AuditResultName"], "WarnOnly");
    }

    #[test]
    fn test_sarif_ignores_min_severity() {
        let options = RenderOptions {
            min_severity: Severity::Error,
            color: true,
            format: OutputFormat::Sarif,
        };
        let (outcome, out, _) = render_to_strings(&options);

        assert_eq!(outcome, RenderOutcome::SarifDocument);
        let document: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(document["runs"][0]["results"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_record_fields_sorted_and_complete() {
        let base = report().findings()[2].clone();
        let finding = base
            .with_auditor("privileged")
            .with_metadata("Container", "app");
        let keys: Vec<_> = record_fields(&finding).into_iter().map(|f| f.0).collect();
        assert_eq!(
            keys,
            vec![
                "AuditResultName",
                "Auditor",
                "Container",
                "ResourceApiVersion",
                "ResourceKind",
                "ResourceName",
                "ResourceNamespace",
            ]
        );
    }
}
