//! Exit codes for the CLI
//!
//! # Exit Code Reference
//!
//! | Code | Constant | Meaning |
//! |------|----------|---------|
//! | 0 | `SUCCESS` | No error-severity findings, or a SARIF document was written |
//! | 1 | `FATAL` | Setup, source, audit or render failure |
//! | 2 | `ERROR_FINDINGS` | Default code for error-severity findings (`--exitcode`) |

use crate::cli::output::RenderOutcome;
use crate::rules::Report;

/// Success - the run completed without error-severity findings.
pub const SUCCESS: i32 = 0;

/// Fatal failure before a report could be rendered.
///
/// Used when:
/// - Auditor initialization failed
/// - The manifest or cluster could not be reached
/// - An auditor failed on a resource
/// - The report could not be written
pub const FATAL: i32 = 1;

/// Error-severity findings were reported; overridable with `--exitcode`.
pub const ERROR_FINDINGS: i32 = 2;

/// Pick the process exit code once the report has been rendered.
///
/// A SARIF document always exits with [`SUCCESS`]; consumers of SARIF read
/// results from the document itself.
pub fn resolve(report: &Report, outcome: RenderOutcome, configured: i32) -> i32 {
    match outcome {
        RenderOutcome::SarifDocument => SUCCESS,
        RenderOutcome::Findings if report.has_errors() => configured,
        RenderOutcome::Findings => SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Finding, Severity};

    fn report(severities: &[Severity]) -> Report {
        Report::new(
            severities
                .iter()
                .map(|s| Finding::new("Result", *s, "message"))
                .collect(),
        )
    }

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(SUCCESS, 0);
        assert_eq!(FATAL, 1);
        assert_eq!(ERROR_FINDINGS, 2);
    }

    #[test]
    fn test_errors_use_configured_code() {
        let report = report(&[Severity::Warning, Severity::Error]);
        assert_eq!(resolve(&report, RenderOutcome::Findings, ERROR_FINDINGS), 2);
        assert_eq!(resolve(&report, RenderOutcome::Findings, 7), 7);
    }

    #[test]
    fn test_warnings_only_succeed() {
        let report = report(&[Severity::Warning, Severity::Info]);
        assert_eq!(resolve(&report, RenderOutcome::Findings, 7), SUCCESS);
        let empty = Report::default();
        assert_eq!(resolve(&empty, RenderOutcome::Findings, 7), SUCCESS);
    }

    #[test]
    fn test_sarif_always_succeeds() {
        let report = report(&[Severity::Error]);
        assert_eq!(resolve(&report, RenderOutcome::SarifDocument, 7), SUCCESS);
    }
}
