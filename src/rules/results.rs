//! # Audit Results Structures
//!
//! This module defines the data structures for representing audit findings
//! and the report produced by one audit run.
//!
//! ## Overview
//!
//! - [`Severity`] - Finding severity levels (Error, Warning, Info)
//! - [`Finding`] - Individual finding raised by an auditor against a resource
//! - [`Report`] - Ordered collection of findings from an audit run
//!
//! ## Examples
//!
//! ```rust
//! use kubeaudit::rules::{Finding, Report, Severity};
//!
//! let finding = Finding::new("PrivilegedTrue", Severity::Error, "Privileged is set to 'true'")
//!     .with_metadata("Container", "web");
//!
//! let report = Report::new(vec![finding]);
//! assert!(report.has_errors());
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::k8s::ResourceRef;

/// Severity levels for audit findings.
///
/// Ordered `Error > Warning > Info`; a minimum-severity threshold keeps every
/// finding that compares greater than or equal to it.
///
/// ```rust
/// use kubeaudit::rules::Severity;
///
/// assert!(Severity::Error > Severity::Warning);
/// assert_eq!(Severity::from_string("warn"), Some(Severity::Warning));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A security control is missing or misconfigured.
    Error,
    /// A control is not explicitly set and relies on a possibly unsafe default.
    Warning,
    /// Informational, e.g. an override label was applied.
    Info,
}

impl Severity {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s).ok_or_else(|| {
            format!("invalid severity '{s}' (expected one of \"error\", \"warning\", \"info\")")
        })
    }
}

/// A single issue raised by an auditor.
///
/// Auditors build findings with [`Finding::new`] and the builder methods; the
/// engine then stamps the auditor name and resource identity before the
/// finding lands in a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Result name, e.g. "PrivilegedTrue".
    pub name: String,

    /// Name of the auditor that raised the finding.
    pub auditor: String,

    pub severity: Severity,

    /// Human readable explanation.
    pub message: String,

    /// Resource the finding was raised against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,

    /// Extra key/value context (container name, expected values, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Finding {
    /// Create a new finding
    pub fn new(name: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auditor: String::new(),
            severity,
            message: message.into(),
            resource: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the auditor name
    pub fn with_auditor(mut self, auditor: impl Into<String>) -> Self {
        self.auditor = auditor.into();
        self
    }

    /// Set the resource identity
    pub fn with_resource(mut self, resource: ResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }

    /// True when the finding passes a minimum-severity threshold.
    pub fn meets(&self, min_severity: Severity) -> bool {
        self.severity >= min_severity
    }
}

/// Ordered findings produced by one audit run.
///
/// A report is built once by the engine and only read afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    /// Get all findings, in the order they were produced
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings at or above the given severity, in report order
    pub fn findings_at_least(&self, min_severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.meets(min_severity))
    }

    /// Count findings by severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Check if there is at least one error-severity finding
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}
