//! Configuration module
//!
//! [`RunConfig`] is built once from the command line and passed by reference
//! through the pipeline. [`AuditorsConfig`] is the optional YAML file tuning
//! the default auditor catalog.

pub mod loader;

pub use loader::{AuditorSettings, AuditorsConfig, ImageConfig};

use std::path::PathBuf;

use crate::cli::exit_codes;
use crate::cli::output::RenderOptions;

/// Settings for one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Manifest path, or `-` for standard input.
    pub manifest: Option<PathBuf>,

    /// Explicit kubeconfig path (local mode only).
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context name.
    pub context: Option<String>,

    /// Namespace to audit; `None` means all namespaces.
    pub namespace: Option<String>,

    /// Audit resources owned by controllers as well.
    pub include_generated: bool,

    pub render: RenderOptions,

    /// Exit code used when the report has error-severity findings.
    pub exit_code: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            kubeconfig: None,
            context: None,
            namespace: None,
            include_generated: false,
            render: RenderOptions::default(),
            exit_code: exit_codes::ERROR_FINDINGS,
        }
    }
}

/// Treat empty strings as unset, the way an omitted flag would be.
pub(crate) fn non_empty<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|v| v.as_ref().to_string())
        .filter(|v| !v.is_empty())
}
