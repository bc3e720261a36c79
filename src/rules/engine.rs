//! Audit engine
//!
//! Owns the active rule set and runs it against exactly one resolved source.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, span, Level};

use super::catalog;
use super::results::{Finding, Report, Severity};
use crate::config::AuditorsConfig;
use crate::error::{AuditError, KubeauditError, SetupError, SourceError};
use crate::k8s::manifest::{self, STDIN_NAME};
use crate::k8s::{ClientOptions, KubeLister, KubeResource, ResourceLister};
use crate::source::{ManifestInput, SourceSelection};

/// A single security check run against every resource.
pub trait Auditable: Send + Sync {
    /// Unique auditor name, also used as the subcommand name.
    fn name(&self) -> &'static str;

    /// Inspect one resource and return the issues found.
    fn audit(&self, resource: &KubeResource) -> anyhow::Result<Vec<Finding>>;
}

/// Ordered collection of auditors.
pub type RuleSet = Vec<Box<dyn Auditable>>;

/// Runs a fixed, non-empty rule set.
pub struct AuditEngine {
    auditors: RuleSet,
}

impl std::fmt::Debug for AuditEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditEngine")
            .field("auditors", &self.auditor_names())
            .finish()
    }
}

impl AuditEngine {
    /// Create an engine bound to `auditors`.
    ///
    /// Rejects an empty rule set and duplicate auditor names.
    pub fn new(auditors: RuleSet) -> Result<Self, SetupError> {
        if auditors.is_empty() {
            return Err(SetupError::EmptyRuleSet);
        }

        let mut seen = std::collections::HashSet::new();
        for auditor in &auditors {
            if !seen.insert(auditor.name()) {
                return Err(SetupError::DuplicateAuditor(auditor.name().to_string()));
            }
        }

        Ok(Self { auditors })
    }

    /// Build the engine from explicit auditors, falling back to the full
    /// default catalog when none are given.
    pub fn initialize(explicit: RuleSet, config: &AuditorsConfig) -> Result<Self, SetupError> {
        let auditors = if explicit.is_empty() {
            debug!("No explicit auditors, loading default catalog");
            catalog::all_auditors(config)?
        } else {
            explicit
        };

        let engine = Self::new(auditors)?;
        info!(auditors = ?engine.auditor_names(), "Initialized audit engine");
        Ok(engine)
    }

    pub fn auditor_names(&self) -> Vec<&'static str> {
        self.auditors.iter().map(|a| a.name()).collect()
    }

    /// Run every auditor against every resource, resource by resource.
    ///
    /// The first auditor failure aborts the run; no partial report is returned.
    pub fn audit_resources(&self, resources: &[KubeResource]) -> Result<Report, AuditError> {
        let mut findings = Vec::new();

        for resource in resources {
            let identity = resource.identity();
            let span = span!(Level::DEBUG, "resource", resource = %identity);
            let _guard = span.enter();

            for auditor in &self.auditors {
                let raised = auditor
                    .audit(resource)
                    .map_err(|source| AuditError::Auditor {
                        auditor: auditor.name().to_string(),
                        resource: identity.to_string(),
                        source,
                    })?;
                debug!(
                    auditor = %auditor.name(),
                    findings_count = raised.len(),
                    "Auditor completed"
                );

                findings.extend(raised.into_iter().map(|finding| {
                    finding
                        .with_auditor(auditor.name())
                        .with_resource(identity.clone())
                }));
            }
        }

        let report = Report::new(findings);
        info!(
            "Audit complete: {} resources, {} errors, {} warnings, {} info",
            resources.len(),
            report.count_by_severity(Severity::Error),
            report.count_by_severity(Severity::Warning),
            report.count_by_severity(Severity::Info),
        );
        Ok(report)
    }

    /// Audit a manifest stream. `name` identifies the manifest in errors.
    pub fn audit_manifest<R: Read>(&self, name: &str, reader: R) -> Result<Report, AuditError> {
        let resources =
            manifest::parse_manifest(reader).map_err(|source| AuditError::Manifest {
                name: name.to_string(),
                source,
            })?;
        self.audit_resources(&resources)
    }

    /// Audit whatever a lister returns.
    pub async fn audit_listed(
        &self,
        lister: &dyn ResourceLister,
        options: &ClientOptions,
    ) -> Result<Report, AuditError> {
        let resources = lister.list_resources(options).await?;
        self.audit_resources(&resources)
    }

    /// Audit the cluster this process is running in.
    pub async fn audit_cluster(&self, options: &ClientOptions) -> Result<Report, KubeauditError> {
        let lister = KubeLister::in_cluster()?;
        Ok(self.audit_listed(&lister, options).await?)
    }

    /// Audit a cluster reached through a kubeconfig file.
    pub async fn audit_local(
        &self,
        kubeconfig: Option<&Path>,
        context: Option<&str>,
        options: &ClientOptions,
    ) -> Result<Report, KubeauditError> {
        let lister = KubeLister::from_kubeconfig(kubeconfig, context).await?;
        Ok(self.audit_listed(&lister, options).await?)
    }

    /// Run the audit against exactly the resolved source.
    pub async fn generate_report(
        &self,
        source: &SourceSelection,
    ) -> Result<Report, KubeauditError> {
        match source {
            SourceSelection::Manifest(ManifestInput::Stdin) => {
                info!("Auditing manifest from standard input");
                Ok(self.audit_manifest(STDIN_NAME, io::stdin().lock())?)
            }
            SourceSelection::Manifest(ManifestInput::File(path)) => {
                info!(path = %path.display(), "Auditing manifest file");
                let file = File::open(path).map_err(|source| SourceError::ManifestOpen {
                    path: path.clone(),
                    source,
                })?;
                let name = path.display().to_string();
                Ok(self.audit_manifest(&name, BufReader::new(file))?)
            }
            SourceSelection::Cluster { options } => {
                info!(namespace = ?options.namespace, "Auditing cluster in cluster mode");
                self.audit_cluster(options).await
            }
            SourceSelection::Local {
                kubeconfig,
                context,
                options,
            } => {
                info!(namespace = ?options.namespace, "Auditing cluster in local mode");
                self.audit_local(kubeconfig.as_deref(), context.as_deref(), options)
                    .await
            }
        }
    }
}
