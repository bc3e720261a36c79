//! Error types for kubeaudit
//!
//! Every stage of the audit pipeline returns its own error kind. The binary
//! maps any of them to a single diagnostic line and a fatal exit.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kubeaudit
#[derive(Error, Debug)]
pub enum KubeauditError {
    /// Rule catalog or engine construction failed
    #[error("initializing auditors: {0}")]
    Setup(#[from] SetupError),

    /// The manifest or cluster could not be reached
    #[error("accessing audit source: {0}")]
    Source(#[from] SourceError),

    /// Running the auditors against a resolved source failed
    #[error("running audit: {0}")]
    Audit(#[from] AuditError),

    /// Encoding the report failed
    #[error("rendering report: {0}")]
    Render(#[from] RenderError),
}

/// Errors raised while building the rule set and the engine
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("no auditors enabled")]
    EmptyRuleSet,

    #[error("auditor '{0}' is registered more than once")]
    DuplicateAuditor(String),

    #[error("unknown auditor '{0}' in configuration")]
    UnknownAuditor(String),

    #[error("invalid configuration for auditor '{auditor}': {message}")]
    InvalidAuditorConfig { auditor: String, message: String },

    #[error("failed to read auditor config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse auditor config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Errors raised while opening a manifest or connecting to a cluster
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open manifest file '{path}': {source}")]
    ManifestOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load in-cluster configuration: {0}")]
    InCluster(String),

    #[error("failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("failed to create Kubernetes client: {0}")]
    Client(#[from] kube::Error),
}

/// Errors raised while auditing a resolved source
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("failed to audit manifest '{name}': {source}")]
    Manifest { name: String, source: ManifestError },

    #[error("failed to list {kind} resources: {source}")]
    List { kind: String, source: kube::Error },

    #[error("failed to decode {kind} resource: {message}")]
    Decode { kind: String, message: String },

    #[error("auditor '{auditor}' failed on {resource}: {source}")]
    Auditor {
        auditor: String,
        resource: String,
        source: anyhow::Error,
    },
}

/// Errors raised while parsing a manifest stream
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("invalid YAML in document {document}: {source}")]
    Yaml {
        document: usize,
        source: serde_yaml::Error,
    },

    #[error("invalid object in document {document}: {message}")]
    Object { document: usize, message: String },
}

/// Errors raised while encoding a report
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to generate SARIF output: {0}")]
    Sarif(#[source] serde_json::Error),

    #[error("failed to encode JSON record: {0}")]
    Json(#[source] serde_json::Error),

    #[error("failed to write report: {0}")]
    Write(#[from] std::io::Error),
}
