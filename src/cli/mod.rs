//! # CLI Module
//!
//! This module defines the command-line interface for kubeaudit using `clap`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `all` | Run every enabled auditor from the default catalog |
//! | `privileged` | Audit containers running as privileged |
//! | `hostns` | Audit pods sharing host namespaces |
//! | `image` | Audit container image tags |
//! | `nonroot` | Audit containers allowed to run as root |
//! | `rootfs` | Audit containers with a writable root filesystem |
//! | `escalation` | Audit containers allowing privilege escalation |
//!
//! ## Submodules
//!
//! - [`commands`] - Command implementations
//! - [`exit_codes`] - Standardized exit codes
//! - [`output`] - Report output formatters (pretty, json, logrus, SARIF)
//!
//! ## Global Options
//!
//! The audit source is picked from the global options: `-f, --manifest`
//! audits a file (or `-` for stdin), otherwise the cluster kubeaudit runs in,
//! otherwise the cluster named by `--kubeconfig` and `-c, --context`.
//!
//! ## Examples
//!
//! ```bash
//! # Audit a manifest with every auditor
//! kubeaudit all -f deployment.yaml
//!
//! # Audit a namespace of the current cluster, errors only
//! kubeaudit privileged -n prod -m error
//!
//! # Produce SARIF for code scanning
//! kubeaudit all -f deployment.yaml -p sarif > kubeaudit.sarif
//! ```

pub mod commands;
pub mod exit_codes;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{non_empty, RunConfig};
use crate::rules::Severity;
use commands::{AllArgs, ImageArgs};
use output::{OutputFormat, RenderOptions};

/// kubeaudit - Audit Kubernetes clusters and manifests for common security controls
#[derive(Parser, Debug)]
#[command(name = "kubeaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to kubeconfig file (local mode)
    #[arg(long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(short, long, global = true, value_name = "NAME")]
    pub context: Option<String>,

    /// Minimum severity of findings to report (error, warning, info)
    #[arg(short = 'm', long = "minseverity", global = true, default_value = "info")]
    pub min_severity: Severity,

    /// Output format
    #[arg(short = 'p', long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only audit resources in this namespace (default: all namespaces)
    #[arg(short, long, global = true, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Include resources owned by a controller (cluster and local modes)
    #[arg(short = 'g', long = "includegenerated", global = true)]
    pub include_generated: bool,

    /// Disable colored pretty output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Manifest file to audit, or `-` to read standard input
    #[arg(short = 'f', long, global = true, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Exit code used when error-severity findings are reported
    #[arg(short = 'e', long = "exitcode", global = true, default_value_t = exit_codes::ERROR_FINDINGS)]
    pub exit_code: i32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every enabled auditor
    All(AllArgs),

    /// Audit containers running as privileged
    Privileged,

    /// Audit pods sharing the host network, IPC or PID namespace
    Hostns,

    /// Audit container image tags
    Image(ImageArgs),

    /// Audit containers allowed to run as root
    Nonroot,

    /// Audit containers with a writable root filesystem
    Rootfs,

    /// Audit containers allowing privilege escalation
    Escalation,
}

impl Cli {
    /// Settings for this run. Empty string arguments count as unset.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            manifest: self
                .manifest
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            kubeconfig: self
                .kubeconfig
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            context: non_empty(self.context.as_deref()),
            namespace: non_empty(self.namespace.as_deref()),
            include_generated: self.include_generated,
            render: RenderOptions {
                min_severity: self.min_severity,
                color: !self.no_color,
                format: self.format,
            },
            exit_code: self.exit_code,
        }
    }
}
