//! Audit source resolution
//!
//! Exactly one source is audited per run, picked in fixed precedence:
//!
//! 1. **Manifest** whenever `--manifest` is given (`-` reads standard input)
//! 2. **Cluster** when running inside a cluster and no `--kubeconfig` was given
//! 3. **Local** otherwise, through a kubeconfig file and optional context

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::RunConfig;
use crate::k8s::{ClientOptions, ClusterProbe};

/// Manifest argument value meaning "read from standard input".
pub const STDIN_SENTINEL: &str = "-";

/// Where a manifest is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestInput {
    Stdin,
    File(PathBuf),
}

impl ManifestInput {
    /// Interpret a `--manifest` argument.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == STDIN_SENTINEL {
            Self::Stdin
        } else {
            Self::File(arg.to_path_buf())
        }
    }

    /// Path shown to renderers; standard input has none.
    pub fn title(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(path) => Some(path),
        }
    }
}

/// The single source an audit run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// A static manifest. Namespace and generated-resource options do not apply.
    Manifest(ManifestInput),
    /// The cluster this process runs in.
    Cluster { options: ClientOptions },
    /// A cluster reached through a kubeconfig file.
    Local {
        kubeconfig: Option<PathBuf>,
        context: Option<String>,
        options: ClientOptions,
    },
}

impl SourceSelection {
    /// Pick the audit source for this run.
    ///
    /// The probe is only consulted when no manifest was supplied, and an
    /// explicit kubeconfig always wins over in-cluster detection.
    pub fn resolve(config: &RunConfig, probe: &dyn ClusterProbe) -> Self {
        if let Some(manifest) = &config.manifest {
            let input = ManifestInput::from_arg(manifest);
            debug!(?input, "Selected manifest mode");
            return Self::Manifest(input);
        }

        let options = ClientOptions {
            namespace: config.namespace.clone(),
            include_generated: config.include_generated,
        };

        if config.kubeconfig.is_none() && probe.running_in_cluster() {
            debug!(?options, "Selected cluster mode");
            return Self::Cluster { options };
        }

        debug!(kubeconfig = ?config.kubeconfig, context = ?config.context, "Selected local mode");
        Self::Local {
            kubeconfig: config.kubeconfig.clone(),
            context: config.context.clone(),
            options,
        }
    }

    /// Manifest path to use as a report title, if any.
    pub fn manifest_title(&self) -> Option<&Path> {
        match self {
            Self::Manifest(input) => input.title(),
            _ => None,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Manifest(_) => "manifest",
            Self::Cluster { .. } => "cluster",
            Self::Local { .. } => "local",
        }
    }
}
