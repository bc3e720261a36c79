//! Host namespace auditor

use anyhow::Result;

use super::pod_spec_flag;
use crate::k8s::KubeResource;
use crate::rules::engine::Auditable;
use crate::rules::results::{Finding, Severity};

pub const NAME: &str = "hostns";

/// Pod spec fields that share a host namespace, with the result name raised.
const HOST_NAMESPACES: [(&str, &str, &str); 3] = [
    ("hostNetwork", "NamespaceHostNetworkTrue", "network"),
    ("hostIPC", "NamespaceHostIPCTrue", "IPC"),
    ("hostPID", "NamespaceHostPIDTrue", "PID"),
];

/// Finds pods sharing the host's network, IPC or PID namespace.
pub struct HostNamespacesAuditor;

impl Auditable for HostNamespacesAuditor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn audit(&self, resource: &KubeResource) -> Result<Vec<Finding>> {
        let Some(pod_spec) = resource.pod_spec() else {
            return Ok(Vec::new());
        };

        let findings = HOST_NAMESPACES
            .iter()
            .filter(|(field, _, _)| pod_spec_flag(pod_spec, field) == Some(true))
            .map(|(field, name, namespace)| {
                Finding::new(
                    *name,
                    Severity::Error,
                    format!("{field} is set to 'true' in PodSpec. It should be set to 'false'."),
                )
                .with_metadata("Namespace", *namespace)
            })
            .collect();

        Ok(findings)
    }
}
