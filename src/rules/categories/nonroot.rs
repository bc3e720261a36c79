//! Run-as-non-root auditor
//!
//! A container runs as non-root when its own security context sets
//! `runAsNonRoot: true`, or when it leaves the field unset and the pod security
//! context sets it. The container setting always wins.

use anyhow::Result;

use super::container_security_flag;
use crate::k8s::{container_name, KubeResource};
use crate::rules::engine::Auditable;
use crate::rules::results::{Finding, Severity};

pub const NAME: &str = "nonroot";

pub struct RunAsNonRootAuditor;

impl Auditable for RunAsNonRootAuditor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn audit(&self, resource: &KubeResource) -> Result<Vec<Finding>> {
        let pod_setting = resource
            .pod_security_context()
            .and_then(|psc| psc.get("runAsNonRoot"))
            .and_then(|v| v.as_bool());

        let mut findings = Vec::new();
        for container in resource.containers() {
            let container_setting = container_security_flag(container, "runAsNonRoot");

            let finding = match (container_setting, pod_setting) {
                (Some(true), _) | (None, Some(true)) => continue,
                (Some(false), _) => Finding::new(
                    "RunAsNonRootCSCFalse",
                    Severity::Error,
                    "runAsNonRoot is set to false in the container SecurityContext. It should be set to 'true'.",
                ),
                (None, Some(false)) => Finding::new(
                    "RunAsNonRootPSCFalseCSCNil",
                    Severity::Error,
                    "runAsNonRoot is set to false in the pod SecurityContext and not set in the container SecurityContext. It should be set to 'true' in at least one of them.",
                ),
                (None, None) => Finding::new(
                    "RunAsNonRootPSCNilCSCNil",
                    Severity::Error,
                    "runAsNonRoot is not set in the container SecurityContext nor the pod SecurityContext. It should be set to 'true' in at least one of them.",
                ),
            };
            findings.push(finding.with_metadata("Container", container_name(container)));
        }

        Ok(findings)
    }
}
