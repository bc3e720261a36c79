//! Read-only root filesystem auditor

use anyhow::Result;

use super::container_security_flag;
use crate::k8s::{container_name, KubeResource};
use crate::rules::engine::Auditable;
use crate::rules::results::{Finding, Severity};

pub const NAME: &str = "rootfs";

pub struct ReadOnlyRootFilesystemAuditor;

impl Auditable for ReadOnlyRootFilesystemAuditor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn audit(&self, resource: &KubeResource) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for container in resource.containers() {
            let finding = match container_security_flag(container, "readOnlyRootFilesystem") {
                Some(true) => continue,
                Some(false) => Finding::new(
                    "ReadOnlyRootFilesystemFalse",
                    Severity::Error,
                    "readOnlyRootFilesystem is set to 'false' in container SecurityContext. It should be set to 'true'.",
                ),
                None => Finding::new(
                    "ReadOnlyRootFilesystemNil",
                    Severity::Error,
                    "readOnlyRootFilesystem is not set in container SecurityContext. It should be set to 'true'.",
                ),
            };
            findings.push(finding.with_metadata("Container", container_name(container)));
        }

        Ok(findings)
    }
}
