//! Privileged container auditor

use anyhow::Result;

use super::container_security_flag;
use crate::k8s::{container_name, KubeResource};
use crate::rules::engine::Auditable;
use crate::rules::results::{Finding, Severity};

pub const NAME: &str = "privileged";

/// Finds containers that run privileged, or leave `privileged` unset.
pub struct PrivilegedAuditor;

impl Auditable for PrivilegedAuditor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn audit(&self, resource: &KubeResource) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for container in resource.containers() {
            let finding = match container_security_flag(container, "privileged") {
                Some(false) => continue,
                Some(true) => Finding::new(
                    "PrivilegedTrue",
                    Severity::Error,
                    "privileged is set to 'true' in container SecurityContext. It should be set to 'false'.",
                ),
                None => Finding::new(
                    "PrivilegedNil",
                    Severity::Warning,
                    "privileged is not set in container SecurityContext. Privileged defaults to 'false' but it should be explicitly set to 'false'.",
                ),
            };
            findings.push(finding.with_metadata("Container", container_name(container)));
        }

        Ok(findings)
    }
}
