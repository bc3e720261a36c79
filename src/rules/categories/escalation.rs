//! Privilege escalation auditor

use anyhow::Result;

use super::container_security_flag;
use crate::k8s::{container_name, KubeResource};
use crate::rules::engine::Auditable;
use crate::rules::results::{Finding, Severity};

pub const NAME: &str = "escalation";

/// Finds containers that may gain more privileges than their parent process.
pub struct PrivilegeEscalationAuditor;

impl Auditable for PrivilegeEscalationAuditor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn audit(&self, resource: &KubeResource) -> Result<Vec<Finding>> {
        let findings = resource
            .containers()
            .filter_map(|container| {
                let finding = match container_security_flag(container, "allowPrivilegeEscalation") {
                    Some(false) => return None,
                    Some(true) => Finding::new(
                        "AllowPrivilegeEscalationTrue",
                        Severity::Error,
                        "allowPrivilegeEscalation is set to 'true' in container SecurityContext. It should be set to 'false'.",
                    ),
                    // Unset defaults to true.
                    None => Finding::new(
                        "AllowPrivilegeEscalationNil",
                        Severity::Error,
                        "allowPrivilegeEscalation not set which allows privilege escalation. It should be set to 'false'.",
                    ),
                };
                Some(finding.with_metadata("Container", container_name(container)))
            })
            .collect();

        Ok(findings)
    }
}
