//! Default auditor catalog

use tracing::debug;

use super::categories::{
    escalation::{self, PrivilegeEscalationAuditor},
    hostns::{self, HostNamespacesAuditor},
    image::{self, ImageAuditor},
    nonroot::{self, RunAsNonRootAuditor},
    privileged::{self, PrivilegedAuditor},
    rootfs::{self, ReadOnlyRootFilesystemAuditor},
};
use super::engine::{Auditable, RuleSet};
use crate::config::AuditorsConfig;
use crate::error::SetupError;

/// Every built-in auditor, in the order they run.
pub const AUDITOR_NAMES: [&str; 6] = [
    escalation::NAME,
    hostns::NAME,
    image::NAME,
    nonroot::NAME,
    privileged::NAME,
    rootfs::NAME,
];

/// Build one built-in auditor by name.
pub fn auditor(name: &str, config: &AuditorsConfig) -> Result<Box<dyn Auditable>, SetupError> {
    let auditor: Box<dyn Auditable> = match name {
        escalation::NAME => Box::new(PrivilegeEscalationAuditor),
        hostns::NAME => Box::new(HostNamespacesAuditor),
        image::NAME => match config.auditors.image.image.as_deref() {
            Some(required) => Box::new(ImageAuditor::with_required_image(required)?),
            None => Box::new(ImageAuditor::new()),
        },
        nonroot::NAME => Box::new(RunAsNonRootAuditor),
        privileged::NAME => Box::new(PrivilegedAuditor),
        rootfs::NAME => Box::new(ReadOnlyRootFilesystemAuditor),
        other => return Err(SetupError::UnknownAuditor(other.to_string())),
    };
    Ok(auditor)
}

/// Build every auditor the configuration leaves enabled.
pub fn all_auditors(config: &AuditorsConfig) -> Result<RuleSet, SetupError> {
    if let Some(unknown) = config
        .enabled_auditors
        .keys()
        .find(|name| !AUDITOR_NAMES.contains(&name.as_str()))
    {
        return Err(SetupError::UnknownAuditor(unknown.clone()));
    }

    let mut auditors = Vec::new();
    for name in AUDITOR_NAMES {
        if !config.is_enabled(name) {
            debug!(auditor = name, "Auditor disabled by configuration");
            continue;
        }
        auditors.push(auditor(name, config)?);
    }

    if auditors.is_empty() {
        return Err(SetupError::EmptyRuleSet);
    }
    Ok(auditors)
}
