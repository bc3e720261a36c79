//! Built-in auditors

pub mod escalation;
pub mod hostns;
pub mod image;
pub mod nonroot;
pub mod privileged;
pub mod rootfs;

use serde_json::Value;

/// Boolean field of a container's `securityContext`.
pub(crate) fn container_security_flag(container: &Value, field: &str) -> Option<bool> {
    container.get("securityContext")?.get(field)?.as_bool()
}

/// Boolean field of a pod spec, e.g. `hostNetwork`.
pub(crate) fn pod_spec_flag(pod_spec: &Value, field: &str) -> Option<bool> {
    pod_spec.get(field)?.as_bool()
}
