//! Generic Kubernetes resource representation
//!
//! Manifests and live clusters both produce [`KubeResource`] values, so the
//! auditors never care where an object came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity of a resource, attached to every finding raised against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// A single Kubernetes object together with its identity.
#[derive(Debug, Clone)]
pub struct KubeResource {
    identity: ResourceRef,
    generated: bool,
    object: Value,
}

impl KubeResource {
    /// Build a resource from a decoded object.
    ///
    /// Fails when `apiVersion` or `kind` is missing, since a finding could
    /// not be attributed to anything.
    pub fn from_value(object: Value) -> Result<Self, String> {
        let api_version = object
            .get("apiVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| "object is missing 'apiVersion'".to_string())?
            .to_string();
        let kind = object
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| "object is missing 'kind'".to_string())?
            .to_string();

        let metadata = object.get("metadata");
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        let generated = metadata
            .and_then(|m| m.get("ownerReferences"))
            .and_then(Value::as_array)
            .is_some_and(|owners| !owners.is_empty());

        Ok(Self {
            identity: ResourceRef {
                api_version,
                kind,
                name,
                namespace,
            },
            generated,
            object,
        })
    }

    pub fn identity(&self) -> &ResourceRef {
        &self.identity
    }

    /// True when a controller owns this object (e.g. a pod created by a ReplicaSet).
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Locate the pod spec of workload kinds.
    pub fn pod_spec(&self) -> Option<&Value> {
        let spec = self.object.get("spec")?;
        match self.identity.kind.as_str() {
            "Pod" => Some(spec),
            "Deployment" | "StatefulSet" | "DaemonSet" | "ReplicaSet"
            | "ReplicationController" | "Job" => spec.get("template")?.get("spec"),
            "CronJob" => spec
                .get("jobTemplate")?
                .get("spec")?
                .get("template")?
                .get("spec"),
            _ => None,
        }
    }

    /// Pod-level security context, if any.
    pub fn pod_security_context(&self) -> Option<&Value> {
        self.pod_spec()?.get("securityContext")
    }

    /// Init containers followed by regular containers.
    pub fn containers(&self) -> impl Iterator<Item = &Value> {
        let spec = self.pod_spec();
        ["initContainers", "containers"]
            .into_iter()
            .filter_map(move |key| spec.and_then(|s| s.get(key)).and_then(Value::as_array))
            .flatten()
    }
}

/// Name of a container object, empty when unset.
pub fn container_name(container: &Value) -> &str {
    container
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_identity() {
        let resource = KubeResource::from_value(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web", "namespace": "prod"}
        }))
        .unwrap();

        assert_eq!(resource.identity().kind, "Deployment");
        assert_eq!(resource.identity().name, "web");
        assert_eq!(resource.identity().namespace.as_deref(), Some("prod"));
        assert_eq!(resource.identity().to_string(), "Deployment/prod/web");
        assert!(!resource.is_generated());
    }

    #[test]
    fn test_from_value_requires_kind() {
        let err = KubeResource::from_value(json!({"apiVersion": "v1"})).unwrap_err();
        assert!(err.contains("kind"));
    }

    #[test]
    fn test_owner_references_mark_generated() {
        let resource = KubeResource::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "web-abc",
                "ownerReferences": [{"kind": "ReplicaSet", "name": "web-123"}]
            }
        }))
        .unwrap();

        assert!(resource.is_generated());
    }

    #[test]
    fn test_containers_for_cronjob() {
        let resource = KubeResource::from_value(json!({
            "apiVersion": "batch/v1",
            "kind": "CronJob",
            "metadata": {"name": "nightly"},
            "spec": {"jobTemplate": {"spec": {"template": {"spec": {
                "initContainers": [{"name": "setup"}],
                "containers": [{"name": "main"}]
            }}}}}
        }))
        .unwrap();

        let names: Vec<_> = resource.containers().map(container_name).collect();
        assert_eq!(names, vec!["setup", "main"]);
    }

    #[test]
    fn test_non_workload_has_no_containers() {
        let resource = KubeResource::from_value(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "web"},
            "spec": {"ports": []}
        }))
        .unwrap();

        assert!(resource.pod_spec().is_none());
        assert_eq!(resource.containers().count(), 0);
    }
}
