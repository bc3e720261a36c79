//! Live cluster access
//!
//! Builds a Kubernetes client either from the in-cluster service account or
//! from a kubeconfig file, then lists the workload kinds the auditors inspect.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Pod, ReplicationController};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

use super::KubeResource;
use crate::error::{AuditError, SourceError};

/// Scoping options forwarded to the resource listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Namespace to list from; `None` lists every namespace.
    pub namespace: Option<String>,
    /// Keep resources owned by a controller.
    pub include_generated: bool,
}

/// Detects whether the process runs inside a Kubernetes pod.
pub trait ClusterProbe {
    fn running_in_cluster(&self) -> bool;
}

/// Probe backed by the in-cluster service account configuration.
pub struct InClusterProbe;

impl ClusterProbe for InClusterProbe {
    fn running_in_cluster(&self) -> bool {
        Config::incluster().is_ok()
    }
}

/// Source of live resources for cluster and local audits.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list_resources(&self, options: &ClientOptions)
        -> Result<Vec<KubeResource>, AuditError>;
}

/// [`ResourceLister`] talking to a real API server.
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    /// Connect using the pod's service account.
    pub fn in_cluster() -> Result<Self, SourceError> {
        install_crypto_provider();
        let config = Config::incluster().map_err(|e| SourceError::InCluster(e.to_string()))?;
        let client = Client::try_from(config)?;
        info!("Connected to cluster using in-cluster configuration");
        Ok(Self { client })
    }

    /// Connect through a kubeconfig file.
    ///
    /// Without a path the default location (or `$KUBECONFIG`) is used. Without
    /// a context the kubeconfig's current context is used.
    pub async fn from_kubeconfig(
        path: Option<&Path>,
        context: Option<&str>,
    ) -> Result<Self, SourceError> {
        install_crypto_provider();
        let kubeconfig = match path {
            Some(path) => Kubeconfig::read_from(path)?,
            None => Kubeconfig::read()?,
        };
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options).await?;
        let client = Client::try_from(config)?;
        info!(
            kubeconfig = ?path,
            context = context.unwrap_or("<current>"),
            "Connected to cluster using kubeconfig"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list_resources(
        &self,
        options: &ClientOptions,
    ) -> Result<Vec<KubeResource>, AuditError> {
        let namespace = options.namespace.as_deref();
        let mut resources = Vec::new();

        resources.extend(list_kind::<Pod>(&self.client, namespace).await?);
        resources.extend(list_kind::<ReplicationController>(&self.client, namespace).await?);
        resources.extend(list_kind::<Deployment>(&self.client, namespace).await?);
        resources.extend(list_kind::<StatefulSet>(&self.client, namespace).await?);
        resources.extend(list_kind::<DaemonSet>(&self.client, namespace).await?);
        resources.extend(list_kind::<ReplicaSet>(&self.client, namespace).await?);
        resources.extend(list_kind::<Job>(&self.client, namespace).await?);
        resources.extend(list_kind::<CronJob>(&self.client, namespace).await?);

        Ok(filter_generated(resources, options.include_generated))
    }
}

/// Drop controller-owned resources unless asked to keep them.
pub fn filter_generated(
    mut resources: Vec<KubeResource>,
    include_generated: bool,
) -> Vec<KubeResource> {
    if include_generated {
        return resources;
    }
    let total = resources.len();
    resources.retain(|r| !r.is_generated());
    let skipped = total - resources.len();
    debug!(skipped, "Filtered generated resources");
    resources
}

async fn list_kind<K>(
    client: &Client,
    namespace: Option<&str>,
) -> Result<Vec<KubeResource>, AuditError>
where
    K: kube::Resource<Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug,
    K::DynamicType: Default,
{
    let dynamic_type = K::DynamicType::default();
    let kind = K::kind(&dynamic_type).to_string();
    let api_version = K::api_version(&dynamic_type).to_string();

    let api: Api<K> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(|source| AuditError::List {
            kind: kind.clone(),
            source,
        })?;
    debug!(kind = %kind, count = list.items.len(), "Listed resources");

    list.items
        .iter()
        .map(|item| {
            let mut value = serde_json::to_value(item).map_err(|e| AuditError::Decode {
                kind: kind.clone(),
                message: e.to_string(),
            })?;
            // List items come back without type metadata.
            if let Some(object) = value.as_object_mut() {
                object
                    .entry("apiVersion")
                    .or_insert_with(|| api_version.clone().into());
                object.entry("kind").or_insert_with(|| kind.clone().into());
            }
            KubeResource::from_value(value).map_err(|message| AuditError::Decode {
                kind: kind.clone(),
                message,
            })
        })
        .collect()
}

fn install_crypto_provider() {
    // Fails only when a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod(name: &str, owned: bool) -> KubeResource {
        let mut metadata = json!({"name": name});
        if owned {
            metadata["ownerReferences"] = json!([{"kind": "ReplicaSet", "name": "rs"}]);
        }
        KubeResource::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": metadata
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_generated_drops_owned_resources() {
        let resources = vec![pod("standalone", false), pod("owned", true)];
        let kept = filter_generated(resources, false);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identity().name, "standalone");
    }

    #[test]
    fn test_filter_generated_keeps_everything_when_included() {
        let resources = vec![pod("standalone", false), pod("owned", true)];
        assert_eq!(filter_generated(resources, true).len(), 2);
    }

    #[test]
    fn test_client_options_default_is_all_namespaces() {
        let options = ClientOptions::default();
        assert!(options.namespace.is_none());
        assert!(!options.include_generated);
    }
}
