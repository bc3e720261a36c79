//! Kubernetes resources, manifest parsing and cluster access

pub mod cluster;
pub mod manifest;
mod resource;

pub use cluster::{ClientOptions, ClusterProbe, InClusterProbe, KubeLister, ResourceLister};
pub use resource::{container_name, KubeResource, ResourceRef};
