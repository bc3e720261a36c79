//! kubeaudit Library
//!
//! This crate audits Kubernetes workloads for common security controls. One
//! run initializes a set of auditors, resolves a single source (a manifest,
//! the cluster it runs in, or a cluster reached through a kubeconfig),
//! audits it and renders the findings.

pub mod cli;
pub mod config;
pub mod error;
pub mod k8s;
pub mod rules;
pub mod source;

pub use error::KubeauditError;
