//! Container image auditor
//!
//! Flags images pulled without a pinned tag. When configured with a required
//! image, containers using that image name must also use its exact tag.

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::SetupError;
use crate::k8s::{container_name, KubeResource};
use crate::rules::engine::Auditable;
use crate::rules::results::{Finding, Severity};

pub const NAME: &str = "image";

lazy_static! {
    // name[:tag][@digest]; a registry port is part of the name because the
    // tag cannot contain '/'.
    static ref IMAGE_REFERENCE: Regex = Regex::new(
        r"^(?P<name>[^@\s]+?)(?::(?P<tag>[\w][\w.-]{0,127}))?(?:@(?P<digest>[A-Za-z0-9_+.-]+:[A-Fa-f0-9]+))?$"
    )
    .expect("image reference pattern is valid");
}

/// Parsed container image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub name: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(image: &str) -> Option<Self> {
        let captures = IMAGE_REFERENCE.captures(image)?;
        Some(Self {
            name: captures["name"].to_string(),
            tag: captures.name("tag").map(|m| m.as_str().to_string()),
            digest: captures
                .name("digest")
                .map(|m| m.as_str().to_string()),
        })
    }
}

/// Audits container image tags.
#[derive(Debug, Default)]
pub struct ImageAuditor {
    required: Option<ImageReference>,
}

impl ImageAuditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `image` (`name:tag`) for every container using that image name.
    pub fn with_required_image(image: &str) -> Result<Self, SetupError> {
        let invalid = |message: &str| SetupError::InvalidAuditorConfig {
            auditor: NAME.to_string(),
            message: format!("{message}: '{image}'"),
        };

        let Some(required) = ImageReference::parse(image) else {
            return Err(invalid("invalid image"));
        };
        if required.tag.is_none() {
            return Err(invalid("required image must include a tag"));
        }

        Ok(Self {
            required: Some(required),
        })
    }

    fn audit_container(&self, container: &Value) -> Option<Finding> {
        let image = container
            .get("image")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let container = container_name(container);

        let Some(reference) = ImageReference::parse(image) else {
            return Some(
                Finding::new(
                    "ImageInvalid",
                    Severity::Error,
                    format!("Image '{image}' is not a valid image reference."),
                )
                .with_metadata("Container", container),
            );
        };

        if let Some(required) = &self.required {
            if required.name == reference.name {
                let finding = if required.tag == reference.tag {
                    Finding::new("ImageCorrect", Severity::Info, "Image tag is correct.")
                } else {
                    Finding::new(
                        "ImageTagIncorrect",
                        Severity::Error,
                        format!(
                            "Container tag is incorrect. It should be set to '{}'.",
                            required.tag.as_deref().unwrap_or_default()
                        ),
                    )
                };
                return Some(
                    finding
                        .with_metadata("Container", container)
                        .with_metadata("Image", image),
                );
            }
        }

        let finding = match reference.tag.as_deref() {
            None if reference.digest.is_some() => return None,
            None => Finding::new(
                "ImageTagMissing",
                Severity::Warning,
                "Image tag is missing.",
            ),
            Some("latest") => Finding::new(
                "ImageLatestTag",
                Severity::Warning,
                "Image tag is 'latest'. A fixed tag should be used instead.",
            ),
            Some(_) => return None,
        };
        Some(
            finding
                .with_metadata("Container", container)
                .with_metadata("Image", image),
        )
    }
}

impl Auditable for ImageAuditor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn audit(&self, resource: &KubeResource) -> Result<Vec<Finding>> {
        Ok(resource
            .containers()
            .filter_map(|container| self.audit_container(container))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::categories::testing::pod_with_container;
    use serde_json::json;

    fn audit(auditor: &ImageAuditor, image: &str) -> Vec<Finding> {
        auditor
            .audit(&pod_with_container(json!({"name": "app", "image": image})))
            .unwrap()
    }

    #[test]
    fn test_parse_image_reference() {
        let reference = ImageReference::parse("registry.example.com:5000/team/app:1.2.3").unwrap();
        assert_eq!(reference.name, "registry.example.com:5000/team/app");
        assert_eq!(reference.tag.as_deref(), Some("1.2.3"));

        let reference = ImageReference::parse("registry.example.com:5000/team/app").unwrap();
        assert_eq!(reference.name, "registry.example.com:5000/team/app");
        assert!(reference.tag.is_none());

        let reference = ImageReference::parse("nginx@sha256:abcdef0123").unwrap();
        assert_eq!(reference.name, "nginx");
        assert_eq!(reference.digest.as_deref(), Some("sha256:abcdef0123"));

        assert!(ImageReference::parse("").is_none());
    }

    #[test]
    fn test_missing_and_latest_tags() {
        let auditor = ImageAuditor::new();

        let findings = audit(&auditor, "nginx");
        assert_eq!(findings[0].name, "ImageTagMissing");
        assert_eq!(findings[0].severity, Severity::Warning);

        assert_eq!(audit(&auditor, "nginx:latest")[0].name, "ImageLatestTag");
        assert!(audit(&auditor, "nginx:1.25").is_empty());
        assert!(audit(&auditor, "nginx@sha256:abcdef0123").is_empty());
    }

    #[test]
    fn test_required_image() {
        let auditor = ImageAuditor::with_required_image("nginx:1.25").unwrap();

        let findings = audit(&auditor, "nginx:1.24");
        assert_eq!(findings[0].name, "ImageTagIncorrect");
        assert_eq!(findings[0].severity, Severity::Error);

        let findings = audit(&auditor, "nginx:1.25");
        assert_eq!(findings[0].name, "ImageCorrect");
        assert_eq!(findings[0].severity, Severity::Info);

        // Other images still get the tag checks.
        assert_eq!(audit(&auditor, "redis")[0].name, "ImageTagMissing");
    }

    #[test]
    fn test_required_image_needs_tag() {
        let err = ImageAuditor::with_required_image("nginx").unwrap_err();
        assert!(matches!(err, SetupError::InvalidAuditorConfig { .. }));
    }

    #[test]
    fn test_missing_image_is_invalid() {
        let findings = ImageAuditor::new()
            .audit(&pod_with_container(json!({"name": "app"})))
            .unwrap();
        assert_eq!(findings[0].name, "ImageInvalid");
    }
}
