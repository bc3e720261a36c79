//! Auditor configuration loader

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::SetupError;

/// Configuration for the default auditor catalog.
///
/// ```yaml
/// enabledAuditors:
///   image: false
/// auditors:
///   image:
///     image: "nginx:1.25"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditorsConfig {
    /// Per-auditor switch; auditors not listed are enabled
    #[serde(default)]
    pub enabled_auditors: BTreeMap<String, bool>,

    /// Per-auditor settings
    #[serde(default)]
    pub auditors: AuditorSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditorSettings {
    #[serde(default)]
    pub image: ImageConfig,
}

/// Settings for the image auditor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image (`name:tag`) every matching container must use
    #[serde(default)]
    pub image: Option<String>,
}

impl AuditorsConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, SetupError> {
        let content = fs::read_to_string(path).map_err(|source| SetupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| SetupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Check whether an auditor is switched on
    pub fn is_enabled(&self, auditor: &str) -> bool {
        self.enabled_auditors.get(auditor).copied().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_enables_everything() {
        let config = AuditorsConfig::default();
        assert!(config.is_enabled("privileged"));
        assert!(config.is_enabled("anything"));
    }

    #[test]
    fn test_from_yaml() {
        let config = AuditorsConfig::from_yaml(
            "enabledAuditors:\n  image: false\nauditors:\n  image:\n    image: \"nginx:1.25\"\n",
        )
        .unwrap();

        assert!(!config.is_enabled("image"));
        assert!(config.is_enabled("privileged"));
        assert_eq!(config.auditors.image.image.as_deref(), Some("nginx:1.25"));
    }

    #[test]
    fn test_from_empty_yaml() {
        let config = AuditorsConfig::from_yaml("  \n").unwrap();
        assert_eq!(config, AuditorsConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "enabledAuditors:\n  rootfs: false").unwrap();

        let config = AuditorsConfig::load_from_file(file.path()).unwrap();
        assert!(!config.is_enabled("rootfs"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AuditorsConfig::load_from_file(Path::new("/nonexistent/kubeaudit.yaml"))
            .unwrap_err();
        assert!(matches!(err, SetupError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "enabledAuditors: [not, a, map]").unwrap();

        let err = AuditorsConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, SetupError::ConfigParse { .. }));
    }
}
