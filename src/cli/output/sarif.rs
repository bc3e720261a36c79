//! SARIF output formatting for code scanning integration
//!
//! The SARIF document is always complete: every finding in the report is
//! included and the document is written in one piece.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::RenderError;
use crate::rules::results::{Finding, Report, Severity};

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

pub struct SarifOutput {
    artifact_uri: Option<String>,
}

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    default_configuration: SarifDefaultConfig,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    auditor: String,
}

#[derive(Serialize)]
struct SarifDefaultConfig {
    level: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    physical_location: Option<SarifPhysicalLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLogicalLocation {
    name: String,
    fully_qualified_name: String,
    kind: &'static str,
}

impl SarifOutput {
    /// `manifest` becomes the artifact location of every result.
    pub fn new(manifest: Option<&Path>) -> Self {
        Self {
            artifact_uri: manifest.map(|path| path.display().to_string()),
        }
    }

    fn severity_to_level(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "note",
        }
    }

    fn finding_to_result(&self, finding: &Finding) -> SarifResult {
        let physical_location = self.artifact_uri.as_ref().map(|uri| SarifPhysicalLocation {
            artifact_location: SarifArtifactLocation { uri: uri.clone() },
        });
        let logical_locations = finding
            .resource
            .iter()
            .map(|resource| SarifLogicalLocation {
                name: resource.name.clone(),
                fully_qualified_name: resource.to_string(),
                kind: "resource",
            })
            .collect();

        let mut properties = finding.metadata.clone();
        if !finding.auditor.is_empty() {
            properties.insert("Auditor".to_string(), finding.auditor.clone());
        }

        SarifResult {
            rule_id: finding.name.clone(),
            level: Self::severity_to_level(finding.severity),
            message: SarifMessage {
                text: finding.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location,
                logical_locations,
            }],
            properties,
        }
    }

    /// One rule per distinct result name, in order of first appearance.
    fn rules(report: &Report) -> Vec<SarifRule> {
        let mut rules: Vec<SarifRule> = Vec::new();
        for finding in report.findings() {
            if rules.iter().any(|rule| rule.id == finding.name) {
                continue;
            }
            rules.push(SarifRule {
                id: finding.name.clone(),
                name: finding.name.clone(),
                short_description: SarifMessage {
                    text: finding.message.clone(),
                },
                default_configuration: SarifDefaultConfig {
                    level: Self::severity_to_level(finding.severity),
                },
                properties: SarifRuleProperties {
                    auditor: finding.auditor.clone(),
                },
            });
        }
        rules
    }

    /// Encode the whole report as a pretty-printed SARIF document.
    pub fn render_document(&self, report: &Report) -> Result<String, RenderError> {
        let document = SarifReport {
            schema: SARIF_SCHEMA,
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "kubeaudit",
                        version: env!("CARGO_PKG_VERSION"),
                        information_uri: "https://github.com/Shopify/kubeaudit",
                        rules: Self::rules(report),
                    },
                },
                results: report
                    .findings()
                    .iter()
                    .map(|finding| self.finding_to_result(finding))
                    .collect(),
            }],
        };

        let mut rendered = serde_json::to_string_pretty(&document).map_err(RenderError::Sarif)?;
        rendered.push('\n');
        Ok(rendered)
    }
}
