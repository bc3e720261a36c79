//! Terminal output formatting with colors

use colored::{ColoredString, Colorize};

use super::ReportRenderer;
use crate::error::RenderError;
use crate::k8s::ResourceRef;
use crate::rules::results::{Finding, Severity};

pub struct TerminalOutput {
    color: bool,
}

impl TerminalOutput {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: ColoredString) -> ColoredString {
        if self.color {
            text
        } else {
            text.clear()
        }
    }

    fn format_severity(&self, severity: Severity) -> ColoredString {
        let label = format!("[{severity}]");
        self.paint(match severity {
            Severity::Error => label.red().bold(),
            Severity::Warning => label.yellow().bold(),
            Severity::Info => label.blue().bold(),
        })
    }

    fn format_resource_header(&self, resource: Option<&ResourceRef>) -> String {
        let mut output = format!(
            "\n{}\n\n",
            self.paint("---------------- Results for ---------------".cyan())
        );

        match resource {
            Some(resource) => {
                output.push_str(&format!("  apiVersion: {}\n", resource.api_version));
                output.push_str(&format!("  kind: {}\n", resource.kind));
                output.push_str("  metadata:\n");
                output.push_str(&format!("    name: {}\n", resource.name));
                if let Some(namespace) = &resource.namespace {
                    output.push_str(&format!("    namespace: {namespace}\n"));
                }
            }
            None => output.push_str("  <unknown resource>\n"),
        }

        output.push_str(&format!(
            "\n{}\n\n",
            self.paint("--------------------------------------------".cyan())
        ));
        output
    }

    fn format_finding(&self, finding: &Finding) -> String {
        let mut output = format!(
            "-- {} {}\n",
            self.format_severity(finding.severity),
            self.paint(finding.name.bold())
        );
        output.push_str(&format!("   Message: {}\n", finding.message));

        if !finding.metadata.is_empty() {
            output.push_str("   Metadata:\n");
            for (key, value) in &finding.metadata {
                output.push_str(&format!("      {key}: {value}\n"));
            }
        }

        output.push('\n');
        output
    }
}

impl ReportRenderer for TerminalOutput {
    fn render_report(&self, findings: &[&Finding]) -> Result<String, RenderError> {
        if findings.is_empty() {
            return Ok(format!(
                "{}\n",
                self.paint("All checks completed. 0 high-risk vulnerabilities found".green())
            ));
        }

        // Group by resource, keeping the order in which resources first appear.
        let mut groups: Vec<(Option<&ResourceRef>, Vec<&Finding>)> = Vec::new();
        for &finding in findings {
            let resource = finding.resource.as_ref();
            match groups.iter_mut().find(|(r, _)| *r == resource) {
                Some((_, group)) => group.push(finding),
                None => groups.push((resource, vec![finding])),
            }
        }

        let mut output = String::new();
        for (resource, group) in groups {
            output.push_str(&self.format_resource_header(resource));
            for finding in group {
                output.push_str(&self.format_finding(finding));
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resource(name: &str) -> ResourceRef {
        ResourceRef {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            name: name.to_string(),
            namespace: Some("prod".to_string()),
        }
    }

    #[test]
    fn test_format_finding_without_color() {
        let output = TerminalOutput::new(false);
        let finding = Finding::new("PrivilegedTrue", Severity::Error, "Privileged is true")
            .with_metadata("Container", "app");

        assert_eq!(
            output.format_finding(&finding),
            "-- [error] PrivilegedTrue\n   Message: Privileged is true\n   Metadata:\n      Container: app\n\n"
        );
    }

    #[test]
    fn test_format_resource_header() {
        let output = TerminalOutput::new(false);
        let header = output.format_resource_header(Some(&resource("web")));
        assert!(header.contains("  kind: Deployment\n"));
        assert!(header.contains("    name: web\n"));
        assert!(header.contains("    namespace: prod\n"));
    }

    #[test]
    fn test_findings_grouped_by_resource() {
        let output = TerminalOutput::new(false);
        let findings = [
            Finding::new("A1", Severity::Error, "a1").with_resource(resource("a")),
            Finding::new("B1", Severity::Error, "b1").with_resource(resource("b")),
            Finding::new("A2", Severity::Warning, "a2").with_resource(resource("a")),
        ];
        let refs: Vec<&Finding> = findings.iter().collect();

        let rendered = output.render_report(&refs).unwrap();
        assert_eq!(rendered.matches("Results for").count(), 2);

        let a1 = rendered.find("A1").unwrap();
        let a2 = rendered.find("A2").unwrap();
        let b1 = rendered.find("B1").unwrap();
        assert!(a1 < a2 && a2 < b1);
    }

    #[test]
    fn test_empty_report() {
        let output = TerminalOutput::new(false);
        let rendered = output.render_report(&[]).unwrap();
        assert!(rendered.contains("All checks completed"));
    }
}
