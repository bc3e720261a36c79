//! YAML manifest parsing

use serde::Deserialize;
use std::io::Read;
use tracing::debug;

use super::KubeResource;
use crate::error::ManifestError;

/// Display name used for manifests read from standard input.
pub const STDIN_NAME: &str = "<stdin>";

/// Parse a stream holding one or more `---` separated Kubernetes objects.
///
/// Empty documents are skipped. Document numbers in errors start at 1.
pub fn parse_manifest<R: Read>(reader: R) -> Result<Vec<KubeResource>, ManifestError> {
    let mut resources = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_reader(reader).enumerate() {
        let document_number = index + 1;
        let value = serde_json::Value::deserialize(document).map_err(|source| {
            ManifestError::Yaml {
                document: document_number,
                source,
            }
        })?;

        if value.is_null() {
            debug!(document = document_number, "Skipping empty document");
            continue;
        }

        let resource =
            KubeResource::from_value(value).map_err(|message| ManifestError::Object {
                document: document_number,
                message,
            })?;
        debug!(document = document_number, resource = %resource.identity(), "Parsed resource");
        resources.push(resource);
    }

    Ok(resources)
}
