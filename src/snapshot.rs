//! Loads metadata dumps and turns them into snapshots of the public surface.
//!
//! A metadata reader (outside this crate) writes one [`SnapshotDocument`] per
//! library version. [`TypeProvider::list_public_types`] then selects the
//! publicly visible, non-compiler-generated types the engine compares.

use crate::model::{Accessibility, AssemblyName, SNAPSHOT_SCHEMA_VERSION, TypeDescriptor};
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Source of the public types of one library version.
pub trait TypeProvider {
    fn list_public_types(&self) -> Vec<TypeDescriptor>;
}

/// One assembly of a metadata dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssemblyEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

/// A serialized metadata dump of one package version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub assemblies: Vec<AssemblyEntry>,
}

fn default_schema_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

impl SnapshotDocument {
    /// Parses a JSON or YAML document.
    pub fn from_content(content: &str) -> anyhow::Result<Self> {
        let document: SnapshotDocument = if content.trim_start().starts_with('{') {
            serde_json::from_str(content).context("Failed to parse JSON snapshot document")?
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML snapshot document")?
        };

        if document.schema_version > SNAPSHOT_SCHEMA_VERSION {
            bail!(
                "Unsupported snapshot schema version {} (supported up to {})",
                document.schema_version,
                SNAPSHOT_SCHEMA_VERSION
            );
        }
        Ok(document)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
        Self::from_content(&content).with_context(|| format!("Invalid snapshot '{}'", path.display()))
    }
}

impl TypeProvider for SnapshotDocument {
    fn list_public_types(&self) -> Vec<TypeDescriptor> {
        let mut types = Vec::new();

        for assembly in &self.assemblies {
            for t in &assembly.types {
                if t.visibility != Accessibility::Public || t.is_compiler_generated() {
                    debug!(type_name = %t.full_name(), "skipping non-public type");
                    continue;
                }
                let mut t = t.clone();
                if t.assembly.name.is_empty() {
                    t.assembly = AssemblyName {
                        name: assembly.name.clone(),
                        version: assembly.version.clone(),
                        public_key_token: None,
                    };
                }
                types.push(t);
            }
        }

        types
    }
}

/// The public surface of one package version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiSnapshot {
    pub package_id: String,
    pub version: String,
    pub types: Vec<TypeDescriptor>,
}

impl ApiSnapshot {
    pub fn new(package_id: impl Into<String>, version: impl Into<String>, types: Vec<TypeDescriptor>) -> Self {
        Self {
            package_id: package_id.into(),
            version: version.into(),
            types,
        }
    }

    /// Takes the public types of any provider.
    pub fn from_provider(
        package_id: impl Into<String>,
        version: impl Into<String>,
        provider: &dyn TypeProvider,
    ) -> Self {
        Self::new(package_id, version, provider.list_public_types())
    }

    pub fn from_document(document: &SnapshotDocument) -> Self {
        Self::from_provider(document.package_id.clone(), document.version.clone(), document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
package_id: Contoso.Widgets
version: 1.2.0
assemblies:
  - name: Contoso.Widgets
    version: 1.2.0.0
    types:
      - namespace: Contoso.Widgets
        name: Widget
        members:
          - kind: property
            name: Title
            member_type: { kind: named, namespace: System, name: String, assembly: { name: System.Runtime } }
      - namespace: Contoso.Widgets
        name: WidgetCache
        visibility: internal
      - namespace: Contoso.Widgets
        name: "<>c__DisplayClass1_0"
"#;

    #[test]
    fn test_yaml_document_lists_public_types() {
        let document = SnapshotDocument::from_content(DOC).unwrap();
        let types = document.list_public_types();

        assert_eq!(types.len(), 1);
        assert_eq!(types[0].full_name(), "Contoso.Widgets.Widget");
        assert_eq!(types[0].assembly.name, "Contoso.Widgets");
        assert_eq!(types[0].assembly.version.as_deref(), Some("1.2.0.0"));
        assert_eq!(types[0].members.len(), 1);
    }

    #[test]
    fn test_json_document() {
        let json = r#"{"package_id":"P","version":"1.0","assemblies":[{"name":"P","types":[{"name":"T"}]}]}"#;
        let snapshot = ApiSnapshot::from_document(&SnapshotDocument::from_content(json).unwrap());
        assert_eq!(snapshot.package_id, "P");
        assert_eq!(snapshot.types[0].full_name(), "T");
    }

    #[test]
    fn test_future_schema_is_rejected() {
        let err = SnapshotDocument::from_content(r#"{"schema_version": 99}"#).unwrap_err();
        assert!(err.to_string().contains("Unsupported snapshot schema version"));
    }

    #[test]
    fn test_malformed_document() {
        assert!(SnapshotDocument::from_content("{ not json").is_err());
    }
}
