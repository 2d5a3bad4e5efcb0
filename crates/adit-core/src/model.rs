//! Serde models for catalog documents
//!
//! Records fetched from the metadata repository are posted back after
//! modification, so every model preserves fields the core does not
//! interpret via a flattened `extra` map. Resolved relations ride along
//! under the repository's `_resolved` convention.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reference to another document, optionally resolved inline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct ResolvedRef<T> {
    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(rename = "_resolved", default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<T>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> ResolvedRef<T> {
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            resolved: None,
            extra: Map::new(),
        }
    }
}

/// The repository a record belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub repo_code: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One level of a record's ancestry chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ancestor {
    #[serde(rename = "ref")]
    pub reference: String,

    pub level: String,

    #[serde(rename = "_resolved", default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<AncestorDetail>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resolved fields of an ancestor record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,

    /// Sole public identifier of a collection-level record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_0: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One reference to a digital file, keyed by URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileVersion {
    pub file_uri: String,

    #[serde(default)]
    pub publish: bool,

    #[serde(default)]
    pub is_representative: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileVersion {
    pub fn new(file_uri: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            publish: false,
            is_representative: false,
            extra: Map::new(),
        }
    }

    pub fn published(mut self) -> Self {
        self.publish = true;
        self
    }

    pub fn representative(mut self) -> Self {
        self.is_representative = true;
        self
    }
}

/// A record linking a catalog record to its digital file representations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    pub digital_object_id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_object_type: Option<String>,

    #[serde(default)]
    pub publish: bool,

    #[serde(default)]
    pub file_versions: Vec<FileVersion>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An instance attached to a catalog record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub instance_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_object: Option<ResolvedRef<DigitalObject>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Instance {
    /// An unresolved digital-object instance pointing at `uri`
    pub fn digital_object_ref(uri: impl Into<String>) -> Self {
        Self {
            instance_type: "digital_object".to_string(),
            digital_object: Some(ResolvedRef::unresolved(uri)),
            extra: Map::new(),
        }
    }
}

/// An archival object as fetched from the metadata repository
///
/// Fetched fresh on every resolution; never cached across batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub uri: String,

    #[serde(default)]
    pub component_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub display_string: String,

    #[serde(default)]
    pub level: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<ResolvedRef<RepositoryInfo>>,

    #[serde(default)]
    pub ancestors: Vec<Ancestor>,

    #[serde(default)]
    pub instances: Vec<Instance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogRecord {
    /// Title to label derived documents with: the record's own title,
    /// falling back to its display string.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.display_string)
    }

    /// Digital-object instances linked to this record
    pub fn digital_object_links(&self) -> impl Iterator<Item = &ResolvedRef<DigitalObject>> {
        self.instances
            .iter()
            .filter_map(|instance| instance.digital_object.as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_round_trip_preserves_unknown_fields() {
        let raw = json!({
            "uri": "/repositories/2/archival_objects/99",
            "component_id": "item-1",
            "title": "Letters",
            "display_string": "Letters, 1901",
            "level": "file",
            "lock_version": 7,
            "jsonmodel_type": "archival_object",
            "instances": [],
            "ancestors": []
        });

        let record: CatalogRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.component_id, "item-1");
        assert_eq!(record.extra["lock_version"], 7);

        let round_tripped = serde_json::to_value(&record).unwrap();
        assert_eq!(round_tripped["lock_version"], raw["lock_version"]);
        assert_eq!(round_tripped["jsonmodel_type"], raw["jsonmodel_type"]);
    }

    #[test]
    fn test_digital_object_instance_shape() {
        let instance = Instance::digital_object_ref("/repositories/2/digital_objects/5");
        let value = serde_json::to_value(&instance).unwrap();

        assert_eq!(value["instance_type"], "digital_object");
        assert_eq!(
            value["digital_object"]["ref"],
            "/repositories/2/digital_objects/5"
        );
        assert!(value["digital_object"].get("_resolved").is_none());
    }

    #[test]
    fn test_file_version_defaults() {
        let version: FileVersion =
            serde_json::from_value(json!({"file_uri": "https://example.org/a.tif"})).unwrap();
        assert!(!version.publish);
        assert!(!version.is_representative);

        let built = FileVersion::new("https://example.org/b.tif")
            .published()
            .representative();
        assert!(built.publish);
        assert!(built.is_representative);
    }

    #[test]
    fn test_display_title_fallback() {
        let record: CatalogRecord = serde_json::from_value(json!({
            "uri": "/repositories/2/archival_objects/1",
            "display_string": "Untitled item, 1950",
            "level": "item"
        }))
        .unwrap();
        assert_eq!(record.display_title(), "Untitled item, 1950");
    }
}
