//! Facets: named, versioned metadata fragments attached to runs and datasets.
//!
//! A facet is a self-describing payload stored under a well-known key in a
//! [`FacetMap`]: `schema`, `dataSource`, `lifecycleStateChange`,
//! `errorMessage`, `checkpoints`, `documentation`. Builders are pure: they
//! never mutate their source object and never perform I/O. A builder that
//! cannot produce a meaningful facet (for example from a schema with no
//! fields) returns `None`, and the dataset is kept without that facet.

use crate::dataset::DatasetIdentifier;
use crate::schema::Schema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Producer identifier stamped into every facet.
pub const PRODUCER: &str = concat!("tributary/", env!("CARGO_PKG_VERSION"));

/// Versioning fields carried by every facet payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetMeta {
    /// What produced this facet
    #[serde(rename = "_producer", default)]
    pub producer: String,
    /// Version tag of the facet shape
    #[serde(rename = "_schemaURL", default)]
    pub schema_url: String,
}

impl FacetMeta {
    fn versioned(facet_name: &str) -> Self {
        Self {
            producer: PRODUCER.to_string(),
            schema_url: format!("tributary:facet:{}:v1", facet_name),
        }
    }
}

/// Columnar schema of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFacet {
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Fields in declaration order
    pub fields: Vec<SchemaFacetField>,
}

/// One field of a [`SchemaFacet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFacetField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaFacet {
    /// Builds a schema facet from a columnar schema.
    ///
    /// Returns `None` for a schema with no fields: the dataset record is
    /// kept, the facet is skipped.
    pub fn from_schema(schema: &Schema) -> Option<Self> {
        if schema.is_empty() {
            return None;
        }
        let fields = schema
            .fields
            .iter()
            .map(|f| SchemaFacetField {
                name: f.name.clone(),
                field_type: f.data_type.type_name(),
                description: f.doc.clone(),
            })
            .collect();
        Some(Self {
            meta: FacetMeta::versioned("schema"),
            fields,
        })
    }
}

/// Source system a dataset lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceFacet {
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Source system namespace
    pub name: String,
    /// Connection URI, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl DataSourceFacet {
    /// Builds a datasource facet for a namespace, with an optional
    /// connection URI.
    pub fn new(namespace: &str, uri: Option<&str>) -> Self {
        Self {
            meta: FacetMeta::versioned("dataSource"),
            name: namespace.to_string(),
            uri: uri.map(str::to_string),
        }
    }
}

/// Lifecycle transition applied to a dataset by the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStateChange {
    Create,
    Alter,
    Drop,
    Overwrite,
    Rename,
    Truncate,
}

/// Records a lifecycle transition, with the prior identifier for renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStateChangeFacet {
    #[serde(flatten)]
    pub meta: FacetMeta,
    pub lifecycle_state_change: LifecycleStateChange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_identifier: Option<DatasetIdentifier>,
}

impl LifecycleStateChangeFacet {
    /// Builds a facet for a plain state change.
    pub fn new(change: LifecycleStateChange) -> Self {
        Self {
            meta: FacetMeta::versioned("lifecycleStateChange"),
            lifecycle_state_change: change,
            previous_identifier: None,
        }
    }

    /// Builds a RENAME facet carrying the identifier the dataset had before.
    pub fn renamed_from(previous: DatasetIdentifier) -> Self {
        Self {
            meta: FacetMeta::versioned("lifecycleStateChange"),
            lifecycle_state_change: LifecycleStateChange::Rename,
            previous_identifier: Some(previous),
        }
    }
}

/// Failure description attached to FAIL run events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFacet {
    #[serde(flatten)]
    pub meta: FacetMeta,
    pub message: String,
    pub stack_trace: String,
}

impl ErrorFacet {
    /// Builds an error facet from a host-reported failure, rendering the
    /// full cause chain into the trace field.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let mut trace = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push_str("\ncaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            meta: FacetMeta::versioned("errorMessage"),
            message: error.to_string(),
            stack_trace: trace,
        }
    }
}

/// Streaming checkpoint marker attached to RUNNING run events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointFacet {
    #[serde(flatten)]
    pub meta: FacetMeta,
    pub checkpoint_id: u64,
    pub timestamp: DateTime<Utc>,
}

impl CheckpointFacet {
    /// Builds a checkpoint facet.
    pub fn new(checkpoint_id: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            meta: FacetMeta::versioned("checkpoints"),
            checkpoint_id,
            timestamp,
        }
    }
}

/// Free-text description of a dataset, usually a catalog table comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationFacet {
    #[serde(flatten)]
    pub meta: FacetMeta,
    pub description: String,
}

impl DocumentationFacet {
    /// Builds a documentation facet.
    pub fn new(description: &str) -> Self {
        Self {
            meta: FacetMeta::versioned("documentation"),
            description: description.to_string(),
        }
    }
}

/// Any facet payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Facet {
    Schema(SchemaFacet),
    DataSource(DataSourceFacet),
    LifecycleStateChange(LifecycleStateChangeFacet),
    Error(ErrorFacet),
    Checkpoint(CheckpointFacet),
    Documentation(DocumentationFacet),
}

impl Facet {
    /// The canonical map key this facet is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            Facet::Schema(_) => "schema",
            Facet::DataSource(_) => "dataSource",
            Facet::LifecycleStateChange(_) => "lifecycleStateChange",
            Facet::Error(_) => "errorMessage",
            Facet::Checkpoint(_) => "checkpoints",
            Facet::Documentation(_) => "documentation",
        }
    }
}

impl From<SchemaFacet> for Facet {
    fn from(f: SchemaFacet) -> Self {
        Facet::Schema(f)
    }
}

impl From<DataSourceFacet> for Facet {
    fn from(f: DataSourceFacet) -> Self {
        Facet::DataSource(f)
    }
}

impl From<LifecycleStateChangeFacet> for Facet {
    fn from(f: LifecycleStateChangeFacet) -> Self {
        Facet::LifecycleStateChange(f)
    }
}

impl From<ErrorFacet> for Facet {
    fn from(f: ErrorFacet) -> Self {
        Facet::Error(f)
    }
}

impl From<CheckpointFacet> for Facet {
    fn from(f: CheckpointFacet) -> Self {
        Facet::Checkpoint(f)
    }
}

impl From<DocumentationFacet> for Facet {
    fn from(f: DocumentationFacet) -> Self {
        Facet::Documentation(f)
    }
}

/// Facets keyed by name.
///
/// Map semantics: inserting under an existing key replaces the previous
/// value. Iteration order is the key order, so serialized events are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetMap(BTreeMap<String, Facet>);

impl FacetMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a facet under its canonical key. Last writer wins.
    pub fn insert(&mut self, facet: impl Into<Facet>) {
        let facet = facet.into();
        self.0.insert(facet.key().to_string(), facet);
    }

    /// Inserts a facet under an explicit key.
    pub fn insert_named(&mut self, key: impl Into<String>, facet: impl Into<Facet>) {
        self.0.insert(key.into(), facet.into());
    }

    /// Looks up a facet by key.
    pub fn get(&self, key: &str) -> Option<&Facet> {
        self.0.get(key)
    }

    /// Removes every facet whose key appears in `keys`.
    pub fn strip(&mut self, keys: &[String]) {
        for key in keys {
            self.0.remove(key);
        }
    }

    /// Whether the map holds no facets.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates facets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Facet)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Field};

    fn orders_schema() -> Schema {
        Schema::new()
            .field(Field::new("id", DataType::Int64).nullable(false))
            .field(Field::new("amount", DataType::Decimal {
                precision: 10,
                scale: 2,
            }))
    }

    #[test]
    fn test_schema_facet_from_schema() {
        let facet = SchemaFacet::from_schema(&orders_schema()).unwrap();
        assert_eq!(facet.fields.len(), 2);
        assert_eq!(facet.fields[0].name, "id");
        assert_eq!(facet.fields[1].field_type, "decimal(10,2)");
        assert_eq!(facet.meta.producer, PRODUCER);
    }

    #[test]
    fn test_empty_schema_yields_no_facet() {
        assert!(SchemaFacet::from_schema(&Schema::new()).is_none());
    }

    #[test]
    fn test_error_facet_renders_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = crate::error::TributaryError::Io(io);
        let facet = ErrorFacet::from_error(&err);
        assert_eq!(facet.message, "IO error: disk gone");
        assert!(facet.stack_trace.contains("caused by: disk gone"));
    }

    #[test]
    fn test_facet_map_last_writer_wins() {
        let mut map = FacetMap::new();
        map.insert(LifecycleStateChangeFacet::new(LifecycleStateChange::Create));
        map.insert(LifecycleStateChangeFacet::new(LifecycleStateChange::Overwrite));
        assert_eq!(map.len(), 1);
        match map.get("lifecycleStateChange") {
            Some(Facet::LifecycleStateChange(f)) => {
                assert_eq!(f.lifecycle_state_change, LifecycleStateChange::Overwrite)
            }
            other => panic!("unexpected facet: {:?}", other),
        }
    }

    #[test]
    fn test_facet_serialization_shape() {
        let facet = DataSourceFacet::new("postgresql://db:5432", Some("jdbc:postgresql://db:5432"));
        let json = serde_json::to_value(&facet).unwrap();
        assert_eq!(json["name"], "postgresql://db:5432");
        assert_eq!(json["uri"], "jdbc:postgresql://db:5432");
        assert!(json["_producer"].as_str().unwrap().starts_with("tributary/"));
        assert_eq!(json["_schemaURL"], "tributary:facet:dataSource:v1");
    }

    #[test]
    fn test_lifecycle_state_serializes_screaming() {
        let facet = LifecycleStateChangeFacet::new(LifecycleStateChange::Overwrite);
        let json = serde_json::to_value(&facet).unwrap();
        assert_eq!(json["lifecycleStateChange"], "OVERWRITE");
    }

    #[test]
    fn test_strip_removes_disabled_keys() {
        let mut map = FacetMap::new();
        map.insert(SchemaFacet::from_schema(&orders_schema()).unwrap());
        map.insert(DataSourceFacet::new("file", None));
        map.strip(&["schema".to_string()]);
        assert_eq!(map.len(), 1);
        assert!(map.get("schema").is_none());
        assert!(map.get("dataSource").is_some());
    }
}
