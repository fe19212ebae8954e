//! Dataset records and canonical identifier resolution.
//!
//! Every location a job reads or writes, whether a filesystem path, a URI,
//! a catalog table, a Kafka topic, or a JDBC table, is reduced to one canonical
//! `(namespace, name)` pair before it appears in a lineage event. Resolution
//! is pure: the same raw descriptor always yields the same identifier, and
//! two descriptors for the same physical location (an absolute path and its
//! `file://` URI) yield the same identifier.
//!
//! A descriptor that lacks enough information to produce a namespace fails
//! with [`TributaryError::UnresolvableLocation`]; callers treat that as
//! "skip this dataset", never as fatal.

use crate::error::{Result, TributaryError};
use crate::facet::{Facet, FacetMap};
use serde::{Deserialize, Serialize};

/// Canonical `(namespace, name)` identifier for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetIdentifier {
    /// Source system namespace, e.g. `file`, `hdfs://namenode:8020`, `db`
    pub namespace: String,
    /// Name within the namespace, e.g. `/out/result`, `orders`
    pub name: String,
}

impl DatasetIdentifier {
    /// Creates an identifier from already-canonical parts.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for DatasetIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Resolves a raw location descriptor (URI or absolute path) into a
/// canonical identifier.
///
/// - `scheme://authority/path` becomes namespace `scheme://authority`,
///   name `/path`; an empty authority collapses the namespace to the bare
///   scheme, so `file:///out` and `/out` resolve identically.
/// - Trailing path separators are trimmed; the root path stays `/`.
/// - Relative paths and empty descriptors are unresolvable.
pub fn resolve_location(raw: &str) -> Result<DatasetIdentifier> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TributaryError::UnresolvableLocation(
            "empty location descriptor".to_string(),
        ));
    }

    if let Some((scheme, rest)) = raw.split_once("://") {
        if scheme.is_empty() {
            return Err(TributaryError::UnresolvableLocation(format!(
                "missing scheme: {}",
                raw
            )));
        }
        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let namespace = if authority.is_empty() {
            scheme.to_string()
        } else {
            format!("{}://{}", scheme, authority)
        };
        Ok(DatasetIdentifier::new(namespace, normalize_path(path)))
    } else if raw.starts_with('/') {
        // Bare absolute path, same physical location as a file:// URI
        Ok(DatasetIdentifier::new("file", normalize_path(raw)))
    } else {
        Err(TributaryError::UnresolvableLocation(format!(
            "relative path has no anchor: {}",
            raw
        )))
    }
}

/// Builds an identifier for a Kafka topic.
///
/// The namespace is derived from the first bootstrap server so that all
/// topics of one cluster share a namespace.
pub fn from_kafka(bootstrap_servers: &str, topic: &str) -> DatasetIdentifier {
    let first = bootstrap_servers
        .split(',')
        .next()
        .unwrap_or(bootstrap_servers)
        .trim();
    let namespace = if first.is_empty() {
        "kafka".to_string()
    } else {
        format!("kafka://{}", first)
    };
    DatasetIdentifier::new(namespace, topic)
}

/// Builds an identifier for a table behind a JDBC connection URL.
///
/// `jdbc:postgresql://db.prod:5432/sales` with table `orders` resolves to
/// namespace `postgresql://db.prod:5432`, name `orders`.
pub fn from_jdbc(url: &str, table: &str) -> Result<DatasetIdentifier> {
    let trimmed = url.trim().strip_prefix("jdbc:").unwrap_or(url.trim());
    let (scheme, rest) = trimmed.split_once("://").ok_or_else(|| {
        TributaryError::UnresolvableLocation(format!("not a connection url: {}", url))
    })?;
    let authority = rest.split(['/', '?']).next().unwrap_or("");
    if scheme.is_empty() || authority.is_empty() {
        return Err(TributaryError::UnresolvableLocation(format!(
            "connection url missing authority: {}",
            url
        )));
    }
    Ok(DatasetIdentifier::new(
        format!("{}://{}", scheme, authority),
        table,
    ))
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A dataset read or written by a run.
///
/// Role (input vs output) is positional: it is determined by which list of
/// the run event the dataset appears in. Built fresh per event, never
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Source system namespace
    pub namespace: String,
    /// Name within the namespace
    pub name: String,
    /// Attached facets, keyed by facet name
    #[serde(default, skip_serializing_if = "FacetMap::is_empty")]
    pub facets: FacetMap,
}

impl Dataset {
    /// Creates a dataset from a resolved identifier, with no facets.
    pub fn new(id: DatasetIdentifier) -> Self {
        Self {
            namespace: id.namespace,
            name: id.name,
            facets: FacetMap::new(),
        }
    }

    /// Attaches a facet under its canonical key.
    pub fn with_facet(mut self, facet: impl Into<Facet>) -> Self {
        self.facets.insert(facet);
        self
    }

    /// Attaches a facet if present.
    pub fn with_facet_opt<F: Into<Facet>>(mut self, facet: Option<F>) -> Self {
        if let Some(facet) = facet {
            self.facets.insert(facet);
        }
        self
    }

    /// The canonical identifier of this dataset.
    pub fn identifier(&self) -> DatasetIdentifier {
        DatasetIdentifier::new(self.namespace.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_resolution() {
        let id = resolve_location("hdfs://namenode:8020/warehouse/orders").unwrap();
        assert_eq!(id.namespace, "hdfs://namenode:8020");
        assert_eq!(id.name, "/warehouse/orders");
    }

    #[test]
    fn test_path_and_file_uri_agree() {
        let from_path = resolve_location("/out/result").unwrap();
        let from_uri = resolve_location("file:///out/result").unwrap();
        assert_eq!(from_path, from_uri);
        assert_eq!(from_path.namespace, "file");
        assert_eq!(from_path.name, "/out/result");
    }

    #[test]
    fn test_trailing_separator_normalized() {
        let a = resolve_location("s3://bucket/raw/events/").unwrap();
        let b = resolve_location("s3://bucket/raw/events").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "/raw/events");
    }

    #[test]
    fn test_root_path_stays_root() {
        let id = resolve_location("hdfs://nn:8020/").unwrap();
        assert_eq!(id.name, "/");
        let bare = resolve_location("s3://bucket").unwrap();
        assert_eq!(bare.name, "/");
        assert_eq!(bare.namespace, "s3://bucket");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let first = resolve_location("file:///data/in").unwrap();
        let second = resolve_location("file:///data/in").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unresolvable_locations() {
        assert!(resolve_location("").is_err());
        assert!(resolve_location("relative/path").is_err());
        assert!(resolve_location("://host/path").is_err());
        let err = resolve_location("relative/path").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_kafka_identifier() {
        let id = from_kafka("broker1:9092,broker2:9092", "clicks");
        assert_eq!(id.namespace, "kafka://broker1:9092");
        assert_eq!(id.name, "clicks");
    }

    #[test]
    fn test_jdbc_identifier() {
        let id = from_jdbc("jdbc:postgresql://db.prod:5432/sales", "orders").unwrap();
        assert_eq!(id.namespace, "postgresql://db.prod:5432");
        assert_eq!(id.name, "orders");

        assert!(from_jdbc("not-a-url", "orders").is_err());
    }
}
