//! Visitors over streaming transformations.
//!
//! Streaming visitors match connector endpoints: sources on the input side,
//! sinks on the output side. Intermediate operators carry no dataset
//! information and are never matched.

use crate::dataset::{self, Dataset};
use crate::error::Result;
use crate::facet::{DataSourceFacet, SchemaFacet};
use crate::stream::Transformation;
use crate::visitor::{resolve_or_skip, Visitor};

/// Input: Kafka consumer source, one dataset per subscribed topic.
pub struct KafkaSourceVisitor;

impl Visitor<Transformation> for KafkaSourceVisitor {
    fn name(&self) -> &'static str {
        "kafka_source"
    }

    fn is_applicable(&self, node: &Transformation) -> bool {
        matches!(node, Transformation::KafkaSource { .. })
    }

    fn apply(&self, node: &Transformation) -> Result<Vec<Dataset>> {
        let Transformation::KafkaSource {
            topics,
            bootstrap_servers,
            schema,
            ..
        } = node
        else {
            return Ok(Vec::new());
        };
        Ok(topics
            .iter()
            .map(|topic| {
                let id = dataset::from_kafka(bootstrap_servers, topic);
                Dataset::new(id.clone())
                    .with_facet_opt(SchemaFacet::from_schema(schema))
                    .with_facet(DataSourceFacet::new(&id.namespace, None))
            })
            .collect())
    }
}

/// Input: file-monitoring source.
pub struct FileSourceVisitor;

impl Visitor<Transformation> for FileSourceVisitor {
    fn name(&self) -> &'static str {
        "file_source"
    }

    fn is_applicable(&self, node: &Transformation) -> bool {
        matches!(node, Transformation::FileSource { .. })
    }

    fn apply(&self, node: &Transformation) -> Result<Vec<Dataset>> {
        let Transformation::FileSource { path, schema, .. } = node else {
            return Ok(Vec::new());
        };
        let Some(id) = resolve_or_skip(path) else {
            return Ok(Vec::new());
        };
        Ok(vec![Dataset::new(id.clone())
            .with_facet_opt(SchemaFacet::from_schema(schema))
            .with_facet(DataSourceFacet::new(&id.namespace, Some(path.as_str())))])
    }
}

/// Output: Kafka producer sink.
pub struct KafkaSinkVisitor;

impl Visitor<Transformation> for KafkaSinkVisitor {
    fn name(&self) -> &'static str {
        "kafka_sink"
    }

    fn is_applicable(&self, node: &Transformation) -> bool {
        matches!(node, Transformation::KafkaSink { .. })
    }

    fn apply(&self, node: &Transformation) -> Result<Vec<Dataset>> {
        let Transformation::KafkaSink {
            topic,
            bootstrap_servers,
            schema,
            ..
        } = node
        else {
            return Ok(Vec::new());
        };
        let id = dataset::from_kafka(bootstrap_servers, topic);
        Ok(vec![Dataset::new(id.clone())
            .with_facet_opt(SchemaFacet::from_schema(schema))
            .with_facet(DataSourceFacet::new(&id.namespace, None))])
    }
}

/// Output: file-writing sink.
pub struct FileSinkVisitor;

impl Visitor<Transformation> for FileSinkVisitor {
    fn name(&self) -> &'static str {
        "file_sink"
    }

    fn is_applicable(&self, node: &Transformation) -> bool {
        matches!(node, Transformation::FileSink { .. })
    }

    fn apply(&self, node: &Transformation) -> Result<Vec<Dataset>> {
        let Transformation::FileSink { path, .. } = node else {
            return Ok(Vec::new());
        };
        let Some(id) = resolve_or_skip(path) else {
            return Ok(Vec::new());
        };
        Ok(vec![Dataset::new(id.clone())
            .with_facet(DataSourceFacet::new(&id.namespace, Some(path.as_str())))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Field, Schema};

    #[test]
    fn test_kafka_source_yields_one_dataset_per_topic() {
        let node = Transformation::KafkaSource {
            id: 1,
            topics: vec!["clicks".to_string(), "views".to_string()],
            bootstrap_servers: "broker:9092".to_string(),
            schema: Schema::new().field(Field::new("ts", DataType::Timestamp)),
        };
        let datasets = KafkaSourceVisitor.apply(&node).unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].namespace, "kafka://broker:9092");
        assert_eq!(datasets[0].name, "clicks");
        assert_eq!(datasets[1].name, "views");
        assert!(datasets[0].facets.get("schema").is_some());
    }

    #[test]
    fn test_file_sink_resolves_path() {
        let node = Transformation::FileSink {
            id: 1,
            path: "s3://bucket/out/".to_string(),
            format: Some("parquet".to_string()),
            input: 0,
        };
        let datasets = FileSinkVisitor.apply(&node).unwrap();
        assert_eq!(datasets[0].namespace, "s3://bucket");
        assert_eq!(datasets[0].name, "/out");
    }

    #[test]
    fn test_unresolvable_sink_path_is_skipped() {
        let node = Transformation::FileSink {
            id: 1,
            path: "relative/out".to_string(),
            format: None,
            input: 0,
        };
        assert!(FileSinkVisitor.apply(&node).unwrap().is_empty());
    }

    #[test]
    fn test_operators_are_never_matched() {
        let op = Transformation::OneInput {
            id: 7,
            name: "window".to_string(),
            input: 1,
        };
        assert!(!KafkaSourceVisitor.is_applicable(&op));
        assert!(!FileSourceVisitor.is_applicable(&op));
        assert!(!KafkaSinkVisitor.is_applicable(&op));
        assert!(!FileSinkVisitor.is_applicable(&op));
    }
}
