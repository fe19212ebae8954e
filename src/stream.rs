//! Streaming transformation DAG.
//!
//! A streaming job is a finite DAG of [`Transformation`] values referencing
//! each other by id, the way the host wires operators together. Lineage
//! extraction does not walk the DAG directly: [`sink_lineages`] first
//! reduces it to one [`SinkLineage`] per sink (the sink paired with every
//! source transitively upstream of it) and visitors then run over those
//! pairings.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One node of a streaming transformation DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformation {
    /// Kafka consumer source
    KafkaSource {
        id: usize,
        topics: Vec<String>,
        bootstrap_servers: String,
        schema: Schema,
    },
    /// File-monitoring source
    FileSource {
        id: usize,
        path: String,
        format: Option<String>,
        schema: Schema,
    },
    /// Single-input operator (map, filter, window, ...)
    OneInput { id: usize, name: String, input: usize },
    /// Two-input operator (join, connect)
    TwoInput {
        id: usize,
        name: String,
        left: usize,
        right: usize,
    },
    /// Union of several upstreams
    Union { id: usize, inputs: Vec<usize> },
    /// Kafka producer sink
    KafkaSink {
        id: usize,
        topic: String,
        bootstrap_servers: String,
        input: usize,
        schema: Schema,
    },
    /// File-writing sink
    FileSink {
        id: usize,
        path: String,
        format: Option<String>,
        input: usize,
    },
}

impl Transformation {
    /// This transformation's id.
    pub fn id(&self) -> usize {
        match self {
            Transformation::KafkaSource { id, .. }
            | Transformation::FileSource { id, .. }
            | Transformation::OneInput { id, .. }
            | Transformation::TwoInput { id, .. }
            | Transformation::Union { id, .. }
            | Transformation::KafkaSink { id, .. }
            | Transformation::FileSink { id, .. } => *id,
        }
    }

    /// Ids of direct upstream transformations.
    pub fn input_ids(&self) -> Vec<usize> {
        match self {
            Transformation::KafkaSource { .. } | Transformation::FileSource { .. } => Vec::new(),
            Transformation::OneInput { input, .. }
            | Transformation::KafkaSink { input, .. }
            | Transformation::FileSink { input, .. } => vec![*input],
            Transformation::TwoInput { left, right, .. } => vec![*left, *right],
            Transformation::Union { inputs, .. } => inputs.clone(),
        }
    }

    /// Whether this transformation writes out of the job.
    pub fn is_sink(&self) -> bool {
        matches!(
            self,
            Transformation::KafkaSink { .. } | Transformation::FileSink { .. }
        )
    }

    /// Whether this transformation reads into the job.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            Transformation::KafkaSource { .. } | Transformation::FileSource { .. }
        )
    }
}

/// A sink paired with every source upstream of it.
#[derive(Debug)]
pub struct SinkLineage<'a> {
    /// The sink transformation
    pub sink: &'a Transformation,
    /// Sources feeding the sink, in upstream-walk order
    pub sources: Vec<&'a Transformation>,
}

/// Reduces a transformation DAG to one [`SinkLineage`] per sink.
///
/// The upstream walk is depth-first over input ids, deduplicated so diamond
/// topologies contribute each source once. A dangling input id is skipped
/// with a warning; extraction proceeds over what is reachable.
pub fn sink_lineages(transformations: &[Transformation]) -> Vec<SinkLineage<'_>> {
    let by_id: HashMap<usize, &Transformation> =
        transformations.iter().map(|t| (t.id(), t)).collect();

    transformations
        .iter()
        .filter(|t| t.is_sink())
        .map(|sink| SinkLineage {
            sink,
            sources: upstream_sources(sink, &by_id),
        })
        .collect()
}

fn upstream_sources<'a>(
    sink: &'a Transformation,
    by_id: &HashMap<usize, &'a Transformation>,
) -> Vec<&'a Transformation> {
    let mut sources = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut stack: Vec<usize> = sink.input_ids();
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = by_id.get(&id) else {
            warn!(input = id, sink = sink.id(), "dangling transformation input, skipping");
            continue;
        };
        if node.is_source() {
            sources.push(*node);
        }
        let mut inputs = node.input_ids();
        inputs.reverse();
        stack.extend(inputs);
    }
    sources
}
