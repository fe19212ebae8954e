//! The plan/transformation visitor engine.
//!
//! A visitor is a matcher for one node/operator kind: `is_applicable` is a
//! cheap shape test safe to call on every node, `apply` produces the
//! datasets that node contributes. Whether those datasets are inputs or
//! outputs of the run is fixed by which factory list the visitor is
//! registered in (see [`factory`]).
//!
//! [`extract`] is the dispatcher and the error boundary: it runs every
//! visitor over every node, keeps matches, flattens the results preserving
//! visitor-registration order then node-traversal order, and converts a
//! failing visitor into a logged skip so one malformed node never prevents
//! lineage for a whole run.

pub mod batch;
pub mod factory;
pub mod streaming;

use crate::catalog::{CatalogProvider, TableName};
use crate::config::LineageConfig;
use crate::dataset::{self, Dataset, DatasetIdentifier};
use crate::error::Result;
use crate::run::Job;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Shared read-only context for one run.
///
/// Constructed once per run, never mutated, shared into every visitor the
/// factories build. Safe to use from concurrent extraction calls.
pub struct LineageContext {
    /// Deployment configuration
    pub config: LineageConfig,
    /// Job identity stamped on every event of the run
    pub job: Job,
    /// Run identifier
    pub run_id: Uuid,
    catalog: Option<Arc<dyn CatalogProvider>>,
}

impl LineageContext {
    /// Creates a context without catalog access.
    pub fn new(config: LineageConfig, job: Job, run_id: Uuid) -> Self {
        Self {
            config,
            job,
            run_id,
            catalog: None,
        }
    }

    /// Attaches a catalog lookup capability.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// The catalog, when one was provided.
    pub fn catalog(&self) -> Option<&dyn CatalogProvider> {
        self.catalog.as_deref()
    }

    /// Resolves a table reference to a canonical identifier.
    ///
    /// Qualified references resolve directly; bare references go through
    /// the catalog. `None` means the reference cannot be anchored; the
    /// caller skips the dataset.
    pub fn table_identifier(&self, table: &TableName) -> Option<DatasetIdentifier> {
        if let Some(database) = &table.database {
            return Some(DatasetIdentifier::new(database.clone(), table.table.clone()));
        }
        match self.catalog() {
            Some(catalog) => catalog
                .resolve_entry(table)
                .map(|entry| entry.dataset_identifier()),
            None => {
                debug!(table = %table, "bare table reference without catalog, skipping");
                None
            }
        }
    }
}

/// Resolves a raw location, logging and returning `None` when it cannot be
/// anchored. Visitors use this so an unresolvable location skips one
/// dataset instead of failing the node.
pub(crate) fn resolve_or_skip(raw: &str) -> Option<DatasetIdentifier> {
    match dataset::resolve_location(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(location = raw, error = %e, "unresolvable location, skipping dataset");
            None
        }
    }
}

/// A matcher for one node/operator kind.
///
/// Applicability is a shape test, not a value test: it is total, cheap, and
/// never contradicts `apply`. `apply` is idempotent and side-effect-free
/// beyond constructing the returned datasets.
pub trait Visitor<N>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this visitor understands the node kind.
    fn is_applicable(&self, node: &N) -> bool;

    /// Extracts datasets from an applicable node. An absent optional field
    /// or missing catalog entry yields `Ok` with an empty vec.
    fn apply(&self, node: &N) -> Result<Vec<Dataset>>;
}

/// Runs every visitor over every node and flattens the matches.
///
/// Ordering is visitor-registration order, then node-traversal order, so
/// the result is deterministic for a fixed graph snapshot and visitor set.
pub fn extract<N>(visitors: &[Box<dyn Visitor<N>>], nodes: &[&N]) -> Vec<Dataset> {
    let mut datasets = Vec::new();
    for visitor in visitors {
        for node in nodes {
            if !visitor.is_applicable(node) {
                continue;
            }
            match visitor.apply(node) {
                Ok(mut found) => datasets.append(&mut found),
                Err(e) => {
                    warn!(visitor = visitor.name(), error = %e, "visitor failed, skipping node");
                }
            }
        }
    }
    datasets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TributaryError;

    struct Evens;
    struct Odds;
    struct Broken;

    impl Visitor<u32> for Evens {
        fn name(&self) -> &'static str {
            "evens"
        }
        fn is_applicable(&self, node: &u32) -> bool {
            node % 2 == 0
        }
        fn apply(&self, node: &u32) -> Result<Vec<Dataset>> {
            Ok(vec![Dataset::new(DatasetIdentifier::new(
                "even",
                node.to_string(),
            ))])
        }
    }

    impl Visitor<u32> for Odds {
        fn name(&self) -> &'static str {
            "odds"
        }
        fn is_applicable(&self, node: &u32) -> bool {
            node % 2 == 1
        }
        fn apply(&self, node: &u32) -> Result<Vec<Dataset>> {
            Ok(vec![Dataset::new(DatasetIdentifier::new(
                "odd",
                node.to_string(),
            ))])
        }
    }

    impl Visitor<u32> for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn is_applicable(&self, _node: &u32) -> bool {
            true
        }
        fn apply(&self, _node: &u32) -> Result<Vec<Dataset>> {
            Err(TributaryError::MalformedSchema("boom".into()))
        }
    }

    #[test]
    fn test_extract_preserves_visitor_then_node_order() {
        let visitors: Vec<Box<dyn Visitor<u32>>> = vec![Box::new(Evens), Box::new(Odds)];
        let nodes: Vec<u32> = vec![1, 2, 3, 4];
        let refs: Vec<&u32> = nodes.iter().collect();

        let names: Vec<String> = extract(&visitors, &refs)
            .into_iter()
            .map(|d| format!("{}:{}", d.namespace, d.name))
            .collect();

        // All even matches first (registration order), each in node order.
        assert_eq!(names, vec!["even:2", "even:4", "odd:1", "odd:3"]);
    }

    #[test]
    fn test_failing_visitor_is_skipped_not_fatal() {
        let visitors: Vec<Box<dyn Visitor<u32>>> = vec![Box::new(Broken), Box::new(Evens)];
        let nodes: Vec<u32> = vec![2];
        let refs: Vec<&u32> = nodes.iter().collect();

        let datasets = extract(&visitors, &refs);
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].namespace, "even");
    }

    #[test]
    fn test_extract_is_deterministic() {
        let visitors: Vec<Box<dyn Visitor<u32>>> = vec![Box::new(Evens), Box::new(Odds)];
        let nodes: Vec<u32> = vec![5, 6, 7];
        let refs: Vec<&u32> = nodes.iter().collect();

        assert_eq!(extract(&visitors, &refs), extract(&visitors, &refs));
    }
}
