//! Visitors over batch logical-plan nodes.
//!
//! Input visitors match the relation leaves a plan reads; output visitors
//! match the command nodes that write. Each visitor handles exactly one
//! node kind, so the set grows by adding a struct and registering it in
//! [`super::factory`].

use crate::dataset::{self, Dataset};
use crate::error::Result;
use crate::facet::{
    DataSourceFacet, DocumentationFacet, LifecycleStateChange, LifecycleStateChangeFacet,
    SchemaFacet,
};
use crate::plan::PlanNode;
use crate::visitor::{resolve_or_skip, LineageContext, Visitor};
use std::sync::Arc;
use tracing::debug;

/// Input: scan of a catalog-backed table.
pub struct CatalogRelationVisitor {
    context: Arc<LineageContext>,
}

impl CatalogRelationVisitor {
    pub fn new(context: Arc<LineageContext>) -> Self {
        Self { context }
    }
}

impl Visitor<PlanNode> for CatalogRelationVisitor {
    fn name(&self) -> &'static str {
        "catalog_relation"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::CatalogRelation { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::CatalogRelation { table, schema } = node else {
            return Ok(Vec::new());
        };
        let Some(id) = self.context.table_identifier(table) else {
            return Ok(Vec::new());
        };
        let entry = self.context.catalog().and_then(|c| c.resolve_entry(table));
        let location = entry.as_ref().and_then(|e| e.location.clone());
        let description = entry.as_ref().and_then(|e| e.description.clone());

        let mut ds = Dataset::new(id.clone())
            .with_facet_opt(SchemaFacet::from_schema(schema))
            .with_facet(DataSourceFacet::new(&id.namespace, location.as_deref()));
        if let Some(description) = description {
            ds = ds.with_facet(DocumentationFacet::new(&description));
        }
        Ok(vec![ds])
    }
}

/// Input: scan of files at a location.
pub struct FsRelationVisitor;

impl Visitor<PlanNode> for FsRelationVisitor {
    fn name(&self) -> &'static str {
        "fs_relation"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::FsRelation { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::FsRelation {
            location, schema, ..
        } = node
        else {
            return Ok(Vec::new());
        };
        let Some(id) = resolve_or_skip(location) else {
            return Ok(Vec::new());
        };
        Ok(vec![Dataset::new(id.clone())
            .with_facet_opt(SchemaFacet::from_schema(schema))
            .with_facet(DataSourceFacet::new(&id.namespace, Some(location.as_str())))])
    }
}

/// Input: scan of a table behind a JDBC connection.
pub struct JdbcRelationVisitor;

impl Visitor<PlanNode> for JdbcRelationVisitor {
    fn name(&self) -> &'static str {
        "jdbc_relation"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::JdbcRelation { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::JdbcRelation { url, table, schema } = node else {
            return Ok(Vec::new());
        };
        let id = match dataset::from_jdbc(url, table) {
            Ok(id) => id,
            Err(e) => {
                debug!(url = url.as_str(), error = %e, "unresolvable connection url, skipping");
                return Ok(Vec::new());
            }
        };
        Ok(vec![Dataset::new(id.clone())
            .with_facet_opt(SchemaFacet::from_schema(schema))
            .with_facet(DataSourceFacet::new(&id.namespace, Some(url.as_str())))])
    }
}

/// Output: write into a directory.
pub struct InsertIntoDirVisitor;

impl Visitor<PlanNode> for InsertIntoDirVisitor {
    fn name(&self) -> &'static str {
        "insert_into_dir"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::InsertIntoDir { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::InsertIntoDir {
            storage,
            overwrite,
            child,
        } = node
        else {
            return Ok(Vec::new());
        };
        // No materialized location yet, nothing to report
        let Some(location) = &storage.location else {
            return Ok(Vec::new());
        };
        let Some(id) = resolve_or_skip(location) else {
            return Ok(Vec::new());
        };

        let mut ds = Dataset::new(id.clone())
            .with_facet_opt(child.output_schema().and_then(SchemaFacet::from_schema))
            .with_facet(DataSourceFacet::new(&id.namespace, Some(location.as_str())));
        if *overwrite {
            ds = ds.with_facet(LifecycleStateChangeFacet::new(
                LifecycleStateChange::Overwrite,
            ));
        }
        Ok(vec![ds])
    }
}

/// Output: write into a catalog table.
pub struct InsertIntoTableVisitor {
    context: Arc<LineageContext>,
}

impl InsertIntoTableVisitor {
    pub fn new(context: Arc<LineageContext>) -> Self {
        Self { context }
    }
}

impl Visitor<PlanNode> for InsertIntoTableVisitor {
    fn name(&self) -> &'static str {
        "insert_into_table"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::InsertIntoTable { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::InsertIntoTable {
            table,
            overwrite,
            child,
        } = node
        else {
            return Ok(Vec::new());
        };
        let Some(id) = self.context.table_identifier(table) else {
            return Ok(Vec::new());
        };
        let entry = self.context.catalog().and_then(|c| c.resolve_entry(table));
        let location = entry.as_ref().and_then(|e| e.location.clone());

        let mut ds = Dataset::new(id.clone())
            .with_facet_opt(child.output_schema().and_then(SchemaFacet::from_schema))
            .with_facet(DataSourceFacet::new(&id.namespace, location.as_deref()));
        if *overwrite {
            ds = ds.with_facet(LifecycleStateChangeFacet::new(
                LifecycleStateChange::Overwrite,
            ));
        }
        Ok(vec![ds])
    }
}

/// Output: create a table from a query.
pub struct CreateTableAsSelectVisitor {
    context: Arc<LineageContext>,
}

impl CreateTableAsSelectVisitor {
    pub fn new(context: Arc<LineageContext>) -> Self {
        Self { context }
    }
}

impl Visitor<PlanNode> for CreateTableAsSelectVisitor {
    fn name(&self) -> &'static str {
        "create_table_as_select"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::CreateTableAsSelect { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::CreateTableAsSelect {
            table,
            schema,
            location,
            ..
        } = node
        else {
            return Ok(Vec::new());
        };
        let Some(id) = self.context.table_identifier(table) else {
            return Ok(Vec::new());
        };
        Ok(vec![Dataset::new(id.clone())
            .with_facet_opt(SchemaFacet::from_schema(schema))
            .with_facet(DataSourceFacet::new(&id.namespace, location.as_deref()))
            .with_facet(LifecycleStateChangeFacet::new(LifecycleStateChange::Create))])
    }
}

/// Output: drop a table.
pub struct DropTableVisitor {
    context: Arc<LineageContext>,
}

impl DropTableVisitor {
    pub fn new(context: Arc<LineageContext>) -> Self {
        Self { context }
    }
}

impl Visitor<PlanNode> for DropTableVisitor {
    fn name(&self) -> &'static str {
        "drop_table"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::DropTable { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::DropTable { table, .. } = node else {
            return Ok(Vec::new());
        };
        let Some(catalog) = self.context.catalog() else {
            debug!(table = %table, "no catalog to resolve drop target, skipping");
            return Ok(Vec::new());
        };
        // Target already removed from the catalog, nothing to report
        let Some(entry) = catalog.resolve_entry(table) else {
            return Ok(Vec::new());
        };

        let id = entry.dataset_identifier();
        Ok(vec![Dataset::new(id.clone())
            .with_facet(DataSourceFacet::new(&id.namespace, entry.location.as_deref()))
            .with_facet(LifecycleStateChangeFacet::new(LifecycleStateChange::Drop))])
    }
}

/// Output: rename a table.
pub struct AlterTableRenameVisitor {
    context: Arc<LineageContext>,
}

impl AlterTableRenameVisitor {
    pub fn new(context: Arc<LineageContext>) -> Self {
        Self { context }
    }
}

impl Visitor<PlanNode> for AlterTableRenameVisitor {
    fn name(&self) -> &'static str {
        "alter_table_rename"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::AlterTableRename { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::AlterTableRename { from, to } = node else {
            return Ok(Vec::new());
        };
        let Some(to_id) = self.context.table_identifier(to) else {
            return Ok(Vec::new());
        };
        let from_id = self
            .context
            .table_identifier(from)
            .unwrap_or_else(|| {
                crate::dataset::DatasetIdentifier::new(to_id.namespace.clone(), from.table.clone())
            });

        Ok(vec![Dataset::new(to_id.clone())
            .with_facet(DataSourceFacet::new(&to_id.namespace, None))
            .with_facet(LifecycleStateChangeFacet::renamed_from(from_id))])
    }
}

/// Output: truncate a table.
pub struct TruncateTableVisitor {
    context: Arc<LineageContext>,
}

impl TruncateTableVisitor {
    pub fn new(context: Arc<LineageContext>) -> Self {
        Self { context }
    }
}

impl Visitor<PlanNode> for TruncateTableVisitor {
    fn name(&self) -> &'static str {
        "truncate_table"
    }

    fn is_applicable(&self, node: &PlanNode) -> bool {
        matches!(node, PlanNode::TruncateTable { .. })
    }

    fn apply(&self, node: &PlanNode) -> Result<Vec<Dataset>> {
        let PlanNode::TruncateTable { table } = node else {
            return Ok(Vec::new());
        };
        let Some(catalog) = self.context.catalog() else {
            debug!(table = %table, "no catalog to resolve truncate target, skipping");
            return Ok(Vec::new());
        };
        let Some(entry) = catalog.resolve_entry(table) else {
            return Ok(Vec::new());
        };

        let id = entry.dataset_identifier();
        Ok(vec![Dataset::new(id.clone())
            .with_facet(DataSourceFacet::new(&id.namespace, entry.location.as_deref()))
            .with_facet(LifecycleStateChangeFacet::new(
                LifecycleStateChange::Truncate,
            ))])
    }
}
