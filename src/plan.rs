//! Batch logical-plan representation.
//!
//! A job's plan is a finite tree of [`PlanNode`] values: leaf relations the
//! job reads, command nodes that write, and structural nodes in between.
//! The tree is opaque to the orchestrator: only visitors give meaning to
//! individual node kinds, so new kinds can be added without touching
//! dispatch. Traversal is deterministic pre-order, which keeps extracted
//! dataset ordering reproducible.

use crate::catalog::TableName;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Storage description attached to directory-writing commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    /// Target location; absent when the host has not materialized one
    pub location: Option<String>,
    /// Storage format, e.g. `parquet`
    pub format: Option<String>,
}

impl StorageDescriptor {
    /// Creates a descriptor with a known location.
    pub fn at(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            format: None,
        }
    }

    /// Sets the format.
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }
}

/// One node of a batch logical plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanNode {
    /// Scan of a catalog-backed table
    CatalogRelation { table: TableName, schema: Schema },
    /// Scan of files at a location
    FsRelation {
        location: String,
        format: Option<String>,
        schema: Schema,
    },
    /// Scan of a table behind a JDBC connection
    JdbcRelation {
        url: String,
        table: String,
        schema: Schema,
    },
    /// Write into a directory
    InsertIntoDir {
        storage: StorageDescriptor,
        overwrite: bool,
        child: Box<PlanNode>,
    },
    /// Write into a catalog table
    InsertIntoTable {
        table: TableName,
        overwrite: bool,
        child: Box<PlanNode>,
    },
    /// Create a table from a query
    CreateTableAsSelect {
        table: TableName,
        schema: Schema,
        location: Option<String>,
        child: Box<PlanNode>,
    },
    /// Drop a table
    DropTable { table: TableName, if_exists: bool },
    /// Rename a table
    AlterTableRename { from: TableName, to: TableName },
    /// Truncate a table
    TruncateTable { table: TableName },
    /// Column projection
    Project { child: Box<PlanNode> },
    /// Row filter
    Filter { condition: String, child: Box<PlanNode> },
    /// Two-sided join
    Join {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
    },
    /// Aggregation
    Aggregate { child: Box<PlanNode> },
    /// Union of several children
    Union { children: Vec<PlanNode> },
    /// A node kind the extraction does not understand; never matched
    Opaque { kind: String },
}

impl PlanNode {
    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::InsertIntoDir { child, .. }
            | PlanNode::InsertIntoTable { child, .. }
            | PlanNode::CreateTableAsSelect { child, .. }
            | PlanNode::Project { child }
            | PlanNode::Filter { child, .. }
            | PlanNode::Aggregate { child } => vec![child],
            PlanNode::Join { left, right } => vec![left, right],
            PlanNode::Union { children } => children.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// The columnar schema this node produces, when one is derivable
    /// without evaluating the plan.
    pub fn output_schema(&self) -> Option<&Schema> {
        match self {
            PlanNode::CatalogRelation { schema, .. }
            | PlanNode::FsRelation { schema, .. }
            | PlanNode::JdbcRelation { schema, .. }
            | PlanNode::CreateTableAsSelect { schema, .. } => Some(schema),
            PlanNode::Project { child }
            | PlanNode::Filter { child, .. }
            | PlanNode::Aggregate { child } => child.output_schema(),
            _ => None,
        }
    }

    /// Deterministic pre-order traversal of the subtree rooted here.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

/// Pre-order plan iterator.
pub struct Iter<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children = node.children();
        for child in children.into_iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Field};

    fn scan(table: &str) -> PlanNode {
        PlanNode::CatalogRelation {
            table: TableName::parse(table),
            schema: Schema::new().field(Field::new("id", DataType::Int64)),
        }
    }

    #[test]
    fn test_preorder_traversal() {
        let plan = PlanNode::InsertIntoDir {
            storage: StorageDescriptor::at("file:///out"),
            overwrite: false,
            child: Box::new(PlanNode::Join {
                left: Box::new(scan("db.a")),
                right: Box::new(PlanNode::Filter {
                    condition: "id > 0".to_string(),
                    child: Box::new(scan("db.b")),
                }),
            }),
        };

        let kinds: Vec<&str> = plan
            .iter()
            .map(|n| match n {
                PlanNode::InsertIntoDir { .. } => "insert",
                PlanNode::Join { .. } => "join",
                PlanNode::CatalogRelation { table, .. } => {
                    if table.table == "a" {
                        "scan_a"
                    } else {
                        "scan_b"
                    }
                }
                PlanNode::Filter { .. } => "filter",
                _ => "other",
            })
            .collect();

        assert_eq!(kinds, vec!["insert", "join", "scan_a", "filter", "scan_b"]);
    }

    #[test]
    fn test_output_schema_passes_through_structural_nodes() {
        let plan = PlanNode::Project {
            child: Box::new(PlanNode::Filter {
                condition: "true".to_string(),
                child: Box::new(scan("db.a")),
            }),
        };
        let schema = plan.output_schema().unwrap();
        assert_eq!(schema.fields[0].name, "id");
    }

    #[test]
    fn test_commands_have_no_output_schema() {
        let plan = PlanNode::DropTable {
            table: TableName::parse("db.tmp"),
            if_exists: true,
        };
        assert!(plan.output_schema().is_none());
    }
}
