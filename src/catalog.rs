// Read-only catalog access for table-backed datasets

use crate::dataset::DatasetIdentifier;
use crate::schema::Schema;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A possibly-qualified table reference as it appears in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    /// Database/catalog qualifier, absent for bare references
    pub database: Option<String>,
    /// Table name
    pub table: String,
}

impl TableName {
    /// Creates a qualified reference.
    pub fn qualified(database: &str, table: &str) -> Self {
        Self {
            database: Some(database.to_string()),
            table: table.to_string(),
        }
    }

    /// Creates a bare reference, resolved through the catalog later.
    pub fn bare(table: &str) -> Self {
        Self {
            database: None,
            table: table.to_string(),
        }
    }

    /// Parses `db.orders` into a qualified reference, `orders` into a bare
    /// one. Multi-part qualifiers keep everything before the last dot as
    /// the database.
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once('.') {
            Some((database, table)) => Self::qualified(database, table),
            None => Self::bare(raw),
        }
    }

    /// Renders the reference back to dotted form.
    pub fn to_qualified_string(&self) -> String {
        match &self.database {
            Some(db) => format!("{}.{}", db, self.table),
            None => self.table.clone(),
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_qualified_string())
    }
}

/// A catalog entry for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTable {
    /// Owning database
    pub database: String,
    /// Table name
    pub table: String,
    /// Physical storage location, when the table is path-backed
    pub location: Option<String>,
    /// Table schema
    pub schema: Schema,
    /// Table comment
    pub description: Option<String>,
}

impl CatalogTable {
    /// Creates an entry with no location, schema, or description.
    pub fn new(database: &str, table: &str) -> Self {
        Self {
            database: database.to_string(),
            table: table.to_string(),
            location: None,
            schema: Schema::new(),
            description: None,
        }
    }

    /// Sets the storage location.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Sets the schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the table comment.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Canonical identifier: namespace from the database, name from the
    /// table.
    pub fn dataset_identifier(&self) -> DatasetIdentifier {
        DatasetIdentifier::new(self.database.clone(), self.table.clone())
    }
}

/// Read-only lookup into the host's table catalog.
///
/// Implementations must be safe to share across runs; the core only ever
/// queries, never writes.
pub trait CatalogProvider: Send + Sync {
    /// Resolves a table reference to its catalog entry, `None` when the
    /// table does not exist at inspection time.
    fn resolve_entry(&self, name: &TableName) -> Option<CatalogTable>;
}

/// In-memory catalog for embedding and tests.
pub struct MemoryCatalog {
    tables: RwLock<HashMap<String, CatalogTable>>,
    default_database: String,
}

impl MemoryCatalog {
    /// Creates an empty catalog with `default` as the unqualified-lookup
    /// database.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            default_database: "default".to_string(),
        }
    }

    /// Creates an empty catalog with an explicit default database.
    pub fn with_default_database(database: &str) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            default_database: database.to_string(),
        }
    }

    /// Registers a table.
    pub fn register(&self, table: CatalogTable) {
        let key = format!("{}.{}", table.database, table.table);
        self.tables.write().insert(key, table);
    }

    /// Removes a table, returning whether it existed.
    pub fn deregister(&self, name: &TableName) -> bool {
        let key = self.lookup_key(name);
        self.tables.write().remove(&key).is_some()
    }

    fn lookup_key(&self, name: &TableName) -> String {
        match &name.database {
            Some(db) => format!("{}.{}", db, name.table),
            None => format!("{}.{}", self.default_database, name.table),
        }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogProvider for MemoryCatalog {
    fn resolve_entry(&self, name: &TableName) -> Option<CatalogTable> {
        self.tables.read().get(&self.lookup_key(name)).cloned()
    }
}
