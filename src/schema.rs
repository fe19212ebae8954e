// Columnar schema carried by plan nodes and stream connectors

use serde::{Deserialize, Serialize};

/// Columnar schema of a relation, connector, or created table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Fields/columns in declaration order
    pub fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Whether the schema carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single field/column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is nullable
    pub nullable: bool,
    /// Description
    pub doc: Option<String>,
}

impl Field {
    /// Creates a new nullable field
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            nullable: true,
            doc: None,
        }
    }

    /// Sets nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets documentation
    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }
}

/// Data type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Boolean
    Boolean,
    /// 32-bit integer
    Int32,
    /// 64-bit integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Decimal with precision and scale
    Decimal { precision: u8, scale: u8 },
    /// String
    String,
    /// Binary data
    Binary,
    /// Date
    Date,
    /// Timestamp
    Timestamp,
    /// Array of elements
    Array { element: Box<DataType> },
    /// Map/dictionary
    Map { key: Box<DataType>, value: Box<DataType> },
    /// Struct/record
    Struct { fields: Vec<Field> },
}

impl DataType {
    /// Renders the type the way it appears in a schema facet.
    pub fn type_name(&self) -> String {
        match self {
            DataType::Boolean => "boolean".to_string(),
            DataType::Int32 => "int32".to_string(),
            DataType::Int64 => "int64".to_string(),
            DataType::Float32 => "float32".to_string(),
            DataType::Float64 => "float64".to_string(),
            DataType::Decimal { precision, scale } => {
                format!("decimal({},{})", precision, scale)
            }
            DataType::String => "string".to_string(),
            DataType::Binary => "binary".to_string(),
            DataType::Date => "date".to_string(),
            DataType::Timestamp => "timestamp".to_string(),
            DataType::Array { element } => format!("array<{}>", element.type_name()),
            DataType::Map { key, value } => {
                format!("map<{},{}>", key.type_name(), value.type_name())
            }
            DataType::Struct { fields } => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.data_type.type_name()))
                    .collect();
                format!("struct<{}>", inner.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(DataType::Int64.type_name(), "int64");
        assert_eq!(
            DataType::Decimal {
                precision: 10,
                scale: 2
            }
            .type_name(),
            "decimal(10,2)"
        );
        let nested = DataType::Array {
            element: Box::new(DataType::Struct {
                fields: vec![Field::new("id", DataType::Int32)],
            }),
        };
        assert_eq!(nested.type_name(), "array<struct<id:int32>>");
    }

    #[test]
    fn test_schema_builder() {
        let schema = Schema::new()
            .field(Field::new("id", DataType::Int64).nullable(false))
            .field(Field::new("name", DataType::String).doc("customer name"));
        assert_eq!(schema.fields.len(), 2);
        assert!(!schema.fields[0].nullable);
        assert_eq!(schema.fields[1].doc.as_deref(), Some("customer name"));
    }
}
