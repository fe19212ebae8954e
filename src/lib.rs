//! Tributary - dataset lineage extraction for data-processing jobs.
//!
//! Tributary inspects a job's execution graph (a logical-plan tree for
//! batch/SQL jobs, a transformation DAG for streaming jobs) and derives
//! the datasets the job reads and writes, with descriptive facets attached.
//! At each lifecycle point the host reports, it assembles a structured run
//! event and hands it to a pluggable emitter.
//!
//! # Features
//!
//! - **Canonical identifiers**: paths, URIs, catalog references, topics and
//!   connection URLs all reduce to one `(namespace, name)` scheme.
//! - **Visitor engine**: one matcher per node/operator kind, registered in
//!   a fixed order so extraction is deterministic and new kinds are added
//!   independently.
//! - **Typed facets**: schema, datasource, lifecycle state change, error,
//!   checkpoint and documentation fragments, versioned and composable.
//! - **Lifecycle state machine**: host-driven callbacks for submit,
//!   checkpoint, completion and failure; out-of-order callbacks are ignored.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Tributary                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Lifecycle: ExecutionContext | JobContext | phase machine   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Extraction: Visitor Set | Factory | Dispatch               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Identity: DatasetIdentifier | Catalog | Facet Builders     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Emission: EventEmitter | Channel | Tracing | Collecting    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tributary::config::LineageConfig;
//! use tributary::context::{BatchExecutionContext, ExecutionContext};
//! use tributary::emit::CollectingEmitter;
//! use tributary::plan::{PlanNode, StorageDescriptor};
//! use tributary::run::Job;
//! use tributary::schema::{DataType, Field, Schema};
//! use tributary::visitor::LineageContext;
//! use uuid::Uuid;
//!
//! let plan = PlanNode::InsertIntoDir {
//!     storage: StorageDescriptor::at("file:///out/result"),
//!     overwrite: false,
//!     child: Box::new(PlanNode::FsRelation {
//!         location: "file:///in/raw".to_string(),
//!         format: Some("parquet".to_string()),
//!         schema: Schema::new().field(Field::new("id", DataType::Int64)),
//!     }),
//! };
//!
//! let context = Arc::new(LineageContext::new(
//!     LineageConfig::default(),
//!     Job::from_display_name("pipelines", "DailyOrdersLoad"),
//!     Uuid::new_v4(),
//! ));
//! let emitter = Arc::new(CollectingEmitter::new());
//! let job = BatchExecutionContext::new(context, plan, emitter.clone());
//!
//! job.on_submitted();
//! assert_eq!(emitter.events().len(), 1);
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod dataset;
pub mod emit;
pub mod error;
pub mod facet;
pub mod job;
pub mod plan;
pub mod run;
pub mod schema;
pub mod stream;
pub mod visitor;

pub use catalog::{CatalogProvider, CatalogTable, TableName};
pub use context::{BatchExecutionContext, ExecutionContext, JobContext, StreamExecutionContext};
pub use dataset::{Dataset, DatasetIdentifier};
pub use emit::EventEmitter;
pub use error::{Result, TributaryError};
pub use run::{Job, Run, RunEvent, RunState};
pub use visitor::{LineageContext, Visitor};
