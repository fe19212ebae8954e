//! Visitor registration.
//!
//! Visitors are registered in fixed, explicit lists rather than discovered
//! at runtime, so dispatch order, and with it the ordering of extracted
//! datasets, is deterministic and testable. Adding support for a new node
//! kind means adding its visitor to the right list here.

use crate::plan::PlanNode;
use crate::stream::Transformation;
use crate::visitor::batch::{
    AlterTableRenameVisitor, CatalogRelationVisitor, CreateTableAsSelectVisitor,
    DropTableVisitor, FsRelationVisitor, InsertIntoDirVisitor, InsertIntoTableVisitor,
    JdbcRelationVisitor, TruncateTableVisitor,
};
use crate::visitor::streaming::{
    FileSinkVisitor, FileSourceVisitor, KafkaSinkVisitor, KafkaSourceVisitor,
};
use crate::visitor::{LineageContext, Visitor};
use std::sync::Arc;

/// Input visitors for batch plans, in registration order.
pub fn batch_input_visitors(context: &Arc<LineageContext>) -> Vec<Box<dyn Visitor<PlanNode>>> {
    vec![
        Box::new(CatalogRelationVisitor::new(Arc::clone(context))),
        Box::new(FsRelationVisitor),
        Box::new(JdbcRelationVisitor),
    ]
}

/// Output visitors for batch plans, in registration order.
pub fn batch_output_visitors(context: &Arc<LineageContext>) -> Vec<Box<dyn Visitor<PlanNode>>> {
    vec![
        Box::new(InsertIntoDirVisitor),
        Box::new(InsertIntoTableVisitor::new(Arc::clone(context))),
        Box::new(CreateTableAsSelectVisitor::new(Arc::clone(context))),
        Box::new(DropTableVisitor::new(Arc::clone(context))),
        Box::new(AlterTableRenameVisitor::new(Arc::clone(context))),
        Box::new(TruncateTableVisitor::new(Arc::clone(context))),
    ]
}

/// Input visitors for streaming graphs, in registration order.
pub fn stream_input_visitors(
    _context: &Arc<LineageContext>,
) -> Vec<Box<dyn Visitor<Transformation>>> {
    vec![Box::new(KafkaSourceVisitor), Box::new(FileSourceVisitor)]
}

/// Output visitors for streaming graphs, in registration order.
pub fn stream_output_visitors(
    _context: &Arc<LineageContext>,
) -> Vec<Box<dyn Visitor<Transformation>>> {
    vec![Box::new(KafkaSinkVisitor), Box::new(FileSinkVisitor)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineageConfig;
    use crate::run::Job;
    use uuid::Uuid;

    fn context() -> Arc<LineageContext> {
        Arc::new(LineageContext::new(
            LineageConfig::default(),
            Job::new("pipelines", "test_job"),
            Uuid::new_v4(),
        ))
    }

    #[test]
    fn test_registration_order_is_stable() {
        let ctx = context();
        let names: Vec<&str> = batch_output_visitors(&ctx).iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec![
                "insert_into_dir",
                "insert_into_table",
                "create_table_as_select",
                "drop_table",
                "alter_table_rename",
                "truncate_table",
            ]
        );

        let names: Vec<&str> = stream_input_visitors(&ctx).iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["kafka_source", "file_source"]);
    }
}
