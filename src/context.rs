//! Per-run orchestration.
//!
//! A [`JobContext`] owns one run: its identity, its graph snapshot, and the
//! emitter. The host drives it exclusively through lifecycle callbacks;
//! the core never polls host state. Phases form an explicit state machine:
//!
//! ```text
//! Submitted --> Running --> Completed
//!      \           |   \
//!       \          |    --> Failed
//!        ----------+-------^
//!            (checkpoints only while Running)
//! ```
//!
//! An out-of-order callback is logged and ignored; nothing is emitted for
//! it. Everything below [`JobContext::build_event`] converts extraction
//! problems into omitted datasets or facets, so a malformed node never
//! costs a run its lineage.

use crate::dataset::Dataset;
use crate::emit::EventEmitter;
use crate::facet::{CheckpointFacet, ErrorFacet, FacetMap};
use crate::plan::PlanNode;
use crate::run::{Run, RunEvent, RunState};
use crate::stream::{self, Transformation};
use crate::visitor::{self, factory, LineageContext};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Submitted,
    Running,
    Completed,
    Failed,
}

/// Host-reported execution result handed to `on_completed`.
#[derive(Debug, Clone, Default)]
pub struct JobResult {
    /// Wall-clock runtime, when the host tracked it
    pub runtime: Option<Duration>,
}

/// Lifecycle callbacks fired by the host, at most once per phase, in phase
/// order.
pub trait ExecutionContext: Send + Sync {
    /// The job was submitted; extract the static graph and emit START.
    fn on_submitted(&self);

    /// A streaming checkpoint completed; emit a RUNNING event carrying the
    /// checkpoint facet.
    fn on_checkpoint(&self, facet: CheckpointFacet);

    /// The job finished; emit COMPLETE with final dataset state.
    fn on_completed(&self, result: &JobResult);

    /// The job failed; emit FAIL with an error facet.
    fn on_failed(&self, error: &dyn std::error::Error);
}

/// A graph snapshot lineage can be extracted from.
pub trait LineageGraph: Send + Sync {
    /// Extracts `(inputs, outputs)` from the snapshot.
    fn extract_datasets(&self, context: &Arc<LineageContext>) -> (Vec<Dataset>, Vec<Dataset>);
}

impl LineageGraph for PlanNode {
    fn extract_datasets(&self, context: &Arc<LineageContext>) -> (Vec<Dataset>, Vec<Dataset>) {
        let nodes: Vec<&PlanNode> = self.iter().collect();
        let inputs = visitor::extract(&factory::batch_input_visitors(context), &nodes);
        let outputs = visitor::extract(&factory::batch_output_visitors(context), &nodes);
        (inputs, outputs)
    }
}

impl LineageGraph for Vec<Transformation> {
    fn extract_datasets(&self, context: &Arc<LineageContext>) -> (Vec<Dataset>, Vec<Dataset>) {
        let input_visitors = factory::stream_input_visitors(context);
        let output_visitors = factory::stream_output_visitors(context);

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for lineage in stream::sink_lineages(self) {
            inputs.extend(visitor::extract(&input_visitors, &lineage.sources));
            outputs.extend(visitor::extract(&output_visitors, &[lineage.sink]));
        }
        (inputs, outputs)
    }
}

/// Per-run orchestrator over a batch plan.
pub type BatchExecutionContext = JobContext<PlanNode>;

/// Per-run orchestrator over a streaming transformation DAG.
pub type StreamExecutionContext = JobContext<Vec<Transformation>>;

/// Per-run orchestrator: one instance per run, confined to the host's
/// callback sequencing for that run.
pub struct JobContext<G: LineageGraph> {
    context: Arc<LineageContext>,
    graph: G,
    emitter: Arc<dyn EventEmitter>,
    phase: Mutex<LifecyclePhase>,
}

impl<G: LineageGraph> JobContext<G> {
    /// Creates a context in the `Submitted` phase.
    pub fn new(context: Arc<LineageContext>, graph: G, emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            context,
            graph,
            emitter,
            phase: Mutex::new(LifecyclePhase::Submitted),
        }
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.lock()
    }

    /// Assembles the event for a lifecycle state by extracting the graph
    /// snapshot. Never fails: extraction problems surface as omitted
    /// datasets or facets.
    pub fn build_event(&self, state: RunState) -> RunEvent {
        let (inputs, outputs) = self.graph.extract_datasets(&self.context);
        self.assemble(state, inputs, outputs, FacetMap::new())
    }

    fn assemble(
        &self,
        state: RunState,
        mut inputs: Vec<Dataset>,
        mut outputs: Vec<Dataset>,
        mut run_facets: FacetMap,
    ) -> RunEvent {
        let disabled = &self.context.config.disabled_facets;
        if !disabled.is_empty() {
            for dataset in inputs.iter_mut().chain(outputs.iter_mut()) {
                dataset.facets.strip(disabled);
            }
            run_facets.strip(disabled);
        }

        let mut run = Run::new(self.context.run_id);
        run.facets = run_facets;
        RunEvent::new(state, run, self.context.job.clone())
            .with_inputs(inputs)
            .with_outputs(outputs)
    }

    fn emit(&self, event: RunEvent) {
        debug!(
            run_id = %event.run.run_id,
            event_type = ?event.event_type,
            inputs = event.inputs.len(),
            outputs = event.outputs.len(),
            "emitting lineage event"
        );
        self.emitter.emit(event);
    }

    /// Transitions to `to` when legal from the current phase. Returns
    /// whether the transition happened.
    fn advance(&self, to: LifecyclePhase, callback: &str) -> bool {
        let mut phase = self.phase.lock();
        let legal = matches!(
            (*phase, to),
            (LifecyclePhase::Submitted, LifecyclePhase::Running)
                | (LifecyclePhase::Submitted, LifecyclePhase::Completed)
                | (LifecyclePhase::Submitted, LifecyclePhase::Failed)
                | (LifecyclePhase::Running, LifecyclePhase::Completed)
                | (LifecyclePhase::Running, LifecyclePhase::Failed)
        );
        if legal {
            *phase = to;
        } else {
            warn!(
                run_id = %self.context.run_id,
                callback,
                phase = ?*phase,
                "lifecycle callback out of order, ignoring"
            );
        }
        legal
    }
}

impl<G: LineageGraph> ExecutionContext for JobContext<G> {
    fn on_submitted(&self) {
        if !self.advance(LifecyclePhase::Running, "on_submitted") {
            return;
        }
        self.emit(self.build_event(RunState::Start));
    }

    fn on_checkpoint(&self, facet: CheckpointFacet) {
        if *self.phase.lock() != LifecyclePhase::Running {
            warn!(
                run_id = %self.context.run_id,
                checkpoint = facet.checkpoint_id,
                "checkpoint outside running phase, ignoring"
            );
            return;
        }
        // Checkpoints carry only the marker facet, no re-extraction
        let mut facets = FacetMap::new();
        facets.insert(facet);
        self.emit(self.assemble(RunState::Running, Vec::new(), Vec::new(), facets));
    }

    fn on_completed(&self, result: &JobResult) {
        if !self.advance(LifecyclePhase::Completed, "on_completed") {
            return;
        }
        if let Some(runtime) = result.runtime {
            debug!(run_id = %self.context.run_id, ?runtime, "job completed");
        }
        if !self.context.config.emit_on_complete {
            return;
        }
        self.emit(self.build_event(RunState::Complete));
    }

    fn on_failed(&self, error: &dyn std::error::Error) {
        if !self.advance(LifecyclePhase::Failed, "on_failed") {
            return;
        }
        let (inputs, outputs) = self.graph.extract_datasets(&self.context);
        let mut facets = FacetMap::new();
        facets.insert(ErrorFacet::from_error(error));
        self.emit(self.assemble(RunState::Fail, inputs, outputs, facets));
    }
}
