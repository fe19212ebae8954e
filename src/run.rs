//! Run events: the outbound record describing a run at one lifecycle point.
//!
//! A [`RunEvent`] is assembled by the execution context at each host
//! callback and handed to the emitter unmodified. Events are values: a new
//! one is constructed per lifecycle point, never mutated afterwards.

use crate::dataset::Dataset;
use crate::facet::{Facet, FacetMap};
use crate::job;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state stamped on a run event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Start,
    Running,
    Complete,
    Fail,
    Other,
}

/// One execution of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Run identifier, stable across all events of the run
    pub run_id: Uuid,
    /// Run-level facets
    #[serde(default, skip_serializing_if = "FacetMap::is_empty")]
    pub facets: FacetMap,
}

impl Run {
    /// Creates a run record with no facets.
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            facets: FacetMap::new(),
        }
    }

    /// Attaches a run facet under an explicit key.
    pub fn with_facet(mut self, key: &str, facet: impl Into<Facet>) -> Self {
        self.facets.insert_named(key, facet);
        self
    }
}

/// The job a run belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Namespace grouping related jobs, from configuration
    pub namespace: String,
    /// Normalized job name
    pub name: String,
    /// Job-level facets
    #[serde(default, skip_serializing_if = "FacetMap::is_empty")]
    pub facets: FacetMap,
}

impl Job {
    /// Creates a job from an already-normalized name.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            facets: FacetMap::new(),
        }
    }

    /// Creates a job from a host display name, normalizing it to
    /// snake_case.
    pub fn from_display_name(namespace: &str, display_name: &str) -> Self {
        Self::new(namespace, &job::normalize_name(display_name))
    }
}

/// A structured lineage event describing one run at one lifecycle point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    /// Lifecycle state
    pub event_type: RunState,
    /// When the event was assembled
    pub event_time: DateTime<Utc>,
    /// The run
    pub run: Run,
    /// The job
    pub job: Job,
    /// Datasets the run reads from
    pub inputs: Vec<Dataset>,
    /// Datasets the run writes to
    pub outputs: Vec<Dataset>,
}

impl RunEvent {
    /// Creates an event with empty dataset lists, stamped now.
    pub fn new(event_type: RunState, run: Run, job: Job) -> Self {
        Self {
            event_type,
            event_time: Utc::now(),
            run,
            job,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Sets the input datasets.
    pub fn with_inputs(mut self, inputs: Vec<Dataset>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Sets the output datasets.
    pub fn with_outputs(mut self, outputs: Vec<Dataset>) -> Self {
        self.outputs = outputs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, DatasetIdentifier};

    #[test]
    fn test_event_serializes_camel_case() {
        let event = RunEvent::new(
            RunState::Start,
            Run::new(Uuid::new_v4()),
            Job::new("pipelines", "daily_orders_load"),
        )
        .with_inputs(vec![Dataset::new(DatasetIdentifier::new("db", "orders"))]);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "START");
        assert!(json["eventTime"].is_string());
        assert_eq!(json["job"]["name"], "daily_orders_load");
        assert_eq!(json["inputs"][0]["namespace"], "db");
        assert_eq!(json["outputs"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_job_from_display_name() {
        let job = Job::from_display_name("pipelines", "DailyOrdersLoad");
        assert_eq!(job.name, "daily_orders_load");
        assert_eq!(job.namespace, "pipelines");
    }

    #[test]
    fn test_run_states_serialize_screaming() {
        for (state, expected) in [
            (RunState::Start, "\"START\""),
            (RunState::Running, "\"RUNNING\""),
            (RunState::Complete, "\"COMPLETE\""),
            (RunState::Fail, "\"FAIL\""),
            (RunState::Other, "\"OTHER\""),
        ] {
            assert_eq!(serde_json::to_string(&state).unwrap(), expected);
        }
    }
}
