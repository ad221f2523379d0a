//! # Workflow Events
//!
//! Progress notifications for UIs (agent status bar, chat stream).
//! Events are observational only; they never influence routing.

use crate::state::{AgentId, WorkflowStage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of workflow event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEventKind {
    /// Run accepted, orchestrator about to start
    WorkflowStarted,
    /// Agent started working
    AgentStarted,
    /// Agent completed successfully
    AgentCompleted,
    /// Backend call for an agent failed
    AgentFailed,
    /// Stage moved to a new value
    StageChanged,
    /// Routing terminated normally
    WorkflowCompleted,
    /// Hop limit or timeout hit
    WorkflowAborted,
}

/// An event in a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Unique event ID
    pub id: String,
    /// Run this event belongs to
    pub run_id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: WorkflowEventKind,
    /// Agent that produced this event
    #[serde(default)]
    pub agent: Option<AgentId>,
    /// Stage after the event
    #[serde(default)]
    pub stage: Option<WorkflowStage>,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl WorkflowEvent {
    /// Create a new event
    pub fn new(run_id: &str, kind: WorkflowEventKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            run_id: run_id.to_string(),
            timestamp: Utc::now(),
            kind,
            agent: None,
            stage: None,
            data: None,
        }
    }

    pub fn with_agent(mut self, agent: AgentId) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_stage(mut self, stage: WorkflowStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
