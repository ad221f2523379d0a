//! # Workflow Coordinator
//!
//! Drives one run: invoke the current agent, apply its reply, route, repeat.
//! The coordinator holds no per-run data, so one instance can serve many
//! concurrent runs; each run owns its `WorkflowState`.

use crate::llm::{LlmError, TextGenerator};
use crate::skills::{create_swarm, SkillMap};
use crate::state::{AgentId, Payload, WorkflowStage, WorkflowState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::{WorkflowEvent, WorkflowEventKind};
use super::pipeline::{route, NextStep};

/// Default agent invocations allowed per run
pub const DEFAULT_MAX_HOPS: usize = 25;

/// Default wall-clock budget per run
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// Configuration for the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Agent invocations allowed before the run is aborted
    pub max_hops: usize,
    /// Wall-clock limit applied by `run_with_timeout` (None = unbounded)
    pub run_timeout_secs: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            run_timeout_secs: Some(DEFAULT_RUN_TIMEOUT_SECS),
        }
    }
}

impl CoordinatorConfig {
    /// Read `OPENDEV_MAX_HOPS` and `OPENDEV_TIMEOUT_SECS` (0 disables the timeout)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(hops) = env_number::<usize>("OPENDEV_MAX_HOPS") {
            config.max_hops = hops;
        }
        if let Some(secs) = env_number::<u64>("OPENDEV_TIMEOUT_SECS") {
            config.run_timeout_secs = (secs > 0).then_some(secs);
        }
        config
    }
}

fn env_number<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}

/// An incoming request that starts a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub user_message: String,
    #[serde(default)]
    pub project_context: Payload,
}

impl RunRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            project_context: Payload::new(),
        }
    }

    pub fn with_context(mut self, project_context: Payload) -> Self {
        self.project_context = project_context;
        self
    }
}

/// Why a run did not produce a final state
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The text-generation call failed; the step's state change was not applied
    #[error("{agent} agent failed: {source}")]
    Backend {
        agent: AgentId,
        #[source]
        source: LlmError,
    },

    /// Routing kept going past the hop limit. Carries the state as reached.
    #[error("hop limit of {hops} reached (last stage: {stage})")]
    HopLimitExceeded {
        hops: usize,
        stage: WorkflowStage,
        state: Box<WorkflowState>,
    },

    /// The run exceeded its wall-clock budget; its state is discarded
    #[error("workflow run exceeded {secs}s")]
    Timeout { secs: u64 },

    #[error("no skill registered for agent {0}")]
    MissingSkill(AgentId),
}

impl WorkflowError {
    /// Stage the run had reached, when known
    pub fn last_stage(&self) -> Option<WorkflowStage> {
        match self {
            WorkflowError::HopLimitExceeded { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// State at abort time (hop limit only)
    pub fn into_state(self) -> Option<WorkflowState> {
        match self {
            WorkflowError::HopLimitExceeded { state, .. } => Some(*state),
            _ => None,
        }
    }
}

/// The workflow engine
pub struct Coordinator {
    config: CoordinatorConfig,
    llm: Arc<dyn TextGenerator>,
    skills: SkillMap,
    event_tx: Option<mpsc::Sender<WorkflowEvent>>,
}

impl Coordinator {
    /// Create a coordinator with the default four-agent swarm
    pub fn new(config: CoordinatorConfig, llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            config,
            llm,
            skills: create_swarm(),
            event_tx: None,
        }
    }

    /// Replace the whole skill registry
    pub fn with_skills(mut self, skills: SkillMap) -> Self {
        self.skills = skills;
        self
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<WorkflowEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Emit an event. A full channel holds the run until the consumer
    /// drains it; a closed channel is ignored.
    async fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run the workflow for one request, without a wall-clock limit
    pub async fn run(&self, request: RunRequest) -> Result<WorkflowState, WorkflowError> {
        let run_id = Uuid::new_v4().to_string();
        let state = WorkflowState::new(request.user_message, request.project_context);
        self.drive(&run_id, state).await
    }

    /// Run the workflow under `run_timeout_secs`. On expiry the run's state
    /// is dropped and `WorkflowError::Timeout` is returned.
    pub async fn run_with_timeout(
        &self,
        request: RunRequest,
    ) -> Result<WorkflowState, WorkflowError> {
        let Some(secs) = self.config.run_timeout_secs else {
            return self.run(request).await;
        };

        let run_id = Uuid::new_v4().to_string();
        let state = WorkflowState::new(request.user_message, request.project_context);

        match tokio::time::timeout(Duration::from_secs(secs), self.drive(&run_id, state)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(run_id = %run_id, secs, "Workflow run timed out");
                self.emit(
                    WorkflowEvent::new(&run_id, WorkflowEventKind::WorkflowAborted)
                        .with_data(serde_json::json!({ "reason": "timeout", "secs": secs })),
                )
                .await;
                Err(WorkflowError::Timeout { secs })
            }
        }
    }

    #[tracing::instrument(
        skip(self, state),
        fields(request_preview = %state.user_request().chars().take(50).collect::<String>())
    )]
    async fn drive(
        &self,
        run_id: &str,
        mut state: WorkflowState,
    ) -> Result<WorkflowState, WorkflowError> {
        self.emit(
            WorkflowEvent::new(run_id, WorkflowEventKind::WorkflowStarted)
                .with_stage(state.workflow_stage),
        )
        .await;

        let mut next = AgentId::Orchestrator;
        let mut hops = 0usize;

        loop {
            if hops >= self.config.max_hops {
                let stage = state.workflow_stage;
                tracing::warn!(hops, %stage, "Hop limit reached, aborting run");
                self.emit(
                    WorkflowEvent::new(run_id, WorkflowEventKind::WorkflowAborted)
                        .with_stage(stage)
                        .with_data(serde_json::json!({ "reason": "hop_limit", "hops": hops })),
                )
                .await;
                return Err(WorkflowError::HopLimitExceeded {
                    hops,
                    stage,
                    state: Box::new(state),
                });
            }

            let skill = self
                .skills
                .get(&next)
                .ok_or(WorkflowError::MissingSkill(next))?;

            self.emit(
                WorkflowEvent::new(run_id, WorkflowEventKind::AgentStarted)
                    .with_agent(next)
                    .with_stage(state.workflow_stage),
            )
            .await;

            let previous_stage = state.workflow_stage;
            state = match skill.run(&state, self.llm.as_ref()).await {
                Ok(updated) => updated,
                Err(source) => {
                    tracing::warn!(agent = %next, error = %source, "Agent backend call failed");
                    self.emit(
                        WorkflowEvent::new(run_id, WorkflowEventKind::AgentFailed)
                            .with_agent(next)
                            .with_data(serde_json::json!({ "error": source.to_string() })),
                    )
                    .await;
                    return Err(WorkflowError::Backend {
                        agent: next,
                        source,
                    });
                }
            };
            hops += 1;

            self.emit(
                WorkflowEvent::new(run_id, WorkflowEventKind::AgentCompleted)
                    .with_agent(next)
                    .with_stage(state.workflow_stage),
            )
            .await;

            if state.workflow_stage != previous_stage {
                tracing::debug!(
                    agent = %next,
                    from = %previous_stage,
                    to = %state.workflow_stage,
                    "Stage changed"
                );
                self.emit(
                    WorkflowEvent::new(run_id, WorkflowEventKind::StageChanged)
                        .with_agent(next)
                        .with_stage(state.workflow_stage),
                )
                .await;
            }

            match route(next, state.workflow_stage) {
                NextStep::Agent(agent) => next = agent,
                NextStep::Terminate => {
                    tracing::info!(hops, stage = %state.workflow_stage, "Workflow finished");
                    self.emit(
                        WorkflowEvent::new(run_id, WorkflowEventKind::WorkflowCompleted)
                            .with_agent(next)
                            .with_stage(state.workflow_stage),
                    )
                    .await;
                    return Ok(state);
                }
            }
        }
    }
}
