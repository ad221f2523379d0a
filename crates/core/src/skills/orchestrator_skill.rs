//! # Orchestrator Skill (Sisyphus)
//!
//! The PM agent. Reads the user request and the team's progress, then
//! decides which stage runs next and, optionally, breaks the request into
//! a short task list.
//!
//! ## Stage classification
//!
//! Evaluated against `rules::STAGE_RULES` in this order, first hit wins:
//! design → coding → qa → complete → clarification → idle.
//!
//! ## Task extraction
//!
//! Lines starting with `- `, `* ` or `<digits>.` become pending tasks once
//! the marker is stripped, if at least `MIN_TASK_CHARS` long. At most
//! `MAX_TASKS` are kept, in line order.

use crate::skills::agent_definitions::Skill;
use crate::skills::llm_helpers::record_reply;
use crate::skills::prompts;
use crate::skills::rules::STAGE_RULES;
use crate::state::{AgentId, Task, WorkflowStage, WorkflowState};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum tasks kept per reply
pub const MAX_TASKS: usize = 5;

/// Minimum task description length after stripping the marker
pub const MIN_TASK_CHARS: usize = 6;

fn numbered_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.").expect("valid regex"))
}

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*\d.]+\s*").expect("valid regex"))
}

/// Orchestrator skill that coordinates the agent pipeline
pub struct OrchestratorSkill {
    system_prompt: String,
}

impl Default for OrchestratorSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorSkill {
    pub fn new() -> Self {
        Self::with_prompt(prompts::ORCHESTRATOR)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: prompt.into(),
        }
    }

    /// Next workflow stage implied by the reply
    pub fn parse_next_stage(response: &str) -> WorkflowStage {
        STAGE_RULES.classify(response)
    }

    /// Bulleted / numbered lines of the reply as pending tasks
    pub fn parse_tasks(response: &str) -> Vec<Task> {
        response
            .lines()
            .map(str::trim)
            .filter(|line| {
                line.starts_with("- ") || line.starts_with("* ") || numbered_line().is_match(line)
            })
            .map(|line| list_marker().replace(line, "").into_owned())
            .filter(|task| task.chars().count() >= MIN_TASK_CHARS)
            .take(MAX_TASKS)
            .map(Task::pending)
            .collect()
    }
}

impl Skill for OrchestratorSkill {
    fn id(&self) -> AgentId {
        AgentId::Orchestrator
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn apply_response(&self, mut state: WorkflowState, reply: &str) -> WorkflowState {
        record_reply(&mut state, AgentId::Orchestrator, reply);

        let next_stage = Self::parse_next_stage(reply);
        state.workflow_stage = next_stage;

        if next_stage == WorkflowStage::Complete && !state.set_final_response(reply) {
            tracing::warn!("Final response already set, keeping the first one");
        }

        let tasks = Self::parse_tasks(reply);
        if !tasks.is_empty() {
            tracing::debug!(count = tasks.len(), "Orchestrator queued tasks");
            state.extend_tasks(tasks);
        }

        state
    }
}
