//! # Agent Definitions
//!
//! Every role agent is one capability: consume the state, call the
//! backend once, produce the next state. The engine holds a map from
//! `AgentId` to that capability.

use crate::llm::{LlmError, TextGenerator};
use crate::skills::llm_helpers::build_history;
use crate::skills::{ArchitectSkill, CoderSkill, OrchestratorSkill, QaSkill};
use crate::state::{AgentId, WorkflowState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A role agent: a system prompt plus a reply parser
#[async_trait]
pub trait Skill: Send + Sync {
    fn id(&self) -> AgentId;

    fn system_prompt(&self) -> &str;

    /// Apply a backend reply to the state. Pure with respect to `reply`.
    fn apply_response(&self, state: WorkflowState, reply: &str) -> WorkflowState;

    /// Invoke the backend and apply its reply to a copy of `state`.
    /// On backend failure `state` is untouched and the error is returned.
    async fn run(
        &self,
        state: &WorkflowState,
        llm: &dyn TextGenerator,
    ) -> Result<WorkflowState, LlmError> {
        let history = build_history(state);
        let reply = llm.invoke(self.system_prompt(), &history).await?;
        Ok(self.apply_response(state.clone(), &reply))
    }
}

/// Registry the coordinator dispatches on
pub type SkillMap = HashMap<AgentId, Arc<dyn Skill>>;

/// The Orchestrator (Sisyphus): plans, decomposes, picks the next stage
pub fn orchestrator_agent() -> Arc<dyn Skill> {
    Arc::new(OrchestratorSkill::new())
}

/// The Architect: designs canvas nodes
pub fn architect_agent() -> Arc<dyn Skill> {
    Arc::new(ArchitectSkill::new())
}

/// The Coder: writes code blocks
pub fn coder_agent() -> Arc<dyn Skill> {
    Arc::new(CoderSkill::new())
}

/// QA: pass/fail verdict plus issues
pub fn qa_agent() -> Arc<dyn Skill> {
    Arc::new(QaSkill::new())
}

/// All four role agents with their default prompts
pub fn create_swarm() -> SkillMap {
    [
        orchestrator_agent(),
        architect_agent(),
        coder_agent(),
        qa_agent(),
    ]
    .into_iter()
    .map(|skill| (skill.id(), skill))
    .collect()
}
