//! # Coder Skill
//!
//! Harvests fenced code blocks from the coder's reply as artifacts and
//! hands off to QA.

use crate::skills::agent_definitions::Skill;
use crate::skills::llm_helpers::record_reply;
use crate::skills::prompts;
use crate::state::{
    AgentId, Artifact, CodeArtifact, TaskResult, TaskStatus, WorkflowStage, WorkflowState,
};
use regex::Regex;
use std::sync::OnceLock;

/// Language recorded for untagged blocks
pub const DEFAULT_LANGUAGE: &str = "text";

fn fence_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(\w+)?\n(.*?)```").expect("valid regex"))
}

pub struct CoderSkill {
    system_prompt: String,
}

impl Default for CoderSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl CoderSkill {
    pub fn new() -> Self {
        Self::with_prompt(prompts::CODER)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: prompt.into(),
        }
    }

    /// Every fenced block, in order, as a code artifact
    pub fn extract_code_blocks(response: &str) -> Vec<Artifact> {
        fence_pattern()
            .captures_iter(response)
            .enumerate()
            .map(|(index, caps)| {
                let language = caps
                    .get(1)
                    .map(|m| m.as_str())
                    .unwrap_or(DEFAULT_LANGUAGE)
                    .to_string();
                let content = caps
                    .get(2)
                    .map(|m| m.as_str().trim())
                    .unwrap_or_default()
                    .to_string();

                Artifact::Code(CodeArtifact {
                    language,
                    content,
                    index,
                })
            })
            .collect()
    }
}

impl Skill for CoderSkill {
    fn id(&self) -> AgentId {
        AgentId::Coder
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn apply_response(&self, mut state: WorkflowState, reply: &str) -> WorkflowState {
        record_reply(&mut state, AgentId::Coder, reply);

        let artifacts = Self::extract_code_blocks(reply);
        tracing::debug!(count = artifacts.len(), "Coder produced code blocks");

        state.push_task_result(
            TaskResult::new(AgentId::Coder, TaskStatus::Completed, reply).with_artifacts(artifacts),
        );

        state.workflow_stage = WorkflowStage::Qa;
        state
    }
}
