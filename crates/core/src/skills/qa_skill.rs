//! # QA Skill
//!
//! Reviews the coder's output. The verdict decides the next stage: a pass
//! completes the workflow, a fail sends it back to coding.
//!
//! ## Verdict
//!
//! - pass keyword and no issue keyword → pass
//! - any issue keyword → fail (an explicit pass phrase does not override it)
//! - neither → pass
//!
//! Empty-findings statements ("no issues found", "문제 없") are removed
//! before the issue scan.

use crate::skills::agent_definitions::Skill;
use crate::skills::llm_helpers::record_reply;
use crate::skills::prompts;
use crate::skills::rules::{
    contains_any, strip_negations, ISSUE_KEYWORDS, ISSUE_LINE_MARKERS, PASS_KEYWORDS,
};
use crate::state::{
    AgentId, Artifact, IssueArtifact, Severity, TaskResult, TaskStatus, WorkflowStage,
    WorkflowState,
};

/// Outcome of a QA review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn next_stage(&self) -> WorkflowStage {
        match self {
            Verdict::Pass => WorkflowStage::Complete,
            Verdict::Fail => WorkflowStage::Coding,
        }
    }

    pub fn task_status(&self) -> TaskStatus {
        match self {
            Verdict::Pass => TaskStatus::Completed,
            Verdict::Fail => TaskStatus::Failed,
        }
    }
}

pub struct QaSkill {
    system_prompt: String,
}

impl Default for QaSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl QaSkill {
    pub fn new() -> Self {
        Self::with_prompt(prompts::QA)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: prompt.into(),
        }
    }

    /// Whether the reply reports problems
    pub fn check_for_issues(response: &str) -> bool {
        let lowered = response.to_lowercase();
        let has_issues = contains_any(&strip_negations(&lowered), ISSUE_KEYWORDS);
        let is_passed = contains_any(&lowered, PASS_KEYWORDS);

        if is_passed && !has_issues {
            return false;
        }

        has_issues
    }

    pub fn verdict(response: &str) -> Verdict {
        if Self::check_for_issues(response) {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }

    /// Lines carrying a labelled issue marker, as issue artifacts
    pub fn extract_issues(response: &str) -> Vec<Artifact> {
        response
            .lines()
            .map(str::trim)
            .filter(|line| contains_any(&line.to_lowercase(), ISSUE_LINE_MARKERS))
            .map(|line| {
                Artifact::Issue(IssueArtifact {
                    description: line.to_string(),
                    severity: Severity::Medium,
                })
            })
            .collect()
    }
}

impl Skill for QaSkill {
    fn id(&self) -> AgentId {
        AgentId::Qa
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn apply_response(&self, mut state: WorkflowState, reply: &str) -> WorkflowState {
        record_reply(&mut state, AgentId::Qa, reply);

        let verdict = Self::verdict(reply);
        let issues = Self::extract_issues(reply);
        tracing::info!(?verdict, issues = issues.len(), "QA review finished");

        state.push_task_result(
            TaskResult::new(AgentId::Qa, verdict.task_status(), reply).with_artifacts(issues),
        );

        state.workflow_stage = verdict.next_stage();
        state
    }
}
