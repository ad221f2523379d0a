//! # Workflow State
//!
//! The single record threaded through every agent invocation of a run.
//! Collections only grow during a run: the `push_*`/`extend_*` helpers are
//! the only mutators, and `final_response` can be written once.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum length (in chars) of a task result's output summary
pub const OUTPUT_SUMMARY_LIMIT: usize = 500;

/// Opaque key-value payload (project context, node operation data)
pub type Payload = BTreeMap<String, serde_json::Value>;

/// Identifier of a role agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    /// The PM / planner (a.k.a. Sisyphus)
    Orchestrator,
    Architect,
    Coder,
    Qa,
}

impl AgentId {
    /// All agents in pipeline order
    pub fn all() -> [AgentId; 4] {
        [
            AgentId::Orchestrator,
            AgentId::Architect,
            AgentId::Coder,
            AgentId::Qa,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orchestrator => "orchestrator",
            Self::Architect => "architect",
            Self::Coder => "coder",
            Self::Qa => "qa",
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Orchestrator => "Sisyphus",
            Self::Architect => "Architect",
            Self::Coder => "Coder",
            Self::Qa => "QA",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the workflow. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Waiting for more user input
    #[default]
    Idle,
    /// Orchestrator is analyzing the request
    Planning,
    /// Architect is producing node operations
    Design,
    /// Coder is producing code artifacts
    Coding,
    /// QA is reviewing
    Qa,
    /// Terminal stage
    Complete,
}

impl WorkflowStage {
    pub fn all() -> [WorkflowStage; 6] {
        [
            Self::Idle,
            Self::Planning,
            Self::Design,
            Self::Coding,
            Self::Qa,
            Self::Complete,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Design => "design",
            Self::Coding => "coding",
            Self::Qa => "qa",
            Self::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Agent that produced the message (assistant messages only)
    #[serde(default)]
    pub agent_type: Option<AgentId>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent_type: None,
        }
    }

    pub fn assistant(agent: AgentId, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent_type: Some(agent),
        }
    }
}

/// Outcome of one agent invocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A code block harvested by the coder
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CodeArtifact {
    pub language: String,
    pub content: String,
    pub index: usize,
}

/// Severity of a QA issue. Only `Medium` is produced today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A labelled issue reported by QA
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct IssueArtifact {
    pub description: String,
    pub severity: Severity,
}

/// Structured record extracted from an agent reply
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Artifact {
    Code(CodeArtifact),
    Issue(IssueArtifact),
}

/// Result from one agent's execution. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TaskResult {
    pub agent: AgentId,
    pub status: TaskStatus,
    /// First `OUTPUT_SUMMARY_LIMIT` chars of the reply
    pub output: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl TaskResult {
    pub fn new(agent: AgentId, status: TaskStatus, reply: &str) -> Self {
        Self {
            agent,
            status,
            output: summarize_output(reply, OUTPUT_SUMMARY_LIMIT),
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }
}

/// Kind of pending graph edit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

/// Canvas node type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Action,
    Function,
    Data,
}

/// A pending edit against the external node/edge graph.
/// Produced here, applied elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NodeOperation {
    pub operation: OperationKind,
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Payload,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    Pending,
}

/// A task decomposed from the orchestrator's reply
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Task {
    pub description: String,
    pub status: PendingStatus,
    #[serde(default)]
    pub assigned_to: Option<AgentId>,
}

impl Task {
    pub fn pending(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: PendingStatus::Pending,
            assigned_to: None,
        }
    }
}

/// State shared between all agents in one run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WorkflowState {
    messages: Vec<Message>,
    pub current_agent: AgentId,
    task_queue: Vec<Task>,
    task_results: Vec<TaskResult>,
    pub workflow_stage: WorkflowStage,
    project_context: Payload,
    risk_score: i64,
    node_operations: Vec<NodeOperation>,
    user_request: String,
    final_response: Option<String>,
}

impl WorkflowState {
    /// Fresh state for one incoming user request
    pub fn new(user_message: impl Into<String>, project_context: Payload) -> Self {
        let user_request = user_message.into();
        Self {
            messages: vec![Message::user(user_request.clone())],
            current_agent: AgentId::Orchestrator,
            task_queue: Vec::new(),
            task_results: Vec::new(),
            workflow_stage: WorkflowStage::Planning,
            project_context,
            risk_score: 0,
            node_operations: Vec::new(),
            user_request,
            final_response: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn task_queue(&self) -> &[Task] {
        &self.task_queue
    }

    pub fn task_results(&self) -> &[TaskResult] {
        &self.task_results
    }

    pub fn node_operations(&self) -> &[NodeOperation] {
        &self.node_operations
    }

    pub fn project_context(&self) -> &Payload {
        &self.project_context
    }

    pub fn risk_score(&self) -> i64 {
        self.risk_score
    }

    pub fn user_request(&self) -> &str {
        &self.user_request
    }

    pub fn final_response(&self) -> Option<&str> {
        self.final_response.as_deref()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_task_result(&mut self, result: TaskResult) {
        self.task_results.push(result);
    }

    pub fn extend_tasks(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.task_queue.extend(tasks);
    }

    pub fn extend_node_operations(&mut self, ops: impl IntoIterator<Item = NodeOperation>) {
        self.node_operations.extend(ops);
    }

    /// Set the final response. Returns `false` (and keeps the old value)
    /// if one was already set.
    pub fn set_final_response(&mut self, response: impl Into<String>) -> bool {
        if self.final_response.is_some() {
            return false;
        }
        self.final_response = Some(response.into());
        true
    }
}

/// Truncate `text` to at most `limit` chars, never splitting a char
pub fn summarize_output(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = WorkflowState::new("Add a like button", Payload::new());
        assert_eq!(state.workflow_stage, WorkflowStage::Planning);
        assert_eq!(state.current_agent, AgentId::Orchestrator);
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role, Role::User);
        assert_eq!(state.user_request(), "Add a like button");
        assert_eq!(state.risk_score(), 0);
        assert!(state.final_response().is_none());
        assert!(state.task_results().is_empty());
    }

    #[test]
    fn test_final_response_set_once() {
        let mut state = WorkflowState::new("x", Payload::new());
        assert!(state.set_final_response("done"));
        assert!(!state.set_final_response("again"));
        assert_eq!(state.final_response(), Some("done"));
    }

    #[test]
    fn test_summarize_output_char_boundary() {
        let text = "설계".repeat(300);
        let summary = summarize_output(&text, OUTPUT_SUMMARY_LIMIT);
        assert_eq!(summary.chars().count(), 500);

        assert_eq!(summarize_output("short", 500), "short");
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&WorkflowStage::Qa).unwrap();
        assert_eq!(json, "\"qa\"");
        let stage: WorkflowStage = serde_json::from_str("\"complete\"").unwrap();
        assert!(stage.is_terminal());
    }

    #[test]
    fn test_artifact_is_tagged() {
        let artifact = Artifact::Issue(IssueArtifact {
            description: "Bug: crash".to_string(),
            severity: Severity::Medium,
        });
        let value = serde_json::to_value(&artifact).unwrap();
        assert_eq!(value["type"], "issue");
        assert_eq!(value["severity"], "medium");
    }
}
