//! Default system prompts bundled at compile time.

use crate::state::AgentId;

/// Orchestrator (Sisyphus) - plans and picks the next stage
pub const ORCHESTRATOR: &str = include_str!("defaults/orchestrator.md");

/// Architect - designs canvas nodes
pub const ARCHITECT: &str = include_str!("defaults/architect.md");

/// Coder - writes fenced code blocks
pub const CODER: &str = include_str!("defaults/coder.md");

/// QA - reviews code and reports labelled issues
pub const QA: &str = include_str!("defaults/qa.md");

/// System prompt for an agent
pub fn system_prompt(agent: AgentId) -> &'static str {
    match agent {
        AgentId::Orchestrator => ORCHESTRATOR,
        AgentId::Architect => ARCHITECT,
        AgentId::Coder => CODER,
        AgentId::Qa => QA,
    }
}

/// All default prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    AgentId::all()
        .into_iter()
        .map(|agent| (agent.as_str(), system_prompt(agent)))
        .collect()
}
