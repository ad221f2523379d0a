//! # OpenDev Skills
//!
//! The four role agents and the parsers that turn their free-text replies
//! into state transitions.
//!
//! ## Architecture
//!
//! ```text
//! Coordinator
//!   └── Skill (one per AgentId)
//!         ├── system prompt (prompts / defaults/*.md)
//!         └── reply parser (rules tables + regex extraction)
//! ```
//!
//! - `OrchestratorSkill` - Picks the next stage, queues tasks
//! - `ArchitectSkill` - Proposes canvas node operations
//! - `CoderSkill` - Harvests code blocks
//! - `QaSkill` - Pass/fail verdict and issue records

pub mod llm_helpers;
pub mod prompts;
pub mod rules;

// Role skills
pub mod architect_skill;
pub mod coder_skill;
pub mod orchestrator_skill;
pub mod qa_skill;

// Agent Definitions (compose skills into the registry)
pub mod agent_definitions;

// Re-exports for convenience
pub use architect_skill::ArchitectSkill;
pub use coder_skill::CoderSkill;
pub use orchestrator_skill::OrchestratorSkill;
pub use qa_skill::{QaSkill, Verdict};

pub use agent_definitions::{
    architect_agent, coder_agent, create_swarm, orchestrator_agent, qa_agent, Skill, SkillMap,
};
