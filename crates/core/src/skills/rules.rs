//! # Keyword Rule Tables
//!
//! Agent replies are free text; the workflow branches on them through
//! ordered keyword tables. A table is evaluated top to bottom against the
//! lowercased reply and the first rule with a matching keyword wins, so the
//! order of `rules` is the tie-break.
//!
//! Keyword sets carry the Korean phrasing the prompts ask for plus English
//! equivalents.

use crate::state::{NodeType, WorkflowStage};

/// One (keywords -> category) rule
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<C: Copy + 'static> {
    pub category: C,
    pub keywords: &'static [&'static str],
}

impl<C: Copy> KeywordRule<C> {
    /// `text` must already be lowercased
    pub fn matches(&self, text: &str) -> bool {
        contains_any(text, self.keywords)
    }
}

/// Ordered rules plus a fallback category
#[derive(Debug, Clone, Copy)]
pub struct RuleTable<C: Copy + 'static> {
    pub rules: &'static [KeywordRule<C>],
    pub fallback: C,
}

impl<C: Copy> RuleTable<C> {
    /// Category of the first matching rule, or the fallback
    pub fn classify(&self, text: &str) -> C {
        self.matching_rule(text)
            .map(|rule| rule.category)
            .unwrap_or(self.fallback)
    }

    /// First matching rule, if any
    pub fn matching_rule(&self, text: &str) -> Option<&KeywordRule<C>> {
        let lowered = text.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }
}

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ============================================================================
// Orchestrator: next stage
// ============================================================================

pub const DESIGN_PHRASES: &[&str] = &[
    "설계를 시작",
    "architect",
    "설계 단계",
    "설계로 넘어",
    "start the design",
    "design phase",
];

pub const CODING_PHRASES: &[&str] = &[
    "코딩을 시작",
    "coder",
    "개발 단계",
    "코딩으로",
    "start coding",
    "development phase",
];

pub const QA_PHRASES: &[&str] = &[
    "qa를 시작",
    "테스트",
    "검증 단계",
    "qa로",
    "start qa",
    "qa phase",
    "verification phase",
];

pub const COMPLETE_PHRASES: &[&str] = &["완료", "complete", "배포 준비", "ready to deploy"];

pub const CLARIFY_PHRASES: &[&str] = &[
    "추가 정보",
    "질문",
    "확인이 필요",
    "more information",
    "clarify",
];

/// Design, coding, qa, completion, clarification; else idle
pub static STAGE_RULES: RuleTable<WorkflowStage> = RuleTable {
    rules: &[
        KeywordRule {
            category: WorkflowStage::Design,
            keywords: DESIGN_PHRASES,
        },
        KeywordRule {
            category: WorkflowStage::Coding,
            keywords: CODING_PHRASES,
        },
        KeywordRule {
            category: WorkflowStage::Qa,
            keywords: QA_PHRASES,
        },
        KeywordRule {
            category: WorkflowStage::Complete,
            keywords: COMPLETE_PHRASES,
        },
        KeywordRule {
            category: WorkflowStage::Idle,
            keywords: CLARIFY_PHRASES,
        },
    ],
    fallback: WorkflowStage::Idle,
};

// ============================================================================
// Architect: node type
// ============================================================================

pub const DATA_KEYWORDS: &[&str] = &["데이터", "db", "테이블", "저장", "table", "storage", "data"];

pub const FUNCTION_KEYWORDS: &[&str] = &[
    "함수",
    "처리",
    "검증",
    "api",
    "function",
    "process",
    "validat",
    "handler",
];

/// Data storage first, then processing/validation/interface; else action
pub static NODE_TYPE_RULES: RuleTable<NodeType> = RuleTable {
    rules: &[
        KeywordRule {
            category: NodeType::Data,
            keywords: DATA_KEYWORDS,
        },
        KeywordRule {
            category: NodeType::Function,
            keywords: FUNCTION_KEYWORDS,
        },
    ],
    fallback: NodeType::Action,
};

// ============================================================================
// QA: verdict
// ============================================================================

pub const ISSUE_KEYWORDS: &[&str] = &[
    "버그", "오류", "에러", "문제", "수정 필요", "bug", "error", "issue", "fix",
];

pub const PASS_KEYWORDS: &[&str] = &[
    "통과", "성공", "완료", "문제 없", "pass", "success", "approved",
];

/// Phrases that report an empty findings list, blanked out before the
/// issue scan. Only whole findings statements belong here: a bare
/// "no error" can describe a missing behaviour ("no error message").
pub const NEGATED_ISSUE_PHRASES: &[&str] = &[
    "문제 없",
    "버그 없",
    "no issues found",
    "no issue found",
    "no bugs found",
    "no bug found",
    "no errors found",
    "no error found",
    "no issues were found",
    "no bugs were found",
    "without issues",
];

/// Line markers that make a QA line an issue record
pub const ISSUE_LINE_MARKERS: &[&str] = &["버그:", "오류:", "문제:", "issue:", "bug:", "error:"];

/// Remove negated issue phrases from already-lowercased text
pub fn strip_negations(lowered: &str) -> String {
    NEGATED_ISSUE_PHRASES
        .iter()
        .fold(lowered.to_string(), |acc, phrase| acc.replace(phrase, " "))
}
