//! Offline backend: canned replies that walk a request through design,
//! coding and QA without a network call.

use opendev_core::llm::ScriptedLlm;
use opendev_core::skills::prompts;

const ORCHESTRATOR_REPLIES: &[&str] = &[
    "요청을 분석했습니다.\n- 사용자 화면 흐름 정리\n- 입력 데이터 구조 정의\n설계를 시작합니다.",
    "설계가 준비되었습니다. 코딩을 시작합니다.",
    "구현이 끝났습니다. QA를 시작합니다.",
];

const ARCHITECT_REPLY: &str =
    "노드: 사용자 입력 폼\n노드: 입력 검증 함수\n노드: 결과 저장 테이블";

const CODER_REPLY: &str = "구현 코드입니다.\n```typescript\nexport function handleSubmit(input: string): string {\n  return input.trim();\n}\n```";

const QA_REPLY: &str = "모든 테스트 통과, 문제 없습니다.";

/// Anything unscripted closes the run
const FALLBACK_REPLY: &str = "작업이 완료되었습니다.";

/// A fresh scripted backend for one run
pub fn mock_llm() -> ScriptedLlm {
    ScriptedLlm::new()
        .on(prompts::ORCHESTRATOR, ORCHESTRATOR_REPLIES)
        .always(prompts::ARCHITECT, &[ARCHITECT_REPLY])
        .always(prompts::CODER, &[CODER_REPLY])
        .always(prompts::QA, &[QA_REPLY])
        .with_fallback(FALLBACK_REPLY)
}
