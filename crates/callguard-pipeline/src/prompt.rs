//! Prompt construction for consultation and call analysis

use callguard_domain::traits::Prompt;
use callguard_domain::{AllowedCategorySet, TranscriptLine};

const NONE_MARKER: &str = "(없음)";

const CONSULT_SYSTEM: &str = "너는 악성민원 대응/법률 자문 전문가 AI다. 반드시 JSON만 출력한다. \
키는 answer, sourcePages 고정. 코드블록/추가설명 금지. \
답변 생성 시 반드시 [대화 스크립트]를 우선 근거로 삼고, 사용자의 질문은 이 스크립트에 이어지는 추가 맥락으로만 해석하라. \
만약 스크립트와 질문이 충돌할 경우 스크립트를 신뢰하라. \
참고자료를 answer에 그대로 복붙하지 말고 요약/해설하라. \
한국어로만 답하고, 불확실한 내용은 단정하지 말고 '~일 수 있습니다' 같은 완곡 표현을 사용하라. ";

const CONSULT_FORMAT: &str = "아래 자료(스크립트/메모리/RAG/추가법률)를 바탕으로 **JSON으로만** 답변해.

- answer: **정확히 2문단**
  1) 1문단: 즉시 취해야 할 구체적 조치(보고·기록·심리안정·차단/선종료 기준 등)와 실무 팁을 **4~6문장**으로 서술.
  2) 2문단: 아래 문장으로 **반드시 시작**
     **\"당신이 상담한 내용은 ‘{유형명}’에 해당할 수 있으며, 관련 법률로는 ‘{법률명 조문번호}’가 있습니다.\"**
     이어서 각 법률을 **한 줄씩** 설명하되, **법률명만 굵게(예: - **형법 제307조**: …)** 표시하고 설명 문구는 굵게 하지 마.
- sourcePages: [{\"유형\": \"<악성민원 유형>\", \"관련법률\": \"<법률명 제n조>\"}] 의 배열만 작성. \
**마크다운/따옴표/괄호 설명 금지**. (예: \"형법 제307조\" OK, \"형법 제307조(명예훼손)\" 금지)

- 참고자료가 부족해도 실제 **유형/법률명을 반드시 채워 넣어라**(합리적 추론).";

const ANALYSIS_INSTRUCTIONS: &str = "너는 악성민원 대응 및 관련 법률 자문을 돕는 전문가 AI야.

아래 통화 내용을 참고해서 정중하고 구조화된 요약을 생성해줘.

✅ **적용 가능한 법률**에는 반드시 '법률명 + 조문번호 + 조문명'을 포함하고,
   각 법률이 어떤 악성 발언 유형(예: 성희롱, 폭언, 명예훼손, 협박 등)에 대응되는지 간단히 설명해줘.
✅ 첫 문단은 상담원에게 건네는 인사와 즉시 조치 안내로 시작하고, 이어서 적용 가능한 법률과 대응 방법(사내 대응 절차, 법적 조치)을 Markdown 목록으로 정리해줘.
✅ 출력은 자연스럽고 띄어쓰기가 올바른 한국어 문장으로 작성해줘.

[❗단, 문제가 되지 않는 평범한 통화라면 \"법적 조치 대상은 아니며 일반 민원 응대로 판단됩니다.\"로 간단히 응답해줘.]";

/// `SPEAKER: text` lines, at most `cap` of them
pub fn transcript_text(lines: &[TranscriptLine], cap: usize) -> String {
    lines
        .iter()
        .take(cap)
        .map(|l| format!("{}: {}", l.speaker.as_str(), l.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when no line carries any text
pub fn is_blank_transcript(lines: &[TranscriptLine]) -> bool {
    lines.iter().all(|l| l.text.trim().is_empty())
}

/// Builds the consultation prompt
///
/// The transcript is the primary source; memory, retrieved guidelines and
/// keyword law notes are supporting material.
#[derive(Debug, Clone, Default)]
pub struct ConsultPromptBuilder {
    question: String,
    transcript: String,
    memory: String,
    retrieval: String,
    additional_laws: String,
    allowed: AllowedCategorySet,
}

impl ConsultPromptBuilder {
    /// Create a builder for `question`
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// Rendered transcript
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }

    /// Rendered session memory
    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = memory.into();
        self
    }

    /// Retrieved guideline blocks
    pub fn with_retrieval(mut self, retrieval: impl Into<String>) -> Self {
        self.retrieval = retrieval.into();
        self
    }

    /// Keyword-triggered law notes
    pub fn with_additional_laws(mut self, notes: impl Into<String>) -> Self {
        self.additional_laws = notes.into();
        self
    }

    /// Categories the answer may mention
    pub fn with_allowed(mut self, allowed: AllowedCategorySet) -> Self {
        self.allowed = allowed;
        self
    }

    /// Build the system and user messages
    pub fn build(&self) -> Prompt {
        let allowed = if self.allowed.is_unrestricted() {
            "제한 없음".to_string()
        } else {
            self.allowed.sorted().join(", ")
        };
        let system = format!(
            "{}아래 허용유형 외의 유형/법률/표현(키워드 포함)은 언급하지 마라. 허용유형: {}",
            CONSULT_SYSTEM, allowed
        );

        let mut user = String::new();
        user.push_str(CONSULT_FORMAT);
        user.push_str("\n\n[대화 스크립트]\n");
        user.push_str(or_none(&self.transcript));
        user.push_str("\n\n[대화 메모리]\n");
        user.push_str(&self.memory);
        user.push_str("\n\n[참고 법률 자료]\n");
        user.push_str(&self.retrieval);
        user.push_str("\n\n[키워드 기반 추가 법률]\n");
        user.push_str(or_none(&self.additional_laws));
        user.push_str("\n\n[질문]\n");
        user.push_str(&self.question);
        user.push('\n');

        Prompt::new(system, user)
    }
}

/// Single-message prompt for whole-call analysis
pub fn analysis_prompt(dialogue: &str, references: &str) -> Prompt {
    Prompt::new(
        "",
        format!(
            "{}\n\n---\n\n# 통화 내용:\n{}\n\n# 참고 법률 자료:\n{}\n",
            ANALYSIS_INSTRUCTIONS, dialogue, references
        ),
    )
}

fn or_none(text: &str) -> &str {
    if text.trim().is_empty() {
        NONE_MARKER
    } else {
        text
    }
}
