//! Inbound requests: operator questions and call transcripts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation identifier for one pipeline invocation, based on UUIDv7
///
/// UUIDv7 sorts chronologically, which keeps request logs in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new RequestId
    ///
    /// # Examples
    ///
    /// ```
    /// use callguard_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Who spoke a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Speaker {
    /// The caller
    Inbound,
    /// The operator
    Outbound,
}

impl Speaker {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Inbound => "INBOUND",
            Speaker::Outbound => "OUTBOUND",
        }
    }
}

/// One speech-to-text line of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Speaker of the line
    pub speaker: Speaker,

    /// Recognized text
    pub text: String,
}

impl TranscriptLine {
    /// Create a caller line
    pub fn inbound(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Inbound,
            text: text.into(),
        }
    }

    /// Create an operator line
    pub fn outbound(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Outbound,
            text: text.into(),
        }
    }
}

/// An operator question about the current call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultRequest {
    /// Session key for conversational memory
    pub session_id: String,

    /// Operator question
    pub question: String,

    /// Call transcript so far, if any
    #[serde(default)]
    pub transcript: Option<Vec<TranscriptLine>>,
}

impl ConsultRequest {
    /// Create a request without transcript
    pub fn new(session_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            question: question.into(),
            transcript: None,
        }
    }

    /// Attach transcript lines
    pub fn with_transcript(mut self, lines: Vec<TranscriptLine>) -> Self {
        self.transcript = Some(lines);
        self
    }

    /// Transcript lines (empty when absent)
    pub fn transcript_lines(&self) -> &[TranscriptLine] {
        self.transcript.as_deref().unwrap_or(&[])
    }
}
