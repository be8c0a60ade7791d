//! Events emitted while a request is answered

use callguard_domain::AnswerPayload;

/// One event on a request's stream
///
/// Zero or more `Delta`s arrive in generation order, followed by exactly one
/// `Final`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A raw text fragment from the completion service
    Delta(String),

    /// The sanitized answer; always the last event
    Final(AnswerPayload),
}

impl StreamEvent {
    /// True for the terminal event
    pub fn is_final(&self) -> bool {
        matches!(self, StreamEvent::Final(_))
    }
}
