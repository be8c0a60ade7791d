//! Per-session conversational memory
//!
//! A [`SessionStore`] owns one bounded [`SessionLog`] per session key, each
//! behind its own async mutex. Holding that mutex for the whole request keeps
//! concurrent requests on the same session from interleaving their memory
//! reads and appends.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// Default number of remembered question/answer turns
pub const DEFAULT_MAX_TURNS: usize = 8;

/// Rendered memory when a session has no turns yet
pub const EMPTY_MEMORY: &str = "(이전 대화 없음)";

/// One remembered exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Operator question
    pub question: String,
    /// Final answer text
    pub answer: String,
}

/// Bounded FIFO of turns; the oldest turn is evicted first
#[derive(Debug, Clone)]
pub struct SessionLog {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl SessionLog {
    /// Empty log keeping at most `max_turns` turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns),
            max_turns: max_turns.max(1),
        }
    }

    /// Append a turn, evicting the oldest when full
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        if self.turns.len() == self.max_turns {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn {
            question: question.into(),
            answer: answer.into(),
        });
    }

    /// Turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Number of turns held
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turn has been recorded
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// `Q: …\nA: …` lines for prompts
    pub fn render(&self) -> String {
        if self.turns.is_empty() {
            return EMPTY_MEMORY.to_string();
        }
        self.turns
            .iter()
            .map(|t| format!("Q: {}\nA: {}", t.question, t.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Handle to one session's log; lock it for the duration of a request
pub type SessionHandle = Arc<AsyncMutex<SessionLog>>;

/// Session key → memory log, with explicit open / close
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    max_turns: usize,
}

impl SessionStore {
    /// Store whose logs keep `max_turns` turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns,
        }
    }

    /// Handle for `key`, creating an empty log on first use
    pub fn open(&self, key: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(session = %key, "Opened session");
                Arc::new(AsyncMutex::new(SessionLog::new(self.max_turns)))
            })
            .clone()
    }

    /// Existing handle for `key`
    pub fn get(&self, key: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(key).cloned()
    }

    /// Dispose of a session; returns false when it was not open
    ///
    /// Requests already holding the handle finish against the detached log.
    pub fn close(&self, key: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let removed = sessions.remove(key).is_some();
        if removed {
            debug!(session = %key, "Closed session");
        }
        removed
    }

    /// Number of open sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// True when no session is open
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded_fifo() {
        let mut log = SessionLog::new(2);
        log.push("q1", "a1");
        log.push("q2", "a2");
        log.push("q3", "a3");
        let questions: Vec<&str> = log.turns().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3"]);
    }

    #[test]
    fn test_render() {
        let mut log = SessionLog::new(8);
        assert_eq!(log.render(), EMPTY_MEMORY);
        log.push("욕설 대응?", "기록하세요");
        assert_eq!(log.render(), "Q: 욕설 대응?\nA: 기록하세요");
    }

    #[tokio::test]
    async fn test_open_returns_same_handle() {
        let store = SessionStore::default();
        let a = store.open("call:1");
        let b = store.open("call:1");
        assert!(Arc::ptr_eq(&a, &b));

        a.lock().await.push("q", "a");
        assert_eq!(b.lock().await.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_close_disposes_log() {
        let store = SessionStore::default();
        store.open("call:1").lock().await.push("q", "a");

        assert!(store.close("call:1"));
        assert!(!store.close("call:1"));
        assert!(store.get("call:1").is_none());
        assert!(store.open("call:1").lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_lock_serializes_same_session() {
        let store = Arc::new(SessionStore::default());
        let handle = store.open("s");
        let guard = handle.lock().await;

        let other = store.open("s");
        assert!(other.try_lock().is_err());
        drop(guard);
        assert!(other.try_lock().is_ok());
    }
}
