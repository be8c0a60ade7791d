//! Configuration for the pipeline

use crate::error::PipelineError;
use callguard_evidence::DEFAULT_EVIDENCE_LIMIT;
use callguard_store::DEFAULT_MAX_TURNS;
use serde::{Deserialize, Serialize};

/// Configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum fused evidence items per answer
    pub evidence_limit: usize,

    /// Retrieval matches requested per query
    pub top_k: usize,

    /// Maximum keyword hints taken from the lexicon
    pub hint_limit: usize,

    /// Maximum law mentions recovered from prose model output
    pub law_mention_limit: usize,

    /// Turns kept in each session's memory
    pub max_turns: usize,

    /// Transcript lines included in prompts
    pub transcript_line_cap: usize,

    /// Capacity of the per-request event channel
    pub stream_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            evidence_limit: DEFAULT_EVIDENCE_LIMIT,
            top_k: 5,
            hint_limit: 8,
            law_mention_limit: 5,
            max_turns: DEFAULT_MAX_TURNS,
            transcript_line_cap: 60,
            stream_buffer: 64,
        }
    }
}

impl PipelineConfig {
    /// Wide retrieval and long memory, for well-provisioned deployments
    pub fn thorough() -> Self {
        Self {
            evidence_limit: 5,
            top_k: 10,
            hint_limit: 8,
            law_mention_limit: 8,
            max_turns: 16,
            transcript_line_cap: 120,
            stream_buffer: 128,
        }
    }

    /// Narrow retrieval and short prompts, for small local models
    pub fn compact() -> Self {
        Self {
            evidence_limit: 3,
            top_k: 3,
            hint_limit: 4,
            law_mention_limit: 3,
            max_turns: 4,
            transcript_line_cap: 30,
            stream_buffer: 32,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        let positive = [
            ("evidence_limit", self.evidence_limit),
            ("top_k", self.top_k),
            ("hint_limit", self.hint_limit),
            ("law_mention_limit", self.law_mention_limit),
            ("max_turns", self.max_turns),
            ("transcript_line_cap", self.transcript_line_cap),
            ("stream_buffer", self.stream_buffer),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(PipelineError::Config(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }
}
