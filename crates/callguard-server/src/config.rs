//! Configuration file parsing for the server.
//!
//! Loads settings from a TOML file with one section per collaborator:
//! `[server]`, `[llm]`, `[retrieval]`, `[classifier]`, `[lexicon]` and
//! `[pipeline]`. Every section and field has a default.

use callguard_pipeline::{PipelineConfig, PipelineError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid or missing value
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Invalid pipeline section
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener
    pub server: ListenSection,

    /// Completion and embedding model server
    pub llm: LlmSection,

    /// Guideline retrieval backend
    pub retrieval: RetrievalSection,

    /// Abusive-speech classifier
    pub classifier: ClassifierSection,

    /// Word-list overrides
    pub lexicon: LexiconSection,

    /// Request pipeline tuning
    pub pipeline: PipelineConfig,
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSection {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,
}

impl Default for ListenSection {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
        }
    }
}

/// `[llm]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Model server endpoint
    pub endpoint: String,

    /// Completion model
    pub chat_model: String,

    /// Embedding model
    pub embed_model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per embedding request
    pub max_retries: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            endpoint: callguard_llm::ollama::DEFAULT_ENDPOINT.to_string(),
            chat_model: "llama3.1".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            temperature: 0.2,
            timeout_secs: callguard_llm::ollama::DEFAULT_TIMEOUT_SECS,
            max_retries: callguard_llm::ollama::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Which retrieval backend answers guideline queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalBackend {
    /// In-process index built from a documents file
    Local,
    /// Hosted vector index over HTTP
    Hosted,
}

/// `[retrieval]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSection {
    /// Backend selection
    pub backend: RetrievalBackend,

    /// Documents file for the local backend
    pub documents: Option<PathBuf>,

    /// Index host for the hosted backend
    pub host: String,

    /// API key for the hosted backend
    pub api_key: Option<String>,

    /// Namespace within the hosted index
    pub namespace: Option<String>,

    /// Request timeout in seconds for the hosted backend
    pub timeout_secs: u64,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            backend: RetrievalBackend::Local,
            documents: None,
            host: String::new(),
            api_key: None,
            namespace: None,
            timeout_secs: callguard_store::http_index::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[classifier]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Prediction endpoint returning `{probabilities, label}`
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8001/predict".to_string(),
            timeout_secs: callguard_filter::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[lexicon]`
///
/// Both paths must be given to replace the built-in profanity lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSection {
    /// `{"badwords": [...]}` file
    pub badwords: Option<PathBuf>,

    /// `{"force_block": [...]}` file
    pub force_block: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Local development: local model server and in-process index
    pub fn development() -> Self {
        Self::default()
    }

    /// Hosted index with a larger retrieval window
    pub fn hosted(host: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            server: ListenSection {
                bind_address: "0.0.0.0".to_string(),
                ..Default::default()
            },
            retrieval: RetrievalSection {
                backend: RetrievalBackend::Hosted,
                host: host.into(),
                api_key,
                ..Default::default()
            },
            pipeline: PipelineConfig::thorough(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind_address is empty".to_string()));
        }
        let required = [
            ("llm.endpoint", &self.llm.endpoint),
            ("llm.chat_model", &self.llm.chat_model),
            ("llm.embed_model", &self.llm.embed_model),
            ("classifier.endpoint", &self.classifier.endpoint),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} is empty", name)));
            }
        }
        if self.llm.timeout_secs == 0 || self.classifier.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than 0".to_string()));
        }
        if self.retrieval.backend == RetrievalBackend::Hosted && self.retrieval.host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "retrieval.host is required for the hosted backend".to_string(),
            ));
        }
        if self.lexicon.badwords.is_some() != self.lexicon.force_block.is_some() {
            return Err(ConfigError::Invalid(
                "lexicon.badwords and lexicon.force_block must be set together".to_string(),
            ));
        }
        self.pipeline.validate()?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.retrieval.backend, RetrievalBackend::Local);
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(ServerConfig::development().validate().is_ok());

        let hosted = ServerConfig::hosted("https://index.example", Some("key".to_string()));
        assert!(hosted.validate().is_ok());
        assert_eq!(hosted.bind_addr(), "0.0.0.0:8000");
        assert_eq!(hosted.pipeline, PipelineConfig::thorough());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [server]
            bind_address = "0.0.0.0"
            bind_port = 9000

            [llm]
            chat_model = "qwen2.5"

            [retrieval]
            backend = "hosted"
            host = "https://index.example"
            namespace = "guidelines"

            [pipeline]
            top_k = 8
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.llm.chat_model, "qwen2.5");
        assert_eq!(config.llm.embed_model, "nomic-embed-text");
        assert_eq!(config.retrieval.backend, RetrievalBackend::Hosted);
        assert_eq!(config.retrieval.namespace.as_deref(), Some("guidelines"));
        assert_eq!(config.pipeline.top_k, 8);
        assert_eq!(config.pipeline.evidence_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hosted_requires_host() {
        let config: ServerConfig = toml::from_str("[retrieval]\nbackend = \"hosted\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retrieval.host"));
    }

    #[test]
    fn test_lexicon_paths_set_together() {
        let config: ServerConfig =
            toml::from_str("[lexicon]\nbadwords = \"/etc/callguard/badwords.json\"").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_pipeline_section() {
        let config: ServerConfig = toml::from_str("[pipeline]\nevidence_limit = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Pipeline(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind_port = 8080").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind_port, 8080);

        let missing = ServerConfig::from_file("/nonexistent/callguard.toml");
        assert!(matches!(missing, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/callguard.toml");
        let config = ServerConfig::from_file(path).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind_port = ").unwrap();
        assert!(matches!(
            ServerConfig::from_file(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
