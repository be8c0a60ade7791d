//! Classifier oracle adapters
//!
//! - `HttpClassifier`: remote model server (`POST {endpoint}` with `{"text"}`)
//! - `MockClassifier`: deterministic oracle for tests and development

use crate::error::FilterError;
use callguard_domain::traits::{ClassifierOracle, ClassifierOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Default timeout for classifier requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    probabilities: Vec<f64>,
    #[serde(default)]
    label: String,
}

/// Client for a model server that returns `{probabilities, label}`
pub struct HttpClassifier {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpClassifier {
    /// Create a client with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FilterError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FilterError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FilterError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ClassifierOracle for HttpClassifier {
    type Error = FilterError;

    fn classify(&self, text: &str) -> Result<ClassifierOutput, Self::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .map_err(|e| FilterError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FilterError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ClassifyResponse = response
            .json()
            .map_err(|e| FilterError::Malformed(format!("Failed to parse response: {}", e)))?;
        debug!(label = %parsed.label, "Classifier responded");

        Ok(ClassifierOutput {
            probabilities: parsed.probabilities,
            argmax_label: parsed.label,
        })
    }
}

/// Deterministic classifier oracle
///
/// Returns a fixed output unless a specific text has been scripted. Clones
/// share the call counter.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    default_output: Option<ClassifierOutput>,
    scripted: Arc<Mutex<HashMap<String, ClassifierOutput>>>,
    failure: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl MockClassifier {
    /// Always return `probabilities` with `label`
    pub fn fixed(probabilities: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            default_output: Some(ClassifierOutput {
                probabilities,
                argmax_label: label.into(),
            }),
            scripted: Arc::new(Mutex::new(HashMap::new())),
            failure: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Confidently normal on every input
    pub fn normal() -> Self {
        Self::fixed(vec![0.01, 0.01, 0.01, 0.97], "정상")
    }

    /// Fail every call with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default_output: None,
            scripted: Arc::new(Mutex::new(HashMap::new())),
            failure: Some(message.into()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script the output for one exact text
    pub fn add_output(&self, text: impl Into<String>, probabilities: Vec<f64>, label: impl Into<String>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.insert(
                text.into(),
                ClassifierOutput {
                    probabilities,
                    argmax_label: label.into(),
                },
            );
        }
    }

    /// Number of classify calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::normal()
    }
}

impl ClassifierOracle for MockClassifier {
    type Error = FilterError;

    fn classify(&self, text: &str) -> Result<ClassifierOutput, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(FilterError::Upstream(message.clone()));
        }

        let scripted = self
            .scripted
            .lock()
            .map_err(|_| FilterError::Upstream("mock state poisoned".to_string()))?;
        if let Some(output) = scripted.get(text) {
            return Ok(output.clone());
        }

        self.default_output
            .clone()
            .ok_or_else(|| FilterError::Upstream("no scripted output".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_scripted_outputs() {
        let mock = MockClassifier::normal();
        mock.add_output("넌 끝났어", vec![0.0, 0.0, 0.99, 0.01], "협박");

        assert_eq!(mock.classify("넌 끝났어").unwrap().argmax_label, "협박");
        assert_eq!(mock.classify("안녕하세요").unwrap().argmax_label, "정상");
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_mock_clone_shares_counter() {
        let a = MockClassifier::normal();
        let b = a.clone();
        a.classify("x").unwrap();
        assert_eq!(b.call_count(), 1);
    }

    #[test]
    fn test_http_classifier_unreachable() {
        let classifier =
            HttpClassifier::with_timeout("http://127.0.0.1:9/classify", Duration::from_millis(200))
                .unwrap();
        assert_eq!(classifier.endpoint(), "http://127.0.0.1:9/classify");
        assert!(matches!(
            classifier.classify("테스트"),
            Err(FilterError::Upstream(_))
        ));
    }
}
