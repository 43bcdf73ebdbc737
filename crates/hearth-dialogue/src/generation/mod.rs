//! Generation orchestration.
//!
//! Builds a request from a frozen answer set, calls the configured
//! [`GenerationService`] with a per-attempt timeout and a bounded number
//! of retries, and recovers a structured artifact from whatever comes back.

pub mod echo;
pub mod http;
pub mod recovery;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use hearth_core::config::GenerationConfig;
use hearth_core::types::{GenerationOutcome, Session};

use crate::error::GenerationError;
use crate::schema::Schema;

pub use echo::EchoGenerationService;
pub use http::HttpGenerationService;

// =============================================================================
// Request / response
// =============================================================================

/// One canonical answer, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub field: String,
    pub value: String,
}

/// Everything the generation service sees.
///
/// Dialogue bookkeeping (mode, cursor, counters) is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub domain: String,
    pub brief: String,
    pub answers: Vec<AnswerEntry>,
    pub format_hint: Option<String>,
    pub language: String,
}

impl GenerationRequest {
    pub fn answer(&self, field: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.field == field)
            .map(|a| a.value.as_str())
    }
}

/// Raw result of a service call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    /// The service already returned parsed JSON.
    Structured(Value),
    /// Free text that may contain an artifact.
    Text(String),
}

/// An external generator of artifacts.
#[async_trait]
pub trait GenerationService: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GenerationError>;
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Attempt limits for one generation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Duration,
}

impl From<&GenerationConfig> for RetryPolicy {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            attempt_timeout: Duration::from_secs(config.timeout_secs.max(1)),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

/// Wraps a [`GenerationService`] with timeouts, retries and output recovery.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    service: Arc<dyn GenerationService>,
    policy: RetryPolicy,
}

impl GenerationOrchestrator {
    pub fn new(service: Arc<dyn GenerationService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Snapshot the canonical answers of a frozen session.
    ///
    /// Optional fields left unanswered are sent with their defaults.
    pub fn build_request(schema: &Schema, session: &Session, language: &str) -> GenerationRequest {
        let answers = schema
            .fields
            .iter()
            .filter_map(|f| {
                let value = session
                    .answers
                    .get(&f.id)
                    .filter(|v| !v.trim().is_empty())
                    .cloned()
                    .or_else(|| (!f.required).then(|| f.default.clone()))?;
                Some(AnswerEntry {
                    field: f.id.clone(),
                    value,
                })
            })
            .collect();

        let format_hint = schema
            .format_field
            .as_ref()
            .and_then(|id| session.answers.get(id))
            .cloned();

        GenerationRequest {
            domain: schema.id.clone(),
            brief: schema.generation_brief.clone(),
            answers,
            format_hint,
            language: language.to_string(),
        }
    }

    /// Run generation to completion: an artifact, or a failure carrying
    /// the most recent raw output seen by any attempt as diagnostic.
    pub async fn invoke(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut last_error: Option<GenerationError> = None;
        let mut last_diagnostic: Option<String> = None;

        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(request).await {
                Ok(artifact) => {
                    info!(
                        service = %self.service.name(),
                        domain = %request.domain,
                        attempt,
                        "Generation succeeded"
                    );
                    return GenerationOutcome::Artifact { artifact };
                }
                Err(e) => {
                    warn!(
                        service = %self.service.name(),
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        "Generation attempt failed"
                    );
                    last_diagnostic = e.diagnostic().or(last_diagnostic);
                    last_error = Some(e);
                }
            }
            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.backoff).await;
            }
        }

        let message = last_error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "generation was not attempted".to_string());
        GenerationOutcome::Failure {
            message,
            diagnostic: last_diagnostic,
        }
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let output = tokio::time::timeout(self.policy.attempt_timeout, self.service.generate(request))
            .await
            .map_err(|_| GenerationError::Timeout(self.policy.attempt_timeout.as_secs()))??;

        match output {
            GenerationOutput::Structured(v @ (Value::Object(_) | Value::Array(_))) => Ok(v),
            GenerationOutput::Structured(other) => {
                let raw = other.to_string();
                recovery::recover_artifact(&raw).ok_or(GenerationError::Unparseable { raw })
            }
            GenerationOutput::Text(raw) => {
                debug!(len = raw.len(), "Recovering artifact from text output");
                recovery::recover_artifact(&raw).ok_or(GenerationError::Unparseable { raw })
            }
        }
    }
}
