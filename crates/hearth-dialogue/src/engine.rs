//! The dialogue engine: one entry point per user turn.

use std::sync::Arc;

use tracing::{debug, info, warn};

use hearth_core::config::HearthConfig;
use hearth_core::types::{GenerationOutcome, Session};
use hearth_storage::SessionPersistence;

use crate::error::DialogueError;
use crate::generation::{GenerationOrchestrator, GenerationService, RetryPolicy};
use crate::locks::KeyedLocks;
use crate::resolver::{self, ResolveOptions, Step};
use crate::schema::{Schema, SchemaRegistry};
use crate::store::SessionStore;
use crate::types::{TurnRequest, TurnResponse};

/// Longest accepted session id.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Limits and defaults applied to every turn.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub max_message_length: usize,
    pub grace_enabled: bool,
    pub language: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&HearthConfig::default())
    }
}

impl From<&HearthConfig> for EngineSettings {
    fn from(config: &HearthConfig) -> Self {
        Self {
            max_message_length: config.dialogue.max_message_length,
            grace_enabled: config.dialogue.grace_enabled,
            language: config.general.language.clone(),
        }
    }
}

pub struct DialogueEngine {
    registry: SchemaRegistry,
    store: Arc<SessionStore>,
    orchestrator: GenerationOrchestrator,
    settings: EngineSettings,
    generation_gates: KeyedLocks,
}

impl DialogueEngine {
    pub fn new(
        registry: SchemaRegistry,
        persistence: Arc<dyn SessionPersistence>,
        orchestrator: GenerationOrchestrator,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            store: Arc::new(SessionStore::new(persistence)),
            orchestrator,
            settings,
            generation_gates: KeyedLocks::new(),
        }
    }

    /// Engine over the built-in schemas, configured from `config`.
    pub fn from_config(
        config: &HearthConfig,
        persistence: Arc<dyn SessionPersistence>,
        service: Arc<dyn GenerationService>,
    ) -> Self {
        let orchestrator = GenerationOrchestrator::new(service, RetryPolicy::from(&config.generation));
        Self::new(
            SchemaRegistry::builtin(),
            persistence,
            orchestrator,
            EngineSettings::from(config),
        )
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Current state of a session, if it exists.
    pub async fn session(&self, session_id: &str) -> Result<Option<Session>, DialogueError> {
        self.store.get(session_id).await
    }

    /// Process one user turn.
    ///
    /// Validation failures are returned as `Err` before any session is
    /// touched. Generation failures are not errors here: they come back as
    /// [`TurnResponse::Error`] and leave the session retryable.
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse, DialogueError> {
        validate_session_id(&request.session_id)?;
        if request.text.chars().count() > self.settings.max_message_length {
            return Err(DialogueError::MessageTooLong(self.settings.max_message_length));
        }
        let schema = self.registry.resolve(&request.domain)?;

        let opts = ResolveOptions {
            grace_enabled: self.settings.grace_enabled,
        };
        let (session, step) = self
            .store
            .apply(&request.session_id, &schema, |session| {
                resolver::advance(&schema, session, &request.text, opts)
            })
            .await?;

        debug!(
            session_id = %request.session_id,
            mode = %session.mode,
            answered = session.answers.len(),
            step = ?step,
            "Turn processed"
        );

        if let Some(response) = TurnResponse::from_step(&schema, step.clone()) {
            return Ok(response);
        }

        match (step, session.artifact()) {
            (Step::Completed, Some(artifact)) => Ok(TurnResponse::Success {
                artifact: artifact.clone(),
            }),
            _ => {
                let language = request
                    .language
                    .clone()
                    .unwrap_or_else(|| self.settings.language.clone());
                self.generate(schema, &request.session_id, language).await
            }
        }
    }

    /// Run generation for a frozen session and record the outcome.
    async fn generate(
        &self,
        schema: Arc<Schema>,
        session_id: &str,
        language: String,
    ) -> Result<TurnResponse, DialogueError> {
        let gate = self.generation_gates.lock(session_id).await;

        // Another turn may have finished generating while we waited.
        let session = self.store.get(session_id).await?.ok_or_else(|| {
            DialogueError::Storage(format!("session {} vanished before generation", session_id))
        })?;
        if let Some(artifact) = session.artifact() {
            return Ok(TurnResponse::Success {
                artifact: artifact.clone(),
            });
        }

        let request = GenerationOrchestrator::build_request(&schema, &session, &language);
        let orchestrator = self.orchestrator.clone();
        let store = Arc::clone(&self.store);
        let sid = session_id.to_string();

        info!(
            session_id = %sid,
            service = %orchestrator.service_name(),
            "Starting generation"
        );

        // Detached so the outcome is recorded even if the caller goes away.
        let task = tokio::spawn(async move {
            let _gate = gate;
            let outcome = orchestrator.invoke(&request).await;
            let recorded = outcome.clone();
            store
                .apply(&sid, &schema, move |session| {
                    session.completed = matches!(recorded, GenerationOutcome::Artifact { .. });
                    session.outcome = Some(recorded);
                })
                .await?;
            Ok::<_, DialogueError>(outcome)
        });

        let outcome = task
            .await
            .map_err(|e| DialogueError::TaskFailed(e.to_string()))??;

        Ok(match outcome {
            GenerationOutcome::Artifact { artifact } => {
                info!(session_id = %session_id, "Session completed");
                TurnResponse::Success { artifact }
            }
            GenerationOutcome::Failure {
                message,
                diagnostic,
            } => {
                warn!(session_id = %session_id, error = %message, "Generation failed");
                TurnResponse::Error {
                    message,
                    diagnostic,
                }
            }
        })
    }
}

/// Session ids are opaque but must be non-empty, bounded and made of
/// ASCII letters, digits, `-`, `_` or `.`.
pub fn validate_session_id(session_id: &str) -> Result<(), DialogueError> {
    let well_formed = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if well_formed {
        Ok(())
    } else {
        Err(DialogueError::InvalidSessionId(session_id.to_string()))
    }
}
