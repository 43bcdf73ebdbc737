use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// How a session collects its answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueMode {
    /// No mode chosen yet; the next reply is matched against mode phrases.
    #[default]
    Unset,
    /// One field per turn, driven by the cursor.
    Guided,
    /// Every missing field is mined from each reply.
    Bulk,
}

impl DialogueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueMode::Unset => "unset",
            DialogueMode::Guided => "guided",
            DialogueMode::Bulk => "bulk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unset" => Some(DialogueMode::Unset),
            "guided" => Some(DialogueMode::Guided),
            "bulk" => Some(DialogueMode::Bulk),
            _ => None,
        }
    }
}

impl std::fmt::Display for DialogueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the last generation attempt recorded on a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// A structured artifact was produced.
    Artifact { artifact: serde_json::Value },
    /// Every attempt failed. `diagnostic` holds the last raw output, if any.
    Failure {
        message: String,
        diagnostic: Option<String>,
    },
}

// =============================================================================
// Newtype Wrappers - Temporal
// =============================================================================

/// Unix timestamp in seconds since epoch.
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }
}

// =============================================================================
// Session
// =============================================================================

/// Per-conversation state of one slot-filling dialogue.
///
/// Invariants maintained by the dialogue engine:
/// - `mode` moves away from `Unset` at most once;
/// - `answers` only holds field ids of the schema named by `schema_id`;
/// - `cursor` is `Some` only while `mode == Guided` and collection is open;
/// - `completed` is set only once an artifact has been recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub schema_id: String,
    pub mode: DialogueMode,
    /// Field id to canonical value.
    pub answers: BTreeMap<String, String>,
    /// Field awaiting a guided answer.
    pub cursor: Option<String>,
    pub completed: bool,
    /// Consecutive bulk turns that recorded nothing.
    pub stalled_turns: u32,
    /// Whether the one-time default fill has been spent.
    pub grace_used: bool,
    pub outcome: Option<GenerationOutcome>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// A fresh session with no mode and no answers.
    pub fn new(session_id: impl Into<String>, schema_id: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            session_id: session_id.into(),
            schema_id: schema_id.into(),
            mode: DialogueMode::Unset,
            answers: BTreeMap::new(),
            cursor: None,
            completed: false,
            stalled_turns: 0,
            grace_used: false,
            outcome: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the mode if none has been chosen. Returns false when the mode
    /// was already fixed.
    pub fn choose_mode(&mut self, mode: DialogueMode) -> bool {
        if self.mode != DialogueMode::Unset || mode == DialogueMode::Unset {
            return false;
        }
        self.mode = mode;
        true
    }

    /// The recorded artifact, if generation has succeeded.
    pub fn artifact(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            Some(GenerationOutcome::Artifact { artifact }) => Some(artifact),
            _ => None,
        }
    }

    /// Whether `field_id` holds a non-blank value.
    pub fn has_answer(&self, field_id: &str) -> bool {
        self.answers
            .get(field_id)
            .is_some_and(|v| !v.trim().is_empty())
    }

    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// Generate an opaque session id for callers that do not supply one.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
