//! Completeness resolution: one collection step per turn.
//!
//! [`advance`] is a pure function of the schema, the session and the
//! reply. It records answers, moves the cursor and decides whether the
//! session needs more questions or is ready for generation. The caller is
//! responsible for running it under the session's lock.

use tracing::{debug, info};

use hearth_core::types::{DialogueMode, Session};

use crate::extractor::{self, ExtractionResult};
use crate::mode;
use crate::normalizer;
use crate::schema::{FieldSpec, Schema};

/// Outcome of one collection step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// No mode chosen yet; re-issue the mode question.
    ChooseMode,
    /// Guided: ask exactly this field next.
    Ask { field_id: String, prompt: String },
    /// Bulk: ask for every field still missing, in schema order.
    AskMany { fields: Vec<(String, String)> },
    /// Every required field is filled; the answers are frozen.
    Ready,
    /// An artifact was already recorded for this session.
    Completed,
}

/// Per-call knobs that come from configuration rather than the schema.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub grace_enabled: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            grace_enabled: true,
        }
    }
}

/// Required fields without a value, in schema order.
pub fn missing_fields<'a>(schema: &'a Schema, session: &Session) -> Vec<&'a FieldSpec> {
    schema
        .required_fields()
        .filter(|f| !session.has_answer(&f.id))
        .collect()
}

/// Run one step of collection for `text`.
pub fn advance(schema: &Schema, session: &mut Session, text: &str, opts: ResolveOptions) -> Step {
    if session.completed {
        return Step::Completed;
    }

    // Frozen answer set: only generation remains.
    if missing_fields(schema, session).is_empty() && session.mode != DialogueMode::Unset {
        session.cursor = None;
        return Step::Ready;
    }

    if session.mode == DialogueMode::Unset {
        let Some(chosen) = mode::select_mode(text) else {
            return Step::ChooseMode;
        };
        session.choose_mode(chosen);
        info!(session_id = %session.session_id, mode = %chosen, "Dialogue mode selected");
        // The selecting reply is not mined for answers.
        return next_step(schema, session);
    }

    match session.mode {
        DialogueMode::Guided => collect_guided(schema, session, text),
        DialogueMode::Bulk => collect_bulk(schema, session, text, opts),
        DialogueMode::Unset => {}
    }

    next_step(schema, session)
}

fn collect_guided(schema: &Schema, session: &mut Session, text: &str) {
    let field = session
        .cursor
        .as_deref()
        .and_then(|id| schema.field(id))
        .filter(|f| !session.has_answer(&f.id))
        .or_else(|| missing_fields(schema, session).into_iter().next());

    let Some(field) = field else {
        return;
    };

    let candidates = extractor::extract_guided(schema, field, text);
    record(schema, session, candidates);
}

fn collect_bulk(schema: &Schema, session: &mut Session, text: &str, opts: ResolveOptions) {
    let candidates: Vec<&FieldSpec> = schema
        .fields
        .iter()
        .filter(|f| !session.has_answer(&f.id))
        .collect();

    let extracted = extractor::extract_bulk(schema, &candidates, text);
    let recorded = record(schema, session, extracted);

    if recorded > 0 {
        session.stalled_turns = 0;
    } else {
        session.stalled_turns += 1;
    }

    if !opts.grace_enabled || session.grace_used {
        return;
    }
    let stalled_out = schema
        .grace
        .after_stalled_turns
        .is_some_and(|n| session.stalled_turns >= n);
    if stalled_out || schema.grace.asks_for_defaults(text) {
        let filled = fill_defaults(schema, session);
        session.grace_used = true;
        session.stalled_turns = 0;
        info!(
            session_id = %session.session_id,
            filled,
            "Missing fields completed with defaults"
        );
    }
}

/// Normalize and store candidates for fields that are still empty.
/// Returns how many answers were recorded.
fn record(schema: &Schema, session: &mut Session, candidates: ExtractionResult) -> usize {
    let mut recorded = 0;
    for (field_id, raw) in candidates {
        let Some(field) = schema.field(&field_id) else {
            continue;
        };
        if session.has_answer(&field.id) {
            continue;
        }
        let value = normalizer::normalize(field, &raw);
        if value.is_empty() {
            continue;
        }
        debug!(field = %field.id, value = %value, "Answer recorded");
        session.answers.insert(field.id.clone(), value);
        recorded += 1;
    }
    recorded
}

fn fill_defaults(schema: &Schema, session: &mut Session) -> usize {
    let missing: Vec<(String, String)> = missing_fields(schema, session)
        .into_iter()
        .map(|f| (f.id.clone(), f.default.clone()))
        .collect();
    let filled = missing.len();
    session.answers.extend(missing);
    filled
}

fn next_step(schema: &Schema, session: &mut Session) -> Step {
    let missing = missing_fields(schema, session);
    if missing.is_empty() {
        session.cursor = None;
        return Step::Ready;
    }

    match session.mode {
        DialogueMode::Guided => {
            let field = missing[0];
            session.cursor = Some(field.id.clone());
            Step::Ask {
                field_id: field.id.clone(),
                prompt: field.prompt.clone(),
            }
        }
        DialogueMode::Bulk => {
            session.cursor = None;
            Step::AskMany {
                fields: missing
                    .iter()
                    .map(|f| (f.id.clone(), f.prompt.clone()))
                    .collect(),
            }
        }
        DialogueMode::Unset => Step::ChooseMode,
    }
}
