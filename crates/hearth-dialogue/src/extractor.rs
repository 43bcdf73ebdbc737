//! Answer extraction for the two collection profiles.
//!
//! Extraction only proposes raw candidates; the normalizer turns them into
//! canonical values. A field that nothing matched is simply absent from
//! the result.

use std::collections::BTreeMap;

use tracing::debug;

use crate::normalizer;
use crate::schema::{FieldSpec, Schema, SkipAction};

/// Field id to candidate value.
pub type ExtractionResult = BTreeMap<String, String>;

/// Guided profile: the whole reply answers `field`.
///
/// A skip phrase stands for the field's default when the schema says so.
/// An empty reply yields nothing, so the same field is asked again.
pub fn extract_guided(schema: &Schema, field: &FieldSpec, text: &str) -> ExtractionResult {
    let mut result = ExtractionResult::new();
    let text = text.trim();
    if text.is_empty() {
        return result;
    }

    if schema.skip.is_skip(text) {
        match schema.skip.guided {
            SkipAction::UseDefault => {
                debug!(field = %field.id, "Skip phrase, using default");
                result.insert(field.id.clone(), field.default.clone());
            }
            SkipAction::Ignore => {}
        }
        return result;
    }

    result.insert(field.id.clone(), text.to_string());
    result
}

/// Bulk profile: mine one utterance for every field in `candidates`.
///
/// Fields with cues are matched through their cues and the captured text
/// is the candidate, unless it is itself a skip phrase; all other fields
/// must be recognized by one of their rules. A reply that is nothing but a skip phrase is handled by the
/// schema's bulk skip action.
pub fn extract_bulk(schema: &Schema, candidates: &[&FieldSpec], text: &str) -> ExtractionResult {
    let mut result = ExtractionResult::new();
    let text = text.trim();
    if text.is_empty() {
        return result;
    }

    if schema.skip.is_skip(text) {
        if schema.skip.bulk == SkipAction::UseDefault {
            for field in candidates {
                result.insert(field.id.clone(), field.default.clone());
            }
        }
        return result;
    }

    for field in candidates {
        if let Some(value) = match_field(schema, field, text) {
            result.insert(field.id.clone(), value);
        }
    }

    debug!(
        schema = %schema.id,
        matched = result.len(),
        candidates = candidates.len(),
        "Bulk extraction finished"
    );
    result
}

fn match_field(schema: &Schema, field: &FieldSpec, text: &str) -> Option<String> {
    if field.cues.is_empty() {
        return normalizer::recognize(field, text);
    }
    field.cues.iter().find_map(|cue| {
        let captured = cue.captures(text)?.get(1)?.as_str().trim();
        (!captured.is_empty() && !schema.skip.is_skip(captured)).then(|| captured.to_string())
    })
}
