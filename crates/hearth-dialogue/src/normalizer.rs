//! Maps raw candidate text to a field's canonical value.
//!
//! Normalization is total: text no rule recognizes is returned trimmed.
//! Every canonical output a schema declares normalizes to itself, so
//! applying the normalizer twice is the same as applying it once.

use tracing::debug;

use crate::schema::{Cardinality, FieldSpec};

/// Canonical value of `raw` for `field`.
pub fn normalize(field: &FieldSpec, raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() {
        return String::new();
    }
    match recognize(field, text) {
        Some(value) => value,
        None => {
            debug!(field = %field.id, value = %text, "No rule matched, keeping text as given");
            text.to_string()
        }
    }
}

/// Canonical value if at least one rule matches `text`.
///
/// Used by bulk extraction, where an unrecognized utterance must not be
/// taken as an answer.
pub fn recognize(field: &FieldSpec, text: &str) -> Option<String> {
    match field.cardinality {
        Cardinality::One => field.rules.iter().find_map(|r| r.apply(text)),
        Cardinality::Many => {
            let mut values: Vec<String> = Vec::new();
            for rule in &field.rules {
                if let Some(v) = rule.apply(text) {
                    if !values.contains(&v) {
                        values.push(v);
                    }
                }
            }
            (!values.is_empty()).then(|| values.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{bread_schema, recipe_schema};
    use crate::schema::{Rule, Schema};

    fn field<'a>(schema: &'a Schema, id: &str) -> &'a FieldSpec {
        schema.field(id).unwrap()
    }

    // ---- Behavior ----

    #[test]
    fn test_unmatched_text_passes_through_trimmed() {
        let schema = bread_schema();
        assert_eq!(
            normalize(field(&schema, "bread_type"), "  my grandmother's loaf "),
            "my grandmother's loaf"
        );
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let schema = bread_schema();
        assert_eq!(normalize(field(&schema, "experience"), "   "), "");
    }

    #[test]
    fn test_first_rule_wins_for_single_fields() {
        let f = FieldSpec::new("x", "?", "")
            .rule(Rule::keywords(&["a"], "first"))
            .rule(Rule::keywords(&["a"], "second"));
        assert_eq!(normalize(&f, "a"), "first");
    }

    #[test]
    fn test_many_fields_join_in_rule_order() {
        let schema = bread_schema();
        assert_eq!(
            normalize(field(&schema, "flours"), "manitoba and some 00"),
            "all-purpose/00, manitoba"
        );
    }

    #[test]
    fn test_recognize_rejects_unknown_text() {
        let schema = bread_schema();
        assert!(recognize(field(&schema, "experience"), "pineapple").is_none());
    }

    #[test]
    fn test_bread_examples() {
        let schema = bread_schema();
        let cases = [
            ("experience", "I'm a total newbie", "beginner"),
            ("bread_type", "Focaccia!", "focaccia"),
            ("leavening", "no yeast please", "none"),
            ("leavening", "my liquid starter", "liquid starter"),
            ("equipment", "kitchenaid and a pizza stone", "stand mixer, baking stone"),
            ("fermentation_time", "overnight", "12h"),
            ("fermentation_time", "36 hours", "36h"),
            ("room_temperature", "about 21 C", "21°C"),
            ("room_temperature", "70F", "70°F"),
            ("room_temperature", "22", "22°C"),
            ("final_amount", "one loaf", "1 loaf"),
            ("final_amount", "2 loaves", "2 loaves"),
            ("final_amount", "12 rolls", "12 rolls"),
            ("final_amount", "1.5 kg", "1.5 kg"),
            ("dietary", "gluten free", "gluten-free"),
            ("format", "compact", "compact and schematic"),
        ];
        for (id, raw, expected) in cases {
            assert_eq!(normalize(field(&schema, id), raw), expected, "{}: {}", id, raw);
        }
    }

    #[test]
    fn test_recipe_examples() {
        let schema = recipe_schema();
        let cases = [
            ("dish_type", "a main course", "main course"),
            ("cuisine", "thai food", "Thai"),
            ("include_ingredients", "include chicken and lemon", "chicken and lemon"),
            ("avoid_ingredients", "without nuts", "nuts"),
            ("time_available", "45 minutes", "45 min"),
            ("time_available", "2 hours", "2h"),
            ("servings", "serves 6", "6"),
            ("servings", "4 people", "4"),
            ("servings", "just me", "1"),
            ("special_goal", "something to impress", "gourmet"),
        ];
        for (id, raw, expected) in cases {
            assert_eq!(normalize(field(&schema, id), raw), expected, "{}: {}", id, raw);
        }
    }

    // ---- Idempotence ----

    fn assert_idempotent(schema: &Schema) {
        for f in &schema.fields {
            let mut samples: Vec<String> = vec![f.default.clone()];
            for rule in &f.rules {
                // Templates are checked through the examples below.
                if !rule.output().contains('{') {
                    samples.push(rule.output().to_string());
                }
            }
            for sample in samples {
                let once = normalize(f, &sample);
                assert_eq!(once, sample, "{}.{} is not canonical", schema.id, f.id);
                assert_eq!(normalize(f, &once), once);
            }
        }
    }

    #[test]
    fn test_bread_canonical_values_are_fixed_points() {
        assert_idempotent(&bread_schema());
    }

    #[test]
    fn test_recipe_canonical_values_are_fixed_points() {
        assert_idempotent(&recipe_schema());
    }

    #[test]
    fn test_normalize_twice_equals_once() {
        let bread = bread_schema();
        let recipe = recipe_schema();
        let inputs = [
            "24 hours",
            "about 21 C",
            "3 loaves",
            "500 grams",
            "1.5 kg",
            "serves 4",
            "90 minutes",
            "include include garlic",
            "avoid shellfish",
            "hand kneading, dutch oven",
            "something odd",
            "18",
        ];
        for schema in [&bread, &recipe] {
            for f in &schema.fields {
                for raw in inputs {
                    let once = normalize(f, raw);
                    assert_eq!(normalize(f, &once), once, "{}.{}: {}", schema.id, f.id, raw);
                }
            }
        }
    }
}
