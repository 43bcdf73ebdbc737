//! Field schemas and the registry that resolves them by domain.
//!
//! A [`Schema`] is an ordered list of [`FieldSpec`]s plus the per-domain
//! policies the resolver consults. Schemas are built once and shared
//! read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::catalog;
use crate::error::DialogueError;

// =============================================================================
// Matchers and rules
// =============================================================================

/// How a rule recognizes its input.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// The whole trimmed, lowercased text equals one of the phrases.
    Exact(Vec<String>),
    /// Any keyword occurs as a whole word, ignoring case.
    Keyword(Regex),
    /// A regular expression whose capture groups fill the output template.
    Pattern(Regex),
}

/// One normalization rule: a matcher and the canonical value it yields.
///
/// For [`Matcher::Pattern`] rules the output may reference capture groups
/// as `{1}`, `{2}`, ...
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: Matcher,
    output: String,
}

impl Rule {
    pub fn exact(phrases: &[&str], output: &str) -> Self {
        Self {
            matcher: Matcher::Exact(phrases.iter().map(|p| p.to_lowercase()).collect()),
            output: output.to_string(),
        }
    }

    /// Word-bounded, case-insensitive keyword rule.
    ///
    /// # Panics
    ///
    /// Panics if `keywords` is empty.
    pub fn keywords(keywords: &[&str], output: &str) -> Self {
        assert!(!keywords.is_empty(), "keyword rule needs at least one keyword");
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
            .expect("escaped keywords always form a valid regex");
        Self {
            matcher: Matcher::Keyword(re),
            output: output.to_string(),
        }
    }

    /// Case-insensitive pattern rule for built-in schemas.
    ///
    /// # Panics
    ///
    /// Panics on an invalid pattern. Use [`Rule::try_pattern`] for patterns
    /// that are not compile-time constants.
    pub fn pattern(pattern: &str, output: &str) -> Self {
        Self::try_pattern(pattern, output).expect("Invalid field pattern")
    }

    pub fn try_pattern(pattern: &str, output: &str) -> Result<Self, DialogueError> {
        let re = Regex::new(&format!("(?i){}", pattern))
            .map_err(|e| DialogueError::InvalidSchema(e.to_string()))?;
        Ok(Self {
            matcher: Matcher::Pattern(re),
            output: output.to_string(),
        })
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Canonical value for `text`, or `None` if the rule does not match.
    pub fn apply(&self, text: &str) -> Option<String> {
        match &self.matcher {
            Matcher::Exact(phrases) => {
                let folded = text.trim().to_lowercase();
                phrases
                    .iter()
                    .any(|p| *p == folded)
                    .then(|| self.output.clone())
            }
            Matcher::Keyword(re) => re.is_match(text).then(|| self.output.clone()),
            Matcher::Pattern(re) => {
                let caps = re.captures(text)?;
                let mut out = self.output.clone();
                for i in 1..caps.len() {
                    let value = caps.get(i).map(|m| m.as_str().trim()).unwrap_or("");
                    out = out.replace(&format!("{{{}}}", i), value);
                }
                let out = out.trim().to_string();
                (!out.is_empty()).then_some(out)
            }
        }
    }
}

// =============================================================================
// Fields
// =============================================================================

/// Whether a field takes one value or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// First matching rule wins.
    One,
    /// Every matching rule contributes, joined with ", " in rule order.
    Many,
}

/// One slot to fill.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub id: String,
    pub prompt: String,
    pub required: bool,
    pub default: String,
    pub cardinality: Cardinality,
    pub rules: Vec<Rule>,
    /// Capture patterns used in bulk replies for free-text fields. When
    /// present they replace `rules` as the bulk matcher set; the capture
    /// is then normalized with `rules`.
    pub cues: Vec<Regex>,
}

impl FieldSpec {
    pub fn new(id: &str, prompt: &str, default: &str) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            required: true,
            default: default.to_string(),
            cardinality: Cardinality::One,
            rules: Vec::new(),
            cues: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn many(mut self) -> Self {
        self.cardinality = Cardinality::Many;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a bulk cue.
    ///
    /// # Panics
    ///
    /// Panics on an invalid pattern or one without a capture group.
    pub fn cue(mut self, pattern: &str) -> Self {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("Invalid cue pattern");
        assert!(re.captures_len() > 1, "cue pattern needs a capture group");
        self.cues.push(re);
        self
    }
}

// =============================================================================
// Policies
// =============================================================================

/// What a skip phrase means in a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipAction {
    /// Record the default for the affected field(s).
    UseDefault,
    /// Record nothing; the field stays missing.
    Ignore,
}

/// Per-schema handling of "don't know" style replies.
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    pub phrases: Vec<String>,
    pub guided: SkipAction,
    pub bulk: SkipAction,
}

impl SkipPolicy {
    pub fn is_skip(&self, text: &str) -> bool {
        let folded = text.trim().trim_end_matches(['.', '!']).to_lowercase();
        !folded.is_empty() && self.phrases.iter().any(|p| *p == folded)
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self {
            phrases: [
                "no", "none", "nothing", "don't know", "dont know", "idk", "skip", "n/a",
                "na", "?", "not sure", "no idea", "whatever",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            guided: SkipAction::UseDefault,
            bulk: SkipAction::Ignore,
        }
    }
}

static DEFAULTS_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:use|go with|take|pick)\s+(?:the\s+)?defaults?\b|\bdefaults?\s+(?:is|are)\s+fine\b|\byou\s+(?:choose|decide|pick)\b",
    )
    .expect("Invalid defaults phrase regex")
});

/// When a stalled bulk session may be completed with defaults.
///
/// The fill happens at most once per session.
#[derive(Debug, Clone)]
pub struct GracePolicy {
    /// Consecutive bulk turns without progress before defaults are used.
    /// `None` disables the stall trigger; the explicit phrase still works.
    pub after_stalled_turns: Option<u32>,
    /// Whole-word phrases asking for defaults outright.
    pub defaults_phrase: Regex,
}

impl GracePolicy {
    pub fn new(after_stalled_turns: Option<u32>) -> Self {
        Self {
            after_stalled_turns,
            defaults_phrase: DEFAULTS_PHRASE.clone(),
        }
    }

    pub fn asks_for_defaults(&self, text: &str) -> bool {
        self.defaults_phrase.is_match(text)
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Domain id plus ordered fields; immutable once built.
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: String,
    /// Human name used in prompts and artifacts, e.g. "bread".
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub skip: SkipPolicy,
    pub grace: GracePolicy,
    pub choose_mode_prompt: String,
    /// Option labels offered with the choose-mode prompt.
    pub mode_options: [String; 2],
    /// Instructions handed to the generation service.
    pub generation_brief: String,
    /// Field whose answer becomes the format hint.
    pub format_field: Option<String>,
}

impl Schema {
    /// Build a schema, rejecting duplicate field ids.
    pub fn new(
        id: &str,
        title: &str,
        fields: Vec<FieldSpec>,
        generation_brief: &str,
    ) -> Result<Self, DialogueError> {
        if fields.is_empty() {
            return Err(DialogueError::InvalidSchema(format!("{} has no fields", id)));
        }
        for (i, f) in fields.iter().enumerate() {
            if fields[..i].iter().any(|g| g.id == f.id) {
                return Err(DialogueError::InvalidSchema(format!(
                    "{} declares field {} twice",
                    id, f.id
                )));
            }
        }
        let format_field = fields
            .iter()
            .any(|f| f.id == "format")
            .then(|| "format".to_string());
        Ok(Self {
            id: id.to_string(),
            title: title.to_string(),
            fields,
            skip: SkipPolicy::default(),
            grace: GracePolicy::new(Some(2)),
            choose_mode_prompt: format!(
                "Would you like me to ask about your {} one question at a time, or all at once?",
                title
            ),
            mode_options: ["one-by-one".to_string(), "all-at-once".to_string()],
            generation_brief: generation_brief.to_string(),
            format_field,
        })
    }

    pub fn with_grace(mut self, grace: GracePolicy) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_skip(mut self, skip: SkipPolicy) -> Self {
        self.skip = skip;
        self
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Lookup from domain id to schema.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    aliases: HashMap<String, String>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Registry holding the built-in bread and recipe schemas.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(catalog::bread_schema());
        registry.register(catalog::recipe_schema());
        registry.alias("recipes", "recipe");
        registry.alias("breads", "bread");
        registry
    }

    /// Add or replace a schema under its own id.
    pub fn register(&mut self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.id.to_lowercase(), Arc::clone(&schema));
        schema
    }

    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases
            .insert(alias.to_lowercase(), target.to_lowercase());
    }

    /// Resolve a domain id. Lookup is trimmed and case-insensitive.
    pub fn resolve(&self, domain: &str) -> Result<Arc<Schema>, DialogueError> {
        let key = domain.trim().to_lowercase();
        let key = self.aliases.get(&key).cloned().unwrap_or(key);
        self.schemas
            .get(&key)
            .cloned()
            .ok_or_else(|| DialogueError::UnknownDomain(domain.trim().to_string()))
    }

    pub fn domains(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.schemas.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
