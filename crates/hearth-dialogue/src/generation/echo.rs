//! Offline generation service.
//!
//! Produces a deterministic artifact straight from the request, which keeps
//! the dialogue usable without network access and gives tests a stable
//! generator.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{GenerationOutput, GenerationRequest, GenerationService};
use crate::error::GenerationError;

#[derive(Debug, Default, Clone, Copy)]
pub struct EchoGenerationService;

impl EchoGenerationService {
    pub fn new() -> Self {
        Self
    }

    fn artifact(request: &GenerationRequest) -> Value {
        let preferences: Map<String, Value> = request
            .answers
            .iter()
            .map(|a| (a.field.clone(), Value::String(a.value.clone())))
            .collect();

        let kind = request
            .answer("bread_type")
            .or_else(|| request.answer("dish_type"))
            .unwrap_or(request.domain.as_str());
        let title = match request.answer("cuisine").filter(|c| *c != "any") {
            Some(cuisine) => format!("{} {}", cuisine, kind),
            None => capitalize(kind),
        };

        json!({
            "title": title,
            "domain": request.domain,
            "language": request.language,
            "format": request.format_hint,
            "preferences": preferences,
            "steps": [
                "Gather the ingredients and equipment listed in the preferences.",
                "Prepare and combine the ingredients.",
                "Cook or bake, then rest before serving.",
            ],
        })
    }
}

#[async_trait]
impl GenerationService for EchoGenerationService {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, GenerationError> {
        Ok(GenerationOutput::Structured(Self::artifact(request)))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::AnswerEntry;

    fn entry(field: &str, value: &str) -> AnswerEntry {
        AnswerEntry {
            field: field.into(),
            value: value.into(),
        }
    }

    #[tokio::test]
    async fn test_echo_artifact_is_deterministic() {
        let request = GenerationRequest {
            domain: "bread".into(),
            brief: String::new(),
            answers: vec![entry("bread_type", "focaccia"), entry("leavening", "dry yeast")],
            format_hint: Some("compact and schematic".into()),
            language: "en".into(),
        };
        let service = EchoGenerationService::new();
        let first = service.generate(&request).await.unwrap();
        let second = service.generate(&request).await.unwrap();
        assert_eq!(first, second);

        let GenerationOutput::Structured(artifact) = first else {
            panic!("echo service returns structured output");
        };
        assert_eq!(artifact["title"], "Focaccia");
        assert_eq!(artifact["preferences"]["leavening"], "dry yeast");
        assert_eq!(artifact["format"], "compact and schematic");
    }

    #[test]
    fn test_title_uses_cuisine() {
        let request = GenerationRequest {
            domain: "recipe".into(),
            brief: String::new(),
            answers: vec![entry("dish_type", "main course"), entry("cuisine", "Italian")],
            format_hint: None,
            language: "en".into(),
        };
        assert_eq!(EchoGenerationService::artifact(&request)["title"], "Italian main course");
    }
}
