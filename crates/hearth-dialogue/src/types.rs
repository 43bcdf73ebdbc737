//! Turn-level request and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DialogueError;
use crate::resolver::Step;
use crate::schema::Schema;

/// One user message addressed to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub text: String,
    pub domain: String,
    /// Output language for generation; falls back to the configured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TurnRequest {
    pub fn new(
        session_id: impl Into<String>,
        domain: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            domain: domain.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// The engine's reply to a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnResponse {
    ChooseMode {
        prompt: String,
        options: Vec<String>,
    },
    Question(Question),
    Success {
        artifact: Value,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diagnostic: Option<String>,
    },
}

/// Guided turns ask one field, bulk turns ask every missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Question {
    Single {
        field_id: String,
        prompt: String,
    },
    Many {
        missing_fields: Vec<String>,
        prompts: Vec<String>,
    },
}

impl TurnResponse {
    /// Map a collection step that still needs input.
    ///
    /// Returns `None` for [`Step::Ready`] and [`Step::Completed`], which are
    /// answered by generation instead.
    pub fn from_step(schema: &Schema, step: Step) -> Option<Self> {
        match step {
            Step::ChooseMode => Some(TurnResponse::ChooseMode {
                prompt: schema.choose_mode_prompt.clone(),
                options: schema.mode_options.to_vec(),
            }),
            Step::Ask { field_id, prompt } => {
                Some(TurnResponse::Question(Question::Single { field_id, prompt }))
            }
            Step::AskMany { fields } => {
                let (missing_fields, prompts) = fields.into_iter().unzip();
                Some(TurnResponse::Question(Question::Many {
                    missing_fields,
                    prompts,
                }))
            }
            Step::Ready | Step::Completed => None,
        }
    }

    pub fn error(err: &DialogueError) -> Self {
        TurnResponse::Error {
            message: err.to_string(),
            diagnostic: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TurnResponse::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::bread_schema;
    use serde_json::json;

    #[test]
    fn test_choose_mode_wire_shape() {
        let resp = TurnResponse::from_step(&bread_schema(), Step::ChooseMode).unwrap();
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["status"], "choose_mode");
        assert_eq!(v["options"], json!(["one-by-one", "all-at-once"]));
        assert!(v["prompt"].as_str().unwrap().contains("bread"));
    }

    #[test]
    fn test_guided_question_wire_shape() {
        let resp = TurnResponse::Question(Question::Single {
            field_id: "experience".into(),
            prompt: "How experienced are you?".into(),
        });
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            v,
            json!({"status": "question", "field_id": "experience", "prompt": "How experienced are you?"})
        );
    }

    #[test]
    fn test_bulk_question_wire_shape() {
        let step = Step::AskMany {
            fields: vec![
                ("flours".into(), "Which flours?".into()),
                ("dietary".into(), "Any diet?".into()),
            ],
        };
        let resp = TurnResponse::from_step(&bread_schema(), step).unwrap();
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["status"], "question");
        assert_eq!(v["missing_fields"], json!(["flours", "dietary"]));
        assert_eq!(v["prompts"], json!(["Which flours?", "Any diet?"]));

        let back: TurnResponse = serde_json::from_value(v).unwrap();
        assert_eq!(back, resp);
    }

    #[test]
    fn test_error_omits_missing_diagnostic() {
        let resp = TurnResponse::error(&DialogueError::UnknownDomain("pizza".into()));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v, json!({"status": "error", "message": "unknown domain: pizza"}));
    }

    #[test]
    fn test_ready_steps_have_no_question() {
        assert!(TurnResponse::from_step(&bread_schema(), Step::Ready).is_none());
        assert!(TurnResponse::from_step(&bread_schema(), Step::Completed).is_none());
    }

    #[test]
    fn test_turn_request_language_is_optional() {
        let req: TurnRequest =
            serde_json::from_str(r#"{"session_id":"a","text":"hi","domain":"bread"}"#).unwrap();
        assert_eq!(req.language, None);
        assert_eq!(req, TurnRequest::new("a", "bread", "hi"));
    }
}
