//! Slot-filling dialogue engine for Hearth.
//!
//! Collects a schema's fields from free-form replies, either one question
//! at a time or all at once, then hands the frozen answers to a generation
//! service and records the resulting artifact.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod generation;
pub mod locks;
pub mod mode;
pub mod normalizer;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod types;

pub use engine::{DialogueEngine, EngineSettings};
pub use error::{DialogueError, GenerationError};
pub use generation::{
    AnswerEntry, EchoGenerationService, GenerationOrchestrator, GenerationOutput,
    GenerationRequest, GenerationService, HttpGenerationService, RetryPolicy,
};
pub use resolver::{ResolveOptions, Step};
pub use schema::{Cardinality, FieldSpec, GracePolicy, Rule, Schema, SchemaRegistry, SkipAction, SkipPolicy};
pub use store::SessionStore;
pub use types::{Question, TurnRequest, TurnResponse};
