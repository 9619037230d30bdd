pub mod llm_client;

pub use llm_client::{AnswerModel, GenerationConfig, OpenAiModel, ResponseFormat};
