use async_trait::async_trait;
use rig::client::Nothing;
use rig::completion::Prompt;
use rig::prelude::CompletionClient;
use rig::providers::ollama;
use tracing::{debug, error};

use crate::errors::GenerationError;

pub const DEFAULT_MODEL: &str = "llama3.2";
const TEMPERATURE: f64 = 0.8;
const MAX_OUTPUT_TOKENS: u64 = 2048;
const PREAMBLE: &str = "Eres un narrador experto en culturas prehispánicas mexicanas. \
                        Escribes en español, con respeto y autenticidad cultural, \
                        y sigues al pie de la letra el formato que se te pide.";

/// Prompt in, full text out. No streaming and no partial results.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Story generator backed by a local Ollama model through rig.
/// A fresh agent is built per call; the full history travels in the prompt.
#[derive(Clone)]
pub struct OllamaStoryAgent {
    client: ollama::Client,
    base_url: String,
    model: String,
}

impl OllamaStoryAgent {
    pub fn new(base_url: &str, model: &str) -> Result<Self, GenerationError> {
        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(base_url)
            .build()
            .map_err(|e| {
                error!("Failed to build Ollama client for {base_url}: {e}");
                GenerationError::Unavailable { host: base_url.to_string() }
            })?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        })
    }

    fn classify(&self, message: String) -> GenerationError {
        if message.contains("Connection refused") || message.contains("connect") {
            GenerationError::Unavailable { host: self.base_url.clone() }
        } else if message.contains("model") && message.contains("not found") {
            GenerationError::ModelNotFound { model: self.model.clone() }
        } else {
            GenerationError::Inference { message }
        }
    }
}

#[async_trait]
impl StoryGenerator for OllamaStoryAgent {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(PREAMBLE)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_OUTPUT_TOKENS)
            .build();

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "requesting chapter");

        let text = agent.prompt(prompt).await.map_err(|e| {
            error!("Ollama story generation failed: {e}");
            self.classify(e.to_string())
        })?;

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}
