//! Narrative commentary client for the Groq chat-completions API

use crate::error::{PipelineError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default chat model used for commentary.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for the narrative API.
///
/// The credential is injected here once at startup and never read from
/// global state afterwards.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    /// API credential
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub api_base: String,
    /// Chat model identifier
    pub model: String,
    /// Upper bound on one commentary request
    pub timeout: Duration,
}

impl NarrativeConfig {
    /// Create a configuration with an explicit credential and defaults for
    /// everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: GROQ_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the credential from the process environment.
    ///
    /// A missing or empty credential is fatal before any input is accepted.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(PipelineError::Configuration(format!(
                "{} is missing; set it in the environment or a .env file",
                API_KEY_VAR
            ))),
        }
    }

    /// Override the chat model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Anything that can turn a composed prompt into commentary text.
///
/// The pipeline depends on this seam rather than on the concrete client, so
/// tests can substitute a stub without touching the network.
#[async_trait]
pub trait CommentaryGenerator: Send + Sync {
    /// Produce commentary for a fully composed prompt.
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String>;
}

/// Chat-completions client for narrative commentary
pub struct NarrativeClient {
    config: NarrativeConfig,
    client: Client<OpenAIConfig>,
}

impl NarrativeClient {
    /// Create a client from explicit configuration.
    pub fn new(config: NarrativeConfig) -> Self {
        let openai = OpenAIConfig::new()
            .with_api_base(config.api_base.clone())
            .with_api_key(config.api_key.clone());

        Self {
            client: Client::with_config(openai),
            config,
        }
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }
}

#[async_trait]
impl CommentaryGenerator for NarrativeClient {
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages(vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: system_instruction.into(),
                    ..Default::default()
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: prompt.into(),
                    ..Default::default()
                }),
            ])
            .build()
            .map_err(|e| PipelineError::Narrative(format!("Request build failed: {}", e)))?;

        debug!(model = %self.config.model, "sending commentary request");

        let response = timeout(self.config.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PipelineError::Narrative(format!(
                    "Commentary request timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|e| PipelineError::Narrative(format!("Chat completion failed: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Narrative("Model returned an empty response".to_string())
            })
    }
}
