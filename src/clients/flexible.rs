use crate::clients::mock::{MockClient, MockHandle, MockResponse};
use crate::clients::openai::{models::OpenAIModel, OpenAIClient, OpenAIConfig};
#[cfg(feature = "anthropic")]
use crate::clients::claude::{ClaudeClient, ClaudeConfig};
#[cfg(feature = "deepseek")]
use crate::clients::deepseek::{DeepSeekClient, DeepSeekConfig};
use crate::config::{AppConfig, KeyFromEnv};
use crate::core::LowLevelClient;
use crate::error::{AIError, ConfigError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Which completion provider backs the question generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientType {
    OpenAI,
    #[cfg(feature = "anthropic")]
    Claude,
    #[cfg(feature = "deepseek")]
    DeepSeek,
    Mock,
}

impl Default for ClientType {
    /// Pick the first provider whose API key is available, else the mock.
    fn default() -> Self {
        if OpenAIClient::find_key().is_some() {
            return Self::OpenAI;
        }
        #[cfg(feature = "anthropic")]
        if ClaudeClient::find_key().is_some() {
            return Self::Claude;
        }
        #[cfg(feature = "deepseek")]
        if DeepSeekClient::find_key().is_some() {
            return Self::DeepSeek;
        }
        Self::Mock
    }
}

impl ClientType {
    /// Parse client type from string (case insensitive)
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            #[cfg(feature = "anthropic")]
            "claude" | "anthropic" => Ok(Self::Claude),
            #[cfg(feature = "deepseek")]
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientType::OpenAI => write!(f, "OpenAI"),
            #[cfg(feature = "anthropic")]
            ClientType::Claude => write!(f, "Claude"),
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

/// Flexible client that wraps any LowLevelClient chosen at runtime
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    kind: ClientType,
    inner: Arc<dyn LowLevelClient>,
}

impl FlexibleClient {
    pub fn new(kind: ClientType, client: Box<dyn LowLevelClient>) -> Self {
        Self { kind, inner: Arc::from(client) }
    }

    /// Build the provider named in `config`, requiring its API key.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        info!(provider = %config.provider, "Selecting completion provider");
        let client: Box<dyn LowLevelClient> = match config.provider {
            ClientType::OpenAI => {
                let mut openai = OpenAIConfig {
                    api_key: OpenAIClient::require_key()?,
                    temperature: config.temperature,
                    max_tokens: config.max_tokens,
                    ..OpenAIConfig::default()
                };
                if let Some(model) = &config.model {
                    openai.model = OpenAIModel::from_id(model);
                }
                Box::new(OpenAIClient::new(openai))
            }
            #[cfg(feature = "anthropic")]
            ClientType::Claude => {
                let mut claude = ClaudeConfig {
                    api_key: ClaudeClient::require_key()?,
                    temperature: config.temperature,
                    max_tokens: config.max_tokens,
                    ..ClaudeConfig::default()
                };
                if let Some(model) = &config.model {
                    claude = claude.with_model(model.clone());
                }
                Box::new(ClaudeClient::new(claude))
            }
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => {
                let mut deepseek = DeepSeekConfig {
                    api_key: DeepSeekClient::require_key()?,
                    temperature: config.temperature,
                    max_tokens: config.max_tokens,
                    ..DeepSeekConfig::default()
                };
                if let Some(model) = &config.model {
                    deepseek.model = model.clone();
                }
                Box::new(DeepSeekClient::new(deepseek))
            }
            ClientType::Mock => {
                // Uncontrollable mock: only cached questions can be served
                let (mock, _handle) = MockClient::new();
                Box::new(mock)
            }
        };
        Ok(Self::new(config.provider.clone(), client))
    }

    pub fn mock_with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::with_responses(responses);
        (Self::new(ClientType::Mock, Box::new(mock_client)), handle)
    }

    pub fn kind(&self) -> &ClientType {
        &self.kind
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
