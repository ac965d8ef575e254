use super::chat::{ChatRequest, ChatResponse};
use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, DeepSeekError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

const CHAT_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// DeepSeek speaks the OpenAI chat-completions protocol.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: DeepSeekClient::find_key().unwrap_or_default(),
            model: "deepseek-chat".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model, "Creating new DeepSeek client");
        Self { config, client: Client::new() }
    }
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = ChatRequest::quiz(&self.config.model, self.config.max_tokens, self.config.temperature, &prompt);

        debug!("Sending request to DeepSeek API");
        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                DeepSeekError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from DeepSeek API");
        match status.as_u16() {
            429 => {
                warn!("DeepSeek API rate limit exceeded");
                return Err(DeepSeekError::RateLimit.into());
            }
            401 => {
                error!("DeepSeek API authentication failed");
                return Err(DeepSeekError::Authentication.into());
            }
            _ if !status.is_success() => {
                let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                error!(status = %status, error = %error_text, "DeepSeek API error");
                return Err(DeepSeekError::Api(error_text).into());
            }
            _ => {}
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse DeepSeek response JSON");
            DeepSeekError::Http(e.to_string())
        })?;
        if !parsed.has_choices() {
            error!("No choices in DeepSeek response");
            return Err(DeepSeekError::Api("No choices in response".to_string()).into());
        }
        let content = parsed.into_content().ok_or(AIError::EmptyCompletion)?;

        info!(response_len = content.len(), "Successfully received DeepSeek response");
        Ok(content)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
