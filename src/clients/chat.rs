//! Wire types for OpenAI-compatible chat completion endpoints.

use serde::{Deserialize, Serialize};

pub(crate) const SYSTEM_PROMPT: &str =
    "You are a quiz generator that responds only with valid JSON arrays containing question objects.";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    /// System instruction followed by the quiz prompt.
    pub fn quiz(model: &'a str, max_tokens: u32, temperature: f32, prompt: &'a str) -> Self {
        Self {
            model,
            max_tokens,
            temperature,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Text of the first choice, `None` when missing or blank.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}
