mod chat;
#[cfg(feature = "anthropic")]
pub mod claude;
#[cfg(feature = "deepseek")]
pub mod deepseek;
pub mod flexible;
pub mod mock;
pub mod openai;

#[cfg(feature = "anthropic")]
pub use claude::{ClaudeClient, ClaudeConfig};
#[cfg(feature = "deepseek")]
pub use deepseek::{DeepSeekClient, DeepSeekConfig};
pub use flexible::*;
pub use mock::*;
pub use openai::{OpenAIClient, OpenAIConfig};
