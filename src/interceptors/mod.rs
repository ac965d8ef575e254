//! Transcript capture for generator round-trips.

use async_trait::async_trait;
use std::fmt::Debug;

pub type InterceptorError = Box<dyn std::error::Error + Send + Sync>;

/// Receives every prompt sent to the completion API together with the raw reply.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, prompt: &str, response: &str) -> Result<(), InterceptorError>;
}

pub mod file;
pub use file::FileInterceptor;
