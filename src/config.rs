use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::clients::ClientType;
use crate::error::ConfigError;

pub const ENV_PROVIDER: &str = "KIDSQUIZ_PROVIDER";
pub const ENV_MODEL: &str = "KIDSQUIZ_MODEL";
pub const ENV_DATA_DIR: &str = "KIDSQUIZ_DATA_DIR";
pub const ENV_TRANSCRIPT_DIR: &str = "KIDSQUIZ_TRANSCRIPT_DIR";
pub const ENV_USER_ID: &str = "KIDSQUIZ_USER_ID";
pub const ENV_DISPLAY_NAME: &str = "KIDSQUIZ_DISPLAY_NAME";

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|k| !k.trim().is_empty())
    }

    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::MissingKey(Self::KEY_NAME))
    }
}

/// Process-level settings, read once at startup and handed to the collaborators.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ClientType,
    /// Overrides the provider's default model id
    pub model: Option<String>,
    pub data_dir: PathBuf,
    /// When set, every generator prompt/response pair is written here
    pub transcript_dir: Option<PathBuf>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ClientType::default(),
            model: None,
            data_dir: PathBuf::from(".kidsquiz"),
            transcript_dir: None,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

impl AppConfig {
    /// Build from the process environment (after loading `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Some(provider) = non_empty_var(ENV_PROVIDER) {
            config.provider = ClientType::from_str(&provider)?;
        }
        config.model = non_empty_var(ENV_MODEL);
        if let Some(dir) = non_empty_var(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        config.transcript_dir = non_empty_var(ENV_TRANSCRIPT_DIR).map(PathBuf::from);

        debug!(provider = %config.provider, data_dir = %config.data_dir.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn with_provider(mut self, provider: ClientType) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = dir;
        self
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
