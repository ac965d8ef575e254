use thiserror::Error;

use crate::model::EntryId;

/// Errors surfaced by question sourcing, quiz sessions and history recording.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(#[from] StoreError),
    #[error("Question generator unavailable: {0}")]
    GeneratorUnavailable(String),
    #[error("Malformed generator output: {0}")]
    MalformedGeneratorOutput(String),
    #[error("Insufficient questions: expected {expected}, got {actual}")]
    InsufficientQuestions { expected: usize, actual: usize },
    #[error("Invalid question set: {0}")]
    InvalidQuestionSet(String),
    #[error("Question {index} has already been answered")]
    DuplicateAnswerSubmission { index: usize },
    #[error("Question {index} must be answered before advancing")]
    AnswerRequired { index: usize },
    #[error("Quiz session is already completed")]
    SessionCompleted,
    #[error("Quiz session is not completed yet")]
    SessionNotCompleted,
    #[error("Invalid quiz configuration: {0}")]
    InvalidConfig(String),
    #[error("No user is signed in")]
    NotAuthenticated,
}

impl QuizError {
    /// Whether the caller may reasonably offer a manual retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RepositoryUnavailable(_)
                | Self::GeneratorUnavailable(_)
                | Self::MalformedGeneratorOutput(_)
                | Self::InsufficientQuestions { .. }
        )
    }
}

impl From<AIError> for QuizError {
    fn from(err: AIError) -> Self {
        Self::GeneratorUnavailable(err.to_string())
    }
}

/// Failures of the document store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Question bank entry not found: {0}")]
    NotFound(EntryId),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing API key: set {0} in the environment or .env file")]
    MissingKey(&'static str),
    #[error("Unknown provider: '{0}'. Supported: openai, claude, deepseek, mock")]
    UnknownProvider(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Mock client error: {0}")]
    Mock(String),
    #[error("Empty completion")]
    EmptyCompletion,
}

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}
