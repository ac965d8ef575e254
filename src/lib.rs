pub mod app;
pub mod attempt;
pub mod clients;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod identity;
pub mod interceptors;
pub mod json_utils;
pub mod model;
pub mod session;
pub mod sourcing;
pub mod store;

// Convenient re-exports
pub use app::QuizApp;
pub use attempt::QuizAttempt;
pub use dashboard::{Dashboard, DashboardSummary};
pub use error::{QuizError, StoreError};
pub use generator::{GenerationRequest, LlmQuestionGenerator, QuestionGenerator};
pub use model::{Difficulty, Question, QuizConfig, QuizHistoryRecord, UserId};
pub use session::{AnswerOutcome, QuizSession, SessionState};
pub use sourcing::QuestionSourcingService;
