//! Entry points used by a front end: start a quiz, show the dashboard.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::attempt::QuizAttempt;
use crate::dashboard::Dashboard;
use crate::error::QuizError;
use crate::generator::QuestionGenerator;
use crate::identity::{IdentityProvider, UserProfile};
use crate::model::{QuizConfig, UserId};
use crate::session::QuizSession;
use crate::sourcing::QuestionSourcingService;
use crate::store::{HistoryRecorder, QuestionRepository};

#[derive(Debug)]
pub struct QuizApp<G: QuestionGenerator> {
    sourcing: QuestionSourcingService<G>,
    history: Arc<dyn HistoryRecorder>,
    identity: Arc<dyn IdentityProvider>,
}

impl<G: QuestionGenerator> QuizApp<G> {
    pub fn new(
        repository: Arc<dyn QuestionRepository>,
        history: Arc<dyn HistoryRecorder>,
        generator: G,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            sourcing: QuestionSourcingService::new(repository, Arc::clone(&history), generator),
            history,
            identity,
        }
    }

    pub fn current_user(&self) -> Result<UserProfile, QuizError> {
        self.identity.current_user().ok_or(QuizError::NotAuthenticated)
    }

    /// Source the questions and open a session for the signed-in user.
    #[instrument(target = "kidsquiz::app", skip(self, config), fields(topic = %config.topic()))]
    pub async fn start_quiz(&self, config: QuizConfig) -> Result<QuizAttempt, QuizError> {
        let user = self.current_user()?;
        let questions = self.sourcing.fetch_questions(&user.id, &config).await?;
        let session = QuizSession::new(questions)?;
        info!(user = %user.id, questions = session.total(), "Quiz started");
        Ok(QuizAttempt::new(user.id, config, session, Arc::clone(&self.history)))
    }

    /// History of the signed-in user.
    pub async fn dashboard(&self) -> Result<Dashboard, QuizError> {
        let user = self.current_user()?;
        self.dashboard_for(&user.id).await
    }

    pub async fn dashboard_for(&self, user: &UserId) -> Result<Dashboard, QuizError> {
        Dashboard::load(self.history.as_ref(), user).await
    }
}
