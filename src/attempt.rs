//! One user's running quiz: the session plus its side effects.
//!
//! Two kinds of writes leave an attempt:
//! - answered-question events, spawned after the local score update and never
//!   awaited by the quiz flow (failures are logged and dropped);
//! - the history record, written only once the session is `Completed` and
//!   awaited by the caller, who sees any failure.
//!
//! Spawning requires a Tokio runtime.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::QuizError;
use crate::model::{AnsweredQuestionEvent, QuizConfig, QuizHistoryRecord, UserId};
use crate::session::{AnswerOutcome, QuizSession, SessionState};
use crate::store::HistoryRecorder;

pub struct QuizAttempt {
    user: UserId,
    config: QuizConfig,
    session: QuizSession,
    history: Arc<dyn HistoryRecorder>,
    pending: Vec<JoinHandle<()>>,
    recorded: Option<QuizHistoryRecord>,
}

impl fmt::Debug for QuizAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizAttempt")
            .field("user", &self.user)
            .field("config", &self.config)
            .field("state", self.session.state())
            .field("pending_events", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl QuizAttempt {
    pub fn new(user: UserId, config: QuizConfig, session: QuizSession, history: Arc<dyn HistoryRecorder>) -> Self {
        Self { user, config, session, history, pending: Vec::new(), recorded: None }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Apply the answer locally, then record it in the background.
    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome, QuizError> {
        let outcome = self.session.submit_answer(answer)?;

        let event = AnsweredQuestionEvent {
            user_id: self.user.clone(),
            question: outcome.question.clone(),
            subject: self.config.subject().to_string(),
            grade: self.config.grade().to_string(),
            is_correct: outcome.is_correct,
            timestamp: Utc::now(),
        };
        let history = Arc::clone(&self.history);

        self.pending.retain(|handle| !handle.is_finished());
        self.pending.push(tokio::spawn(async move {
            match history.append_answered_event(&event).await {
                Ok(()) => debug!(user = %event.user_id, correct = event.is_correct, "Recorded answered question"),
                Err(e) => warn!(error = %e, user = %event.user_id, "Failed to record answered question"),
            }
        }));

        Ok(outcome)
    }

    pub fn advance(&mut self) -> Result<&SessionState, QuizError> {
        self.session.advance()
    }

    /// Wait for background event writes started so far.
    pub async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Answered-question task did not finish");
            }
        }
    }

    /// Persist the history record for a completed session.
    ///
    /// A failure leaves the session completed; calling again retries the
    /// write. After a successful write the stored record is returned again
    /// without writing twice.
    #[instrument(target = "kidsquiz::attempt", skip(self), fields(user = %self.user))]
    pub async fn record_completion(&mut self) -> Result<QuizHistoryRecord, QuizError> {
        if let Some(record) = &self.recorded {
            return Ok(record.clone());
        }
        let SessionState::Completed { score } = *self.session.state() else {
            return Err(QuizError::SessionNotCompleted);
        };

        let record = QuizHistoryRecord {
            user_id: self.user.clone(),
            date: Utc::now(),
            subject: self.config.subject().to_string(),
            grade: self.config.grade().to_string(),
            score,
            total_questions: self.session.total(),
        };

        self.history.insert_history_record(&record).await.map_err(|e| {
            warn!(error = %e, "Failed to save quiz result");
            QuizError::from(e)
        })?;

        info!(score, total = record.total_questions, "Saved quiz result");
        self.recorded = Some(record.clone());
        Ok(record)
    }
}
