//! Question sourcing: serve unused banked questions first, generate the rest.
//!
//! `fetch_questions` either returns exactly `number_of_questions` questions or
//! fails as a whole. Nothing is retried here; the caller decides whether to
//! offer a retry.
//!
//! There is no lock around the "query unused, then mark used" pair. Two
//! concurrent requests for the same user may pick the same entry; marking is
//! an idempotent set insert, so the only effect is a repeated question.

use futures_util::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::QuizError;
use crate::generator::{GenerationRequest, QuestionGenerator};
use crate::model::{NewQuestionEntry, Question, QuizConfig, Topic, UserId};
use crate::store::{HistoryRecorder, QuestionRepository};

#[derive(Debug, Clone)]
pub struct QuestionSourcingService<G: QuestionGenerator> {
    repository: Arc<dyn QuestionRepository>,
    history: Arc<dyn HistoryRecorder>,
    generator: G,
}

impl<G: QuestionGenerator> QuestionSourcingService<G> {
    pub fn new(repository: Arc<dyn QuestionRepository>, history: Arc<dyn HistoryRecorder>, generator: G) -> Self {
        Self { repository, history, generator }
    }

    #[instrument(
        target = "kidsquiz::sourcing",
        skip(self, config),
        fields(user = %user, topic = %config.topic(), count = config.number_of_questions())
    )]
    pub async fn fetch_questions(&self, user: &UserId, config: &QuizConfig) -> Result<Vec<Question>, QuizError> {
        let count = config.number_of_questions();
        let topic = config.topic();

        let mut cached = self.repository.query_unused(topic, user, count).await?;
        cached.truncate(count);
        let remaining = count - cached.len();
        debug!(cached = cached.len(), remaining, "Queried question bank");

        // Entries are marked before they are handed out; the generator call
        // does not depend on the marks, so both run together.
        let mark_cached = try_join_all(cached.iter().map(|entry| self.repository.mark_used(&entry.id, user)));
        let generated = if remaining == 0 {
            mark_cached.await?;
            Vec::new()
        } else {
            let (marked, generated) = tokio::join!(mark_cached, self.generate(user, topic, remaining));
            marked?;
            generated?
        };

        let mut questions: Vec<Question> = cached.into_iter().map(|entry| entry.question).collect();
        for question in generated {
            let id = self
                .repository
                .insert_question(NewQuestionEntry::shown_to(question.clone(), topic.clone(), user))
                .await?;
            debug!(entry = %id, "Banked generated question");
            questions.push(question);
        }

        if questions.len() != count {
            return Err(QuizError::InsufficientQuestions { expected: count, actual: questions.len() });
        }

        info!(served_from_bank = count - remaining, generated = remaining, "Sourced questions");
        Ok(questions)
    }

    async fn generate(&self, user: &UserId, topic: &Topic, count: usize) -> Result<Vec<Question>, QuizError> {
        let answered = self.history.query_answered_events(user, &topic.subject, &topic.grade).await?;

        let mut seen = HashSet::new();
        let exclude: Vec<String> = answered
            .into_iter()
            .filter(|event| event.is_correct)
            .map(|event| event.question)
            .filter(|text| seen.insert(text.clone()))
            .collect();

        let request = GenerationRequest { topic: topic.clone(), count, exclude };
        let questions = self.generator.generate_questions(&request).await?;

        if questions.len() != count {
            return Err(QuizError::MalformedGeneratorOutput(format!(
                "expected {} questions, got {}",
                count,
                questions.len()
            )));
        }
        Ok(questions)
    }
}
