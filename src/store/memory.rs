use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Collections, HistoryRecorder, QuestionRepository};
use crate::error::StoreError;
use crate::model::{
    AnsweredQuestionEvent, EntryId, NewQuestionEntry, QuestionBankEntry, QuizHistoryRecord, Topic, UserId,
};

/// Process-local document store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collections(collections: Collections) -> Self {
        Self { collections: RwLock::new(collections) }
    }

    pub async fn snapshot(&self) -> Collections {
        self.collections.read().await.clone()
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn query_unused(
        &self,
        topic: &Topic,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QuestionBankEntry>, StoreError> {
        Ok(self.collections.read().await.unused(topic, user, limit))
    }

    async fn mark_used(&self, id: &EntryId, user: &UserId) -> Result<(), StoreError> {
        let changed = self.collections.write().await.mark_used(id, user)?;
        debug!(entry = %id, user = %user, changed, "Marked question as used");
        Ok(())
    }

    async fn insert_question(&self, entry: NewQuestionEntry) -> Result<EntryId, StoreError> {
        Ok(self.collections.write().await.insert(entry))
    }
}

#[async_trait]
impl HistoryRecorder for MemoryStore {
    async fn append_answered_event(&self, event: &AnsweredQuestionEvent) -> Result<(), StoreError> {
        self.collections.write().await.answered.push(event.clone());
        Ok(())
    }

    async fn query_answered_events(
        &self,
        user: &UserId,
        subject: &str,
        grade: &str,
    ) -> Result<Vec<AnsweredQuestionEvent>, StoreError> {
        Ok(self.collections.read().await.answered_by(user, subject, grade))
    }

    async fn insert_history_record(&self, record: &QuizHistoryRecord) -> Result<(), StoreError> {
        self.collections.write().await.history.push(record.clone());
        Ok(())
    }

    async fn query_history(&self, user: &UserId) -> Result<Vec<QuizHistoryRecord>, StoreError> {
        Ok(self.collections.read().await.history_of(user))
    }
}
