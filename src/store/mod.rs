//! Document store collaborators.
//!
//! The question bank and the per-user history are reached only through the
//! two traits below. Both backends keep their collections in a [`Collections`]
//! value; [`JsonFileStore`] additionally writes each collection to disk.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::StoreError;
use crate::model::{
    AnsweredQuestionEvent, EntryId, NewQuestionEntry, QuestionBankEntry, QuizHistoryRecord, Topic, UserId,
};

pub mod collections;
pub mod json_file;
pub mod memory;

pub use collections::Collections;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait QuestionRepository: Send + Sync + Debug {
    /// Entries for `topic` not yet shown to `user`, at most `limit` of them.
    async fn query_unused(
        &self,
        topic: &Topic,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QuestionBankEntry>, StoreError>;

    /// Add `user` to the entry's `used_by` set. Idempotent.
    async fn mark_used(&self, id: &EntryId, user: &UserId) -> Result<(), StoreError>;

    async fn insert_question(&self, entry: NewQuestionEntry) -> Result<EntryId, StoreError>;
}

#[async_trait]
pub trait HistoryRecorder: Send + Sync + Debug {
    async fn append_answered_event(&self, event: &AnsweredQuestionEvent) -> Result<(), StoreError>;

    async fn query_answered_events(
        &self,
        user: &UserId,
        subject: &str,
        grade: &str,
    ) -> Result<Vec<AnsweredQuestionEvent>, StoreError>;

    async fn insert_history_record(&self, record: &QuizHistoryRecord) -> Result<(), StoreError>;

    /// The user's completed quizzes, in no particular order.
    async fn query_history(&self, user: &UserId) -> Result<Vec<QuizHistoryRecord>, StoreError>;
}
