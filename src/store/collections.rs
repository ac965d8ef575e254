use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::model::{
    AnsweredQuestionEvent, EntryId, NewQuestionEntry, QuestionBankEntry, QuizHistoryRecord, Topic, UserId,
};

/// The three document collections, with the query semantics both stores share.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    pub bank: Vec<QuestionBankEntry>,
    pub answered: Vec<AnsweredQuestionEvent>,
    pub history: Vec<QuizHistoryRecord>,
}

impl Collections {
    /// Matching entries not shown to `user`, in insertion order.
    pub fn unused(&self, topic: &Topic, user: &UserId, limit: usize) -> Vec<QuestionBankEntry> {
        self.bank
            .iter()
            .filter(|e| e.topic == *topic && !e.is_used_by(user))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns whether `used_by` changed.
    pub fn mark_used(&mut self, id: &EntryId, user: &UserId) -> Result<bool, StoreError> {
        let entry = self
            .bank
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(entry.mark_used(user))
    }

    pub fn insert(&mut self, entry: NewQuestionEntry) -> EntryId {
        let id = EntryId::generate();
        self.bank.push(entry.with_id(id.clone()));
        id
    }

    pub fn answered_by(&self, user: &UserId, subject: &str, grade: &str) -> Vec<AnsweredQuestionEvent> {
        self.answered
            .iter()
            .filter(|e| e.user_id == *user && e.subject == subject && e.grade == grade)
            .cloned()
            .collect()
    }

    pub fn history_of(&self, user: &UserId) -> Vec<QuizHistoryRecord> {
        self.history.iter().filter(|r| r.user_id == *user).cloned().collect()
    }

    /// Entry counts keyed by (subject, grade, difficulty).
    pub fn bank_summary(&self) -> BTreeMap<(String, String, String), usize> {
        let mut summary = BTreeMap::new();
        for entry in &self.bank {
            let key = (
                entry.topic.subject.clone(),
                entry.topic.grade.clone(),
                entry.topic.difficulty.to_string(),
            );
            *summary.entry(key).or_insert(0) += 1;
        }
        summary
    }
}
