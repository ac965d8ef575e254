//! Read model for the history screen.

use serde::Serialize;

use crate::error::QuizError;
use crate::model::{QuizHistoryRecord, UserId};
use crate::store::HistoryRecorder;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub quizzes_taken: usize,
    pub questions_answered: usize,
    pub correct_answers: usize,
    pub average_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub user: UserId,
    /// Newest first
    pub entries: Vec<QuizHistoryRecord>,
    pub summary: DashboardSummary,
}

impl Dashboard {
    /// Sort by date, newest first. The store's order is not trusted.
    pub fn from_records(user: UserId, mut records: Vec<QuizHistoryRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));

        let questions_answered: usize = records.iter().map(|r| r.total_questions).sum();
        let correct_answers: usize = records.iter().map(|r| r.score).sum();
        let average_percentage = if questions_answered == 0 {
            0
        } else {
            ((correct_answers as f64 / questions_answered as f64) * 100.0).round() as u32
        };

        Self {
            user,
            summary: DashboardSummary {
                quizzes_taken: records.len(),
                questions_answered,
                correct_answers,
                average_percentage,
            },
            entries: records,
        }
    }

    pub async fn load(history: &dyn HistoryRecorder, user: &UserId) -> Result<Self, QuizError> {
        let records = history.query_history(user).await?;
        Ok(Self::from_records(user.clone(), records))
    }

    /// The `n` newest entries. The summary still covers every entry.
    pub fn recent(&self, n: usize) -> &[QuizHistoryRecord] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
