//! Domain types shared by sourcing, sessions and the stores.
//!
//! `Question` can only be built through [`Question::new`] (or deserialized,
//! which goes through the same check), so every value in circulation holds
//! exactly four options and a correct answer that is one of them.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

/// Number of options on every multiple-choice question.
pub const OPTION_COUNT: usize = 4;

/// Inclusive bounds for `QuizConfig::number_of_questions`.
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 10;

pub const SUBJECTS: [&str; 5] = ["Math", "Science", "English", "History", "Geography"];
pub const GRADES: [&str; 5] = ["1st", "2nd", "3rd", "4th", "5th"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque identifier assigned by the store when a bank entry is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuizError::InvalidConfig(format!(
                "unknown difficulty '{}'. Supported: easy, medium, hard",
                s
            ))),
        }
    }
}

/// A question as it appears on the wire, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[schemars(title = "Quiz Question", description = "One multiple-choice question")]
pub struct QuestionCandidate {
    /// The question text shown to the child
    pub question: String,
    /// Exactly 4 possible answers
    pub options: Vec<String>,
    /// Must be exactly one of the options
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionCandidate", into = "QuestionCandidate")]
pub struct Question {
    text: String,
    options: [String; OPTION_COUNT],
    correct_answer: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let text = text.into();
        let correct_answer = correct_answer.into();

        if text.trim().is_empty() {
            return Err(QuizError::InvalidQuestionSet("question text is empty".to_string()));
        }
        let options: [String; OPTION_COUNT] = options.try_into().map_err(|opts: Vec<String>| {
            QuizError::InvalidQuestionSet(format!(
                "question '{}' has {} options, expected {}",
                text,
                opts.len(),
                OPTION_COUNT
            ))
        })?;
        // Exact, case-sensitive membership
        if !options.iter().any(|o| *o == correct_answer) {
            return Err(QuizError::InvalidQuestionSet(format!(
                "correct answer '{}' of question '{}' is not among its options",
                correct_answer, text
            )));
        }

        Ok(Self { text, options, correct_answer })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

impl TryFrom<QuestionCandidate> for Question {
    type Error = QuizError;

    fn try_from(c: QuestionCandidate) -> Result<Self, Self::Error> {
        Question::new(c.question, c.options, c.correct_answer)
    }
}

impl From<Question> for QuestionCandidate {
    fn from(q: Question) -> Self {
        Self {
            question: q.text,
            options: q.options.into(),
            correct_answer: q.correct_answer,
        }
    }
}

/// Subject, grade and difficulty: the key questions are banked under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub subject: String,
    pub grade: String,
    pub difficulty: Difficulty,
}

impl Topic {
    pub fn new(subject: impl Into<String>, grade: impl Into<String>, difficulty: Difficulty) -> Self {
        Self { subject: subject.into(), grade: grade.into(), difficulty }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.subject, self.grade, self.difficulty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    #[serde(flatten)]
    topic: Topic,
    number_of_questions: usize,
}

impl QuizConfig {
    pub fn new(
        subject: impl Into<String>,
        grade: impl Into<String>,
        difficulty: Difficulty,
        number_of_questions: usize,
    ) -> Result<Self, QuizError> {
        let topic = Topic::new(subject, grade, difficulty);
        if topic.subject.trim().is_empty() {
            return Err(QuizError::InvalidConfig("subject is required".to_string()));
        }
        if topic.grade.trim().is_empty() {
            return Err(QuizError::InvalidConfig("grade is required".to_string()));
        }
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&number_of_questions) {
            return Err(QuizError::InvalidConfig(format!(
                "number of questions must be between {} and {}, got {}",
                MIN_QUESTIONS, MAX_QUESTIONS, number_of_questions
            )));
        }
        Ok(Self { topic, number_of_questions })
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn subject(&self) -> &str {
        &self.topic.subject
    }

    pub fn grade(&self) -> &str {
        &self.topic.grade
    }

    pub fn difficulty(&self) -> Difficulty {
        self.topic.difficulty
    }

    pub fn number_of_questions(&self) -> usize {
        self.number_of_questions
    }
}

/// A banked question. `used_by` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankEntry {
    pub id: EntryId,
    pub question: Question,
    #[serde(flatten)]
    pub topic: Topic,
    pub used_by: BTreeSet<UserId>,
}

impl QuestionBankEntry {
    pub fn is_used_by(&self, user: &UserId) -> bool {
        self.used_by.contains(user)
    }

    /// Returns `false` when the user was already recorded.
    pub fn mark_used(&mut self, user: &UserId) -> bool {
        self.used_by.insert(user.clone())
    }
}

/// A question about to be banked; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestionEntry {
    pub question: Question,
    pub topic: Topic,
    pub used_by: BTreeSet<UserId>,
}

impl NewQuestionEntry {
    pub fn shown_to(question: Question, topic: Topic, user: &UserId) -> Self {
        Self { question, topic, used_by: BTreeSet::from([user.clone()]) }
    }

    pub fn with_id(self, id: EntryId) -> QuestionBankEntry {
        QuestionBankEntry { id, question: self.question, topic: self.topic, used_by: self.used_by }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestionEvent {
    pub user_id: UserId,
    pub question: String,
    pub subject: String,
    pub grade: String,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistoryRecord {
    pub user_id: UserId,
    pub date: DateTime<Utc>,
    pub subject: String,
    pub grade: String,
    pub score: usize,
    pub total_questions: usize,
}

impl QuizHistoryRecord {
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        ((self.score as f64 / self.total_questions as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn question_requires_answer_among_options() {
        let err = Question::new("What is 2 + 3?", opts(&["1", "2", "3", "4"]), "5").unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuestionSet(_)));

        let q = Question::new("What is 2 + 2?", opts(&["3", "4", "5", "6"]), "4").unwrap();
        assert_eq!(q.correct_answer(), "4");
        assert!(q.is_correct("4"));
        assert!(!q.is_correct(" 4"));
    }

    #[test]
    fn question_requires_four_options() {
        assert!(Question::new("Pick", opts(&["a", "b", "c"]), "a").is_err());
        assert!(Question::new("Pick", opts(&["a", "b", "c", "d", "e"]), "a").is_err());
        assert!(Question::new("   ", opts(&["a", "b", "c", "d"]), "a").is_err());
    }

    #[test]
    fn question_deserialization_is_validated() {
        let ok: Question = serde_json::from_str(
            r#"{"question":"Largest planet?","options":["Mars","Jupiter","Venus","Earth"],"correctAnswer":"Jupiter"}"#,
        )
        .unwrap();
        assert_eq!(ok.text(), "Largest planet?");

        let bad = serde_json::from_str::<Question>(
            r#"{"question":"Largest planet?","options":["Mars","Jupiter","Venus","Earth"],"correctAnswer":"Saturn"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn config_bounds_are_enforced() {
        assert!(QuizConfig::new("Math", "3rd", Difficulty::Easy, 0).is_err());
        assert!(QuizConfig::new("Math", "3rd", Difficulty::Easy, 11).is_err());
        assert!(QuizConfig::new("", "3rd", Difficulty::Easy, 3).is_err());
        let config = QuizConfig::new("Math", "3rd", Difficulty::Easy, 10).unwrap();
        assert_eq!(config.number_of_questions(), 10);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"easy\"");
    }

    #[test]
    fn mark_used_is_a_set_insert() {
        let q = Question::new("Q", opts(&["a", "b", "c", "d"]), "a").unwrap();
        let topic = Topic::new("Math", "1st", Difficulty::Easy);
        let mut entry = NewQuestionEntry::shown_to(q, topic, &UserId::from("u1")).with_id(EntryId::new("e1"));
        assert!(!entry.mark_used(&UserId::from("u1")));
        assert!(entry.mark_used(&UserId::from("u2")));
        assert!(!entry.mark_used(&UserId::from("u2")));
        assert_eq!(entry.used_by.len(), 2);
    }

    #[test]
    fn percentage_rounds() {
        let record = QuizHistoryRecord {
            user_id: UserId::from("u"),
            date: Utc::now(),
            subject: "Math".into(),
            grade: "2nd".into(),
            score: 2,
            total_questions: 3,
        };
        assert_eq!(record.percentage(), 67);
    }
}
