//! Quiz session state machine.
//!
//! ```text
//! InProgress(i, s) --submit(a)--> AwaitingNext(i, s', a) --advance--> InProgress(i+1, s')
//!                                                        \--advance (last)--> Completed(s')
//! ```
//! [`SessionState::apply`] is the pure transition function; [`QuizSession`]
//! owns the question list and the current state. Answers are compared with
//! exact, case-sensitive string equality.

use crate::error::QuizError;
use crate::model::{Question, QuestionCandidate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    InProgress { index: usize, score: usize },
    AwaitingNext { index: usize, score: usize, selected: String },
    Completed { score: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Submit(String),
    Advance,
}

impl SessionState {
    pub fn initial() -> Self {
        Self::InProgress { index: 0, score: 0 }
    }

    pub fn score(&self) -> usize {
        match self {
            Self::InProgress { score, .. } | Self::AwaitingNext { score, .. } | Self::Completed { score } => *score,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Compute the next state. Illegal events leave `self` untouched and
    /// return the reason.
    pub fn apply(&self, event: &SessionEvent, questions: &[Question]) -> Result<SessionState, QuizError> {
        match (self, event) {
            (Self::InProgress { index, score }, SessionEvent::Submit(answer)) => {
                let question = questions.get(*index).ok_or_else(|| {
                    QuizError::InvalidQuestionSet(format!("no question at index {}", index))
                })?;
                let score = if question.is_correct(answer) { score + 1 } else { *score };
                Ok(Self::AwaitingNext { index: *index, score, selected: answer.clone() })
            }
            (Self::AwaitingNext { index, .. }, SessionEvent::Submit(_)) => {
                Err(QuizError::DuplicateAnswerSubmission { index: *index })
            }
            (Self::InProgress { index, .. }, SessionEvent::Advance) => Err(QuizError::AnswerRequired { index: *index }),
            (Self::AwaitingNext { index, score, .. }, SessionEvent::Advance) => {
                let next = index + 1;
                if next < questions.len() {
                    Ok(Self::InProgress { index: next, score: *score })
                } else {
                    Ok(Self::Completed { score: *score })
                }
            }
            (Self::Completed { .. }, _) => Err(QuizError::SessionCompleted),
        }
    }
}

/// Result of a successful `submit_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    pub question: String,
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub score: usize,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    state: SessionState,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::InvalidQuestionSet("a quiz needs at least one question".to_string()));
        }
        Ok(Self { questions, state: SessionState::initial() })
    }

    /// Build from unvalidated candidates; any bad candidate rejects the set.
    pub fn from_candidates(candidates: Vec<QuestionCandidate>) -> Result<Self, QuizError> {
        let questions = candidates
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.state.score()
    }

    /// `None` once completed.
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            SessionState::InProgress { index, .. } | SessionState::AwaitingNext { index, .. } => Some(*index),
            SessionState::Completed { .. } => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    pub fn selected_answer(&self) -> Option<&str> {
        match &self.state {
            SessionState::AwaitingNext { selected, .. } => Some(selected),
            _ => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.state, SessionState::AwaitingNext { .. })
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome, QuizError> {
        let previous_score = self.state.score();
        let next = self.state.apply(&SessionEvent::Submit(answer.to_string()), &self.questions)?;
        self.state = next;

        let index = self.current_index().unwrap_or_default();
        let question = &self.questions[index];
        Ok(AnswerOutcome {
            index,
            question: question.text().to_string(),
            selected: answer.to_string(),
            correct_answer: question.correct_answer().to_string(),
            is_correct: self.state.score() > previous_score,
            score: self.state.score(),
        })
    }

    pub fn advance(&mut self) -> Result<&SessionState, QuizError> {
        self.state = self.state.apply(&SessionEvent::Advance, &self.questions)?;
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, correct: &str) -> Question {
        Question::new(text, vec!["A".into(), "B".into(), "C".into(), "D".into()], correct).unwrap()
    }

    fn three_questions() -> Vec<Question> {
        vec![question("q1", "A"), question("q2", "B"), question("q3", "C")]
    }

    #[test]
    fn empty_question_set_is_rejected() {
        assert!(matches!(QuizSession::new(vec![]), Err(QuizError::InvalidQuestionSet(_))));
    }

    #[test]
    fn malformed_candidate_rejects_the_set() {
        let candidates = vec![
            QuestionCandidate {
                question: "ok".into(),
                options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                correct_answer: "1".into(),
            },
            QuestionCandidate {
                question: "bad".into(),
                options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                correct_answer: "5".into(),
            },
        ];
        assert!(matches!(QuizSession::from_candidates(candidates), Err(QuizError::InvalidQuestionSet(_))));
    }

    #[test]
    fn all_correct_completes_with_full_score() {
        let mut session = QuizSession::new(three_questions()).unwrap();
        for answer in ["A", "B", "C"] {
            let outcome = session.submit_answer(answer).unwrap();
            assert!(outcome.is_correct);
            session.advance().unwrap();
        }
        assert_eq!(session.state(), &SessionState::Completed { score: 3 });
        assert_eq!(session.current_question(), None);
    }

    #[test]
    fn second_submit_leaves_state_unchanged() {
        let mut session = QuizSession::new(three_questions()).unwrap();
        session.submit_answer("A").unwrap();
        let before = session.state().clone();

        let err = session.submit_answer("B").unwrap_err();
        assert!(matches!(err, QuizError::DuplicateAnswerSubmission { index: 0 }));
        assert_eq!(session.state(), &before);
        assert_eq!(session.score(), 1);
        assert_eq!(session.selected_answer(), Some("A"));
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut session = QuizSession::new(three_questions()).unwrap();
        assert!(matches!(session.advance(), Err(QuizError::AnswerRequired { index: 0 })));
        assert_eq!(session.state(), &SessionState::initial());
    }

    #[test]
    fn advancing_resets_selection() {
        let mut session = QuizSession::new(three_questions()).unwrap();
        let outcome = session.submit_answer("D").unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "A");
        assert!(session.is_answered());

        session.advance().unwrap();
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.selected_answer(), None);
        assert!(!session.is_answered());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn matching_is_exact() {
        let mut session = QuizSession::new(vec![question("q", "A")]).unwrap();
        assert!(!session.submit_answer("a").unwrap().is_correct);
    }

    #[test]
    fn completed_is_terminal() {
        let mut session = QuizSession::new(vec![question("only", "B")]).unwrap();
        session.submit_answer("B").unwrap();
        assert_eq!(session.advance().unwrap(), &SessionState::Completed { score: 1 });
        assert!(matches!(session.submit_answer("B"), Err(QuizError::SessionCompleted)));
        assert!(matches!(session.advance(), Err(QuizError::SessionCompleted)));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn score_stays_within_bounds_for_any_answers() {
        let answers = ["A", "B", "C", "D", "x", ""];
        for seed in 0..64usize {
            let mut session = QuizSession::new(three_questions()).unwrap();
            let mut step = 0;
            while !session.is_completed() {
                let answer = answers[(seed / (step + 1) + step) % answers.len()];
                session.submit_answer(answer).unwrap();
                let index = session.current_index().unwrap();
                assert!(session.score() <= index + 1);
                session.advance().unwrap();
                step += 1;
            }
            assert!(session.score() <= session.total());
        }
    }
}
