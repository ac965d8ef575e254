
use chrono::{Duration, Utc};
use std::sync::Arc;

use kidsquiz::clients::mock::MockResponse;
use kidsquiz::identity::StaticIdentity;
use kidsquiz::model::{QuizHistoryRecord, UserId};
use kidsquiz::store::{HistoryRecorder, MemoryStore};
use kidsquiz::{QuizApp, QuizError, SessionState};

use crate::test_utils::*;

#[tokio::test]
async fn signed_out_user_cannot_start() {
    let store = Arc::new(MemoryStore::new());
    let (generator, handle) = mock_generator(vec![]);
    let app = QuizApp::new(store.clone(), store, generator, Arc::new(StaticIdentity::signed_out()));

    let err = app.start_quiz(config(1)).await.unwrap_err();
    assert!(matches!(err, QuizError::NotAuthenticated));
    assert!(matches!(app.dashboard().await, Err(QuizError::NotAuthenticated)));
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn play_through_records_events_and_history() {
    let store = Arc::new(MemoryStore::new());
    seed_bank(&store, &["first", "second"]).await;
    let (app, _handle) = app_with(store.clone(), vec![]);

    let mut attempt = app.start_quiz(config(2)).await.unwrap();
    assert_eq!(attempt.session().total(), 2);

    let outcome = attempt.submit_answer("A").unwrap();
    assert!(outcome.is_correct);
    assert!(matches!(attempt.record_completion().await, Err(QuizError::SessionNotCompleted)));
    attempt.advance().unwrap();

    let outcome = attempt.submit_answer("B").unwrap();
    assert!(!outcome.is_correct);
    assert_eq!(outcome.correct_answer, "A");
    assert_eq!(attempt.advance().unwrap(), &SessionState::Completed { score: 1 });

    attempt.settle().await;
    let record = attempt.record_completion().await.unwrap();
    assert_eq!((record.score, record.total_questions), (1, 2));
    assert_eq!(record.percentage(), 50);
    assert_eq!(record.subject, "Math");

    let data = store.snapshot().await;
    let events: Vec<_> = data.answered.iter().map(|e| (e.question.as_str(), e.is_correct)).collect();
    assert_eq!(events, vec![("first", true), ("second", false)]);
    assert!(data.answered.iter().all(|e| e.user_id == UserId::from(KID) && e.grade == "3rd"));
    assert_eq!(data.history.len(), 1);

    let dashboard = app.dashboard().await.unwrap();
    assert_eq!(dashboard.entries.len(), 1);
    assert_eq!(dashboard.summary.average_percentage, 50);
}

#[tokio::test]
async fn duplicate_submission_records_a_single_event() {
    let store = Arc::new(MemoryStore::new());
    seed_bank(&store, &["only"]).await;
    let (app, _handle) = app_with(store.clone(), vec![]);
    let mut attempt = app.start_quiz(config(1)).await.unwrap();

    attempt.submit_answer("A").unwrap();
    let err = attempt.submit_answer("B").unwrap_err();
    assert!(matches!(err, QuizError::DuplicateAnswerSubmission { index: 0 }));
    assert_eq!(attempt.session().score(), 1);

    attempt.settle().await;
    assert_eq!(store.snapshot().await.answered.len(), 1);
}

#[tokio::test]
async fn failed_event_write_does_not_block_the_quiz() {
    let store = Arc::new(FlakyStore::default());
    seed_bank(&store.inner, &["q1"]).await;
    FlakyStore::set(&store.fail_events, true);
    let (generator, _handle) = mock_generator(vec![]);
    let app = QuizApp::new(store.clone(), store.clone(), generator, Arc::new(StaticIdentity::signed_in(KID, "Kid")));

    let mut attempt = app.start_quiz(config(1)).await.unwrap();
    assert!(attempt.submit_answer("A").unwrap().is_correct);
    attempt.advance().unwrap();
    attempt.settle().await;

    assert!(attempt.session().is_completed());
    assert!(store.inner.snapshot().await.answered.is_empty());
    attempt.record_completion().await.unwrap();
}

#[tokio::test]
async fn failed_history_write_is_reported_and_retryable() {
    let store = Arc::new(FlakyStore::default());
    seed_bank(&store.inner, &["q1"]).await;
    let (generator, _handle) = mock_generator(vec![]);
    let app = QuizApp::new(store.clone(), store.clone(), generator, Arc::new(StaticIdentity::signed_in(KID, "Kid")));

    let mut attempt = app.start_quiz(config(1)).await.unwrap();
    attempt.submit_answer("A").unwrap();
    attempt.advance().unwrap();

    FlakyStore::set(&store.fail_history, true);
    let err = attempt.record_completion().await.unwrap_err();
    assert!(matches!(err, QuizError::RepositoryUnavailable(_)));
    assert_eq!(attempt.session().state(), &SessionState::Completed { score: 1 });

    FlakyStore::set(&store.fail_history, false);
    let record = attempt.record_completion().await.unwrap();
    assert_eq!(record.score, 1);
    let again = attempt.record_completion().await.unwrap();
    assert_eq!(again, record);
    assert_eq!(store.inner.snapshot().await.history.len(), 1);
}

#[tokio::test]
async fn dashboard_is_newest_first_and_per_user() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let records = [
        (KID, 2, 3, 4),
        (KID, 0, 5, 5),
        ("someone-else", 1, 0, 5),
        (KID, 9, 1, 3),
    ];
    for (user, days_ago, score, total) in records {
        store
            .insert_history_record(&QuizHistoryRecord {
                user_id: UserId::from(user),
                date: now - Duration::days(days_ago),
                subject: "Science".into(),
                grade: "2nd".into(),
                score,
                total_questions: total,
            })
            .await
            .unwrap();
    }
    let (app, _handle) = app_with(store, vec![]);

    let dashboard = app.dashboard().await.unwrap();

    let scores: Vec<_> = dashboard.entries.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![5, 3, 1]);
    assert_eq!(dashboard.summary.quizzes_taken, 3);
    assert_eq!(dashboard.summary.questions_answered, 12);
    assert_eq!(dashboard.summary.correct_answers, 9);
    assert_eq!(dashboard.summary.average_percentage, 75);

    let other = app.dashboard_for(&UserId::from("someone-else")).await.unwrap();
    assert_eq!(other.summary.quizzes_taken, 1);
    assert_eq!(other.summary.average_percentage, 0);
}

#[tokio::test]
async fn generated_questions_start_a_quiz() {
    let store = Arc::new(MemoryStore::new());
    let (app, handle) = app_with(store.clone(), vec![MockResponse::Success(questions_json(&["g1", "g2"]))]);

    let attempt = app.start_quiz(config(2)).await.unwrap();

    assert_eq!(handle.call_count(), 1);
    assert_eq!(attempt.session().current_question().map(|q| q.text()), Some("g1"));
    assert_eq!(store.snapshot().await.bank.len(), 2);
}
