
use std::sync::Arc;

use kidsquiz::clients::mock::MockResponse;
use kidsquiz::identity::StaticIdentity;
use kidsquiz::model::UserId;
use kidsquiz::store::JsonFileStore;
use kidsquiz::QuizApp;

use crate::test_utils::*;

#[tokio::test]
async fn quiz_results_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let kid = UserId::from(KID);

    {
        let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        let (generator, _handle) = mock_generator(vec![MockResponse::Success(questions_json(&["Add seven and one", "Add two and two"]))]);
        let app = QuizApp::new(store.clone(), store, generator, Arc::new(StaticIdentity::signed_in(KID, "Kid")));

        let mut attempt = app.start_quiz(config(2)).await.unwrap();
        attempt.submit_answer("A").unwrap();
        attempt.advance().unwrap();
        attempt.submit_answer("C").unwrap();
        attempt.advance().unwrap();
        attempt.settle().await;
        attempt.record_completion().await.unwrap();
    }

    for file in ["question_bank.json", "answered_events.json", "quiz_history.json"] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }

    let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
    let data = store.snapshot().await;
    assert_eq!(data.bank.len(), 2);
    assert!(data.bank.iter().all(|e| e.is_used_by(&kid)));
    assert_eq!(data.answered.len(), 2);

    // Both banked questions are used up, so a new quiz must go to the generator.
    let (generator, handle) = mock_generator(vec![MockResponse::Success(questions_json(&["Add five and five"]))]);
    let app = QuizApp::new(store.clone(), store, generator, Arc::new(StaticIdentity::signed_in(KID, "Kid")));
    let attempt = app.start_quiz(config(1)).await.unwrap();
    assert_eq!(attempt.session().current_question().map(|q| q.text()), Some("Add five and five"));
    assert!(handle.prompts()[0].contains("Add seven and one"), "correctly answered question should be excluded");
    assert!(!handle.prompts()[0].contains("Add two and two"));

    let dashboard = app.dashboard().await.unwrap();
    assert_eq!(dashboard.entries.len(), 1);
    assert_eq!(dashboard.entries[0].percentage(), 50);
}

#[tokio::test]
async fn bank_json_uses_camel_case_wire_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
    let (generator, _handle) = mock_generator(vec![MockResponse::Success(questions_json(&["What is 7 + 1?"]))]);
    let app = QuizApp::new(store.clone(), store, generator, Arc::new(StaticIdentity::signed_in(KID, "Kid")));

    app.start_quiz(config(1)).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("question_bank.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &json[0];
    assert_eq!(entry["question"]["question"], "What is 7 + 1?");
    assert_eq!(entry["question"]["correctAnswer"], "A");
    assert_eq!(entry["subject"], "Math");
    assert_eq!(entry["difficulty"], "easy");
    assert_eq!(entry["usedBy"][0], KID);
}
