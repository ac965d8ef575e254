//! Question generation through a completion API.
//!
//! [`LlmQuestionGenerator`] turns a [`GenerationRequest`] into a prompt, asks the
//! wrapped [`LowLevelClient`], and validates the reply strictly: it must be a
//! JSON array of exactly `count` well-formed questions or the whole call fails.

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::core::LowLevelClient;
use crate::error::{AIError, QuizError};
use crate::interceptors::Interceptor;
use crate::json_utils::parse_json_array;
use crate::model::{Question, QuestionCandidate, Topic, OPTION_COUNT};

/// What to ask the generator for.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: Topic,
    pub count: usize,
    /// Question texts the user already answered correctly
    pub exclude: Vec<String>,
}

#[async_trait]
pub trait QuestionGenerator: Send + Sync + Debug {
    /// Produce exactly `request.count` valid questions, or fail.
    async fn generate_questions(&self, request: &GenerationRequest) -> Result<Vec<Question>, QuizError>;
}

#[async_trait]
impl<G: QuestionGenerator + ?Sized> QuestionGenerator for Arc<G> {
    async fn generate_questions(&self, request: &GenerationRequest) -> Result<Vec<Question>, QuizError> {
        self.as_ref().generate_questions(request).await
    }
}

#[derive(Debug, Clone)]
pub struct LlmQuestionGenerator<C: LowLevelClient> {
    client: C,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> LlmQuestionGenerator<C> {
    pub fn new(client: C) -> Self {
        Self { client, interceptor: None }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn build_prompt(request: &GenerationRequest) -> String {
        let topic = &request.topic;
        let mut prompt = format!(
            "You are a quiz generator. Generate {count} multiple-choice questions for {grade} level {subject} with {difficulty} difficulty.\n\n\
             Your response must be a valid JSON array of question objects. Each question object must have exactly these properties:\n\
             - question: string (the question text)\n\
             - options: string[] (array of {options} possible answers)\n\
             - correctAnswer: string (must be one of the options)\n\n\
             Example format:\n\
             [\n  {{\n    \"question\": \"What is 2 + 2?\",\n    \"options\": [\"3\", \"4\", \"5\", \"6\"],\n    \"correctAnswer\": \"4\"\n  }}\n]\n",
            count = request.count,
            grade = topic.grade,
            subject = topic.subject,
            difficulty = topic.difficulty,
            options = OPTION_COUNT,
        );

        if !request.exclude.is_empty() {
            prompt.push_str("\nPreviously answered questions to avoid:\n");
            for text in &request.exclude {
                prompt.push_str(text);
                prompt.push('\n');
            }
        }

        prompt = add_schema_guidance::<Vec<QuestionCandidate>>(prompt);
        prompt.push_str("\n\nRespond only with the JSON array, no additional text.");
        prompt
    }

    /// Validate a raw completion against the request.
    pub fn parse_response(raw: &str, expected: usize) -> Result<Vec<Question>, QuizError> {
        let candidates: Vec<QuestionCandidate> =
            parse_json_array(raw).map_err(|e| QuizError::MalformedGeneratorOutput(e.to_string()))?;

        if candidates.len() != expected {
            return Err(QuizError::MalformedGeneratorOutput(format!(
                "expected {} questions, got {}",
                expected,
                candidates.len()
            )));
        }

        candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| {
                Question::try_from(candidate)
                    .map_err(|e| QuizError::MalformedGeneratorOutput(format!("question {}: {}", i + 1, e)))
            })
            .collect()
    }
}

/// Append a JSON Schema for `T` to the prompt.
fn add_schema_guidance<T: JsonSchema>(prompt: String) -> String {
    let schema = schema_for!(T);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{}\n## Response Format\nThe JSON array must match this schema:\n```json\n{}\n```",
        prompt, schema_json
    )
}

#[async_trait]
impl<C: LowLevelClient> QuestionGenerator for LlmQuestionGenerator<C> {
    #[instrument(target = "kidsquiz::generator", skip(self, request), fields(topic = %request.topic, count = request.count, excluded = request.exclude.len()))]
    async fn generate_questions(&self, request: &GenerationRequest) -> Result<Vec<Question>, QuizError> {
        let prompt = Self::build_prompt(request);
        debug!(prompt_len = prompt.len(), "Requesting questions from completion API");

        let raw = match self.client.ask_raw(prompt.clone()).await {
            Ok(raw) => raw,
            Err(AIError::EmptyCompletion) => {
                return Err(QuizError::GeneratorUnavailable("completion API returned no content".to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Completion API call failed");
                return Err(e.into());
            }
        };

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(&prompt, &raw).await {
                warn!(error = %e, "Failed to save generator transcript");
            }
        }

        if raw.trim().is_empty() {
            return Err(QuizError::GeneratorUnavailable("completion API returned no content".to_string()));
        }

        let questions = Self::parse_response(&raw, request.count).map_err(|e| {
            warn!(error = %e, raw = %raw, "Rejected generator output");
            e
        })?;
        info!(generated = questions.len(), "Generated questions");
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{MockClient, MockResponse};
    use crate::model::Difficulty;

    fn request(count: usize, exclude: Vec<&str>) -> GenerationRequest {
        GenerationRequest {
            topic: Topic::new("Math", "3rd", Difficulty::Easy),
            count,
            exclude: exclude.into_iter().map(String::from).collect(),
        }
    }

    const TWO_QUESTIONS: &str = r#"[
        {"question":"What is 2 + 2?","options":["3","4","5","6"],"correctAnswer":"4"},
        {"question":"What is 3 x 3?","options":["6","9","12","33"],"correctAnswer":"9"}
    ]"#;

    #[test]
    fn prompt_mentions_topic_count_and_exclusions() {
        let prompt = LlmQuestionGenerator::<MockClient>::build_prompt(&request(3, vec!["What is 1 + 1?"]));
        assert!(prompt.contains("Generate 3 multiple-choice questions for 3rd level Math with easy difficulty"));
        assert!(prompt.contains("Previously answered questions to avoid:\nWhat is 1 + 1?"));
        assert!(prompt.contains("correctAnswer"));
        assert!(prompt.ends_with("Respond only with the JSON array, no additional text."));

        let plain = LlmQuestionGenerator::<MockClient>::build_prompt(&request(1, vec![]));
        assert!(!plain.contains("Previously answered"));
    }

    #[tokio::test]
    async fn parses_fenced_response() {
        let fenced = format!("```json\n{}\n```", TWO_QUESTIONS);
        let (client, handle) = MockClient::with_responses(vec![MockResponse::Success(fenced)]);
        let generator = LlmQuestionGenerator::new(client);

        let questions = generator.generate_questions(&request(2, vec![])).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].correct_answer(), "9");
        assert_eq!(handle.call_count(), 1);
    }

    #[tokio::test]
    async fn wrong_count_is_malformed() {
        let (client, _handle) = MockClient::with_responses(vec![MockResponse::Success(TWO_QUESTIONS.into())]);
        let generator = LlmQuestionGenerator::new(client);

        let err = generator.generate_questions(&request(3, vec![])).await.unwrap_err();
        assert!(matches!(err, QuizError::MalformedGeneratorOutput(_)));
    }

    #[tokio::test]
    async fn answer_outside_options_is_malformed() {
        let raw = r#"[{"question":"What is 2 + 3?","options":["1","2","3","4"],"correctAnswer":"5"}]"#;
        let (client, _handle) = MockClient::with_responses(vec![MockResponse::Success(raw.into())]);
        let generator = LlmQuestionGenerator::new(client);

        let err = generator.generate_questions(&request(1, vec![])).await.unwrap_err();
        match err {
            QuizError::MalformedGeneratorOutput(reason) => {
                assert!(reason.contains("question 1"));
                assert!(reason.contains("not among its options"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn client_failure_is_unavailable() {
        let (client, _handle) = MockClient::with_responses(vec![MockResponse::Error("down".into())]);
        let generator = LlmQuestionGenerator::new(client);

        let err = generator.generate_questions(&request(1, vec![])).await.unwrap_err();
        assert!(matches!(err, QuizError::GeneratorUnavailable(_)));
    }

    #[tokio::test]
    async fn blank_completion_is_unavailable() {
        let (client, _handle) = MockClient::with_responses(vec![MockResponse::Success("  \n".into())]);
        let generator = LlmQuestionGenerator::new(client);

        let err = generator.generate_questions(&request(1, vec![])).await.unwrap_err();
        assert!(matches!(err, QuizError::GeneratorUnavailable(_)));
    }

    #[test]
    fn extra_fields_are_rejected() {
        let raw = r#"[{"question":"Q","options":["a","b","c","d"],"correctAnswer":"a","hint":"x"}]"#;
        let err = LlmQuestionGenerator::<MockClient>::parse_response(raw, 1).unwrap_err();
        assert!(matches!(err, QuizError::MalformedGeneratorOutput(_)));
    }
}
