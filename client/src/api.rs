use async_trait::async_trait;
use serde::Deserialize;
use trivia_shared::{GameSettings, NewAttempt, Question, QuizAttempt};

use crate::error::{ClientError, Result};

/// The two backend calls a session makes.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn fetch_questions(&self, settings: &GameSettings) -> Result<Vec<Question>>;

    async fn save_attempt(&self, attempt: &NewAttempt) -> Result<QuizAttempt>;
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpQuizApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuizApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    #[tracing::instrument(skip(self), fields(api.base_url = %self.base_url))]
    async fn fetch_questions(&self, settings: &GameSettings) -> Result<Vec<Question>> {
        let response = self
            .client
            .get(self.url("/api/quiz/questions"))
            .query(&settings.to_query_pairs())
            .send()
            .await?;
        let questions: Vec<Question> = Self::check_status(response).await?.json().await?;

        tracing::debug!(question.count = questions.len(), "Fetched questions");
        Ok(questions)
    }

    #[tracing::instrument(skip(self), fields(api.base_url = %self.base_url))]
    async fn save_attempt(&self, attempt: &NewAttempt) -> Result<QuizAttempt> {
        let response = self
            .client
            .post(self.url("/api/quiz/attempt"))
            .json(attempt)
            .send()
            .await?;
        let stored: QuizAttempt = Self::check_status(response).await?.json().await?;

        tracing::info!(attempt.id = %stored.id, "Quiz attempt saved");
        Ok(stored)
    }
}
