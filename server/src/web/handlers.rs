use axum::{
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    response::Json,
};
use trivia_shared::{NewAttempt, Question, QuizAttempt};

use super::error::{Result as WebResult, WebError};
use crate::selection::{QuestionQuery, select_questions};
use crate::state::AppState;

pub async fn get_questions_handler(
    State(app_state): State<AppState>,
    query: Result<Query<QuestionQuery>, QueryRejection>,
) -> WebResult<Json<Vec<Question>>> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed question query, applying no filter");
            QuestionQuery::default()
        }
    };
    tracing::info!("HTTP: Received get_questions request: {:?}", query);

    let filter = query.filter();
    let questions = select_questions(
        &app_state.store,
        &filter,
        query.mode(),
        app_state.quiz_config.quick_question_count,
        &mut rand::thread_rng(),
    );

    Ok(Json(questions))
}

pub async fn save_attempt_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<NewAttempt>, JsonRejection>,
) -> WebResult<Json<QuizAttempt>> {
    let Json(attempt) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected attempt payload");
        if rejection.status().is_server_error() {
            WebError::InternalServerError(rejection.body_text())
        } else {
            WebError::BadRequest(format!("Invalid quiz attempt data: {}", rejection.body_text()))
        }
    })?;
    tracing::info!("HTTP: Received save_attempt request: {:?}", attempt);

    let stored = app_state.store.save_attempt(attempt).await?;
    Ok(Json(stored))
}

#[cfg(test)]
mod tests {
    use crate::config::{QuizConfig, RateLimitConfig, ServerConfig};
    use crate::state::AppState;
    use crate::store::QuizStore;
    use crate::web::{build_router, serve};
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use std::sync::Arc;
    use trivia_shared::{Difficulty, Question, QuizAttempt};

    async fn spawn_server() -> (String, Arc<QuizStore>) {
        let store = Arc::new(QuizStore::seeded().unwrap());
        let app_state = AppState::new(Arc::clone(&store), QuizConfig::default());
        let server_config = ServerConfig {
            port: 0,
            cors_origins: vec![],
            rate_limit: RateLimitConfig {
                enabled: false,
                ..RateLimitConfig::default()
            },
        };
        let router = build_router(app_state, &server_config).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, router));
        (format!("http://{}", addr), store)
    }

    async fn get_questions(base: &str, query: &str) -> reqwest::Response {
        reqwest::get(format!("{}/api/quiz/questions{}", base, query))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_questions_quick_mode_is_capped() {
        let (base, _) = spawn_server().await;
        let response = get_questions(&base, "?difficulty=beginner&mode=quick").await;
        assert_eq!(response.status(), 200);
        let questions: Vec<Question> = response.json().await.unwrap();
        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.difficulty == Difficulty::Beginner));
    }

    #[tokio::test]
    async fn test_questions_without_params_returns_catalog() {
        let (base, store) = spawn_server().await;
        let questions: Vec<Question> = get_questions(&base, "").await.json().await.unwrap();
        assert_eq!(questions.len(), store.catalog_len());
        let ids: HashSet<_> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), questions.len());
    }

    #[tokio::test]
    async fn test_unknown_values_mean_no_filter() {
        let (base, store) = spawn_server().await;
        let response =
            get_questions(&base, "?difficulty=impossible&category=all&mode=forever").await;
        assert_eq!(response.status(), 200);
        let questions: Vec<Question> = response.json().await.unwrap();
        assert_eq!(questions.len(), store.catalog_len());
    }

    #[tokio::test]
    async fn test_empty_match_is_empty_array() {
        let (base, _) = spawn_server().await;
        let response = get_questions(&base, "?difficulty=beginner&category=Sports").await;
        assert_eq!(response.status(), 200);
        let questions: Vec<Question> = response.json().await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_save_attempt_round_trip() {
        let (base, store) = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/quiz/attempt", base))
            .json(&json!({
                "score": 4,
                "totalQuestions": 5,
                "completedAt": "2025-06-01T10:30:00.000Z"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let attempt: QuizAttempt = response.json().await.unwrap();
        assert_eq!(attempt.score, 4);
        assert_eq!(attempt.total_questions, 5);
        assert_eq!(store.attempt_count().await, 1);
    }

    #[tokio::test]
    async fn test_save_attempt_validation_errors() {
        let (base, store) = spawn_server().await;
        let client = reqwest::Client::new();
        let bodies = [
            json!({"score": -1, "totalQuestions": 5, "completedAt": "2025-06-01T10:30:00Z"}),
            json!({"score": 6, "totalQuestions": 5, "completedAt": "2025-06-01T10:30:00Z"}),
            json!({"score": "3", "totalQuestions": 5, "completedAt": "2025-06-01T10:30:00Z"}),
            json!({"totalQuestions": 5, "completedAt": "2025-06-01T10:30:00Z"}),
            json!({"score": 3, "totalQuestions": 5, "completedAt": "yesterday"}),
        ];

        for body in bodies {
            let response = client
                .post(format!("{}/api/quiz/attempt", base))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 400, "body {body} should be rejected");
            let error: Value = response.json().await.unwrap();
            assert!(error["message"].as_str().is_some());
        }
        assert_eq!(store.attempt_count().await, 0);
    }
}
