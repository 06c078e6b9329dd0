use std::sync::Arc;
use std::time::Duration;

use trivia::config::{QuizConfig, RateLimitConfig, ServerConfig};
use trivia::web::{build_router, serve};
use trivia::{AppState, QuizStore};
use trivia_client::{ClientError, HttpQuizApi, Phase, QuizApi, SaveStatus, SessionControllerHandle};
use trivia_shared::{Difficulty, GameMode, GameSettings, NewAttempt};

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

#[tokio::test]
async fn test_full_quiz_flow_against_server() {
    let (base_url, store) = spawn_server().await;
    let api = Arc::new(HttpQuizApi::new(base_url));
    let controller = SessionControllerHandle::spawn(api, Duration::from_millis(10));

    let settings = GameSettings::new(Difficulty::Beginner, GameMode::Quick, None);
    controller.start_quiz(settings).await.unwrap();

    let mut snapshot = controller.wait_for(|s| !s.loading).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Quiz);
    assert!(snapshot.load_error.is_none());
    let total = snapshot.total_questions;
    assert!(total > 0 && total <= 5);

    let mut answered = 0;
    while snapshot.phase == Phase::Quiz {
        let question = snapshot.current_question.clone().unwrap();
        assert_eq!(question.difficulty, Difficulty::Beginner);

        let feedback = controller
            .select_answer(question.correct_answer)
            .await
            .unwrap()
            .unwrap();
        assert!(feedback.correct);
        answered += 1;

        let index = snapshot.current_index;
        snapshot = controller
            .wait_for(|s| s.phase != Phase::Quiz || s.current_index != index)
            .await
            .unwrap();
    }
    assert_eq!(answered, total);

    let snapshot = controller
        .wait_for(|s| matches!(s.save_status, SaveStatus::Saved(_)))
        .await
        .unwrap();
    assert_eq!(snapshot.phase, Phase::Results);
    assert_eq!(snapshot.score as usize, total);

    let attempts = store.attempts().await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].score as usize, total);
    assert_eq!(attempts[0].total_questions as usize, total);

    controller.restart_quiz().await.unwrap();
    let snapshot = controller.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Setup);
    assert_eq!(snapshot.total_questions, 0);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.save_status, SaveStatus::Idle);
}

#[tokio::test]
async fn test_api_reports_rejected_attempt() {
    let (base_url, store) = spawn_server().await;
    let api = HttpQuizApi::new(base_url);

    let err = api
        .save_attempt(&NewAttempt {
            score: 7,
            total_questions: 5,
            completed_at: chrono::Utc::now(),
        })
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.starts_with("Invalid quiz attempt data"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.attempt_count().await, 0);
}

#[tokio::test]
async fn test_comprehensive_mode_returns_every_match() {
    let (base_url, _) = spawn_server().await;
    let api = HttpQuizApi::new(base_url);

    let settings = GameSettings::new(Difficulty::Intermediate, GameMode::Comprehensive, None);
    let questions = api.fetch_questions(&settings).await.unwrap();
    assert_eq!(questions.len(), 6);
    assert!(questions.iter().all(|q| q.difficulty == Difficulty::Intermediate));
}
