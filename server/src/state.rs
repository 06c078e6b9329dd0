use std::sync::Arc;

use crate::config::QuizConfig;
use crate::store::QuizStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<QuizStore>,
    pub quiz_config: Arc<QuizConfig>,
}

impl AppState {
    pub fn new(store: Arc<QuizStore>, quiz_config: QuizConfig) -> Self {
        Self {
            store,
            quiz_config: Arc::new(quiz_config),
        }
    }
}
