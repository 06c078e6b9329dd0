use std::sync::Arc;
use tokio::sync::RwLock;
use trivia_shared::{Category, Difficulty, NewAttempt, Question, QuizAttempt};
use uuid::Uuid;

use crate::catalog::{build_catalog, builtin_entries};
use crate::error::{CatalogError, StoreError};

/// Conjunctive filter; `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        self.difficulty.is_none_or(|d| question.difficulty == d)
            && self.category.is_none_or(|c| question.category == c)
    }
}

/// In-memory question catalog plus the append-only attempt log.
///
/// The catalog is fixed at construction; only the attempt log changes afterwards.
pub struct QuizStore {
    catalog: Arc<Vec<Question>>,
    attempts: RwLock<Vec<QuizAttempt>>,
}

impl QuizStore {
    pub fn new(catalog: Vec<Question>) -> Self {
        tracing::info!(question.count = catalog.len(), "QuizStore seeded");
        Self {
            catalog: Arc::new(catalog),
            attempts: RwLock::new(Vec::new()),
        }
    }

    /// Store seeded with the built-in catalog.
    pub fn seeded() -> Result<Self, CatalogError> {
        Ok(Self::new(build_catalog(builtin_entries())?))
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    /// Copies of every question matching `filter`, in catalog order.
    #[tracing::instrument(skip(self))]
    pub fn questions(&self, filter: &QuestionFilter) -> Vec<Question> {
        let matching: Vec<Question> = self
            .catalog
            .iter()
            .filter(|question| filter.matches(question))
            .cloned()
            .collect();

        tracing::debug!(
            question.count = matching.len(),
            catalog.count = self.catalog.len(),
            "Filtered catalog"
        );
        matching
    }

    #[tracing::instrument(skip(self), fields(
        attempt.score = attempt.score,
        attempt.total_questions = attempt.total_questions
    ))]
    pub async fn save_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, StoreError> {
        let (score, total_questions) = attempt.validate().map_err(|e| {
            tracing::warn!(error = %e, "Rejected quiz attempt");
            StoreError::from(e)
        })?;

        let stored = QuizAttempt {
            id: Uuid::new_v4(),
            score,
            total_questions,
            completed_at: attempt.completed_at,
        };

        let mut attempts = self.attempts.write().await;
        attempts.push(stored.clone());
        tracing::info!(
            attempt.id = %stored.id,
            attempts.count = attempts.len(),
            "Saved quiz attempt"
        );

        Ok(stored)
    }

    pub async fn attempt_count(&self) -> usize {
        self.attempts.read().await.len()
    }

    /// Stored attempts in insertion order.
    pub async fn attempts(&self) -> Vec<QuizAttempt> {
        self.attempts.read().await.clone()
    }
}
