use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::settings::{Category, Difficulty};

pub const ANSWERS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("Question text is empty")]
    EmptyText,
    #[error("Expected {expected} answers, found {found}")]
    AnswerCount { expected: usize, found: usize },
    #[error("Correct answer index {index} is out of range for {len} answers")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

/// A multiple-choice trivia item. The position in `answers` is the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
    pub icon: String,
    pub explanation: String,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Question {
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.answers.len() != ANSWERS_PER_QUESTION {
            return Err(QuestionError::AnswerCount {
                expected: ANSWERS_PER_QUESTION,
                found: self.answers.len(),
            });
        }
        if self.correct_answer >= self.answers.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: self.correct_answer,
                len: self.answers.len(),
            });
        }
        Ok(())
    }

    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_answer
    }

    pub fn correct_answer_text(&self) -> Option<&str> {
        self.answers.get(self.correct_answer).map(String::as_str)
    }
}
