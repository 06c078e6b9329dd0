use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptValidationError {
    #[error("score must not be negative (got {0})")]
    NegativeScore(i64),
    #[error("totalQuestions must be positive (got {0})")]
    NonPositiveTotal(i64),
    #[error("score {score} exceeds totalQuestions {total}")]
    ScoreExceedsTotal { score: i64, total: i64 },
    #[error("{0} is too large")]
    OutOfRange(&'static str),
}

/// Body of `POST /api/quiz/attempt`. Signed so that out-of-range numbers reach validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttempt {
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: DateTime<Utc>,
}

impl NewAttempt {
    pub fn new(score: u32, total_questions: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            score: i64::from(score),
            total_questions: i64::from(total_questions),
            completed_at,
        }
    }

    /// Checks `0 <= score <= totalQuestions` and `totalQuestions > 0`, returning the
    /// narrowed `(score, total)` pair.
    pub fn validate(&self) -> Result<(u32, u32), AttemptValidationError> {
        if self.score < 0 {
            return Err(AttemptValidationError::NegativeScore(self.score));
        }
        if self.total_questions <= 0 {
            return Err(AttemptValidationError::NonPositiveTotal(
                self.total_questions,
            ));
        }
        if self.score > self.total_questions {
            return Err(AttemptValidationError::ScoreExceedsTotal {
                score: self.score,
                total: self.total_questions,
            });
        }
        let total = u32::try_from(self.total_questions)
            .map_err(|_| AttemptValidationError::OutOfRange("totalQuestions"))?;
        let score =
            u32::try_from(self.score).map_err(|_| AttemptValidationError::OutOfRange("score"))?;
        Ok((score, total))
    }
}

/// A completed session as stored in the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Uuid,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(score: i64, total_questions: i64) -> NewAttempt {
        NewAttempt {
            score,
            total_questions,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_bounds() {
        assert_eq!(attempt(0, 5).validate(), Ok((0, 5)));
        assert_eq!(attempt(5, 5).validate(), Ok((5, 5)));
        assert_eq!(
            attempt(-1, 5).validate(),
            Err(AttemptValidationError::NegativeScore(-1))
        );
        assert_eq!(
            attempt(6, 5).validate(),
            Err(AttemptValidationError::ScoreExceedsTotal { score: 6, total: 5 })
        );
        assert_eq!(
            attempt(0, 0).validate(),
            Err(AttemptValidationError::NonPositiveTotal(0))
        );
    }

    #[test]
    fn test_validate_rejects_values_beyond_u32() {
        let huge = i64::from(u32::MAX) + 1;
        assert_eq!(
            attempt(1, huge).validate(),
            Err(AttemptValidationError::OutOfRange("totalQuestions"))
        );
    }

    #[test]
    fn test_body_parses_iso_timestamp() {
        let body = r#"{"score":3,"totalQuestions":5,"completedAt":"2025-01-31T12:00:00.000Z"}"#;
        let parsed: NewAttempt = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.score, 3);
        assert_eq!(parsed.total_questions, 5);
        assert_eq!(parsed.completed_at.to_rfc3339(), "2025-01-31T12:00:00+00:00");
    }

    #[test]
    fn test_body_rejects_non_numeric_score() {
        let body = r#"{"score":"three","totalQuestions":5,"completedAt":"2025-01-31T12:00:00Z"}"#;
        assert!(serde_json::from_str::<NewAttempt>(body).is_err());
    }
}
