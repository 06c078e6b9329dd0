use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use trivia_shared::{Category, Difficulty, GameMode, Question};

use crate::store::{QuestionFilter, QuizStore};

/// Raw query string of `GET /api/quiz/questions`.
///
/// Values are kept as strings so that unknown or malformed input degrades to
/// "no filter" instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionQuery {
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub mode: Option<String>,
}

impl QuestionQuery {
    pub fn filter(&self) -> QuestionFilter {
        QuestionFilter {
            difficulty: parse_lenient::<Difficulty>("difficulty", self.difficulty.as_deref()),
            category: parse_lenient::<Category>("category", self.category.as_deref()),
        }
    }

    pub fn mode(&self) -> Option<GameMode> {
        parse_lenient::<GameMode>("mode", self.mode.as_deref())
    }
}

fn parse_lenient<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    if raw.eq_ignore_ascii_case("all") {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(param = name, value = %raw, "Ignoring unrecognised query value");
            None
        }
    }
}

/// Filters, shuffles the full match set, then truncates for the mode.
///
/// Shuffling happens before truncation so quick mode draws a random subset.
pub fn select_questions<R: Rng + ?Sized>(
    store: &QuizStore,
    filter: &QuestionFilter,
    mode: Option<GameMode>,
    quick_limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions = store.questions(filter);
    shuffle_questions(&mut questions, rng);

    if let Some(limit) = mode.and_then(|m| m.question_limit(quick_limit)) {
        questions.truncate(limit);
    }

    tracing::debug!(
        question.count = questions.len(),
        mode = ?mode,
        "Selected questions"
    );
    questions
}

/// Unbiased in-place Fisher-Yates shuffle.
pub fn shuffle_questions<R: Rng + ?Sized>(questions: &mut [Question], rng: &mut R) {
    questions.shuffle(rng);
}
