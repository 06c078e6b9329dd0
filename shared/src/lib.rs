pub mod attempt;
pub mod question;
pub mod settings;

pub use attempt::{AttemptValidationError, NewAttempt, QuizAttempt};
pub use question::{ANSWERS_PER_QUESTION, Question, QuestionError};
pub use settings::{Category, Difficulty, GameMode, GameSettings, ParseSettingError};
