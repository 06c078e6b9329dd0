pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod summary;

pub use crate::api::{HttpQuizApi, QuizApi};
pub use crate::controller::{AnswerFeedback, SaveStatus, SessionControllerHandle, SessionSnapshot};
pub use crate::error::{ClientError, Result, SessionError};
pub use crate::session::{Phase, QuizSession};
