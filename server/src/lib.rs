pub mod catalog;
pub mod config;
pub mod error;
pub mod selection;
pub mod state;
pub mod store;
pub mod web;

pub use crate::error::{AppError, Result};
pub use crate::state::AppState;
pub use crate::store::{QuestionFilter, QuizStore};
