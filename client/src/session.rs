use serde::Serialize;
use std::fmt;
use trivia_shared::{GameSettings, Question};

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Setup,
    Quiz,
    Results,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Quiz => f.write_str("quiz"),
            Phase::Results => f.write_str("results"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Issued by `start_quiz`; the fetch result must be reported back with the same epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub epoch: u64,
    pub settings: GameSettings,
}

/// A scheduled move past the question at `from_index`, valid only within `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    pub epoch: u64,
    pub from_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedQuiz {
    pub score: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion { index: usize },
    Completed(CompletedQuiz),
    /// The ticket belongs to an abandoned session or an already-passed question.
    Stale,
}

/// Client-side quiz flow: setup → quiz → results → setup.
///
/// Every `start_quiz`/`restart_quiz` bumps the epoch so that fetch results and
/// scheduled advances issued for an earlier session are ignored.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    phase: Phase,
    epoch: u64,
    settings: Option<GameSettings>,
    load_state: LoadState,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    selected_answers: Vec<Option<usize>>,
    awaiting_advance: bool,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_quiz(&mut self, settings: GameSettings) -> Result<FetchTicket, SessionError> {
        if self.phase != Phase::Setup {
            return Err(SessionError::InvalidPhase {
                expected: Phase::Setup,
                actual: self.phase,
            });
        }

        self.epoch += 1;
        self.phase = Phase::Quiz;
        self.settings = Some(settings);
        self.load_state = LoadState::Loading;
        self.questions.clear();
        self.current_index = 0;
        self.score = 0;
        self.selected_answers.clear();
        self.awaiting_advance = false;

        Ok(FetchTicket {
            epoch: self.epoch,
            settings,
        })
    }

    /// Returns `false` when the result belongs to a superseded fetch.
    pub fn questions_loaded(&mut self, epoch: u64, questions: Vec<Question>) -> bool {
        if !self.accepts_fetch_result(epoch) {
            return false;
        }
        self.selected_answers = vec![None; questions.len()];
        self.questions = questions;
        self.load_state = LoadState::Loaded;
        true
    }

    pub fn fetch_failed(&mut self, epoch: u64, message: impl Into<String>) -> bool {
        if !self.accepts_fetch_result(epoch) {
            return false;
        }
        self.load_state = LoadState::Failed(message.into());
        true
    }

    fn accepts_fetch_result(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.phase == Phase::Quiz && self.load_state == LoadState::Loading
    }

    /// Records the first answer for the current question.
    ///
    /// Repeated selections for an answered question return `Ok(None)` and change nothing.
    pub fn select_answer(
        &mut self,
        answer_index: usize,
    ) -> Result<Option<PendingAdvance>, SessionError> {
        if self.phase != Phase::Quiz {
            return Err(SessionError::InvalidPhase {
                expected: Phase::Quiz,
                actual: self.phase,
            });
        }
        if self.load_state != LoadState::Loaded {
            return Err(SessionError::QuestionsNotLoaded);
        }
        let question = self
            .questions
            .get(self.current_index)
            .ok_or(SessionError::NoCurrentQuestion)?;
        if answer_index >= question.answers.len() {
            return Err(SessionError::AnswerOutOfRange {
                index: answer_index,
                len: question.answers.len(),
            });
        }

        let slot = &mut self.selected_answers[self.current_index];
        if slot.is_some() {
            return Ok(None);
        }
        *slot = Some(answer_index);
        if question.is_correct(answer_index) {
            self.score += 1;
        }
        self.awaiting_advance = true;

        Ok(Some(PendingAdvance {
            epoch: self.epoch,
            from_index: self.current_index,
        }))
    }

    pub fn advance(&mut self, pending: PendingAdvance) -> AdvanceOutcome {
        if pending.epoch != self.epoch
            || self.phase != Phase::Quiz
            || pending.from_index != self.current_index
        {
            return AdvanceOutcome::Stale;
        }

        self.awaiting_advance = false;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            AdvanceOutcome::NextQuestion {
                index: self.current_index,
            }
        } else {
            self.phase = Phase::Results;
            AdvanceOutcome::Completed(CompletedQuiz {
                score: self.final_score(),
                total_questions: self.questions.len() as u32,
            })
        }
    }

    /// Back to setup from any phase, dropping settings, questions and answers.
    pub fn restart_quiz(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::default()
        };
    }

    /// Score recomputed from the recorded answers; unanswered questions count as wrong.
    pub fn final_score(&self) -> u32 {
        self.questions
            .iter()
            .zip(&self.selected_answers)
            .filter(|(question, selected)| selected.is_some_and(|i| question.is_correct(i)))
            .count() as u32
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn settings(&self) -> Option<GameSettings> {
        self.settings
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Quiz => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selected_answer(&self, index: usize) -> Option<usize> {
        self.selected_answers.get(index).copied().flatten()
    }

    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected_answers
    }

    pub fn is_awaiting_advance(&self) -> bool {
        self.awaiting_advance
    }

    /// Loaded, but nothing matched the chosen settings.
    pub fn is_empty_set(&self) -> bool {
        self.phase == Phase::Quiz && self.load_state == LoadState::Loaded && self.questions.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use trivia_shared::{Category, Difficulty, GameMode};
    use uuid::Uuid;

    pub(crate) fn question(text: &str, correct_answer: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            question: text.to_string(),
            answers: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer,
            icon: "❓".to_string(),
            explanation: format!("{} explained", text),
            category: Category::Geography,
            difficulty: Difficulty::Beginner,
            image_url: None,
        }
    }

    fn settings() -> GameSettings {
        GameSettings::new(Difficulty::Beginner, GameMode::Quick, None)
    }

    fn loaded_session(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new();
        let ticket = session.start_quiz(settings()).unwrap();
        assert!(session.questions_loaded(ticket.epoch, questions));
        session
    }

    fn answer_and_advance(session: &mut QuizSession, answer: usize) -> AdvanceOutcome {
        let pending = session.select_answer(answer).unwrap().unwrap();
        session.advance(pending)
    }

    #[test]
    fn test_start_quiz_only_from_setup() {
        let mut session = QuizSession::new();
        assert_eq!(session.phase(), Phase::Setup);
        session.start_quiz(settings()).unwrap();
        assert_eq!(session.phase(), Phase::Quiz);
        assert!(session.is_loading());
        assert_eq!(
            session.start_quiz(settings()),
            Err(SessionError::InvalidPhase {
                expected: Phase::Setup,
                actual: Phase::Quiz
            })
        );
    }

    #[test]
    fn test_answer_before_load_is_rejected() {
        let mut session = QuizSession::new();
        session.start_quiz(settings()).unwrap();
        assert_eq!(
            session.select_answer(0),
            Err(SessionError::QuestionsNotLoaded)
        );
    }

    #[test]
    fn test_correct_incorrect_correct_scores_two() {
        let mut session = loaded_session(vec![
            question("q1", 0),
            question("q2", 1),
            question("q3", 2),
        ]);

        assert_eq!(
            answer_and_advance(&mut session, 0),
            AdvanceOutcome::NextQuestion { index: 1 }
        );
        assert_eq!(
            answer_and_advance(&mut session, 3),
            AdvanceOutcome::NextQuestion { index: 2 }
        );
        assert_eq!(
            answer_and_advance(&mut session, 2),
            AdvanceOutcome::Completed(CompletedQuiz {
                score: 2,
                total_questions: 3
            })
        );
        assert_eq!(session.phase(), Phase::Results);
        assert_eq!(session.score(), 2);
        assert_eq!(session.final_score(), 2);
        assert_eq!(session.selected_answers(), &[Some(0), Some(3), Some(2)]);
    }

    #[test]
    fn test_second_selection_is_ignored() {
        let mut session = loaded_session(vec![question("q1", 1), question("q2", 0)]);

        let pending = session.select_answer(1).unwrap();
        assert!(pending.is_some());
        assert_eq!(session.score(), 1);

        assert_eq!(session.select_answer(0), Ok(None));
        assert_eq!(session.select_answer(1), Ok(None));
        assert_eq!(session.score(), 1);
        assert_eq!(session.selected_answer(0), Some(1));
    }

    #[test]
    fn test_out_of_range_answer_is_rejected() {
        let mut session = loaded_session(vec![question("q1", 1)]);
        assert_eq!(
            session.select_answer(4),
            Err(SessionError::AnswerOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(session.selected_answer(0), None);
    }

    #[test]
    fn test_completion_is_reported_once() {
        let mut session = loaded_session(vec![question("q1", 0)]);
        let pending = session.select_answer(0).unwrap().unwrap();
        assert!(matches!(
            session.advance(pending),
            AdvanceOutcome::Completed(_)
        ));
        assert_eq!(session.advance(pending), AdvanceOutcome::Stale);
        assert_eq!(session.phase(), Phase::Results);
    }

    #[test]
    fn test_advance_after_restart_is_stale() {
        let mut session = loaded_session(vec![question("q1", 0), question("q2", 0)]);
        let pending = session.select_answer(0).unwrap().unwrap();

        session.restart_quiz();
        let ticket = session.start_quiz(settings()).unwrap();
        session.questions_loaded(ticket.epoch, vec![question("fresh", 0), question("q", 0)]);

        assert_eq!(session.advance(pending), AdvanceOutcome::Stale);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_stale_fetch_results_are_dropped() {
        let mut session = QuizSession::new();
        let old = session.start_quiz(settings()).unwrap();
        session.restart_quiz();
        let new = session.start_quiz(GameSettings::new(
            Difficulty::Advanced,
            GameMode::Comprehensive,
            Some(Category::Culture),
        ))
        .unwrap();

        assert!(!session.questions_loaded(old.epoch, vec![question("old", 0)]));
        assert!(!session.fetch_failed(old.epoch, "late failure"));
        assert!(session.is_loading());

        assert!(session.questions_loaded(new.epoch, vec![question("new", 0)]));
        assert_eq!(session.questions()[0].question, "new");
        assert!(!session.questions_loaded(new.epoch, vec![question("dup", 0)]));
    }

    #[test]
    fn test_fetch_failure_is_surfaced() {
        let mut session = QuizSession::new();
        let ticket = session.start_quiz(settings()).unwrap();
        assert!(session.fetch_failed(ticket.epoch, "connection refused"));
        assert_eq!(
            session.load_state(),
            &LoadState::Failed("connection refused".to_string())
        );
        assert_eq!(
            session.select_answer(0),
            Err(SessionError::QuestionsNotLoaded)
        );
    }

    #[test]
    fn test_empty_question_set() {
        let mut session = loaded_session(vec![]);
        assert!(session.is_empty_set());
        assert_eq!(session.current_question(), None);
        assert_eq!(
            session.select_answer(0),
            Err(SessionError::NoCurrentQuestion)
        );
        session.restart_quiz();
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut session = loaded_session(vec![question("q1", 0)]);
        answer_and_advance(&mut session, 0);
        assert_eq!(session.phase(), Phase::Results);

        let epoch = session.epoch();
        session.restart_quiz();
        assert_eq!(session.phase(), Phase::Setup);
        assert_eq!(session.settings(), None);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(session.questions().is_empty());
        assert!(session.selected_answers().is_empty());
        assert_eq!(session.load_state(), &LoadState::Idle);
        assert!(session.epoch() > epoch);
    }
}
