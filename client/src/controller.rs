use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use trivia_shared::{GameSettings, NewAttempt, Question, QuizAttempt};

use crate::api::QuizApi;
use crate::error::{ClientError, Result, SessionError};
use crate::session::{AdvanceOutcome, LoadState, PendingAdvance, Phase, QuizSession};

pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved(QuizAttempt),
    Failed(String),
}

/// Feedback shown right after an answer is locked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: usize,
    pub correct: bool,
    pub correct_answer: usize,
    pub explanation: String,
}

/// Everything a view needs to render the current state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub settings: Option<GameSettings>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_question: Option<Question>,
    pub selected_answer: Option<usize>,
    pub score: u32,
    pub awaiting_advance: bool,
    pub save_status: SaveStatus,
}

impl SessionSnapshot {
    fn from_session(session: &QuizSession, save_status: &SaveStatus) -> Self {
        let load_error = match session.load_state() {
            LoadState::Failed(message) => Some(message.clone()),
            _ => None,
        };
        Self {
            phase: session.phase(),
            settings: session.settings(),
            loading: session.is_loading(),
            load_error,
            current_index: session.current_index(),
            total_questions: session.total_questions(),
            current_question: session.current_question().cloned(),
            selected_answer: session.selected_answer(session.current_index()),
            score: session.score(),
            awaiting_advance: session.is_awaiting_advance(),
            save_status: save_status.clone(),
        }
    }

    /// Questions arrived but none matched the settings.
    pub fn is_empty_set(&self) -> bool {
        self.phase == Phase::Quiz
            && !self.loading
            && self.load_error.is_none()
            && self.total_questions == 0
    }
}

#[derive(Debug)]
pub enum ControllerMessage {
    StartQuiz {
        settings: GameSettings,
        respond_to: oneshot::Sender<Result<(), SessionError>>,
    },
    SelectAnswer {
        answer_index: usize,
        respond_to: oneshot::Sender<Result<Option<AnswerFeedback>, SessionError>>,
    },
    RestartQuiz {
        respond_to: oneshot::Sender<()>,
    },
    GetSnapshot {
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
}

/// Completions of the background requests, tagged with the session epoch they belong to.
#[derive(Debug)]
enum TaskEvent {
    QuestionsFetched {
        epoch: u64,
        result: Result<Vec<Question>, String>,
    },
    AttemptSaved {
        epoch: u64,
        result: Result<QuizAttempt, String>,
    },
}

pub struct SessionControllerActor<A: QuizApi + 'static> {
    receiver: mpsc::Receiver<ControllerMessage>,
    task_tx: mpsc::UnboundedSender<TaskEvent>,
    task_rx: mpsc::UnboundedReceiver<TaskEvent>,
    api: Arc<A>,
    session: QuizSession,
    advance_delay: Duration,
    pending_advance: Option<(PendingAdvance, Instant)>,
    fetch_task: Option<JoinHandle<()>>,
    save_task: Option<JoinHandle<()>>,
    save_status: SaveStatus,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl<A: QuizApi + 'static> SessionControllerActor<A> {
    fn new(
        receiver: mpsc::Receiver<ControllerMessage>,
        api: Arc<A>,
        advance_delay: Duration,
        state_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        Self {
            receiver,
            task_tx,
            task_rx,
            api,
            session: QuizSession::new(),
            advance_delay,
            pending_advance: None,
            fetch_task: None,
            save_task: None,
            save_status: SaveStatus::Idle,
            state_tx,
        }
    }

    fn publish(&self) {
        self.state_tx
            .send_replace(SessionSnapshot::from_session(&self.session, &self.save_status));
    }

    #[tracing::instrument(skip(self, msg), fields(
        session.epoch = self.session.epoch(),
        session.phase = %self.session.phase()
    ))]
    fn handle_message(&mut self, msg: ControllerMessage) {
        // Publish before replying so callers never observe the previous snapshot.
        match msg {
            ControllerMessage::StartQuiz {
                settings,
                respond_to,
            } => {
                let result = self.start_quiz(settings);
                self.publish();
                let _ = respond_to.send(result);
            }
            ControllerMessage::SelectAnswer {
                answer_index,
                respond_to,
            } => {
                let result = self.select_answer(answer_index);
                self.publish();
                let _ = respond_to.send(result);
            }
            ControllerMessage::RestartQuiz { respond_to } => {
                self.restart_quiz();
                self.publish();
                let _ = respond_to.send(());
            }
            ControllerMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(SessionSnapshot::from_session(
                    &self.session,
                    &self.save_status,
                ));
            }
        }
    }

    fn start_quiz(&mut self, settings: GameSettings) -> Result<(), SessionError> {
        let ticket = self.session.start_quiz(settings)?;
        self.pending_advance = None;
        self.save_status = SaveStatus::Idle;

        tracing::info!(
            session.epoch = ticket.epoch,
            quiz.difficulty = %settings.difficulty,
            quiz.mode = %settings.game_mode,
            quiz.category = ?settings.category,
            "Starting quiz, fetching questions"
        );

        if let Some(stale) = self.fetch_task.take() {
            stale.abort();
        }
        let api = Arc::clone(&self.api);
        let task_tx = self.task_tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = api
                .fetch_questions(&ticket.settings)
                .await
                .map_err(|e| e.to_string());
            let _ = task_tx.send(TaskEvent::QuestionsFetched {
                epoch: ticket.epoch,
                result,
            });
        }));
        Ok(())
    }

    fn select_answer(&mut self, answer_index: usize) -> Result<Option<AnswerFeedback>, SessionError> {
        let Some(pending) = self.session.select_answer(answer_index)? else {
            tracing::debug!(answer_index, "Question already answered, ignoring selection");
            return Ok(None);
        };

        let question = self
            .session
            .current_question()
            .ok_or(SessionError::NoCurrentQuestion)?;
        let feedback = AnswerFeedback {
            selected: answer_index,
            correct: question.is_correct(answer_index),
            correct_answer: question.correct_answer,
            explanation: question.explanation.clone(),
        };

        self.pending_advance = Some((pending, Instant::now() + self.advance_delay));
        tracing::debug!(
            question.index = pending.from_index,
            answer.correct = feedback.correct,
            session.score = self.session.score(),
            "Answer recorded, advance scheduled"
        );
        Ok(Some(feedback))
    }

    fn restart_quiz(&mut self) {
        self.session.restart_quiz();
        self.pending_advance = None;
        self.save_status = SaveStatus::Idle;
        if let Some(fetch) = self.fetch_task.take() {
            fetch.abort();
        }
        tracing::info!(session.epoch = self.session.epoch(), "Quiz restarted");
    }

    fn fire_advance(&mut self) {
        let Some((pending, _)) = self.pending_advance.take() else {
            return;
        };

        match self.session.advance(pending) {
            AdvanceOutcome::NextQuestion { index } => {
                tracing::debug!(question.index = index, "Advanced to next question");
            }
            AdvanceOutcome::Completed(completed) => {
                tracing::info!(
                    session.score = completed.score,
                    session.total_questions = completed.total_questions,
                    "Quiz completed, saving attempt"
                );
                let attempt = NewAttempt::new(
                    completed.score,
                    completed.total_questions,
                    Utc::now(),
                );
                self.save_status = SaveStatus::Saving;

                let epoch = self.session.epoch();
                let api = Arc::clone(&self.api);
                let task_tx = self.task_tx.clone();
                self.save_task = Some(tokio::spawn(async move {
                    let result = api.save_attempt(&attempt).await.map_err(|e| e.to_string());
                    let _ = task_tx.send(TaskEvent::AttemptSaved { epoch, result });
                }));
            }
            AdvanceOutcome::Stale => {
                tracing::debug!("Dropped stale advance");
            }
        }
        self.publish();
    }

    fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::QuestionsFetched { epoch, result } => {
                let applied = match result {
                    Ok(questions) => {
                        let count = questions.len();
                        let applied = self.session.questions_loaded(epoch, questions);
                        if applied {
                            tracing::info!(question.count = count, "Questions loaded");
                        }
                        applied
                    }
                    Err(message) => {
                        let applied = self.session.fetch_failed(epoch, message.clone());
                        if applied {
                            tracing::warn!(error = %message, "Failed to fetch questions");
                        }
                        applied
                    }
                };
                if applied {
                    self.fetch_task = None;
                } else {
                    tracing::debug!(fetch.epoch = epoch, "Ignoring stale question fetch");
                }
            }
            TaskEvent::AttemptSaved { epoch, result } => {
                if epoch != self.session.epoch() {
                    tracing::debug!(save.epoch = epoch, "Ignoring result for abandoned session");
                    return;
                }
                self.save_status = match result {
                    Ok(attempt) => SaveStatus::Saved(attempt),
                    Err(message) => {
                        tracing::warn!(error = %message, "Failed to save quiz attempt");
                        SaveStatus::Failed(message)
                    }
                };
                self.save_task = None;
            }
        }
        self.publish();
    }

    fn shutdown(&mut self) {
        for task in [self.fetch_task.take(), self.save_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
        self.pending_advance = None;
    }
}

#[tracing::instrument(skip(actor))]
pub async fn run_session_controller<A: QuizApi + 'static>(mut actor: SessionControllerActor<A>) {
    tracing::debug!("Session controller started");

    loop {
        let advance_at = actor.pending_advance.as_ref().map(|(_, at)| *at);
        tokio::select! {
            maybe_msg = actor.receiver.recv() => {
                match maybe_msg {
                    Some(msg) => actor.handle_message(msg),
                    None => {
                        tracing::debug!("All controller handles dropped. Shutting down");
                        break;
                    }
                }
            }
            Some(event) = actor.task_rx.recv() => {
                actor.handle_task_event(event);
            }
            _ = tokio::time::sleep_until(advance_at.unwrap_or_else(Instant::now)), if advance_at.is_some() => {
                actor.fire_advance();
            }
        }
    }

    actor.shutdown();
    tracing::debug!("Session controller stopped");
}

/// Cloneable handle to a running session controller. Dropping every handle tears the session down.
#[derive(Clone, Debug)]
pub struct SessionControllerHandle {
    sender: mpsc::Sender<ControllerMessage>,
    state_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionControllerHandle {
    pub fn spawn<A: QuizApi + 'static>(api: Arc<A>, advance_delay: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());
        let actor = SessionControllerActor::new(receiver, api, advance_delay, state_tx);
        tokio::spawn(run_session_controller(actor));
        Self { sender, state_rx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ControllerMessage,
    ) -> Result<T> {
        let (respond_to, rx) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|e| ClientError::ActorComm(format!("Failed to send request: {}", e)))?;
        rx.await
            .map_err(|e| ClientError::ActorComm(format!("Controller no response: {}", e)))
    }

    pub async fn start_quiz(&self, settings: GameSettings) -> Result<()> {
        self.request(|respond_to| ControllerMessage::StartQuiz {
            settings,
            respond_to,
        })
        .await?
        .map_err(Into::into)
    }

    /// `Ok(None)` when the current question already has an answer.
    pub async fn select_answer(&self, answer_index: usize) -> Result<Option<AnswerFeedback>> {
        self.request(|respond_to| ControllerMessage::SelectAnswer {
            answer_index,
            respond_to,
        })
        .await?
        .map_err(Into::into)
    }

    pub async fn restart_quiz(&self) -> Result<()> {
        self.request(|respond_to| ControllerMessage::RestartQuiz { respond_to })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|respond_to| ControllerMessage::GetSnapshot { respond_to })
            .await
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Waits until a published snapshot satisfies `condition`.
    pub async fn wait_for(
        &self,
        mut condition: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let mut state_rx = self.subscribe();
        let snapshot = state_rx
            .wait_for(|snapshot| condition(snapshot))
            .await
            .map_err(|e| ClientError::ActorComm(format!("Controller stopped: {}", e)))?;
        Ok(snapshot.clone())
    }
}
