//! Task Watcher
//!
//! Submits a background task and polls its status on a fixed interval until
//! a terminal state is reached. The session is modeled as an explicit state
//! machine with one transition function per external event (submit response,
//! poll response), so it can be exercised against a mocked `TasksApi`.
//!
//! State machine: `Idle -> Submitting -> Polling -> {Done, Failed, Error}`.
//! All three right-hand states are terminal; once the poll loop leaves
//! `Polling` it never re-enters it, and the timer is released exactly once.

use crate::api::{ApiError, TasksApi};
use crate::consts::watcher::POLL_INTERVAL_MS;
use crate::events::Event;
use crate::task::TaskStatus;
use log::error;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Status text while a submission or poll cycle is in flight.
pub const MSG_PROCESSING: &str = "Processing your data...";
/// Status text on successful completion.
pub const MSG_COMPLETE: &str = "Processing complete!";
/// Status text when the submit request fails or returns no task ID.
pub const MSG_SUBMIT_FAILED: &str = "An error occurred while starting the task";
/// Status text when a status poll fails. Polling stops; there is no retry.
pub const MSG_POLL_FAILED: &str = "Error checking task status";

/// Which background task to start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TaskKind {
    Prep,
    TrainEval,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FlowState {
    Idle,
    Submitting,
    /// Polling the given task ID. The handle is owned here for the duration
    /// of polling and dropped on any terminal transition.
    Polling(String),
    Done,
    Failed,
    Error,
}

/// One submit-and-watch session.
#[derive(Debug)]
pub struct TaskFlow {
    state: FlowState,
}

impl TaskFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// The task ID currently being polled, if any.
    pub fn task_id(&self) -> Option<String> {
        match &self.state {
            FlowState::Polling(task_id) => Some(task_id.clone()),
            _ => None,
        }
    }

    /// `Idle -> Submitting`. The busy indicator goes up before the request
    /// is issued.
    pub fn begin_submit(&mut self) -> Event {
        self.state = FlowState::Submitting;
        Event::status(MSG_PROCESSING)
    }

    /// `Submitting -> Polling | Error`, driven by the submit response.
    pub fn on_submit_result(&mut self, result: Result<String, ApiError>) -> Option<Event> {
        if self.state != FlowState::Submitting {
            return None;
        }
        match result {
            Ok(task_id) => {
                self.state = FlowState::Polling(task_id);
                None
            }
            Err(e) => {
                error!("Failed to start task: {}", e);
                self.state = FlowState::Error;
                Some(Event::error(MSG_SUBMIT_FAILED))
            }
        }
    }

    /// `Polling -> Polling | Done | Failed | Error`, driven by one poll
    /// response. Ignored in any other state, so a terminal transition can
    /// happen at most once.
    pub fn on_status(&mut self, result: Result<TaskStatus, ApiError>) -> Option<Event> {
        if self.task_id().is_none() {
            return None;
        }
        match result {
            Ok(TaskStatus::Pending) => Some(Event::status(MSG_PROCESSING)),
            // Statuses outside the contract are treated as in-flight; the
            // loop keeps polling without touching the displayed message.
            Ok(TaskStatus::Other) => None,
            Ok(TaskStatus::Done) => {
                self.state = FlowState::Done;
                Some(Event::success(MSG_COMPLETE))
            }
            Ok(TaskStatus::Failed { error: message }) => {
                self.state = FlowState::Failed;
                Some(Event::error(format!("Error: {}", message)))
            }
            Err(e) => {
                error!("Failed to check task status: {}", e);
                self.state = FlowState::Error;
                Some(Event::error(MSG_POLL_FAILED))
            }
        }
    }
}

impl Default for TaskFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Submits a task and polls its status every [`POLL_INTERVAL_MS`] until a
/// terminal state or shutdown. Returns the final flow state.
///
/// Each poll issues its request only after the full interval has elapsed,
/// so the first status request fires no earlier than one interval after
/// submission succeeds. A tick awaits its response before the next delay
/// starts, so ticks never overlap.
pub async fn run_task(
    kind: TaskKind,
    project_name: &str,
    api: &dyn TasksApi,
    event_sender: mpsc::Sender<Event>,
    mut shutdown: broadcast::Receiver<()>,
) -> FlowState {
    let mut flow = TaskFlow::new();
    let _ = event_sender.send(flow.begin_submit()).await;

    let submitted = match kind {
        TaskKind::Prep => api.start_prep(project_name).await,
        TaskKind::TrainEval => api.start_train_eval(project_name).await,
    };
    if let Some(event) = flow.on_submit_result(submitted) {
        let _ = event_sender.send(event).await;
    }

    while let Some(task_id) = flow.task_id() {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)) => {
                let status = api.task_status(&task_id).await;
                if let Some(event) = flow.on_status(status) {
                    let _ = event_sender.send(event).await;
                }
            }
        }
    }

    flow.state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTasksApi;
    use crate::consts::watcher::EVENT_QUEUE_SIZE;
    use crate::events::EventType;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn channels() -> (
        mpsc::Sender<Event>,
        mpsc::Receiver<Event>,
        broadcast::Sender<()>,
    ) {
        let (event_sender, event_receiver) = mpsc::channel::<Event>(EVENT_QUEUE_SIZE);
        let (shutdown_sender, _) = broadcast::channel(1);
        (event_sender, event_receiver, shutdown_sender)
    }

    fn drain(receiver: &mut mpsc::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    // The first status request must not fire earlier than one full poll interval.
    async fn test_first_poll_waits_full_interval() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Ok("task-1".to_string()));

        let polled_at: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
        let polled_at_writer = polled_at.clone();
        api.expect_task_status().times(1).returning_st(move |_| {
            *polled_at_writer.lock().unwrap() = Some(Instant::now());
            Ok(TaskStatus::Done)
        });

        let (event_sender, _event_receiver, shutdown_sender) = channels();
        let started_at = Instant::now();
        let final_state = run_task(
            TaskKind::Prep,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        let polled_at = polled_at.lock().unwrap().expect("status was never polled");
        assert!(polled_at - started_at >= Duration::from_millis(POLL_INTERVAL_MS));
        assert_eq!(final_state, FlowState::Done);
    }

    #[tokio::test(start_paused = true)]
    // A `done` status stops polling after exactly one further UI update.
    async fn test_done_is_terminal() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Ok("task-1".to_string()));
        api.expect_task_status()
            .times(1)
            .returning(|_| Ok(TaskStatus::Done));

        let (event_sender, mut event_receiver, shutdown_sender) = channels();
        let final_state = run_task(
            TaskKind::Prep,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        assert_eq!(final_state, FlowState::Done);
        let events = drain(&mut event_receiver);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].msg, MSG_PROCESSING);
        assert_eq!(events[1].event_type, EventType::Success);
        assert_eq!(events[1].msg, MSG_COMPLETE);
    }

    #[tokio::test(start_paused = true)]
    // Pending keeps the loop alive; the in-progress message is re-emitted each tick.
    async fn test_pending_keeps_polling() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Ok("task-1".to_string()));

        let mut polls = 0;
        api.expect_task_status().times(3).returning_st(move |_| {
            polls += 1;
            if polls < 3 {
                Ok(TaskStatus::Pending)
            } else {
                Ok(TaskStatus::Done)
            }
        });

        let (event_sender, mut event_receiver, shutdown_sender) = channels();
        let final_state = run_task(
            TaskKind::Prep,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        assert_eq!(final_state, FlowState::Done);
        let events = drain(&mut event_receiver);
        assert_eq!(events.len(), 4);
        assert!(events[1..3].iter().all(|e| e.msg == MSG_PROCESSING));
        assert_eq!(events[3].msg, MSG_COMPLETE);
    }

    #[tokio::test(start_paused = true)]
    // An unrecognized status is not terminal and emits no event; the loop
    // polls again on the next tick.
    async fn test_unrecognized_status_keeps_polling() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Ok("task-1".to_string()));

        let mut polls = 0;
        api.expect_task_status().times(2).returning_st(move |_| {
            polls += 1;
            if polls < 2 {
                Ok(TaskStatus::Other)
            } else {
                Ok(TaskStatus::Done)
            }
        });

        let (event_sender, mut event_receiver, shutdown_sender) = channels();
        let final_state = run_task(
            TaskKind::Prep,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        assert_eq!(final_state, FlowState::Done);
        let events = drain(&mut event_receiver);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].msg, MSG_PROCESSING);
        assert_eq!(events[1].msg, MSG_COMPLETE);
    }

    #[tokio::test(start_paused = true)]
    // A failed task surfaces the server-supplied error text verbatim.
    async fn test_failed_shows_server_error() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Ok("task-1".to_string()));
        api.expect_task_status().times(1).returning(|_| {
            Ok(TaskStatus::Failed {
                error: "X".to_string(),
            })
        });

        let (event_sender, mut event_receiver, shutdown_sender) = channels();
        let final_state = run_task(
            TaskKind::Prep,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        assert_eq!(final_state, FlowState::Failed);
        let events = drain(&mut event_receiver);
        assert_eq!(events.last().unwrap().msg, "Error: X");
        assert_eq!(events.last().unwrap().event_type, EventType::Error);
    }

    #[tokio::test(start_paused = true)]
    // A submit response without a task ID is a failure; no poll is ever issued.
    async fn test_missing_task_id_never_polls() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Err(ApiError::MissingTaskId));
        api.expect_task_status().times(0);

        let (event_sender, mut event_receiver, shutdown_sender) = channels();
        let final_state = run_task(
            TaskKind::Prep,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        assert_eq!(final_state, FlowState::Error);
        let events = drain(&mut event_receiver);
        assert_eq!(events.last().unwrap().msg, MSG_SUBMIT_FAILED);
    }

    #[tokio::test(start_paused = true)]
    // A transport error while polling stops the loop immediately; no retry.
    async fn test_poll_error_is_terminal() {
        let mut api = MockTasksApi::new();
        api.expect_start_train_eval()
            .returning(|_| Ok("task-2".to_string()));
        api.expect_task_status().times(1).returning(|_| {
            Err(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        });

        let (event_sender, mut event_receiver, shutdown_sender) = channels();
        let final_state = run_task(
            TaskKind::TrainEval,
            "one",
            &api,
            event_sender,
            shutdown_sender.subscribe(),
        )
        .await;

        assert_eq!(final_state, FlowState::Error);
        let events = drain(&mut event_receiver);
        assert_eq!(events.last().unwrap().msg, MSG_POLL_FAILED);
    }

    #[tokio::test(start_paused = true)]
    // Shutdown interrupts an in-flight session between ticks.
    async fn test_shutdown_stops_polling() {
        let mut api = MockTasksApi::new();
        api.expect_start_prep()
            .returning(|_| Ok("task-1".to_string()));
        api.expect_task_status()
            .returning(|_| Ok(TaskStatus::Pending));

        let (event_sender, _event_receiver, shutdown_sender) = channels();
        let shutdown_receiver = shutdown_sender.subscribe();
        let handle = tokio::spawn(async move {
            run_task(TaskKind::Prep, "one", &api, event_sender, shutdown_receiver).await
        });

        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS / 2)).await;
        shutdown_sender.send(()).unwrap();
        let final_state = handle.await.unwrap();
        assert_eq!(final_state, FlowState::Polling("task-1".to_string()));
    }

    #[test]
    // Transition functions ignore events once the flow is terminal.
    fn test_terminal_states_ignore_further_events() {
        let mut flow = TaskFlow::new();
        flow.begin_submit();
        assert!(flow.on_submit_result(Ok("task-1".to_string())).is_none());
        assert!(flow.on_status(Ok(TaskStatus::Done)).is_some());
        assert_eq!(*flow.state(), FlowState::Done);

        assert!(flow.on_status(Ok(TaskStatus::Pending)).is_none());
        assert!(flow
            .on_submit_result(Ok("task-2".to_string()))
            .is_none());
        assert_eq!(*flow.state(), FlowState::Done);
    }
}
