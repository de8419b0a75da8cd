//! Task list state for the signed-in user.
//!
//! The controller never edits the list speculatively: a change lands only
//! once the server has confirmed it, and every response is checked against
//! the session it was requested under.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tasklane_core::remote::RemoteClient;
use tasklane_core::task::{NewTask, Task, TaskPatch};
use tasklane_core::{Result, TasklaneError};
use tracing::debug;

use crate::session_manager::{SessionManager, SessionTicket};

/// The remote operations the controller issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Message shown when the server did not supply one.
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Load => "Unable to load todos.",
            Operation::Create => "Unable to create todo.",
            Operation::Update => "Unable to update todo.",
            Operation::Delete => "Unable to delete todo.",
        }
    }
}

#[derive(Debug, Clone)]
struct FailedOperation {
    operation: Operation,
    error: TasklaneError,
}

#[derive(Debug, Default)]
struct TaskListState {
    tasks: Vec<Task>,
    loads_in_flight: usize,
    creates_in_flight: usize,
    error: Option<FailedOperation>,
    /// Session generation the contents belong to.
    generation: u64,
}

impl TaskListState {
    fn for_generation(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    fn begin(&mut self, operation: Operation) {
        match operation {
            Operation::Load => self.loads_in_flight += 1,
            Operation::Create => self.creates_in_flight += 1,
            Operation::Update | Operation::Delete => {}
        }
    }

    fn finish(&mut self, operation: Operation) {
        match operation {
            Operation::Load => self.loads_in_flight = self.loads_in_flight.saturating_sub(1),
            Operation::Create => {
                self.creates_in_flight = self.creates_in_flight.saturating_sub(1)
            }
            Operation::Update | Operation::Delete => {}
        }
    }
}

/// Holds the task list and runs the CRUD operations against the server.
///
/// Failures are caught here and kept in a single error slot; every
/// successful operation clears it. An `auth` failure additionally ends the
/// session through [`SessionManager::reconcile_failure`].
pub struct TaskListController {
    remote: Arc<dyn RemoteClient>,
    session: Arc<SessionManager>,
    state: Mutex<TaskListState>,
}

impl TaskListController {
    pub fn new(remote: Arc<dyn RemoteClient>, session: Arc<SessionManager>) -> Self {
        let generation = session.generation();
        Self {
            remote,
            session,
            state: Mutex::new(TaskListState::for_generation(generation)),
        }
    }

    /// Replaces the list with the server's, in server order.
    ///
    /// Returns `false` if the load failed or was discarded.
    pub async fn refresh(&self) -> bool {
        let ticket = self.begin(Operation::Load);
        let result = self.remote.list_tasks(ticket.credential()).await;

        self.settle(Operation::Load, &ticket, result, |tasks, loaded| {
            *tasks = loaded.clone();
        })
        .is_some()
    }

    /// Creates a task and puts the server's copy at the front of the list.
    ///
    /// A blank title is rejected locally without contacting the server.
    pub async fn create(&self, fields: NewTask) -> Option<Task> {
        let fields = match fields.normalized() {
            Ok(fields) => fields,
            Err(e) => {
                self.reject(Operation::Create, e);
                return None;
            }
        };

        let ticket = self.begin(Operation::Create);
        let result = self.remote.create_task(ticket.credential(), &fields).await;

        self.settle(Operation::Create, &ticket, result, |tasks, created| {
            tasks.retain(|t| t.id != created.id);
            tasks.insert(0, created.clone());
        })
    }

    /// Flips the completion flag of `task`.
    pub async fn toggle(&self, task: &Task) -> Option<Task> {
        self.update(&task.id, TaskPatch::completed(!task.completed))
            .await
    }

    /// Rewrites title and description. A blank title is rejected locally.
    pub async fn edit(&self, id: &str, title: &str, description: &str) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() {
            self.reject(
                Operation::Update,
                TasklaneError::validation("Title is required."),
            );
            return None;
        }

        self.update(id, TaskPatch::content(title, description.trim()))
            .await
    }

    /// Applies `patch` and replaces the local entry with the server's copy.
    pub async fn update(&self, id: &str, patch: TaskPatch) -> Option<Task> {
        let ticket = self.begin(Operation::Update);
        let result = self
            .remote
            .update_task(ticket.credential(), id, &patch)
            .await;

        self.settle(Operation::Update, &ticket, result, |tasks, updated| {
            if let Some(slot) = tasks.iter_mut().find(|t| t.id == updated.id) {
                *slot = updated.clone();
            }
        })
    }

    /// Deletes a task. Removing an id the list does not hold is a no-op.
    pub async fn remove(&self, id: &str) -> bool {
        let ticket = self.begin(Operation::Delete);
        let result = self.remote.delete_task(ticket.credential(), id).await;

        self.settle(Operation::Delete, &ticket, result, |tasks, _| {
            tasks.retain(|t| t.id != id);
        })
        .is_some()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock_state().tasks.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().loads_in_flight > 0
    }

    pub fn is_creating(&self) -> bool {
        self.lock_state().creates_in_flight > 0
    }

    /// The error of the most recent failed operation, if it has not been
    /// cleared by a later success.
    pub fn error(&self) -> Option<TasklaneError> {
        self.lock_state().error.as_ref().map(|f| f.error.clone())
    }

    /// The error slot rendered for display.
    pub fn error_message(&self) -> Option<String> {
        self.lock_state()
            .error
            .as_ref()
            .map(|f| f.error.user_message(f.operation.fallback_message()))
    }

    /// Records the start of a request and takes the ticket to send it with.
    fn begin(&self, operation: Operation) -> SessionTicket {
        let ticket = self.session.ticket();
        let mut state = self.lock_state();
        if state.generation == ticket.generation() {
            state.begin(operation);
            if operation == Operation::Load {
                state.error = None;
            }
        }
        ticket
    }

    /// Applies a response, unless the session changed while it was in flight.
    fn settle<T>(
        &self,
        operation: Operation,
        ticket: &SessionTicket,
        result: Result<T>,
        apply: impl FnOnce(&mut Vec<Task>, &T),
    ) -> Option<T> {
        if let Err(e) = &result {
            if self.session.reconcile_failure(ticket, e) {
                return None;
            }
        }

        let mut state = self.lock_state();
        if state.generation != ticket.generation() {
            debug!(
                operation = operation.name(),
                "Discarding response from an ended session"
            );
            return None;
        }
        state.finish(operation);

        match result {
            Ok(value) => {
                apply(&mut state.tasks, &value);
                state.error = None;
                Some(value)
            }
            Err(error) => {
                debug!(operation = operation.name(), kind = %error.kind(), "Task operation failed");
                state.error = Some(FailedOperation { operation, error });
                None
            }
        }
    }

    fn reject(&self, operation: Operation, error: TasklaneError) {
        debug!(operation = operation.name(), error = %error, "Rejected locally");
        self.lock_state().error = Some(FailedOperation { operation, error });
    }

    /// Locks the state, resetting it if the session moved on since it was
    /// filled.
    fn lock_state(&self) -> MutexGuard<'_, TaskListState> {
        let generation = self.session.generation();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation < generation {
            debug!(
                from = state.generation,
                to = generation,
                "Session changed; resetting task list"
            );
            *state = TaskListState::for_generation(generation);
        }
        state
    }
}
