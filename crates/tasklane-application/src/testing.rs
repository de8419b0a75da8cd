//! Scripted test doubles shared by the application tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tasklane_core::auth::{
    AuthSession, Credential, LoginRequest, LoginResponse, RegisterRequest, SessionStore,
};
use tasklane_core::remote::RemoteClient;
use tasklane_core::task::{NewTask, Task, TaskPatch};
use tasklane_core::user::UserProfile;
use tasklane_core::{Result, TasklaneError};
use tasklane_infrastructure::{MemoryKeyValueStore, PersistedSessionStore};
use tokio::sync::oneshot;

use crate::session_manager::SessionManager;
use crate::task_list::TaskListController;

/// A scripted answer: immediate, or held until the test releases it.
pub enum Reply<T> {
    Now(Result<T>),
    Gated(oneshot::Receiver<Result<T>>),
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Reply::Now(Ok(value))
    }

    pub fn err(error: TasklaneError) -> Self {
        Reply::Now(Err(error))
    }

    /// A reply plus the sender that releases it.
    pub fn gated() -> (Self, oneshot::Sender<Result<T>>) {
        let (tx, rx) = oneshot::channel();
        (Reply::Gated(rx), tx)
    }

    async fn resolve(self) -> Result<T> {
        match self {
            Reply::Now(result) => result,
            Reply::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(TasklaneError::network("gate dropped"))),
        }
    }
}

/// One recorded call: operation name plus the bearer token it carried.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub token: Option<String>,
    pub target: Option<String>,
}

/// Remote client answering from per-operation queues.
///
/// An empty queue answers with a network error, so unexpected calls show up
/// as failures rather than hangs.
#[derive(Default)]
pub struct ScriptedRemote {
    logins: Mutex<VecDeque<Reply<LoginResponse>>>,
    registrations: Mutex<VecDeque<Reply<UserProfile>>>,
    lists: Mutex<VecDeque<Reply<Vec<Task>>>>,
    creates: Mutex<VecDeque<Reply<Task>>>,
    updates: Mutex<VecDeque<Reply<Task>>>,
    deletes: Mutex<VecDeque<Reply<()>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_login(&self, reply: Reply<LoginResponse>) {
        self.logins.lock().unwrap().push_back(reply);
    }

    pub fn on_register(&self, reply: Reply<UserProfile>) {
        self.registrations.lock().unwrap().push_back(reply);
    }

    pub fn on_list(&self, reply: Reply<Vec<Task>>) {
        self.lists.lock().unwrap().push_back(reply);
    }

    pub fn on_create(&self, reply: Reply<Task>) {
        self.creates.lock().unwrap().push_back(reply);
    }

    pub fn on_update(&self, reply: Reply<Task>) {
        self.updates.lock().unwrap().push_back(reply);
    }

    pub fn on_delete(&self, reply: Reply<()>) {
        self.deletes.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, op: &'static str, credential: Option<&Credential>, target: Option<&str>) {
        self.calls.lock().unwrap().push(Call {
            op,
            token: credential.map(|c| c.as_str().to_string()),
            target: target.map(str::to_string),
        });
    }

    async fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>, op: &str) -> Result<T> {
        let reply = queue.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(TasklaneError::network(format!("unexpected {} call", op))),
        }
    }
}

#[async_trait]
impl RemoteClient for ScriptedRemote {
    async fn register(&self, payload: &RegisterRequest) -> Result<UserProfile> {
        self.record("register", None, Some(payload.email.as_str()));
        Self::next(&self.registrations, "register").await
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        self.record("login", None, Some(credentials.email.as_str()));
        Self::next(&self.logins, "login").await
    }

    async fn list_tasks(&self, credential: Option<&Credential>) -> Result<Vec<Task>> {
        self.record("list", credential, None);
        Self::next(&self.lists, "list").await
    }

    async fn create_task(&self, credential: Option<&Credential>, fields: &NewTask) -> Result<Task> {
        self.record("create", credential, Some(fields.title.as_str()));
        Self::next(&self.creates, "create").await
    }

    async fn update_task(
        &self,
        credential: Option<&Credential>,
        id: &str,
        _patch: &TaskPatch,
    ) -> Result<Task> {
        self.record("update", credential, Some(id));
        Self::next(&self.updates, "update").await
    }

    async fn delete_task(&self, credential: Option<&Credential>, id: &str) -> Result<()> {
        self.record("delete", credential, Some(id));
        Self::next(&self.deletes, "delete").await
    }
}

pub fn ann() -> UserProfile {
    UserProfile::new("u1", "Ann")
}

pub fn ann_session() -> AuthSession {
    AuthSession::new(ann(), Credential::new("tok1"))
}

pub fn login_response(user: UserProfile, token: &str) -> LoginResponse {
    LoginResponse {
        user,
        token: Credential::new(token),
    }
}

pub fn unauthorized() -> TasklaneError {
    TasklaneError::auth(401, Some("Invalid token".to_string()))
}

/// The wiring every application test starts from.
pub struct Harness {
    pub remote: Arc<ScriptedRemote>,
    pub entries: Arc<MemoryKeyValueStore>,
    pub store: Arc<PersistedSessionStore>,
    pub session: Arc<SessionManager>,
    pub tasks: Arc<TaskListController>,
}

impl Harness {
    /// Nobody logged in, empty store.
    pub fn anonymous() -> Self {
        Self::build(None)
    }

    /// Ann's session already persisted, as after a restart.
    pub fn signed_in() -> Self {
        Self::build(Some(ann_session()))
    }

    fn build(persisted: Option<AuthSession>) -> Self {
        let remote = ScriptedRemote::new();
        let entries = Arc::new(MemoryKeyValueStore::new());
        let store = Arc::new(PersistedSessionStore::new(entries.clone()));
        if let Some(session) = &persisted {
            store.save(session);
        }

        let session = Arc::new(SessionManager::new(remote.clone(), store.clone()));
        let tasks = Arc::new(TaskListController::new(remote.clone(), session.clone()));

        Self {
            remote,
            entries,
            store,
            session,
            tasks,
        }
    }

    /// Yields until the remote has seen `count` calls.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.remote.call_count() < count {
            tokio::task::yield_now().await;
        }
    }
}
