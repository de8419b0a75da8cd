//! Remote client trait.
//!
//! Defines the contract for talking to the hosted task API.

use async_trait::async_trait;

use crate::auth::{Credential, LoginRequest, LoginResponse, RegisterRequest};
use crate::error::Result;
use crate::task::{NewTask, Task, TaskPatch};
use crate::user::UserProfile;

/// Stateless request layer for the task API.
///
/// The caller passes the credential it currently holds; implementations
/// attach it as a bearer token to every task call. With `None` the request
/// goes out unauthenticated and is expected to fail with an auth error.
///
/// Every successful call returns the server's canonical representation of
/// the affected entity. Failures are normalized into [`crate::TasklaneError`]
/// and never swallowed or retried.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Creates an account. Does not establish a session.
    async fn register(&self, payload: &RegisterRequest) -> Result<UserProfile>;

    /// Exchanges credentials for a profile and bearer token.
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse>;

    /// Lists the session's tasks in server order.
    async fn list_tasks(&self, credential: Option<&Credential>) -> Result<Vec<Task>>;

    /// Creates a task and returns it with its server-assigned id.
    async fn create_task(&self, credential: Option<&Credential>, fields: &NewTask) -> Result<Task>;

    /// Applies a partial update and returns the full updated task.
    async fn update_task(
        &self,
        credential: Option<&Credential>,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task>;

    /// Deletes a task.
    async fn delete_task(&self, credential: Option<&Credential>, id: &str) -> Result<()>;
}
