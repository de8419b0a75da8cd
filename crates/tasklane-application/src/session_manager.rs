//! Session lifecycle.
//!
//! `SessionManager` owns the single in-memory session, keeps it in step with
//! the durable [`SessionStore`], and decides when a failed remote call ends
//! the session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tasklane_core::auth::{AuthSession, Credential, LoginRequest, RegisterRequest, SessionStore};
use tasklane_core::remote::RemoteClient;
use tasklane_core::user::UserProfile;
use tasklane_core::{Result, TasklaneError};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct SessionState {
    session: Option<AuthSession>,
    /// Bumped whenever the session is established or torn down.
    generation: u64,
}

/// Snapshot of the session taken before a remote request.
///
/// When the response arrives, [`SessionManager::is_current`] tells whether
/// the session the request was made for is still the live one.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTicket {
    generation: u64,
    credential: Option<Credential>,
}

impl SessionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The credential to send with the request, if any.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

/// Manages the authenticated session.
///
/// `SessionManager` is responsible for:
/// - Rehydrating the session from storage at construction
/// - Logging in, registering and logging out
/// - Ending the session when the server rejects its credential
///
/// It is the only writer of the session store.
pub struct SessionManager {
    remote: Arc<dyn RemoteClient>,
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
    /// Number of login/register calls in flight.
    auth_in_flight: AtomicUsize,
}

impl SessionManager {
    /// Creates a manager, restoring any session persisted by a previous run.
    pub fn new(remote: Arc<dyn RemoteClient>, store: Arc<dyn SessionStore>) -> Self {
        let session = store.load();
        match &session {
            Some(session) => debug!(user_id = %session.user.id, "Restored persisted session"),
            None => debug!("Starting without a session"),
        }

        Self {
            remote,
            store,
            state: RwLock::new(SessionState {
                session,
                generation: 0,
            }),
            auth_in_flight: AtomicUsize::new(0),
        }
    }

    /// Exchanges credentials for a session and persists it.
    ///
    /// On failure the current session (if any) is left untouched and the
    /// remote error is returned as is.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        let _in_flight = AuthInFlight::begin(&self.auth_in_flight);

        let session = match self.remote.login(&request).await {
            Ok(response) => AuthSession::from(response),
            Err(e) => {
                debug!(kind = %e.kind(), "Login rejected");
                return Err(e);
            }
        };

        self.store.save(&session);
        {
            let mut state = self.write_state();
            state.session = Some(session.clone());
            state.generation += 1;
        }

        info!(user_id = %session.user.id, "Logged in");
        Ok(session)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile> {
        let _in_flight = AuthInFlight::begin(&self.auth_in_flight);

        let profile = self.remote.register(&request).await?;
        info!(user_id = %profile.id, "Registered account");
        Ok(profile)
    }

    /// Ends the session in memory and in storage. Safe to call repeatedly.
    pub fn logout(&self) {
        if self.end_session() {
            info!("Logged out");
        }
    }

    /// Ends the session if `error` rejected the credential `ticket` was
    /// taken with and that session is still live.
    ///
    /// Returns `true` when a logout happened.
    pub fn reconcile_failure(&self, ticket: &SessionTicket, error: &TasklaneError) -> bool {
        if !error.is_auth() {
            return false;
        }
        if !self.is_current(ticket) {
            debug!("Ignoring auth failure from an ended session");
            return false;
        }

        let ended = {
            let mut state = self.write_state();
            if state.generation == ticket.generation {
                Self::take_session(&mut state)
            } else {
                false
            }
        };

        if ended {
            self.store.clear();
            warn!(error = %error, "Credential rejected by the server; session ended");
        }
        ended
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().session.is_some()
    }

    pub fn is_auth_in_progress(&self) -> bool {
        self.auth_in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.read_state().session.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read_state().session.as_ref().map(|s| s.user.clone())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.read_state().session.as_ref().map(|s| s.token.clone())
    }

    pub fn generation(&self) -> u64 {
        self.read_state().generation
    }

    /// Takes a snapshot to send a request with.
    pub fn ticket(&self) -> SessionTicket {
        let state = self.read_state();
        SessionTicket {
            generation: state.generation,
            credential: state.session.as_ref().map(|s| s.token.clone()),
        }
    }

    /// Whether the session has not changed since `ticket` was taken.
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.read_state().generation == ticket.generation
    }

    fn end_session(&self) -> bool {
        let ended = Self::take_session(&mut self.write_state());
        self.store.clear();
        ended
    }

    fn take_session(state: &mut SessionState) -> bool {
        match state.session.take() {
            Some(_) => {
                state.generation += 1;
                true
            }
            None => false,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts an auth call as in flight until dropped.
struct AuthInFlight<'a>(&'a AtomicUsize);

impl<'a> AuthInFlight<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for AuthInFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, Reply, ann, ann_session, login_response, unauthorized};
    use tasklane_core::ErrorKind;
    use tasklane_infrastructure::persisted_session_store::{TOKEN_KEY, USER_KEY};

    #[test]
    fn test_starts_from_persisted_session() {
        let harness = Harness::signed_in();

        assert!(harness.session.is_authenticated());
        assert_eq!(harness.session.session(), Some(ann_session()));
        assert_eq!(harness.session.user().unwrap().name, "Ann");
        assert_eq!(harness.session.credential().unwrap().as_str(), "tok1");
    }

    #[test]
    fn test_starts_anonymous_with_empty_store() {
        let harness = Harness::anonymous();

        assert!(!harness.session.is_authenticated());
        assert!(harness.session.user().is_none());
        assert!(harness.session.ticket().credential().is_none());
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let harness = Harness::anonymous();
        harness.remote.on_login(Reply::ok(login_response(ann(), "tok1")));

        let session = harness
            .session
            .login(LoginRequest::new("ann@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(session, ann_session());
        assert!(harness.session.is_authenticated());
        assert!(!harness.session.is_auth_in_progress());

        let snapshot = harness.entries.snapshot();
        assert_eq!(snapshot[TOKEN_KEY], "tok1");
        let user: serde_json::Value = serde_json::from_str(&snapshot[USER_KEY]).unwrap();
        assert_eq!(user, serde_json::json!({"id": "u1", "name": "Ann"}));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let harness = Harness::signed_in();
        let before = harness.session.ticket();
        harness.remote.on_login(Reply::err(TasklaneError::auth(
            401,
            Some("Invalid credentials".to_string()),
        )));

        let err = harness
            .session
            .login(LoginRequest::new("ann@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert_eq!(harness.session.session(), Some(ann_session()));
        assert!(harness.session.is_current(&before));
        assert!(!harness.session.is_auth_in_progress());
        assert_eq!(harness.store.load(), Some(ann_session()));
    }

    #[tokio::test]
    async fn test_auth_in_progress_while_login_pending() {
        let harness = Harness::anonymous();
        let (reply, release) = Reply::gated();
        harness.remote.on_login(reply);

        let session = harness.session.clone();
        let pending = tokio::spawn(async move {
            session.login(LoginRequest::new("ann@example.com", "pw")).await
        });
        harness.wait_for_calls(1).await;

        assert!(harness.session.is_auth_in_progress());
        release.send(Ok(login_response(ann(), "tok1"))).unwrap();
        pending.await.unwrap().unwrap();
        assert!(!harness.session.is_auth_in_progress());
    }

    #[tokio::test]
    async fn test_register_does_not_log_in() {
        let harness = Harness::anonymous();
        let profile = ann().with_email("ann@example.com");
        harness.remote.on_register(Reply::ok(profile.clone()));

        let created = harness
            .session
            .register(RegisterRequest::new("Ann", "ann@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(created, profile);
        assert!(!harness.session.is_authenticated());
        assert!(harness.entries.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_register_failure_is_returned_verbatim() {
        let harness = Harness::anonymous();
        let rejection = TasklaneError::Validation {
            status: Some(409),
            message: Some("Email already registered".to_string()),
        };
        harness.remote.on_register(Reply::err(rejection.clone()));

        let err = harness
            .session
            .register(RegisterRequest::new("Ann", "ann@example.com", "pw"))
            .await
            .unwrap_err();

        assert_eq!(err, rejection);
        assert!(!harness.session.is_auth_in_progress());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let harness = Harness::signed_in();
        let generation = harness.session.generation();

        harness.session.logout();
        assert!(!harness.session.is_authenticated());
        assert!(harness.entries.snapshot().is_empty());
        assert_eq!(harness.session.generation(), generation + 1);

        harness.session.logout();
        assert!(!harness.session.is_authenticated());
        assert!(harness.store.load().is_none());
        assert_eq!(harness.session.generation(), generation + 1);
    }

    #[test]
    fn test_auth_failure_ends_current_session() {
        let harness = Harness::signed_in();
        let ticket = harness.session.ticket();

        assert!(harness.session.reconcile_failure(&ticket, &unauthorized()));
        assert!(!harness.session.is_authenticated());
        assert!(harness.store.load().is_none());
        assert!(harness.entries.snapshot().is_empty());
    }

    #[test]
    fn test_non_auth_failures_keep_session() {
        let harness = Harness::signed_in();
        let ticket = harness.session.ticket();

        for error in [
            TasklaneError::validation("Title is required."),
            TasklaneError::not_found("Task", "t1"),
            TasklaneError::network("connection refused"),
            TasklaneError::malformed("missing field `id`"),
        ] {
            assert!(!harness.session.reconcile_failure(&ticket, &error));
        }
        assert_eq!(harness.session.session(), Some(ann_session()));
    }

    #[tokio::test]
    async fn test_stale_auth_failure_spares_newer_session() {
        let harness = Harness::signed_in();
        let old_ticket = harness.session.ticket();

        harness.session.logout();
        harness.remote.on_login(Reply::ok(login_response(
            UserProfile::new("u2", "Bob"),
            "tok2",
        )));
        harness
            .session
            .login(LoginRequest::new("bob@example.com", "pw"))
            .await
            .unwrap();

        assert!(!harness.session.is_current(&old_ticket));
        assert!(!harness.session.reconcile_failure(&old_ticket, &unauthorized()));
        assert_eq!(harness.session.user().unwrap().name, "Bob");
        assert_eq!(harness.session.credential().unwrap().as_str(), "tok2");
    }

    #[test]
    fn test_ticket_carries_current_credential() {
        let harness = Harness::signed_in();
        let ticket = harness.session.ticket();

        assert_eq!(ticket.credential().map(Credential::as_str), Some("tok1"));
        assert!(harness.session.is_current(&ticket));
    }
}
