//! Session controller for the xIRAS client.
//!
//! `SessionController` owns the in-memory session and everything fetched with
//! it. It gates which fetches are allowed, starts the profile fetch right after
//! a login, and turns every failure into a per-operation error message.
//!
//! Remote calls run in spawned tokio tasks and report back over an MPSC
//! channel as `FetchOutcome` values. The controller is the only thing that
//! mutates state; it applies outcomes in `poll` (non-blocking, once per UI
//! frame) or `settle` (awaits until nothing is in flight).

pub mod state;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::auth::{AccountKey, Credentials, Session};
use crate::config::Config;
use crate::models::{CourseList, StudentProfile};

pub use state::{OperationKind, RequestHandle, SessionError, SessionState, ViewState};

/// Buffer size for the fetch result channel.
/// At most one live request per operation kind, plus superseded ones.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Result of a background call, tagged with the handle that started it.
enum FetchOutcome {
    Authenticated {
        handle: RequestHandle,
        key: AccountKey,
        result: Result<String>,
    },
    Profile {
        handle: RequestHandle,
        result: Result<StudentProfile>,
    },
    Courses {
        handle: RequestHandle,
        result: Result<CourseList>,
    },
}

impl FetchOutcome {
    fn handle(&self) -> RequestHandle {
        match self {
            FetchOutcome::Authenticated { handle, .. }
            | FetchOutcome::Profile { handle, .. }
            | FetchOutcome::Courses { handle, .. } => *handle,
        }
    }
}

pub struct SessionController {
    api: ApiClient,
    session: Option<Session>,
    profile: Option<StudentProfile>,
    courses: Option<CourseList>,
    view: ViewState,
    next_request_id: u64,
    outcome_tx: mpsc::Sender<FetchOutcome>,
    outcome_rx: mpsc::Receiver<FetchOutcome>,
}

impl SessionController {
    /// Create a controller talking to the API named by `config`
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    pub fn with_client(api: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            api,
            session: None,
            profile: None,
            courses: None,
            view: ViewState::default(),
            next_request_id: 0,
            outcome_tx: tx,
            outcome_rx: rx,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::LoggedIn
        } else if self.view.is_loading(OperationKind::Authenticate) {
            SessionState::Authenticating
        } else {
            SessionState::LoggedOut
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn profile(&self) -> Option<&StudentProfile> {
        self.profile.as_ref()
    }

    pub fn courses(&self) -> Option<&CourseList> {
        self.courses.as_ref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_loading(&self, kind: OperationKind) -> bool {
        self.view.is_loading(kind)
    }

    pub fn error(&self, kind: OperationKind) -> Option<SessionError> {
        self.view.error(kind)
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.view.last_error()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    fn next_handle(&mut self, kind: OperationKind) -> RequestHandle {
        self.next_request_id += 1;
        RequestHandle {
            kind,
            id: self.next_request_id,
        }
    }

    /// Start a login. Returns `None` when no request was sent: already logged
    /// in, a login already in flight, or a field is empty (which sets the
    /// authenticate error).
    pub fn authenticate(&mut self, identifier: &str, secret: &str) -> Option<RequestHandle> {
        if self.session.is_some() {
            debug!("Ignoring authenticate while logged in");
            return None;
        }
        if self.view.is_loading(OperationKind::Authenticate) {
            debug!("Ignoring authenticate while a login is in flight");
            return None;
        }

        let credentials = Credentials::new(identifier, secret);
        if !credentials.is_complete() {
            self.view.fail(SessionError::MissingCredentials);
            return None;
        }

        let handle = self.next_handle(OperationKind::Authenticate);
        self.view.begin(handle);

        let api = self.api.clone();
        let key = AccountKey::from_credentials(&credentials);
        info!(account = %key, "Authenticating");

        self.spawn_call(
            async move { api.authenticate(&credentials).await },
            move |result| FetchOutcome::Authenticated { handle, key, result },
        );

        Some(handle)
    }

    /// Fetch the student profile for the session's account key.
    /// A no-op returning `None` while logged out.
    pub fn fetch_profile(&mut self) -> Option<RequestHandle> {
        let (api, key) = self.authenticated_request()?;
        let handle = self.next_handle(OperationKind::Profile);
        self.view.begin(handle);

        self.spawn_call(
            async move { api.fetch_profile(&key).await },
            move |result| FetchOutcome::Profile { handle, result },
        );

        Some(handle)
    }

    /// Fetch the course list for the session's account key.
    /// A no-op returning `None` while logged out.
    pub fn fetch_courses(&mut self) -> Option<RequestHandle> {
        let (api, key) = self.authenticated_request()?;
        let handle = self.next_handle(OperationKind::Courses);
        self.view.begin(handle);

        self.spawn_call(
            async move { api.fetch_courses(&key).await },
            move |result| FetchOutcome::Courses { handle, result },
        );

        Some(handle)
    }

    /// Run `call` in its own task and report its result, or its panic, as an
    /// outcome. Every started request therefore sends exactly one outcome.
    fn spawn_call<T, F, W>(&self, call: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
        W: FnOnce(Result<T>) -> FetchOutcome + Send + 'static,
    {
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(call).await {
                Ok(result) => result,
                Err(e) => Err(anyhow::Error::new(e).context("Request task failed")),
            };
            Self::send_outcome(&tx, wrap(result)).await;
        });
    }

    /// Drop the session and everything fetched with it. Idempotent.
    ///
    /// In-flight calls are not aborted, but their results will be discarded.
    pub fn logout(&mut self) {
        if self.session.is_some() || self.view.any_loading() {
            info!("Logging out");
        }
        self.session = None;
        self.profile = None;
        self.courses = None;
        self.view.reset();
    }

    fn authenticated_request(&self) -> Option<(ApiClient, AccountKey)> {
        match self.session {
            Some(ref session) => {
                let api = self.api.with_token(Arc::new(session.token().to_string()));
                Some((api, session.account_key().clone()))
            }
            None => {
                debug!("Ignoring fetch while logged out");
                None
            }
        }
    }

    // =========================================================================
    // Applying results
    // =========================================================================

    /// Helper to send outcomes, logging any channel errors
    async fn send_outcome(tx: &mpsc::Sender<FetchOutcome>, outcome: FetchOutcome) {
        if let Err(e) = tx.send(outcome).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    /// Apply every result that has already arrived. Returns how many were applied
    /// (stale results count as received but change nothing).
    pub fn poll(&mut self) -> usize {
        let mut received = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
            received += 1;
        }
        received
    }

    /// Wait until no operation is in flight, applying results as they arrive.
    ///
    /// This includes the profile fetch chained onto a successful login.
    pub async fn settle(&mut self) {
        while self.view.any_loading() {
            match self.outcome_rx.recv().await {
                Some(outcome) => self.apply(outcome),
                None => break,
            }
        }
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        let handle = outcome.handle();
        if !self.view.finish(handle) {
            debug!(kind = ?handle.kind, id = handle.id, "Dropping stale result");
            return;
        }

        match outcome {
            FetchOutcome::Authenticated { key, result, .. } => match result {
                Ok(token) => {
                    info!(account = %key, "Login successful");
                    self.session = Some(Session::new(token, key));
                    self.profile = None;
                    self.courses = None;
                    // Session just went from absent to present
                    self.fetch_profile();
                }
                Err(e) => {
                    let cause = format!("{:#}", e);
                    error!(error = %cause, "Login failed");
                    self.view.fail(SessionError::AuthenticationFailed);
                }
            },
            FetchOutcome::Profile { result, .. } => match result {
                Ok(profile) => {
                    debug!("Student details fetched successfully");
                    self.profile = Some(profile);
                }
                Err(e) => {
                    let cause = format!("{:#}", e);
                    warn!(error = %cause, "Student details fetch failed");
                    self.view.fail(SessionError::ProfileFetchFailed);
                }
            },
            FetchOutcome::Courses { result, .. } => match result {
                Ok(courses) => {
                    debug!(count = courses.len(), "Courses fetched successfully");
                    self.courses = Some(courses);
                }
                Err(e) => {
                    let cause = format!("{:#}", e);
                    warn!(error = %cause, "Courses fetch failed");
                    self.view.fail(SessionError::CourseFetchFailed);
                }
            },
        }
    }
}
