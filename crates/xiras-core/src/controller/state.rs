//! View-state types for the session controller.

use thiserror::Error;

/// The three remote operations the controller can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Authenticate,
    Profile,
    Courses,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Authenticate,
        OperationKind::Profile,
        OperationKind::Courses,
    ];

    fn index(&self) -> usize {
        match self {
            OperationKind::Authenticate => 0,
            OperationKind::Profile => 1,
            OperationKind::Courses => 2,
        }
    }
}

/// Tag for one in-flight operation.
///
/// A result is applied only while its handle is still the pending one for
/// its kind; logout and re-triggering both invalidate older handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHandle {
    pub kind: OperationKind,
    pub id: u64,
}

/// Coarse login state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    LoggedIn,
}

/// User-facing failures, one per operation.
///
/// The `Display` text is what the user sees; causes are only logged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Username and password required")]
    MissingCredentials,

    #[error("Login failed. Please check your credentials.")]
    AuthenticationFailed,

    #[error("Error fetching student data.")]
    ProfileFetchFailed,

    #[error("Error fetching course data.")]
    CourseFetchFailed,
}

impl SessionError {
    pub fn kind(&self) -> OperationKind {
        match self {
            SessionError::MissingCredentials | SessionError::AuthenticationFailed => {
                OperationKind::Authenticate
            }
            SessionError::ProfileFetchFailed => OperationKind::Profile,
            SessionError::CourseFetchFailed => OperationKind::Courses,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct OperationSlot {
    pending: Option<u64>,
    error: Option<SessionError>,
}

/// Loading and error flags for every operation kind.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    slots: [OperationSlot; 3],
    last_error: Option<OperationKind>,
}

impl ViewState {
    pub fn is_loading(&self, kind: OperationKind) -> bool {
        self.slots[kind.index()].pending.is_some()
    }

    pub fn any_loading(&self) -> bool {
        OperationKind::ALL.iter().any(|k| self.is_loading(*k))
    }

    pub fn error(&self, kind: OperationKind) -> Option<SessionError> {
        self.slots[kind.index()].error
    }

    /// The most recently reported error, until any operation starts.
    pub fn last_error(&self) -> Option<SessionError> {
        self.last_error.and_then(|kind| self.error(kind))
    }

    /// Mark `handle` as the pending request for its kind and clear stale errors.
    pub(crate) fn begin(&mut self, handle: RequestHandle) {
        let slot = &mut self.slots[handle.kind.index()];
        slot.pending = Some(handle.id);
        slot.error = None;
        self.last_error = None;
    }

    /// Release `handle` if it is still the pending one. False means stale.
    pub(crate) fn finish(&mut self, handle: RequestHandle) -> bool {
        let slot = &mut self.slots[handle.kind.index()];
        if slot.pending == Some(handle.id) {
            slot.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn fail(&mut self, error: SessionError) {
        let kind = error.kind();
        self.slots[kind.index()].error = Some(error);
        self.last_error = Some(kind);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(kind: OperationKind, id: u64) -> RequestHandle {
        RequestHandle { kind, id }
    }

    #[test]
    fn test_begin_and_finish() {
        let mut view = ViewState::default();
        view.begin(handle(OperationKind::Profile, 1));
        assert!(view.is_loading(OperationKind::Profile));
        assert!(!view.is_loading(OperationKind::Courses));
        assert!(view.finish(handle(OperationKind::Profile, 1)));
        assert!(!view.any_loading());
    }

    #[test]
    fn test_superseded_handle_is_stale() {
        let mut view = ViewState::default();
        view.begin(handle(OperationKind::Courses, 1));
        view.begin(handle(OperationKind::Courses, 2));
        assert!(!view.finish(handle(OperationKind::Courses, 1)));
        assert!(view.is_loading(OperationKind::Courses));
        assert!(view.finish(handle(OperationKind::Courses, 2)));
    }

    #[test]
    fn test_errors_are_per_kind() {
        let mut view = ViewState::default();
        view.fail(SessionError::ProfileFetchFailed);
        view.fail(SessionError::CourseFetchFailed);
        assert_eq!(view.error(OperationKind::Profile), Some(SessionError::ProfileFetchFailed));
        assert_eq!(view.last_error(), Some(SessionError::CourseFetchFailed));

        // Restarting courses clears its own slot and the shared last error only
        view.begin(handle(OperationKind::Courses, 3));
        assert_eq!(view.error(OperationKind::Courses), None);
        assert_eq!(view.error(OperationKind::Profile), Some(SessionError::ProfileFetchFailed));
        assert_eq!(view.last_error(), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut view = ViewState::default();
        view.begin(handle(OperationKind::Authenticate, 1));
        view.fail(SessionError::AuthenticationFailed);
        view.reset();
        assert!(!view.any_loading());
        assert!(OperationKind::ALL.iter().all(|k| view.error(*k).is_none()));
        assert_eq!(view.last_error(), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SessionError::AuthenticationFailed.to_string(),
            "Login failed. Please check your credentials."
        );
        assert_eq!(SessionError::MissingCredentials.kind(), OperationKind::Authenticate);
    }
}
