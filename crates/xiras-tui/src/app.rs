//! Application state management for xiras.
//!
//! `App` wraps the core `SessionController` with the terminal UI state: the
//! login form, the selected tab, overlays, and the course list cursor.

use anyhow::Result;
use tracing::{debug, info};

use xiras_core::{Config, OperationKind, SessionController, SessionError, SessionState};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable that pre-fills the username field
pub const USERNAME_ENV: &str = "XIRAS_USERNAME";

/// Maximum length for username input.
/// IRAS student IDs and emails fit comfortably.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// The captured password is an encrypted blob, longer than a typed password.
const MAX_PASSWORD_LENGTH: usize = 256;

/// Number of rows to move on page up/down in the course list.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Profile,
    Courses,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Profile => "Profile",
            Tab::Courses => "Courses",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Profile => Tab::Courses,
            Tab::Courses => Tab::Profile,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Profile => Tab::Courses,
            Tab::Courses => Tab::Profile,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub controller: SessionController,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub course_selection: usize,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let controller = SessionController::new(&config)?;

        let login_username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        debug!(prefilled = !login_username.is_empty(), "Login form initialized");

        Ok(Self {
            controller,

            state: AppState::LoggingIn,
            current_tab: Tab::Profile,
            course_selection: 0,

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.controller.is_authenticated()
    }

    pub fn is_logging_in(&self) -> bool {
        self.controller.state() == SessionState::Authenticating
    }

    /// Show the login form
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    /// Submit the login form. The result arrives via `check_background_tasks`.
    pub fn attempt_login(&mut self) {
        if self.is_logging_in() {
            return;
        }
        if self
            .controller
            .authenticate(&self.login_username, &self.login_password)
            .is_none()
            && self.login_password.is_empty()
        {
            self.login_focus = LoginFocus::Password;
        }
    }

    /// The message shown under the login form
    pub fn login_error(&self) -> Option<SessionError> {
        self.controller.error(OperationKind::Authenticate)
    }

    pub fn logout(&mut self) {
        self.controller.logout();
        self.course_selection = 0;
        self.current_tab = Tab::Profile;
        self.start_login();
        info!("Returned to login");
    }

    // =========================================================================
    // Data
    // =========================================================================

    pub fn reload_profile(&mut self) {
        self.controller.fetch_profile();
    }

    pub fn load_courses(&mut self) {
        if self.controller.fetch_courses().is_some() {
            self.course_selection = 0;
        }
    }

    pub fn course_count(&self) -> usize {
        self.controller.courses().map(|c| c.len()).unwrap_or(0)
    }

    pub fn select_next_course(&mut self, step: usize) {
        let count = self.course_count();
        if count > 0 {
            self.course_selection = (self.course_selection + step).min(count - 1);
        }
    }

    pub fn select_prev_course(&mut self, step: usize) {
        self.course_selection = self.course_selection.saturating_sub(step);
    }

    /// Apply finished background calls and leave the login form once logged in.
    pub fn check_background_tasks(&mut self) {
        if self.controller.poll() == 0 {
            return;
        }

        if self.state == AppState::LoggingIn && self.controller.is_authenticated() {
            self.login_password.clear();
            self.state = AppState::Normal;
            self.current_tab = Tab::Profile;
        }

        let count = self.course_count();
        if self.course_selection >= count {
            self.course_selection = count.saturating_sub(1);
        }
    }

    /// Left side of the status bar
    pub fn status_text(&self) -> String {
        if let Some(err) = self.controller.last_error() {
            return err.to_string();
        }
        match self.controller.session() {
            Some(session) => format!(
                "Signed in as {} {}",
                session.account_key(),
                xiras_core::utils::format_age(session.minutes_since_login())
            ),
            None => String::new(),
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let config = Config {
            api_url: Some("http://127.0.0.1:9".to_string()),
            last_username: Some("2110123".to_string()),
            ..Config::default()
        };
        App::new(config).unwrap()
    }

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Profile.next(), Tab::Courses);
        assert_eq!(Tab::Courses.next(), Tab::Profile); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Profile.prev(), Tab::Courses); // Wraps around
        assert_eq!(Tab::Courses.prev(), Tab::Profile);
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(255, '='));
        assert!(!can_add_password_char(256, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[tokio::test]
    async fn test_starts_on_login_form() {
        let mut app = app();
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_authenticated());

        app.start_login();
        // Username came from config, so focus starts on the password
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[tokio::test]
    async fn test_empty_password_sets_error_and_focus() {
        let mut app = app();
        app.login_focus = LoginFocus::Button;
        app.attempt_login();
        assert_eq!(app.login_error(), Some(SessionError::MissingCredentials));
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(!app.is_logging_in());
    }

    #[tokio::test]
    async fn test_successful_login_clears_password() {
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "access_token": "T" }] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/student-details/2110123/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "studentName": "Nusrat Jahan", "studentId": "2110123" }
            })))
            .mount(&server)
            .await;

        let config = Config {
            api_url: Some(server.uri()),
            ..Config::default()
        };
        let mut app = App::new(config).unwrap();
        app.login_username = "2110123".to_string();
        app.login_password = "encrypted-blob".to_string();
        app.login_focus = LoginFocus::Button;

        app.attempt_login();
        assert!(app.is_logging_in());

        for _ in 0..200 {
            app.check_background_tasks();
            if app.state == AppState::Normal {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(app.state, AppState::Normal);
        assert!(app.is_authenticated());
        assert!(app.login_password.is_empty());
        assert_eq!(app.login_username, "2110123");
        assert_eq!(app.current_tab, Tab::Profile);
        assert!(app.login_error().is_none());
    }

    #[tokio::test]
    async fn test_course_selection_without_courses() {
        let mut app = app();
        app.select_next_course(PAGE_SCROLL_SIZE);
        assert_eq!(app.course_selection, 0);
        app.select_prev_course(1);
        assert_eq!(app.course_selection, 0);
        assert_eq!(app.status_text(), "");
    }
}
