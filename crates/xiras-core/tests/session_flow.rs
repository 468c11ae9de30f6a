//! End-to-end tests for the session controller against a mock xIRAS API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xiras_core::{
    Config, CredentialFields, EnvelopePolarity, OperationKind, SessionController, SessionError,
    SessionState,
};

fn config(server: &MockServer) -> Config {
    Config {
        api_url: Some(server.uri()),
        ..Config::default()
    }
}

fn profile_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "studentName": "Nusrat Jahan",
            "studentId": "s123",
            "cgpa": 3.71,
            "firstMajor": "Computer Science",
            "email": "s123@iub.edu.bd"
        }
    })
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "access_token": token }] })),
        )
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/student-details/s123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(server)
        .await;
}

/// Log in as s123 and wait for the automatic profile fetch.
async fn logged_in(config: &Config) -> SessionController {
    let mut ctrl = SessionController::new(config).unwrap();
    ctrl.authenticate("s123", "pw").unwrap();
    ctrl.settle().await;
    assert_eq!(ctrl.state(), SessionState::LoggedIn);
    ctrl
}

async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        if server.received_requests().await.unwrap_or_default().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server never received {} requests", count);
}

#[tokio::test]
async fn test_login_stores_token_and_fetches_profile_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "email": "s123", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "access_token": "T" }] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/student-details/s123/"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctrl = SessionController::new(&config(&server)).unwrap();
    let handle = ctrl.authenticate("s123", "pw").unwrap();
    assert_eq!(handle.kind, OperationKind::Authenticate);
    assert_eq!(ctrl.state(), SessionState::Authenticating);

    ctrl.settle().await;

    assert_eq!(ctrl.state(), SessionState::LoggedIn);
    let session = ctrl.session().unwrap();
    assert_eq!(session.token(), "T");
    assert_eq!(session.account_key().as_str(), "s123");

    let profile = ctrl.profile().unwrap();
    assert_eq!(profile.student_name, Some(json!("Nusrat Jahan")));
    assert_eq!(profile.cgpa, Some(json!(3.71)));
    assert!(ctrl.courses().is_none());
    assert!(ctrl.last_error().is_none());
}

#[tokio::test]
async fn test_empty_token_list_fails_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut ctrl = SessionController::new(&config(&server)).unwrap();
    ctrl.authenticate("s123", "wrong").unwrap();
    ctrl.settle().await;

    assert_eq!(ctrl.state(), SessionState::LoggedOut);
    assert!(ctrl.session().is_none());
    assert_eq!(ctrl.last_error(), Some(SessionError::AuthenticationFailed));
    assert_eq!(
        ctrl.last_error().unwrap().to_string(),
        "Login failed. Please check your credentials."
    );
}

#[tokio::test]
async fn test_every_bad_token_response_is_the_same_failure() {
    let responses = [
        ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        ResponseTemplate::new(500).set_body_string("boom"),
        ResponseTemplate::new(200).set_body_json(json!({ "token": "T" })),
        ResponseTemplate::new(200).set_body_json(json!({ "data": [{}] })),
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    ];

    for response in responses {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(response)
            .mount(&server)
            .await;

        let mut ctrl = SessionController::new(&config(&server)).unwrap();
        ctrl.authenticate("s123", "pw").unwrap();
        ctrl.settle().await;

        assert_eq!(ctrl.state(), SessionState::LoggedOut);
        assert_eq!(ctrl.error(OperationKind::Authenticate), Some(SessionError::AuthenticationFailed));
    }
}

#[tokio::test]
async fn test_unreachable_server_fails_login() {
    // Nothing listens on the discard port
    let config = Config {
        api_url: Some("http://127.0.0.1:9".to_string()),
        ..Config::default()
    };
    let mut ctrl = SessionController::new(&config).unwrap();
    ctrl.authenticate("s123", "pw").unwrap();
    ctrl.settle().await;

    assert_eq!(ctrl.state(), SessionState::LoggedOut);
    assert_eq!(ctrl.last_error(), Some(SessionError::AuthenticationFailed));
}

#[tokio::test]
async fn test_username_credential_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "username": "s123", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "access_token": "T" }] })))
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server).await;

    let config = Config {
        credential_fields: CredentialFields::Username,
        ..config(&server)
    };
    let ctrl = logged_in(&config).await;
    assert!(ctrl.profile().is_some());
}

#[tokio::test]
async fn test_courses_are_fetched_on_demand_only() {
    let server = MockServer::start().await;
    mount_token(&server, "T").await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/courses/s123/"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": ["CSE303", "CSE201"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut ctrl = logged_in(&config(&server)).await;
    assert!(ctrl.courses().is_none());

    let handle = ctrl.fetch_courses().unwrap();
    assert_eq!(handle.kind, OperationKind::Courses);
    assert!(ctrl.is_loading(OperationKind::Courses));
    assert!(!ctrl.is_loading(OperationKind::Profile));

    ctrl.settle().await;
    assert_eq!(ctrl.courses().unwrap().labels(), ["CSE303", "CSE201"]);
    assert!(ctrl.error(OperationKind::Courses).is_none());
}

#[tokio::test]
async fn test_courses_before_login_is_noop() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let mut ctrl = SessionController::new(&config(&server)).unwrap();
    assert!(ctrl.fetch_courses().is_none());
    assert!(ctrl.fetch_profile().is_none());
    ctrl.settle().await;
    assert_eq!(ctrl.state(), SessionState::LoggedOut);
    assert!(ctrl.courses().is_none());
}

/// `{success:false, data:[...]}` under both readings of the success flag.
/// Conventional (the default) rejects it; Inverted reproduces the legacy
/// web client and uses the data.
#[tokio::test]
async fn test_course_envelope_polarity() {
    let server = MockServer::start().await;
    mount_token(&server, "T").await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/courses/s123/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "data": ["CS101", "CS102"] })),
        )
        .mount(&server)
        .await;

    let mut conventional = logged_in(&config(&server)).await;
    conventional.fetch_courses().unwrap();
    conventional.settle().await;
    assert!(conventional.courses().is_none());
    assert_eq!(
        conventional.error(OperationKind::Courses),
        Some(SessionError::CourseFetchFailed)
    );

    let inverted_config = Config {
        envelope_polarity: EnvelopePolarity::Inverted,
        ..config(&server)
    };
    let mut ctrl = SessionController::new(&inverted_config).unwrap();
    ctrl.authenticate("s123", "pw").unwrap();
    ctrl.settle().await;
    // The profile mock answers success:true, which Inverted rejects
    assert!(ctrl.profile().is_none());
    assert_eq!(ctrl.error(OperationKind::Profile), Some(SessionError::ProfileFetchFailed));

    ctrl.fetch_courses().unwrap();
    ctrl.settle().await;
    assert_eq!(ctrl.courses().unwrap().labels(), ["CS101", "CS102"]);
    assert!(ctrl.error(OperationKind::Courses).is_none());
    // Profile error is kept in its own slot
    assert_eq!(ctrl.error(OperationKind::Profile), Some(SessionError::ProfileFetchFailed));
}

#[tokio::test]
async fn test_failed_profile_refetch_keeps_existing_profile() {
    let server = MockServer::start().await;
    mount_token(&server, "T").await;

    Mock::given(method("GET"))
        .and(path("/api/student-details/s123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Second fetch never answers within the client timeout
    Mock::given(method("GET"))
        .and(path("/api/student-details/s123/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = Config {
        request_timeout_secs: 1,
        ..config(&server)
    };
    let mut ctrl = logged_in(&config).await;
    let before = ctrl.profile().cloned().unwrap();

    ctrl.fetch_profile().unwrap();
    ctrl.settle().await;

    assert_eq!(ctrl.profile(), Some(&before));
    assert_eq!(ctrl.error(OperationKind::Profile), Some(SessionError::ProfileFetchFailed));
    assert_eq!(ctrl.state(), SessionState::LoggedIn);
}

#[tokio::test]
async fn test_logout_is_idempotent_and_clears_everything() {
    let server = MockServer::start().await;
    mount_token(&server, "T").await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/courses/s123/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut ctrl = logged_in(&config(&server)).await;
    ctrl.fetch_courses().unwrap();
    ctrl.settle().await;
    assert!(ctrl.profile().is_some());
    assert!(ctrl.last_error().is_some());

    ctrl.logout();
    assert_eq!(ctrl.state(), SessionState::LoggedOut);
    assert!(ctrl.session().is_none());
    assert!(ctrl.profile().is_none());
    assert!(ctrl.courses().is_none());
    assert!(ctrl.last_error().is_none());
    assert!(ctrl.error(OperationKind::Courses).is_none());

    ctrl.logout();
    assert_eq!(ctrl.state(), SessionState::LoggedOut);
    assert!(ctrl.session().is_none());
    assert!(ctrl.last_error().is_none());
    assert!(!ctrl.view().any_loading());
}

#[tokio::test]
async fn test_login_response_after_logout_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [{ "access_token": "T" }] }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut ctrl = SessionController::new(&config(&server)).unwrap();
    ctrl.authenticate("s123", "pw").unwrap();
    ctrl.logout();

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(ctrl.poll(), 1);

    assert_eq!(ctrl.state(), SessionState::LoggedOut);
    assert!(ctrl.session().is_none());
    assert!(ctrl.profile().is_none());
}

#[tokio::test]
async fn test_superseded_courses_response_is_dropped() {
    let server = MockServer::start().await;
    mount_token(&server, "T").await;
    mount_profile(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/courses/s123/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": ["OLD101"] }))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/courses/s123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": ["NEW101"] })))
        .mount(&server)
        .await;

    let mut ctrl = logged_in(&config(&server)).await;
    let first = ctrl.fetch_courses().unwrap();
    // token + profile + first courses request
    wait_for_requests(&server, 3).await;
    let second = ctrl.fetch_courses().unwrap();
    assert!(second.id > first.id);

    ctrl.settle().await;
    assert_eq!(ctrl.courses().unwrap().labels(), ["NEW101"]);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(ctrl.poll(), 1);
    assert_eq!(ctrl.courses().unwrap().labels(), ["NEW101"]);
}

#[tokio::test]
async fn test_authenticate_while_logged_in_is_noop() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "access_token": "T" }] })))
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server).await;

    let mut ctrl = logged_in(&config(&server)).await;
    assert!(ctrl.authenticate("s456", "other").is_none());
    assert!(!ctrl.is_loading(OperationKind::Authenticate));
    ctrl.settle().await;

    assert_eq!(ctrl.session().unwrap().account_key().as_str(), "s123");
    assert_eq!(ctrl.session().unwrap().token(), "T");
    assert!(ctrl.last_error().is_none());
}
