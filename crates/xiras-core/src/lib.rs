//! Core library for xiras.
//!
//! Everything the frontends need to talk to the IRAS student records API:
//!
//! - `config`: base URL and protocol knobs loaded from disk/env
//! - `api`: the HTTP client for the token, profile and course endpoints
//! - `auth`: the in-memory session created by a successful login
//! - `models`: profile, course and response envelope types
//! - `controller`: the session state machine that sequences fetches
//! - `utils`: display helpers for opaque server values

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AccountKey, Credentials, Session};
pub use config::{Config, CredentialFields, EnvelopePolarity};
pub use controller::{OperationKind, RequestHandle, SessionController, SessionError, SessionState};
pub use models::{CourseList, StudentProfile};
