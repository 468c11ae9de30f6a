//! Data models for IRAS entities.
//!
//! - `StudentProfile`: the student details record, echoed from the server
//! - `CourseList`: ordered course labels
//! - `Envelope`, `TokenResponse`: wire wrappers around the payloads

pub mod course;
pub mod envelope;
pub mod profile;

pub use course::CourseList;
pub use envelope::{Envelope, TokenResponse};
pub use profile::StudentProfile;
