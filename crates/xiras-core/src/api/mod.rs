//! REST API client module for the xIRAS proxy.
//!
//! This module provides the `ApiClient` for exchanging credentials for an
//! access token and fetching the student's profile and course list.
//!
//! The API uses bearer token authentication; the token comes from the first
//! entry of the `/api/token/` response.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
