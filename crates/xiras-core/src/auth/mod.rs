//! Authentication state.
//!
//! - `Credentials`: identifier and secret, held in memory only while logging in
//! - `Session`: the access token and account key from a successful login
//!
//! Nothing here is persisted; a new process always starts logged out.

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::{AccountKey, Session};
