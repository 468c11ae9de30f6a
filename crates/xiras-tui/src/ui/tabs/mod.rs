//! Tab content rendering.

pub mod courses;
pub mod profile;
