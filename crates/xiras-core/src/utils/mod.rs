//! Utility functions for displaying server values.

pub mod format;

pub use format::{format_age, format_value, truncate_string};
