//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, login form and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `tabs`: profile and courses tab content

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
