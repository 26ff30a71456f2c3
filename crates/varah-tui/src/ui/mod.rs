//! Terminal UI module using ratatui.
//!
//! - `render`: frame rendering, layout, and overlays
//! - `input`: keyboard event handling
//! - `styles`: color palette and text styling

pub mod input;
pub mod render;
pub mod styles;
