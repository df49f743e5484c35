//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `tabs`: Per-view content rendering (bus, bikes, events, etc.)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
