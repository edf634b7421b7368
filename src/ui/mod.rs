//! UI modules for the Kilauea workbench.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, panel toggles, and catalog status
//! - Right panel: Layer, marker, and settings checkboxes
//! - Central canvas: Globe view

mod canvas;
mod right_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use right_panel::render_right_panel;
pub use top_bar::render_top_bar;
