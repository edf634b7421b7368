//! Application state management.
//!
//! Layer membership and visibility live in the layer registry; this module
//! only holds what the shell itself owns: the camera, which panels are open,
//! and the status line.

mod viz;

pub use viz::{ViewState, MAX_ZOOM, MIN_ZOOM};

use crate::config::WorkbenchConfig;

/// Which side panels are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelToggles {
    pub layers: bool,
    pub markers: bool,
    pub settings: bool,
}

impl Default for PanelToggles {
    fn default() -> Self {
        Self {
            layers: true,
            markers: false,
            settings: false,
        }
    }
}

impl PanelToggles {
    pub fn any_open(&self) -> bool {
        self.layers || self.markers || self.settings
    }
}

/// Root application state containing all sub-states.
#[derive(Default)]
pub struct AppState {
    /// Camera for the globe canvas
    pub view_state: ViewState,

    /// Side panel visibility
    pub panels: PanelToggles,

    /// Application status message displayed in top bar
    pub status_message: String,
}

impl AppState {
    pub fn new(config: &WorkbenchConfig) -> Self {
        Self {
            view_state: ViewState::from_initial(&config.view),
            status_message: "Ready".to_string(),
            ..Default::default()
        }
    }
}
