//! View state (camera position, zoom/pan).

use crate::config::InitialView;
use crate::globe::GlobeView;
use eframe::egui::{Rect, Vec2};

/// Zoom limits for the canvas.
pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 200.0;

/// Camera state for the globe canvas.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Camera latitude in degrees
    pub center_lat: f64,

    /// Camera longitude in degrees
    pub center_lon: f64,

    /// Camera altitude in meters
    pub altitude: f64,

    /// Current zoom level (1.0 = configured altitude)
    pub zoom: f32,

    /// Current pan offset from center
    pub pan_offset: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_initial(&InitialView::default())
    }
}

impl ViewState {
    pub fn from_initial(view: &InitialView) -> Self {
        Self {
            center_lat: view.latitude,
            center_lon: view.longitude,
            altitude: view.altitude,
            zoom: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }

    /// Builds the projection for this frame's canvas rectangle.
    pub fn globe_view(&self, rect: Rect) -> GlobeView {
        let mut view = GlobeView::new(self.center_lat, self.center_lon, self.altitude);
        view.update(self.zoom, self.pan_offset, rect);
        view
    }

    /// Multiplies the zoom, keeping `anchor` (relative to the canvas center) fixed.
    pub fn zoom_by(&mut self, factor: f32, anchor: Vec2) {
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new_zoom / old_zoom;
        self.pan_offset = anchor * (1.0 - ratio) + self.pan_offset * ratio;
        self.zoom = new_zoom;
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_offset = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewState::default();
        view.zoom_by(1e6, Vec2::ZERO);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_by(1e-9, Vec2::ZERO);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_zoom_about_center_keeps_pan() {
        let mut view = ViewState::default();
        view.zoom_by(2.0, Vec2::ZERO);
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.pan_offset, Vec2::ZERO);

        view.pan_offset = Vec2::new(10.0, 0.0);
        view.reset();
        assert_eq!(view.zoom, 1.0);
        assert_eq!(view.pan_offset, Vec2::ZERO);
    }

    #[test]
    fn test_zoom_about_anchor_shifts_pan() {
        let mut view = ViewState::default();
        view.zoom_by(2.0, Vec2::new(100.0, 0.0));
        assert_eq!(view.pan_offset, Vec2::new(-100.0, 0.0));
    }
}
