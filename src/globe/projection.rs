//! View projection for the globe canvas.
//!
//! The canvas is a flat equirectangular view around a camera position;
//! the camera altitude decides how many degrees fit on screen.

use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;

/// Meters per degree of latitude, close enough for framing the view.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Converts between geographic and screen coordinates for one frame.
#[derive(Debug, Clone)]
pub struct GlobeView {
    /// Camera latitude in degrees
    pub center_lat: f64,
    /// Camera longitude in degrees
    pub center_lon: f64,
    /// Camera altitude in meters
    pub altitude: f64,
    /// Zoom factor applied on top of the altitude framing
    pub zoom: f32,
    /// Pan offset in screen pixels
    pub pan_offset: Vec2,
    /// Screen rectangle for the canvas
    pub screen_rect: Rect,
}

impl Default for GlobeView {
    fn default() -> Self {
        Self {
            center_lat: 0.0,
            center_lon: 0.0,
            altitude: 10_000_000.0,
            zoom: 1.0,
            pan_offset: Vec2::ZERO,
            screen_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        }
    }
}

impl GlobeView {
    pub fn new(center_lat: f64, center_lon: f64, altitude: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            altitude,
            ..Default::default()
        }
    }

    /// Updates the view with the current frame's interaction state.
    pub fn update(&mut self, zoom: f32, pan_offset: Vec2, screen_rect: Rect) {
        self.zoom = zoom;
        self.pan_offset = pan_offset;
        self.screen_rect = screen_rect;
    }

    /// Half-height of the view in degrees.
    pub fn range_deg(&self) -> f64 {
        (self.altitude / METERS_PER_DEGREE) / self.zoom as f64
    }

    /// Effective eye altitude after zooming, in meters.
    pub fn eye_altitude(&self) -> f64 {
        self.altitude / self.zoom as f64
    }

    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        let range = self.range_deg();
        let lat_correction = self.center_lat.to_radians().cos();

        let norm_x = (coord.x - self.center_lon) * lat_correction / range;
        // Screen Y grows downward
        let norm_y = -(coord.y - self.center_lat) / range;

        let center = self.screen_rect.center() + self.pan_offset;
        let half_size = self.screen_rect.size().min_elem() / 2.0;

        Pos2::new(
            center.x + norm_x as f32 * half_size,
            center.y + norm_y as f32 * half_size,
        )
    }

    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        let range = self.range_deg();
        let lat_correction = self.center_lat.to_radians().cos();

        let center = self.screen_rect.center() + self.pan_offset;
        let half_size = self.screen_rect.size().min_elem() / 2.0;
        let norm_x = ((pos.x - center.x) / half_size) as f64;
        let norm_y = ((pos.y - center.y) / half_size) as f64;

        Coord {
            x: self.center_lon + norm_x * range / lat_correction,
            y: self.center_lat - norm_y * range,
        }
    }

    /// Geographic position under the middle of the canvas.
    pub fn look_at(&self) -> Coord<f64> {
        self.screen_to_geo(self.screen_rect.center())
    }

    /// Visible bounds as (min_lon, min_lat, max_lon, max_lat).
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let top_left = self.screen_to_geo(self.screen_rect.left_top());
        let bottom_right = self.screen_to_geo(self.screen_rect.right_bottom());

        (
            top_left.x.min(bottom_right.x),
            top_left.y.min(bottom_right.y),
            top_left.x.max(bottom_right.x),
            top_left.y.max(bottom_right.y),
        )
    }

    pub fn is_visible(&self, coord: Coord<f64>) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = self.visible_bounds();
        (min_lon..=max_lon).contains(&coord.x) && (min_lat..=max_lat).contains(&coord.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kilauea() -> GlobeView {
        let mut view = GlobeView::new(19.40, -155.28, 250e3);
        view.update(
            1.0,
            Vec2::ZERO,
            Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        );
        view
    }

    #[test]
    fn test_center_maps_to_canvas_center() {
        let view = kilauea();
        let pos = view.geo_to_screen(Coord {
            x: -155.28,
            y: 19.40,
        });
        assert!((pos.x - 400.0).abs() < 1e-3);
        assert!((pos.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_screen_round_trip() {
        let view = kilauea();
        let coord = Coord {
            x: -155.0,
            y: 19.7,
        };
        let back = view.screen_to_geo(view.geo_to_screen(coord));
        assert!((back.x - coord.x).abs() < 1e-4);
        assert!((back.y - coord.y).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_narrows_range() {
        let mut view = kilauea();
        let wide = view.range_deg();
        view.zoom = 2.0;
        assert!((view.range_deg() - wide / 2.0).abs() < 1e-9);
        assert!((view.eye_altitude() - 125e3).abs() < 1e-6);
    }

    #[test]
    fn test_north_is_up() {
        let view = kilauea();
        let north = view.geo_to_screen(Coord {
            x: -155.28,
            y: 20.0,
        });
        assert!(north.y < 300.0);
        assert!(view.is_visible(Coord {
            x: -155.28,
            y: 20.0
        }));
    }
}
