//! The rendering engine the layer registry drives.
//!
//! This module provides:
//! - The `RenderingEngine` seam the registry writes through
//! - `Globe`, the engine behind the workbench canvas: a built-in layer
//!   catalog plus an ordered scene list with per-layer visibility
//! - A flat view projection and a painter for the scene

mod builtin;
mod projection;
mod renderer;

pub use builtin::{builtin_layer, BUILTIN_LAYER_NAMES};
pub use projection::GlobeView;
pub use renderer::render_scene;

use crate::catalog::WmsLayer;
use eframe::egui::Color32;
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Handle of a renderable inside the engine's scene list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub(crate) usize);

/// Geographic bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.west + self.east) / 2.0,
            y: (self.south + self.north) / 2.0,
        }
    }
}

/// A named point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Placemark {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// What a renderable draws.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableKind {
    /// Base imagery; drawn as a flat tint since imagery is not decoded.
    Imagery { tint: Color32, labels: bool },
    /// A layer served by a remote WMS endpoint.
    Wms(WmsLayer),
    /// Point markers.
    Placemarks(Vec<Placemark>),
    Compass,
    Coordinates,
    ViewControls,
    Stars,
    Atmosphere,
    Tessellation,
}

/// A layer object the engine can draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub name: String,
    pub kind: RenderableKind,
}

impl Renderable {
    pub fn new(name: impl Into<String>, kind: RenderableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// An empty-or-filled marker layer.
    pub fn placemarks(name: impl Into<String>, placemarks: Vec<Placemark>) -> Self {
        Self::new(name, RenderableKind::Placemarks(placemarks))
    }

    /// A layer discovered in a WMS catalog, named after its title.
    pub fn wms(layer: WmsLayer) -> Self {
        Self::new(layer.title.clone(), RenderableKind::Wms(layer))
    }
}

/// The writes the layer registry performs on a rendering engine.
///
/// The engine owns its layer list; the registry only appends and toggles,
/// and never reads the list back.
pub trait RenderingEngine {
    /// Looks up a built-in layer by name.
    fn resolve_layer_by_name(&self, name: &str) -> Option<Renderable>;

    /// Appends a renderable to the end of the scene.
    fn append(&mut self, renderable: Renderable) -> SceneHandle;

    /// Shows or hides a previously appended renderable.
    fn set_visible(&mut self, handle: SceneHandle, visible: bool);
}

/// A renderable placed in the scene.
#[derive(Debug, Clone)]
pub struct SceneLayer {
    pub renderable: Renderable,
    pub visible: bool,
}

/// The engine behind the workbench canvas.
#[derive(Debug, Default)]
pub struct Globe {
    scene: Vec<SceneLayer>,
}

impl Globe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene layers in draw order (back to front).
    pub fn layers(&self) -> impl Iterator<Item = &SceneLayer> {
        self.scene.iter()
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &SceneLayer> {
        self.scene.iter().filter(|layer| layer.visible)
    }

    /// True when any visible layer matches `predicate`.
    pub fn shows(&self, predicate: impl Fn(&RenderableKind) -> bool) -> bool {
        self.visible_layers()
            .any(|layer| predicate(&layer.renderable.kind))
    }
}

impl RenderingEngine for Globe {
    fn resolve_layer_by_name(&self, name: &str) -> Option<Renderable> {
        builtin_layer(name)
    }

    fn append(&mut self, renderable: Renderable) -> SceneHandle {
        self.scene.push(SceneLayer {
            renderable,
            visible: true,
        });
        SceneHandle(self.scene.len() - 1)
    }

    fn set_visible(&mut self, handle: SceneHandle, visible: bool) {
        match self.scene.get_mut(handle.0) {
            Some(layer) => layer.visible = visible,
            None => log::warn!("Ignoring visibility change for unknown scene handle {:?}", handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_visibility() {
        let mut globe = Globe::new();
        let first = globe.append(builtin_layer("Blue Marble").unwrap());
        let second = globe.append(builtin_layer("Compass").unwrap());
        globe.set_visible(first, false);

        let names: Vec<_> = globe.layers().map(|l| l.renderable.name.as_str()).collect();
        assert_eq!(names, vec!["Blue Marble", "Compass"]);
        assert_eq!(globe.visible_layers().count(), 1);
        assert_ne!(first, second);
    }

    #[test]
    fn test_shows_matches_visible_kinds_only() {
        let mut globe = Globe::new();
        let controls = globe.append(builtin_layer("View Controls").unwrap());
        assert!(globe.shows(|kind| matches!(kind, RenderableKind::ViewControls)));

        globe.set_visible(controls, false);
        assert!(!globe.shows(|kind| matches!(kind, RenderableKind::ViewControls)));
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let mut globe = Globe::new();
        globe.set_visible(SceneHandle(3), true);
        assert_eq!(globe.layers().count(), 0);
    }
}
