//! Built-in layers the engine resolves by name.

use super::{Renderable, RenderableKind};
use eframe::egui::Color32;

/// Every name [`builtin_layer`] resolves, in catalog order.
pub const BUILTIN_LAYER_NAMES: &[&str] = &[
    "Blue Marble",
    "LandSat",
    "Bing Aerial",
    "Bing Aerial with Labels",
    "Sentinal2",
    "Sentinal2 with Labels",
    "Bing Roads",
    "OpenStreetMap",
    "Compass",
    "Coordinates",
    "View Controls",
    "Stars",
    "Atmosphere",
    "Tessellation",
];

/// Builds a fresh renderable for a built-in layer name.
pub fn builtin_layer(name: &str) -> Option<Renderable> {
    let kind = match name {
        "Blue Marble" => imagery(Color32::from_rgb(28, 62, 112), false),
        "LandSat" => imagery(Color32::from_rgb(72, 92, 64), false),
        "Bing Aerial" => imagery(Color32::from_rgb(58, 74, 56), false),
        "Bing Aerial with Labels" => imagery(Color32::from_rgb(58, 74, 56), true),
        "Sentinal2" => imagery(Color32::from_rgb(76, 86, 66), false),
        "Sentinal2 with Labels" => imagery(Color32::from_rgb(76, 86, 66), true),
        "Bing Roads" => imagery(Color32::from_rgb(206, 204, 194), true),
        "OpenStreetMap" => imagery(Color32::from_rgb(232, 226, 214), true),
        "Compass" => RenderableKind::Compass,
        "Coordinates" => RenderableKind::Coordinates,
        "View Controls" => RenderableKind::ViewControls,
        "Stars" => RenderableKind::Stars,
        "Atmosphere" => RenderableKind::Atmosphere,
        "Tessellation" => RenderableKind::Tessellation,
        _ => return None,
    };
    Some(Renderable::new(name, kind))
}

fn imagery(tint: Color32, labels: bool) -> RenderableKind {
    RenderableKind::Imagery { tint, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_name_resolves() {
        for name in BUILTIN_LAYER_NAMES {
            let renderable = builtin_layer(name).unwrap();
            assert_eq!(renderable.name, *name);
        }
    }

    #[test]
    fn test_unknown_name_does_not_resolve() {
        assert!(builtin_layer("NonexistentLayer").is_none());
        assert!(builtin_layer("blue marble").is_none());
    }
}
