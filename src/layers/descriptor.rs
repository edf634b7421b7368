//! Layer descriptor data model.

use crate::globe::{Renderable, SceneHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable reference to a registered layer.
///
/// The registry is append-only, so an id stays valid for the registry's
/// whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification deciding which panel manages a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerCategory {
    Base,
    Overlay,
    Setting,
    Debug,
    Data,
}

impl LayerCategory {
    pub const COUNT: usize = 5;

    pub fn all() -> &'static [LayerCategory; Self::COUNT] {
        &[
            LayerCategory::Base,
            LayerCategory::Overlay,
            LayerCategory::Setting,
            LayerCategory::Debug,
            LayerCategory::Data,
        ]
    }

    /// Position of this category in [`LayerCategory::all`].
    pub fn index(self) -> usize {
        match self {
            LayerCategory::Base => 0,
            LayerCategory::Overlay => 1,
            LayerCategory::Setting => 2,
            LayerCategory::Debug => 3,
            LayerCategory::Data => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LayerCategory::Base => "Base Layers",
            LayerCategory::Overlay => "Overlays",
            LayerCategory::Setting => "Settings",
            LayerCategory::Debug => "Debug",
            LayerCategory::Data => "Data",
        }
    }
}

/// What to register: a built-in layer name, or a renderable built by the caller.
#[derive(Debug, Clone)]
pub enum LayerIdentity {
    /// Resolved against the rendering engine's built-in catalog.
    Name(String),
    /// Used as-is.
    Renderable(Renderable),
}

impl LayerIdentity {
    pub fn name(&self) -> &str {
        match self {
            LayerIdentity::Name(name) => name,
            LayerIdentity::Renderable(renderable) => &renderable.name,
        }
    }
}

impl From<&str> for LayerIdentity {
    fn from(name: &str) -> Self {
        LayerIdentity::Name(name.to_string())
    }
}

impl From<Renderable> for LayerIdentity {
    fn from(renderable: Renderable) -> Self {
        LayerIdentity::Renderable(renderable)
    }
}

/// Registration options for [`LayerRegistry::add_layer`](super::LayerRegistry::add_layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOptions {
    pub category: LayerCategory,
    pub enabled: bool,
    /// Label shown in panels; defaults to the identity's name.
    pub display_name: Option<String>,
}

impl LayerOptions {
    /// Disabled layer in `category` with no display name override.
    pub fn new(category: LayerCategory) -> Self {
        Self {
            category,
            enabled: false,
            display_name: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// How a layer entered the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOrigin {
    /// Looked up by name in the engine's built-in catalog.
    BuiltIn,
    /// Handed in as an already constructed renderable.
    Constructed,
}

/// A registered layer as seen by panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDescriptor {
    id: LayerId,
    name: String,
    origin: LayerOrigin,
    handle: SceneHandle,
    category: LayerCategory,
    pub(crate) enabled: bool,
    display_name: String,
}

impl LayerDescriptor {
    pub(crate) fn new(
        id: LayerId,
        name: String,
        origin: LayerOrigin,
        handle: SceneHandle,
        options: LayerOptions,
    ) -> Self {
        let display_name = options.display_name.unwrap_or_else(|| name.clone());
        Self {
            id,
            name,
            origin,
            handle,
            category: options.category,
            enabled: options.enabled,
            display_name,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// The identity's name (built-in name or renderable name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> LayerOrigin {
        self.origin
    }

    /// Handle of the renderable in the engine's scene.
    pub fn handle(&self) -> SceneHandle {
        self.handle
    }

    pub fn category(&self) -> LayerCategory {
        self.category
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_index_matches_all() {
        for (position, category) in LayerCategory::all().iter().enumerate() {
            assert_eq!(category.index(), position);
        }
    }

    #[test]
    fn test_category_serde_is_lowercase() {
        let json = serde_json::to_string(&LayerCategory::Setting).unwrap();
        assert_eq!(json, "\"setting\"");

        let parsed: LayerCategory = serde_json::from_str("\"overlay\"").unwrap();
        assert_eq!(parsed, LayerCategory::Overlay);
    }

    #[test]
    fn test_display_name_defaults_to_identity_name() {
        let descriptor = LayerDescriptor::new(
            LayerId(0),
            "Compass".to_string(),
            LayerOrigin::BuiltIn,
            SceneHandle(0),
            LayerOptions::new(LayerCategory::Setting),
        );
        assert_eq!(descriptor.display_name(), "Compass");

        let renamed = LayerDescriptor::new(
            LayerId(1),
            "Stars".to_string(),
            LayerOrigin::BuiltIn,
            SceneHandle(1),
            LayerOptions::new(LayerCategory::Setting).display_name("Starfield"),
        );
        assert_eq!(renamed.display_name(), "Starfield");
        assert_eq!(renamed.name(), "Stars");
    }
}
