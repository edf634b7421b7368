//! Workbench configuration.
//!
//! The built-in configuration frames Kilauea and seeds the standard layer
//! set. A JSON file (native) or URL query parameters (web) can override it
//! for one run; nothing is written back.

use crate::error::ConfigError;
use crate::globe::{Placemark, Renderable};
use crate::layers::{LayerCategory, LayerIdentity, LayerOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATALOG_URL: &str = "https://worldwind43.arc.nasa.gov/wms";

/// Environment variable naming a JSON configuration file (native only).
pub const CONFIG_PATH_VAR: &str = "KILAUEA_CONFIG";
/// Environment variable overriding the catalog URL (native only).
pub const CATALOG_URL_VAR: &str = "KILAUEA_CATALOG_URL";

/// Initial camera position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    pub latitude: f64,
    pub longitude: f64,
    /// Eye altitude in meters
    pub altitude: f64,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            latitude: 19.40,
            longitude: -155.28,
            altitude: 250e3,
        }
    }
}

/// Where a seed layer's renderable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    /// Resolved by name against the engine's built-in layers.
    #[default]
    Builtin,
    /// A new marker layer holding the configured placemarks.
    Placemarks,
}

/// One entry of the startup layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedLayer {
    pub name: String,
    pub category: LayerCategory,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub source: SeedSource,
}

impl SeedLayer {
    fn builtin(name: &str, category: LayerCategory, enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            category,
            enabled,
            display_name: None,
            source: SeedSource::Builtin,
        }
    }
}

/// Everything the workbench needs at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub title: String,
    pub catalog_url: String,
    pub view: InitialView,
    pub layers: Vec<SeedLayer>,
    pub placemarks: Vec<Placemark>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        use LayerCategory::*;

        let mut stars = SeedLayer::builtin("Stars", Setting, false);
        stars.display_name = Some("Stars".to_string());

        Self {
            title: "WorldWind Kilauea".to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            view: InitialView::default(),
            layers: vec![
                SeedLayer::builtin("Blue Marble", Base, false),
                SeedLayer::builtin("LandSat", Base, false),
                SeedLayer::builtin("Bing Aerial", Base, false),
                SeedLayer::builtin("Bing Aerial with Labels", Base, false),
                SeedLayer::builtin("Sentinal2", Base, false),
                SeedLayer::builtin("Sentinal2 with Labels", Base, true),
                SeedLayer::builtin("Bing Roads", Base, false),
                SeedLayer::builtin("OpenStreetMap", Base, false),
                SeedLayer {
                    source: SeedSource::Placemarks,
                    ..SeedLayer::builtin("Markers", Data, true)
                },
                SeedLayer::builtin("Compass", Setting, false),
                SeedLayer::builtin("Coordinates", Setting, true),
                SeedLayer::builtin("View Controls", Setting, true),
                stars,
                SeedLayer::builtin("Atmosphere", Setting, false),
                SeedLayer::builtin("Tessellation", Debug, false),
            ],
            placemarks: vec![
                Placemark::new("Kilauea Summit", 19.4069, -155.2834),
                Placemark::new("Puu Oo", 19.3886, -155.1060),
                Placemark::new("Hilo", 19.7241, -155.0868),
            ],
        }
    }
}

impl WorkbenchConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Registry entries for the startup layer list, in configuration order.
    pub fn seed_entries(&self) -> Vec<(LayerIdentity, LayerOptions)> {
        self.layers
            .iter()
            .map(|seed| {
                let identity = match seed.source {
                    SeedSource::Builtin => LayerIdentity::Name(seed.name.clone()),
                    SeedSource::Placemarks => LayerIdentity::Renderable(Renderable::placemarks(
                        seed.name.clone(),
                        self.placemarks.clone(),
                    )),
                };
                let options = LayerOptions {
                    category: seed.category,
                    enabled: seed.enabled,
                    display_name: seed.display_name.clone(),
                };
                (identity, options)
            })
            .collect()
    }

    /// Applies `lat`, `lon`, `alt` and `catalog` query parameters.
    ///
    /// Unparsable values are ignored.
    pub fn apply_query(&mut self, query: &str) {
        let query = query.trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "lat" => {
                    if let Ok(lat) = value.parse() {
                        self.view.latitude = lat;
                    }
                }
                "lon" => {
                    if let Ok(lon) = value.parse() {
                        self.view.longitude = lon;
                    }
                }
                "alt" => {
                    if let Ok(alt) = value.parse() {
                        self.view.altitude = alt;
                    }
                }
                "catalog" if !value.is_empty() => self.catalog_url = value.into_owned(),
                _ => {}
            }
        }
    }

    /// Loads the configuration for a native run.
    ///
    /// Falls back to the built-in configuration when the file named by
    /// `KILAUEA_CONFIG` cannot be read or parsed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => match Self::read_file(&path) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Using built-in configuration: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(url) = std::env::var(CATALOG_URL_VAR) {
            config.catalog_url = url;
        }
        config
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the configuration for a web run from the page's query string.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut config = Self::default();
        let search = web_sys::window().and_then(|window| window.location().search().ok());
        if let Some(search) = search {
            config.apply_query(&search);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_list() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.layers.len(), 15);

        let enabled: Vec<&str> = config
            .layers
            .iter()
            .filter(|layer| layer.enabled)
            .map(|layer| layer.name.as_str())
            .collect();
        assert_eq!(
            enabled,
            vec!["Sentinal2 with Labels", "Markers", "Coordinates", "View Controls"]
        );
    }

    #[test]
    fn test_seed_entries_build_markers_renderable() {
        let config = WorkbenchConfig::default();
        let entries = config.seed_entries();

        let (identity, options) = &entries[8];
        assert!(matches!(identity, LayerIdentity::Renderable(_)));
        assert_eq!(identity.name(), "Markers");
        assert_eq!(options.category, LayerCategory::Data);

        let (identity, options) = &entries[12];
        assert!(matches!(identity, LayerIdentity::Name(name) if name == "Stars"));
        assert_eq!(options.display_name.as_deref(), Some("Stars"));
    }

    #[test]
    fn test_every_default_builtin_resolves() {
        let config = WorkbenchConfig::default();
        for seed in &config.layers {
            if seed.source == SeedSource::Builtin {
                assert!(
                    crate::globe::builtin_layer(&seed.name).is_some(),
                    "{} should resolve",
                    seed.name
                );
            }
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorkbenchConfig::from_json(
            r#"{
                "catalog_url": "https://maps.example.test/wms",
                "layers": [
                    {"name": "Blue Marble", "category": "base", "enabled": true},
                    {"name": "Markers", "category": "data", "source": "placemarks"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.catalog_url, "https://maps.example.test/wms");
        assert_eq!(config.title, "WorldWind Kilauea");
        assert_eq!(config.view, InitialView::default());
        assert_eq!(config.layers.len(), 2);
        assert!(config.layers[0].enabled);
        assert_eq!(config.layers[1].source, SeedSource::Placemarks);
        assert!(!config.layers[1].enabled);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let result = WorkbenchConfig::from_json(r#"{"layers": [{"name": "X", "category": "sky"}]}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_query_overrides() {
        let mut config = WorkbenchConfig::default();
        config.apply_query("?lat=21.3&lon=-157.8&alt=oops&catalog=https%3A%2F%2Fmaps.example.test%2Fwms");

        assert_eq!(config.view.latitude, 21.3);
        assert_eq!(config.view.longitude, -157.8);
        assert_eq!(config.view.altitude, 250e3);
        assert_eq!(config.catalog_url, "https://maps.example.test/wms");
    }
}
