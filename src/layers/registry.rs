//! The layer registry: single owner of layer existence and enabled state.
//!
//! The registry is also the only writer of the rendering engine's layer
//! list. Every successful mutation is applied to the engine synchronously
//! and followed by a re-projection of the category snapshots.

use super::{
    CategoryProjector, CategorySnapshot, LayerCategory, LayerDescriptor, LayerId, LayerIdentity,
    LayerOptions, LayerOrigin,
};
use crate::error::LayerError;
use crate::globe::{Globe, Renderable, RenderingEngine};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Append-only registry of every layer in the scene.
pub struct LayerRegistry<E: RenderingEngine = Globe> {
    engine: E,
    layers: Vec<LayerDescriptor>,
    projector: CategoryProjector,
    subscribers: Vec<Sender<Arc<CategorySnapshot>>>,
}

impl<E: RenderingEngine> LayerRegistry<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            layers: Vec::new(),
            projector: CategoryProjector::new(),
            subscribers: Vec::new(),
        }
    }

    /// Registers a layer and appends it to the engine's scene.
    ///
    /// A name the engine cannot resolve is reported and dropped; the
    /// registry, the engine and every snapshot are left untouched.
    pub fn add_layer(
        &mut self,
        identity: LayerIdentity,
        options: LayerOptions,
    ) -> Result<LayerId, LayerError> {
        let (renderable, origin) = match identity {
            LayerIdentity::Name(name) => match self.engine.resolve_layer_by_name(&name) {
                Some(renderable) => (renderable, LayerOrigin::BuiltIn),
                None => {
                    log::warn!("Dropping layer '{}': not known to the rendering engine", name);
                    return Err(LayerError::Unresolved { name });
                }
            },
            LayerIdentity::Renderable(renderable) => (renderable, LayerOrigin::Constructed),
        };

        let name = renderable.name.clone();
        let handle = self.engine.append(renderable);
        self.engine.set_visible(handle, options.enabled);

        let id = LayerId(self.layers.len());
        let descriptor = LayerDescriptor::new(id, name, origin, handle, options);
        log::debug!(
            "Added layer {} '{}' ({:?}, enabled: {})",
            id,
            descriptor.display_name(),
            descriptor.category(),
            descriptor.enabled()
        );
        self.layers.push(descriptor);
        self.reproject();

        Ok(id)
    }

    /// Registers a layer discovered in a remote catalog: an overlay, initially hidden.
    pub fn add_catalog_layer(&mut self, renderable: Renderable) -> Result<LayerId, LayerError> {
        self.add_layer(
            LayerIdentity::Renderable(renderable),
            LayerOptions::new(LayerCategory::Overlay),
        )
    }

    /// Registers a batch of layers in order, dropping the ones that fail.
    ///
    /// Returns the number of layers actually added.
    pub fn seed<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (LayerIdentity, LayerOptions)>,
    {
        let mut added = 0;
        for (identity, options) in entries {
            match self.add_layer(identity, options) {
                Ok(_) => added += 1,
                Err(e) => log::warn!("Seed layer skipped: {}", e),
            }
        }
        added
    }

    /// Shows or hides a layer. No-op when it is already in that state.
    pub fn set_enabled(&mut self, id: LayerId, enabled: bool) -> Result<(), LayerError> {
        let descriptor = self
            .layers
            .get_mut(id.0)
            .ok_or(LayerError::UnknownLayer(id))?;

        if descriptor.enabled == enabled {
            return Ok(());
        }

        descriptor.enabled = enabled;
        let handle = descriptor.handle();
        log::debug!(
            "Layer {} '{}' {}",
            id,
            descriptor.display_name(),
            if enabled { "enabled" } else { "disabled" }
        );

        self.engine.set_visible(handle, enabled);
        self.reproject();
        Ok(())
    }

    /// Flips a layer's enabled flag and returns the new value.
    pub fn toggle(&mut self, id: LayerId) -> Result<bool, LayerError> {
        let enabled = !self.get(id).ok_or(LayerError::UnknownLayer(id))?.enabled();
        self.set_enabled(id, enabled)?;
        Ok(enabled)
    }

    /// Current snapshot of `category`.
    pub fn get_by_category(&self, category: LayerCategory) -> Arc<CategorySnapshot> {
        self.projector.snapshot(category)
    }

    pub fn get(&self, id: LayerId) -> Option<&LayerDescriptor> {
        self.layers.get(id.0)
    }

    /// Finds the first layer registered under `name`.
    pub fn find(&self, name: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Read-only access to the engine, for drawing.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Receives every snapshot produced from now on.
    pub fn subscribe(&mut self) -> Receiver<Arc<CategorySnapshot>> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    fn reproject(&mut self) {
        let produced = self.projector.project(&self.layers);
        if produced.is_empty() {
            return;
        }

        self.subscribers.retain(|subscriber| {
            produced
                .iter()
                .all(|snapshot| subscriber.send(Arc::clone(snapshot)).is_ok())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WmsLayer;
    use crate::globe::{Placemark, Renderable, SceneHandle};

    /// Engine fake recording every write the registry makes.
    #[derive(Default)]
    struct RecordingEngine {
        appended: Vec<String>,
        visibility: Vec<bool>,
    }

    impl RenderingEngine for RecordingEngine {
        fn resolve_layer_by_name(&self, name: &str) -> Option<Renderable> {
            crate::globe::builtin_layer(name)
        }

        fn append(&mut self, renderable: Renderable) -> SceneHandle {
            self.appended.push(renderable.name);
            self.visibility.push(true);
            SceneHandle(self.appended.len() - 1)
        }

        fn set_visible(&mut self, handle: SceneHandle, visible: bool) {
            self.visibility[handle.0] = visible;
        }
    }

    fn registry() -> LayerRegistry<RecordingEngine> {
        LayerRegistry::new(RecordingEngine::default())
    }

    fn names(snapshot: &CategorySnapshot) -> Vec<&str> {
        snapshot.layers.iter().map(|layer| layer.name()).collect()
    }

    #[test]
    fn test_category_listing_matches_additions_in_order() {
        let mut registry = registry();
        let additions = [
            ("Blue Marble", LayerCategory::Base),
            ("Compass", LayerCategory::Setting),
            ("LandSat", LayerCategory::Base),
            ("Tessellation", LayerCategory::Debug),
            ("Bing Roads", LayerCategory::Base),
            ("Stars", LayerCategory::Setting),
        ];
        for (name, category) in additions {
            registry
                .add_layer(name.into(), LayerOptions::new(category))
                .unwrap();
        }

        for category in LayerCategory::all() {
            let expected: Vec<&str> = additions
                .iter()
                .filter(|(_, c)| c == category)
                .map(|(name, _)| *name)
                .collect();
            assert_eq!(names(&registry.get_by_category(*category)), expected);
        }
    }

    #[test]
    fn test_add_applies_visibility_to_engine() {
        let mut registry = registry();
        registry
            .add_layer("Coordinates".into(), LayerOptions::new(LayerCategory::Setting).enabled(true))
            .unwrap();
        registry
            .add_layer("Compass".into(), LayerOptions::new(LayerCategory::Setting))
            .unwrap();

        assert_eq!(registry.engine().appended, vec!["Coordinates", "Compass"]);
        assert_eq!(registry.engine().visibility, vec![true, false]);
    }

    #[test]
    fn test_set_enabled_keeps_category_and_advances_stamp() {
        let mut registry = registry();
        let id = registry
            .add_layer("Stars".into(), LayerOptions::new(LayerCategory::Setting))
            .unwrap();
        let before = registry.get_by_category(LayerCategory::Setting);

        registry.set_enabled(id, true).unwrap();

        let after = registry.get_by_category(LayerCategory::Setting);
        assert_eq!(registry.get(id).unwrap().category(), LayerCategory::Setting);
        assert!(after.last_updated > before.last_updated);
        assert_eq!(after.len(), 1);
        assert!(after.layers[0].enabled());
        assert_eq!(registry.engine().visibility, vec![true]);
    }

    #[test]
    fn test_set_enabled_to_current_value_is_noop() {
        let mut registry = registry();
        let id = registry
            .add_layer("Compass".into(), LayerOptions::new(LayerCategory::Setting))
            .unwrap();
        let before = registry.get_by_category(LayerCategory::Setting);

        registry.set_enabled(id, false).unwrap();

        let after = registry.get_by_category(LayerCategory::Setting);
        assert_eq!(after.last_updated, before.last_updated);
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_unrelated_mutation_keeps_snapshot_identity() {
        let mut registry = registry();
        registry
            .add_layer("Blue Marble".into(), LayerOptions::new(LayerCategory::Base).enabled(true))
            .unwrap();
        let base = registry.get_by_category(LayerCategory::Base);

        registry
            .add_layer("Tessellation".into(), LayerOptions::new(LayerCategory::Debug))
            .unwrap();

        let base_after = registry.get_by_category(LayerCategory::Base);
        assert!(Arc::ptr_eq(&base, &base_after));
        assert_eq!(base_after.last_updated, base.last_updated);
        assert_eq!(registry.get_by_category(LayerCategory::Debug).len(), 1);
    }

    #[test]
    fn test_stars_scenario() {
        let mut registry = registry();
        registry.seed([(
            LayerIdentity::from("Stars"),
            LayerOptions::new(LayerCategory::Setting).display_name("Stars"),
        )]);
        let before = registry.get_by_category(LayerCategory::Setting).last_updated;
        let stars = registry.find("Stars").unwrap().id();

        registry.set_enabled(stars, true).unwrap();

        let settings = registry.get_by_category(LayerCategory::Setting);
        assert_eq!(settings.len(), 1);
        assert!(settings.layers[0].enabled());
        assert!(settings.last_updated > before);
    }

    #[test]
    fn test_unresolved_name_is_dropped() {
        let mut registry = registry();
        registry
            .add_layer("Blue Marble".into(), LayerOptions::new(LayerCategory::Base))
            .unwrap();
        let stamps: Vec<_> = LayerCategory::all()
            .iter()
            .map(|category| registry.get_by_category(*category).last_updated)
            .collect();

        let result = registry.add_layer(
            "NonexistentLayer".into(),
            LayerOptions::new(LayerCategory::Base),
        );

        assert_eq!(
            result,
            Err(LayerError::Unresolved {
                name: "NonexistentLayer".to_string()
            })
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.engine().appended.len(), 1);
        for (category, stamp) in LayerCategory::all().iter().zip(stamps) {
            assert_eq!(registry.get_by_category(*category).last_updated, stamp);
        }
    }

    #[test]
    fn test_seed_counts_only_resolved_layers() {
        let mut registry = registry();
        let added = registry.seed([
            (LayerIdentity::from("Blue Marble"), LayerOptions::new(LayerCategory::Base)),
            (LayerIdentity::from("Nowhere"), LayerOptions::new(LayerCategory::Base)),
            (LayerIdentity::from("Compass"), LayerOptions::new(LayerCategory::Setting)),
        ]);
        assert_eq!(added, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_constructed_renderable_is_accepted_directly() {
        let mut registry = registry();
        let markers = Renderable::placemarks(
            "Markers",
            vec![Placemark::new("Kilauea", 19.41, -155.28)],
        );
        let id = registry
            .add_layer(markers.into(), LayerOptions::new(LayerCategory::Data).enabled(true))
            .unwrap();

        let descriptor = registry.get(id).unwrap();
        assert_eq!(descriptor.origin(), LayerOrigin::Constructed);
        assert_eq!(descriptor.display_name(), "Markers");
        assert_eq!(registry.get_by_category(LayerCategory::Data).len(), 1);
    }

    #[test]
    fn test_catalog_layers_keep_callback_order() {
        let mut registry = registry();
        registry
            .add_layer("Blue Marble".into(), LayerOptions::new(LayerCategory::Base))
            .unwrap();

        for name in ["A", "B", "C"] {
            let renderable = Renderable::wms(WmsLayer::new(name, name, "https://example.test/wms"));
            registry
                .add_layer(renderable.into(), LayerOptions::new(LayerCategory::Overlay))
                .unwrap();
            registry
                .add_layer("Compass".into(), LayerOptions::new(LayerCategory::Setting))
                .unwrap();
        }

        let overlays = registry.get_by_category(LayerCategory::Overlay);
        assert_eq!(names(&overlays), vec!["A", "B", "C"]);
        assert!(overlays.layers.iter().all(|layer| !layer.enabled()));
    }

    #[test]
    fn test_toggle_and_unknown_layer() {
        let mut registry = registry();
        let id = registry
            .add_layer("Atmosphere".into(), LayerOptions::new(LayerCategory::Setting))
            .unwrap();

        assert_eq!(registry.toggle(id), Ok(true));
        assert_eq!(registry.toggle(id), Ok(false));
        assert_eq!(
            registry.set_enabled(LayerId(42), true),
            Err(LayerError::UnknownLayer(LayerId(42)))
        );
    }

    #[test]
    fn test_subscribers_receive_new_snapshots() {
        let mut registry = registry();
        let updates = registry.subscribe();

        let id = registry
            .add_layer("Compass".into(), LayerOptions::new(LayerCategory::Setting))
            .unwrap();
        registry.set_enabled(id, false).unwrap();
        registry.set_enabled(id, true).unwrap();

        let received: Vec<_> = updates.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|s| s.category == LayerCategory::Setting));
        assert!(received[1].last_updated > received[0].last_updated);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut registry = registry();
        drop(registry.subscribe());

        registry
            .add_layer("Compass".into(), LayerOptions::new(LayerCategory::Setting))
            .unwrap();

        assert!(registry.subscribers.is_empty());
    }
}
