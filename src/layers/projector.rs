//! Category projection: per-category, stamped, immutable views of the registry.
//!
//! Every registry mutation re-partitions the full layer sequence. Only the
//! categories whose contents actually changed receive a new snapshot; the
//! others keep the very same `Arc`, so consumers can detect "nothing changed"
//! with a pointer or stamp comparison instead of a deep compare.

use super::{LayerCategory, LayerDescriptor};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

/// Freshness marker of a snapshot.
///
/// Ordered by the projection revision, which strictly increases with every
/// projection that changed something. The wall-clock time is informational.
#[derive(Debug, Clone, Copy)]
pub struct Stamp {
    revision: u64,
    at: DateTime<Utc>,
}

impl Stamp {
    fn new(revision: u64) -> Self {
        Self {
            revision,
            at: Utc::now(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wall-clock time the snapshot was produced.
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

impl PartialEq for Stamp {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision
    }
}

impl Eq for Stamp {}

impl PartialOrd for Stamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Stamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.revision.cmp(&other.revision)
    }
}

/// Immutable view of one category's layers, in registration order.
#[derive(Debug, Clone)]
pub struct CategorySnapshot {
    pub category: LayerCategory,
    pub layers: Vec<LayerDescriptor>,
    pub last_updated: Stamp,
}

impl CategorySnapshot {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.layers.iter().filter(|layer| layer.enabled()).count()
    }
}

/// Holds the current snapshot of every category.
pub struct CategoryProjector {
    revision: u64,
    snapshots: [Arc<CategorySnapshot>; LayerCategory::COUNT],
}

impl Default for CategoryProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryProjector {
    /// Starts with an empty, stamped snapshot for each category.
    pub fn new() -> Self {
        let snapshots = (*LayerCategory::all()).map(|category| {
            Arc::new(CategorySnapshot {
                category,
                layers: Vec::new(),
                last_updated: Stamp::new(0),
            })
        });
        Self {
            revision: 0,
            snapshots,
        }
    }

    pub fn snapshot(&self, category: LayerCategory) -> Arc<CategorySnapshot> {
        Arc::clone(&self.snapshots[category.index()])
    }

    /// Re-partitions `layers` and replaces the snapshots of changed categories.
    ///
    /// Returns the freshly produced snapshots, empty when nothing changed.
    pub fn project(&mut self, layers: &[LayerDescriptor]) -> Vec<Arc<CategorySnapshot>> {
        let mut partitions: [Vec<LayerDescriptor>; LayerCategory::COUNT] = Default::default();
        for layer in layers {
            partitions[layer.category().index()].push(layer.clone());
        }

        let changed: Vec<usize> = partitions
            .iter()
            .enumerate()
            .filter(|(index, partition)| **partition != self.snapshots[*index].layers)
            .map(|(index, _)| index)
            .collect();

        if changed.is_empty() {
            return Vec::new();
        }

        self.revision += 1;
        let stamp = Stamp::new(self.revision);

        changed
            .into_iter()
            .map(|index| {
                let snapshot = Arc::new(CategorySnapshot {
                    category: LayerCategory::all()[index],
                    layers: std::mem::take(&mut partitions[index]),
                    last_updated: stamp,
                });
                self.snapshots[index] = Arc::clone(&snapshot);
                snapshot
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::SceneHandle;
    use crate::layers::{LayerId, LayerOptions, LayerOrigin};

    fn descriptor(id: usize, name: &str, category: LayerCategory, enabled: bool) -> LayerDescriptor {
        LayerDescriptor::new(
            LayerId(id),
            name.to_string(),
            LayerOrigin::BuiltIn,
            SceneHandle(id),
            LayerOptions::new(category).enabled(enabled),
        )
    }

    #[test]
    fn test_initial_snapshots_are_empty_and_stamped() {
        let projector = CategoryProjector::new();
        for category in LayerCategory::all() {
            let snapshot = projector.snapshot(*category);
            assert_eq!(snapshot.category, *category);
            assert!(snapshot.is_empty());
            assert_eq!(snapshot.last_updated.revision(), 0);
        }
    }

    #[test]
    fn test_only_changed_categories_are_replaced() {
        let mut projector = CategoryProjector::new();
        let mut layers = vec![descriptor(0, "Blue Marble", LayerCategory::Base, true)];
        let produced = projector.project(&layers);
        assert_eq!(produced.len(), 1);
        assert_eq!(produced[0].category, LayerCategory::Base);

        let base_before = projector.snapshot(LayerCategory::Base);
        layers.push(descriptor(1, "Tessellation", LayerCategory::Debug, false));
        let produced = projector.project(&layers);

        assert_eq!(produced.len(), 1);
        assert_eq!(produced[0].category, LayerCategory::Debug);
        assert!(Arc::ptr_eq(&base_before, &projector.snapshot(LayerCategory::Base)));
    }

    #[test]
    fn test_unchanged_projection_produces_nothing() {
        let mut projector = CategoryProjector::new();
        let layers = vec![descriptor(0, "Compass", LayerCategory::Setting, false)];
        projector.project(&layers);
        let before = projector.snapshot(LayerCategory::Setting);

        assert!(projector.project(&layers).is_empty());
        assert!(Arc::ptr_eq(&before, &projector.snapshot(LayerCategory::Setting)));
    }

    #[test]
    fn test_flag_change_advances_stamp() {
        let mut projector = CategoryProjector::new();
        let mut layers = vec![descriptor(0, "Stars", LayerCategory::Setting, false)];
        projector.project(&layers);
        let before = projector.snapshot(LayerCategory::Setting).last_updated;

        layers[0].enabled = true;
        projector.project(&layers);
        let after = projector.snapshot(LayerCategory::Setting);

        assert!(after.last_updated > before);
        assert_eq!(after.enabled_count(), 1);
    }
}
