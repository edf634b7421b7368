//! Layer registry and category projection.
//!
//! The registry owns which layers exist and whether they are enabled; the
//! projector turns that into one stamped snapshot per category for panels.

mod descriptor;
mod projector;
mod registry;

pub use descriptor::{
    LayerCategory, LayerDescriptor, LayerId, LayerIdentity, LayerOptions, LayerOrigin,
};
pub use projector::{CategoryProjector, CategorySnapshot, Stamp};
pub use registry::LayerRegistry;
