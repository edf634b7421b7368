//! Error types for the layer registry, catalog loader, and configuration.
//!
//! None of these are fatal: the registry and loader recover locally and
//! report through `log`, so the scene always stays renderable.

use crate::layers::LayerId;
use thiserror::Error;

/// Errors raised by [`LayerRegistry`](crate::layers::LayerRegistry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// A named layer is not part of the rendering engine's built-in catalog.
    #[error("layer '{name}' could not be resolved by the rendering engine")]
    Unresolved { name: String },

    /// The id was never issued by this registry.
    #[error("no layer registered with id {0}")]
    UnknownLayer(LayerId),
}

/// Errors raised while loading a remote layer catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The service could not be reached or answered with a failure status.
    #[error("failed to fetch catalog from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The capabilities document as a whole could not be parsed.
    #[error("malformed capabilities document: {0}")]
    MalformedDocument(String),

    /// A single layer entry could not be parsed; its siblings are unaffected.
    #[error("malformed catalog entry #{index}: {reason}")]
    MalformedEntry { index: usize, reason: String },
}

/// Errors raised while loading the workbench configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
