#![warn(clippy::all)]

//! Layer registry, WMS catalog discovery, and globe shell for the Kilauea
//! workbench.
//!
//! The binary wires these together; everything here is usable without a
//! window, which is how the tests drive it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod globe;
pub mod layers;
pub mod state;
pub mod ui;
