//! Right panel UI: layer, marker, and settings controls.
//!
//! Every section draws from a category snapshot. Checkbox clicks are
//! collected while drawing and applied to the registry afterwards, so the
//! snapshot being drawn never changes underneath the panel.

use crate::catalog::CatalogLoader;
use crate::globe::Placemark;
use crate::layers::{CategorySnapshot, LayerCategory, LayerId, LayerRegistry};
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText, ScrollArea};

/// A checkbox change requested by the user this frame.
type ToggleRequest = (LayerId, bool);

pub fn render_right_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    registry: &mut LayerRegistry,
    catalog: &CatalogLoader,
    placemarks: &[Placemark],
) {
    if !state.panels.any_open() {
        return;
    }

    let mut requests: Vec<ToggleRequest> = Vec::new();

    egui::SidePanel::right("right_panel")
        .resizable(true)
        .default_width(240.0)
        .min_width(180.0)
        .max_width(360.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                if state.panels.layers {
                    render_layers_section(ui, registry, catalog, &mut requests);
                    ui.add_space(5.0);
                }
                if state.panels.markers {
                    render_markers_section(ui, registry, placemarks, &mut requests);
                    ui.add_space(5.0);
                }
                if state.panels.settings {
                    render_settings_section(ui, registry, &mut requests);
                }
            });
        });

    for (id, enabled) in requests {
        match registry.set_enabled(id, enabled) {
            Ok(()) => {
                if let Some(layer) = registry.get(id) {
                    state.status_message = format!(
                        "{} {}",
                        layer.display_name(),
                        if enabled { "shown" } else { "hidden" }
                    );
                }
            }
            Err(e) => log::warn!("Layer toggle ignored: {}", e),
        }
    }
}

fn render_layers_section(
    ui: &mut egui::Ui,
    registry: &LayerRegistry,
    catalog: &CatalogLoader,
    requests: &mut Vec<ToggleRequest>,
) {
    egui::CollapsingHeader::new(RichText::new("Layers").strong())
        .default_open(true)
        .show(ui, |ui| {
            let base = registry.get_by_category(LayerCategory::Base);
            render_category(ui, &base, requests);

            ui.separator();

            let overlays = registry.get_by_category(LayerCategory::Overlay);
            render_category(ui, &overlays, requests);

            if catalog.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Loading catalog…").small());
                });
            } else if overlays.is_empty() {
                ui.label(RichText::new("No overlays available").small().weak());
            }
        });
}

fn render_markers_section(
    ui: &mut egui::Ui,
    registry: &LayerRegistry,
    placemarks: &[Placemark],
    requests: &mut Vec<ToggleRequest>,
) {
    egui::CollapsingHeader::new(RichText::new("Markers").strong())
        .default_open(true)
        .show(ui, |ui| {
            let data = registry.get_by_category(LayerCategory::Data);
            render_category(ui, &data, requests);

            ui.separator();
            ui.label(RichText::new("Placemarks").small());

            for placemark in placemarks {
                ui.label(
                    RichText::new(format!(
                        "{}  {:.4}, {:.4}",
                        placemark.name, placemark.latitude, placemark.longitude
                    ))
                    .monospace()
                    .size(11.0),
                );
            }
        });
}

fn render_settings_section(
    ui: &mut egui::Ui,
    registry: &LayerRegistry,
    requests: &mut Vec<ToggleRequest>,
) {
    egui::CollapsingHeader::new(RichText::new("Settings").strong())
        .default_open(true)
        .show(ui, |ui| {
            let settings = registry.get_by_category(LayerCategory::Setting);
            render_category(ui, &settings, requests);
        });

    egui::CollapsingHeader::new(RichText::new("Debug").strong())
        .default_open(false)
        .show(ui, |ui| {
            let debug = registry.get_by_category(LayerCategory::Debug);
            render_category(ui, &debug, requests);
        });
}

/// Draws one checkbox per layer of a snapshot.
fn render_category(
    ui: &mut egui::Ui,
    snapshot: &CategorySnapshot,
    requests: &mut Vec<ToggleRequest>,
) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(snapshot.category.label()).small().strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(snapshot.last_updated.at().format("%H:%M:%S").to_string())
                    .small()
                    .monospace()
                    .color(Color32::GRAY),
            )
            .on_hover_text(format!("Revision {}", snapshot.last_updated.revision()));
        });
    });

    for layer in &snapshot.layers {
        let mut enabled = layer.enabled();
        if ui.checkbox(&mut enabled, layer.display_name()).changed() {
            requests.push((layer.id(), enabled));
        }
    }
}
