//! Top bar UI: app title, panel toggles, and catalog status.

use crate::catalog::{CatalogLoader, CatalogState};
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};
use egui_phosphor::regular as icons;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState, title: &str, catalog: &CatalogLoader) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new(format!("{} {}", icons::GLOBE_HEMISPHERE_WEST, title))
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                ui.toggle_value(&mut state.panels.layers, format!("{} Layers", icons::STACK));
                ui.toggle_value(&mut state.panels.markers, format!("{} Markers", icons::MAP_PIN));
                ui.toggle_value(&mut state.panels.settings, format!("{} Settings", icons::GEAR));

                ui.separator();

                render_catalog_status(ui, catalog);

                ui.separator();

                // Status text
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });
}

fn render_catalog_status(ui: &mut egui::Ui, catalog: &CatalogLoader) {
    match catalog.state() {
        CatalogState::Idle => {}
        CatalogState::Loading { .. } => {
            ui.spinner();
            ui.label(RichText::new("Catalog loading").size(12.0).color(Color32::GRAY));
        }
        CatalogState::Complete { found, .. } => {
            ui.label(
                RichText::new(format!("{} Catalog: {} layer(s)", icons::CHECK_CIRCLE, found))
                    .size(12.0)
                    .color(Color32::from_rgb(120, 200, 120)),
            );
        }
        CatalogState::Failed(e) => {
            ui.label(
                RichText::new(format!("{} Catalog unavailable", icons::WARNING))
                    .size(12.0)
                    .color(Color32::from_rgb(230, 160, 60)),
            )
            .on_hover_text(e.to_string());
        }
    }
}
