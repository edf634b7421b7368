//! Central canvas UI: globe view area.

use crate::globe::{render_scene, Globe, RenderableKind};
use crate::state::AppState;
use eframe::egui::{self, Rect, Sense, Vec2};
use egui_phosphor::regular as icons;

/// Zoom step applied by the view control buttons.
const BUTTON_ZOOM_STEP: f32 = 1.5;

/// Render the globe canvas with every visible scene layer.
pub fn render_canvas(ctx: &egui::Context, state: &mut AppState, globe: &Globe) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();

            // Allocate the full available space for the canvas
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            let view = state.view_state.globe_view(rect);
            render_scene(&painter, globe, &view);

            if globe.shows(|kind| matches!(kind, RenderableKind::ViewControls)) {
                render_view_controls(ui, &rect, state);
            }

            // Handle zoom/pan interactions
            handle_canvas_interaction(&response, &rect, state);
        });
}

fn render_view_controls(ui: &mut egui::Ui, rect: &Rect, state: &mut AppState) {
    let controls_rect = Rect::from_min_size(
        rect.left_bottom() + Vec2::new(10.0, -110.0),
        Vec2::new(36.0, 100.0),
    );

    ui.scope_builder(egui::UiBuilder::new().max_rect(controls_rect), |ui| {
        ui.vertical(|ui| {
            if ui.button(icons::PLUS).on_hover_text("Zoom in").clicked() {
                state.view_state.zoom_by(BUTTON_ZOOM_STEP, Vec2::ZERO);
            }
            if ui.button(icons::MINUS).on_hover_text("Zoom out").clicked() {
                state.view_state.zoom_by(1.0 / BUTTON_ZOOM_STEP, Vec2::ZERO);
            }
            if ui
                .button(icons::CROSSHAIR)
                .on_hover_text("Reset view")
                .clicked()
            {
                state.view_state.reset();
            }
        });
    });
}

fn handle_canvas_interaction(response: &egui::Response, rect: &Rect, state: &mut AppState) {
    // Handle dragging for panning
    if response.dragged() {
        state.view_state.pan_offset += response.drag_delta();
    }

    // Handle scroll for zooming relative to cursor position
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let zoom_factor = 1.0 + scroll_delta.y * 0.001;
            let anchor = response
                .hover_pos()
                .map(|pos| pos - rect.center())
                .unwrap_or(Vec2::ZERO);
            state.view_state.zoom_by(zoom_factor, anchor);
        }
    }

    // Reset view on double-click
    if response.double_clicked() {
        state.view_state.reset();
    }
}
