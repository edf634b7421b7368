//! Scene painting.
//!
//! Draws the visible scene layers onto the canvas. Backdrop layers (stars,
//! atmosphere) go first; everything else follows scene order, back to front.

use super::{Globe, GeoBounds, GlobeView, Placemark, RenderableKind, SceneLayer};
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};
use geo_types::Coord;

const LABEL_COLOR: Color32 = Color32::from_rgb(230, 230, 240);
const OVERLAY_COLOR: Color32 = Color32::from_rgb(255, 170, 60);
const MARKER_COLOR: Color32 = Color32::from_rgb(235, 70, 60);

/// Renders every visible layer of `globe`.
pub fn render_scene(painter: &Painter, globe: &Globe, view: &GlobeView) {
    let rect = view.screen_rect;

    // Empty space when no imagery is enabled
    painter.rect_filled(rect, 0.0, Color32::from_rgb(8, 8, 16));

    for layer in globe.visible_layers().filter(|l| is_backdrop(l)) {
        render_layer(painter, layer, view);
    }
    for layer in globe.visible_layers().filter(|l| !is_backdrop(l)) {
        render_layer(painter, layer, view);
    }
}

fn is_backdrop(layer: &SceneLayer) -> bool {
    matches!(
        layer.renderable.kind,
        RenderableKind::Stars | RenderableKind::Atmosphere
    )
}

fn render_layer(painter: &Painter, layer: &SceneLayer, view: &GlobeView) {
    let rect = view.screen_rect;
    match &layer.renderable.kind {
        RenderableKind::Imagery { tint, labels } => {
            painter.rect_filled(rect, 0.0, *tint);
            if *labels {
                render_imagery_label(painter, rect, &layer.renderable.name);
            }
        }
        RenderableKind::Wms(wms) => {
            if let Some(bounds) = wms.bounds {
                render_footprint(painter, &bounds, &wms.title, view);
            }
        }
        RenderableKind::Placemarks(placemarks) => render_placemarks(painter, placemarks, view),
        RenderableKind::Compass => render_compass(painter, rect),
        RenderableKind::Coordinates => render_coordinates(painter, view),
        // Drawn as interactive widgets by the canvas
        RenderableKind::ViewControls => {}
        RenderableKind::Stars => render_stars(painter, rect),
        RenderableKind::Atmosphere => render_atmosphere(painter, rect),
        RenderableKind::Tessellation => render_graticule(painter, view),
    }
}

fn render_imagery_label(painter: &Painter, rect: Rect, name: &str) {
    painter.text(
        rect.right_bottom() - Vec2::new(8.0, 8.0),
        Align2::RIGHT_BOTTOM,
        name,
        FontId::proportional(10.0),
        Color32::from_white_alpha(140),
    );
}

/// Outline of a WMS layer's coverage, labelled with its title.
fn render_footprint(painter: &Painter, bounds: &GeoBounds, title: &str, view: &GlobeView) {
    let corners = [
        Coord {
            x: bounds.west,
            y: bounds.north,
        },
        Coord {
            x: bounds.east,
            y: bounds.north,
        },
        Coord {
            x: bounds.east,
            y: bounds.south,
        },
        Coord {
            x: bounds.west,
            y: bounds.south,
        },
    ];
    let points: Vec<Pos2> = corners.iter().map(|c| view.geo_to_screen(*c)).collect();
    let footprint = Rect::from_points(&points);
    if !footprint.intersects(view.screen_rect) {
        return;
    }

    let stroke = Stroke::new(1.5, OVERLAY_COLOR);
    painter.rect_filled(
        footprint,
        0.0,
        Color32::from_rgba_unmultiplied(255, 170, 60, 28),
    );
    for i in 0..points.len() {
        painter.line_segment([points[i], points[(i + 1) % points.len()]], stroke);
    }

    let anchor = view.geo_to_screen(bounds.center());
    painter.text(
        anchor,
        Align2::CENTER_CENTER,
        title,
        FontId::proportional(11.0),
        OVERLAY_COLOR,
    );
}

fn render_placemarks(painter: &Painter, placemarks: &[Placemark], view: &GlobeView) {
    for placemark in placemarks {
        let coord = placemark.coord();
        if !view.is_visible(coord) {
            continue;
        }

        let pos = view.geo_to_screen(coord);
        painter.circle_filled(pos, 4.0, MARKER_COLOR);
        painter.circle_stroke(pos, 4.0, Stroke::new(1.0, Color32::WHITE));
        painter.text(
            pos + Vec2::new(6.0, -6.0),
            Align2::LEFT_BOTTOM,
            &placemark.name,
            FontId::proportional(11.0),
            LABEL_COLOR,
        );
    }
}

fn render_compass(painter: &Painter, rect: Rect) {
    let center = rect.right_top() + Vec2::new(-40.0, 40.0);
    let radius = 22.0;
    painter.circle_stroke(center, radius, Stroke::new(1.5, LABEL_COLOR));
    painter.line_segment(
        [center, center - Vec2::new(0.0, radius - 4.0)],
        Stroke::new(2.5, MARKER_COLOR),
    );
    painter.line_segment(
        [center, center + Vec2::new(0.0, radius - 4.0)],
        Stroke::new(2.5, LABEL_COLOR),
    );
    painter.text(
        center - Vec2::new(0.0, radius + 8.0),
        Align2::CENTER_CENTER,
        "N",
        FontId::proportional(12.0),
        LABEL_COLOR,
    );
}

fn render_coordinates(painter: &Painter, view: &GlobeView) {
    let look_at = view.look_at();
    let text = format!(
        "Lat {:.4}°  Lon {:.4}°  Eye {:.0} km",
        look_at.y,
        look_at.x,
        view.eye_altitude() / 1000.0
    );
    painter.text(
        view.screen_rect.left_bottom() + Vec2::new(10.0, -10.0),
        Align2::LEFT_BOTTOM,
        text,
        FontId::monospace(12.0),
        LABEL_COLOR,
    );
}

/// Deterministic star field so stars do not flicker between frames.
fn render_stars(painter: &Painter, rect: Rect) {
    let mut seed: u32 = 0x9E37_79B9;
    for _ in 0..160 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let x = (seed & 0xFFFF) as f32 / 65535.0;
        let y = (seed >> 16) as f32 / 65535.0;
        let pos = Pos2::new(
            rect.left() + x * rect.width(),
            rect.top() + y * rect.height(),
        );
        painter.circle_filled(pos, 0.8, Color32::from_white_alpha(180));
    }
}

fn render_atmosphere(painter: &Painter, rect: Rect) {
    for step in 0..6 {
        let inset = step as f32 * 6.0;
        let alpha = 40 - step * 6;
        painter.rect_stroke(
            rect.shrink(inset),
            0.0,
            Stroke::new(6.0, Color32::from_rgba_unmultiplied(90, 150, 255, alpha as u8)),
            eframe::egui::StrokeKind::Inside,
        );
    }
}

/// Latitude/longitude grid, spacing adapted to the visible range.
fn render_graticule(painter: &Painter, view: &GlobeView) {
    let (min_lon, min_lat, max_lon, max_lat) = view.visible_bounds();
    let spacing = graticule_spacing(view.range_deg());
    let stroke = Stroke::new(0.8, Color32::from_rgba_unmultiplied(120, 255, 120, 110));

    let mut lon = (min_lon / spacing).floor() * spacing;
    while lon <= max_lon {
        let top = view.geo_to_screen(Coord { x: lon, y: max_lat });
        let bottom = view.geo_to_screen(Coord { x: lon, y: min_lat });
        painter.line_segment([top, bottom], stroke);
        lon += spacing;
    }

    let mut lat = (min_lat / spacing).floor() * spacing;
    while lat <= max_lat {
        let left = view.geo_to_screen(Coord { x: min_lon, y: lat });
        let right = view.geo_to_screen(Coord { x: max_lon, y: lat });
        painter.line_segment([left, right], stroke);
        lat += spacing;
    }
}

fn graticule_spacing(range_deg: f64) -> f64 {
    [0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0]
        .into_iter()
        .find(|spacing| range_deg / spacing <= 6.0)
        .unwrap_or(30.0)
}
