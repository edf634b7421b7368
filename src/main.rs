#![warn(clippy::all)]

//! Kilauea Workbench - A layered globe viewer framed on Kilauea.
//!
//! Seeds a fixed set of imagery, marker, and setting layers into a layer
//! registry, then discovers overlay layers from a remote WMS catalog. Side
//! panels show one category each and toggle layers on the globe.

use eframe::egui;
use kilauea_workbench::catalog::CatalogLoader;
use kilauea_workbench::config::WorkbenchConfig;
use kilauea_workbench::globe::Globe;
use kilauea_workbench::layers::{CategorySnapshot, LayerRegistry};
use kilauea_workbench::state::AppState;
use kilauea_workbench::ui;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = WorkbenchConfig::load();
    let title = config.title.clone();
    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| Ok(Box::new(WorkbenchApp::new(cc, config)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let config = WorkbenchConfig::load();

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(WorkbenchApp::new(cc, config)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct WorkbenchApp {
    /// Shell state (camera, open panels, status line)
    state: AppState,

    /// Startup configuration
    config: WorkbenchConfig,

    /// Every layer known to the globe, with its category and visibility
    registry: LayerRegistry,

    /// Channel for async WMS catalog discovery
    catalog: CatalogLoader,

    /// Snapshots published by the registry since the last frame
    layer_updates: Receiver<Arc<CategorySnapshot>>,
}

impl WorkbenchApp {
    /// Create a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, config: WorkbenchConfig) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let mut registry = LayerRegistry::new(Globe::new());
        let layer_updates = registry.subscribe();

        // Seeding finishes before the catalog starts, so catalog overlays
        // always land after every built-in layer.
        let entries = config.seed_entries();
        let expected = entries.len();
        let seeded = registry.seed(entries);
        if seeded < expected {
            log::warn!("Seeded {} of {} startup layers", seeded, expected);
        } else {
            log::info!("Seeded {} startup layers", seeded);
        }

        let mut catalog = CatalogLoader::new();
        catalog.load_catalog(&config.catalog_url, cc.egui_ctx.clone());

        Self {
            state: AppState::new(&config),
            config,
            registry,
            catalog,
            layer_updates,
        }
    }

    /// Adds every layer the catalog has delivered since the last frame.
    fn process_catalog(&mut self) {
        let added = self.catalog.dispatch_into(&mut self.registry);
        if added > 0 {
            self.state.status_message = format!("Discovered {} catalog layer(s)", added);
        }
    }

    /// Drains registry notifications; panels read snapshots directly.
    fn process_layer_updates(&mut self) {
        while let Ok(snapshot) = self.layer_updates.try_recv() {
            log::debug!(
                "{} layers updated: {} of {} enabled (revision {})",
                snapshot.category.label(),
                snapshot.enabled_count(),
                snapshot.len(),
                snapshot.last_updated.revision()
            );
        }
    }
}

impl eframe::App for WorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for catalog results
        self.process_catalog();
        self.process_layer_updates();

        // Keep the spinner moving while the catalog loads
        if self.catalog.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        // Render UI panels in the correct order for egui layout
        // Side and top/bottom panels must be rendered before CentralPanel
        ui::render_top_bar(ctx, &mut self.state, &self.config.title, &self.catalog);
        ui::render_right_panel(
            ctx,
            &mut self.state,
            &mut self.registry,
            &self.catalog,
            &self.config.placemarks,
        );
        ui::render_canvas(ctx, &mut self.state, self.registry.engine());
    }
}
