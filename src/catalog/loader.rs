//! Asynchronous catalog loading.
//!
//! Uses channel-based communication to bridge the async capabilities fetch
//! with egui's synchronous update loop. The fetch runs off the UI thread;
//! discovered layers are handed to the caller's callback on the UI thread,
//! one at a time, in document order.

use super::{capabilities_url, parse_capabilities, WmsLayer};
use crate::error::CatalogError;
use crate::globe::{Renderable, RenderingEngine};
use crate::layers::LayerRegistry;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use web_time::Instant;

/// Progress messages sent from the fetch task to the UI thread.
#[derive(Debug, Clone)]
pub enum CatalogMessage {
    LayerFound(WmsLayer),
    EntrySkipped(CatalogError),
    Finished { found: usize, skipped: usize },
    Failed(CatalogError),
}

/// Where the most recent load stands, as seen by the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Idle,
    Loading {
        service_url: String,
        started: Instant,
    },
    Complete {
        found: usize,
        skipped: usize,
    },
    Failed(CatalogError),
}

/// Channel-based loader for a remote WMS catalog.
pub struct CatalogLoader {
    sender: Sender<CatalogMessage>,
    receiver: Receiver<CatalogMessage>,
    state: CatalogState,
    delivered: usize,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogLoader {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            state: CatalogState::Idle,
            delivered: 0,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CatalogState::Loading { .. })
    }

    /// Number of layers handed to callbacks so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Starts fetching the capabilities of `service_url` without blocking.
    ///
    /// There is no retry, timeout or cancellation: the fetch runs to
    /// completion or failure. Results are picked up by [`dispatch`](Self::dispatch).
    pub fn load_catalog(&mut self, service_url: &str, ctx: egui::Context) {
        self.begin(service_url);

        let sender = self.sender.clone();
        let service_url = service_url.to_string();

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let body = fetch_capabilities_native(&service_url);
                deliver(&sender, &service_url, body);
                ctx.request_repaint();
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let body = fetch_capabilities_web(&service_url).await;
                deliver(&sender, &service_url, body);
                ctx.request_repaint();
            });
        }
    }

    fn begin(&mut self, service_url: &str) {
        log::info!("Loading WMS catalog from {}", service_url);
        self.state = CatalogState::Loading {
            service_url: service_url.to_string(),
            started: Instant::now(),
        };
    }

    /// Drains pending results, calling `on_layer_found` once per discovered layer.
    ///
    /// Each callback completes before the next one starts. Failures and
    /// skipped entries are logged here and never reach the callback.
    /// Returns the number of callbacks made.
    pub fn dispatch(&mut self, mut on_layer_found: impl FnMut(Renderable)) -> usize {
        let mut calls = 0;

        while let Ok(message) = self.receiver.try_recv() {
            match message {
                CatalogMessage::LayerFound(layer) => {
                    log::debug!("Catalog layer found: {} ({})", layer.title, layer.name);
                    on_layer_found(Renderable::wms(layer));
                    calls += 1;
                }
                CatalogMessage::EntrySkipped(e) => {
                    log::warn!("Skipping catalog entry: {}", e);
                }
                CatalogMessage::Finished { found, skipped } => {
                    if let CatalogState::Loading { started, .. } = &self.state {
                        log::info!(
                            "WMS catalog loaded: {} layer(s), {} skipped, in {:.0} ms",
                            found,
                            skipped,
                            started.elapsed().as_secs_f64() * 1000.0
                        );
                    }
                    self.state = CatalogState::Complete { found, skipped };
                }
                CatalogMessage::Failed(e) => {
                    log::error!("WMS catalog unavailable: {}", e);
                    self.state = CatalogState::Failed(e);
                }
            }
        }

        self.delivered += calls;
        calls
    }

    /// Drains pending results into `registry` as disabled overlays.
    ///
    /// Layers are added in the order the catalog listed them. Returns the
    /// number of layers actually registered.
    pub fn dispatch_into<E: RenderingEngine>(&mut self, registry: &mut LayerRegistry<E>) -> usize {
        let mut added = 0;
        self.dispatch(|renderable| match registry.add_catalog_layer(renderable) {
            Ok(_) => added += 1,
            Err(e) => log::warn!("Catalog layer not added: {}", e),
        });
        added
    }
}

/// Parses a fetched document and queues its messages in document order.
///
/// The document is parsed completely before anything is queued, so a broken
/// document never yields a partial set of layers.
fn deliver(
    sender: &Sender<CatalogMessage>,
    service_url: &str,
    body: Result<String, CatalogError>,
) {
    let entries = match body.and_then(|xml| parse_capabilities(&xml, service_url)) {
        Ok(entries) => entries,
        Err(e) => {
            if sender.send(CatalogMessage::Failed(e)).is_err() {
                log::debug!("Catalog failure not delivered: loader dropped");
            }
            return;
        }
    };

    let mut found = 0;
    let mut skipped = 0;
    for entry in entries {
        let message = match entry {
            Ok(layer) => {
                found += 1;
                CatalogMessage::LayerFound(layer)
            }
            Err(e) => {
                skipped += 1;
                CatalogMessage::EntrySkipped(e)
            }
        };
        if sender.send(message).is_err() {
            // Loader dropped; nobody is listening anymore
            return;
        }
    }
    if sender
        .send(CatalogMessage::Finished { found, skipped })
        .is_err()
    {
        log::debug!("Catalog summary not delivered: loader dropped");
    }
}

fn fetch_error(service_url: &str, reason: impl ToString) -> CatalogError {
    CatalogError::Fetch {
        url: service_url.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_capabilities_native(service_url: &str) -> Result<String, CatalogError> {
    let url = capabilities_url(service_url)?;

    let response = reqwest::blocking::get(url.as_str()).map_err(|e| fetch_error(service_url, e))?;
    if !response.status().is_success() {
        return Err(fetch_error(
            service_url,
            format!("service responded with {}", response.status()),
        ));
    }

    response.text().map_err(|e| fetch_error(service_url, e))
}

#[cfg(target_arch = "wasm32")]
async fn fetch_capabilities_web(service_url: &str) -> Result<String, CatalogError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let url = capabilities_url(service_url)?;

    let init = web_sys::RequestInit::new();
    init.set_method("GET");
    init.set_mode(web_sys::RequestMode::Cors);

    let request = web_sys::Request::new_with_str_and_init(url.as_str(), &init)
        .map_err(|e| fetch_error(service_url, format!("{:?}", e)))?;
    let window = web_sys::window().ok_or_else(|| fetch_error(service_url, "no window"))?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| fetch_error(service_url, format!("{:?}", e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| fetch_error(service_url, "fetch did not return a Response"))?;

    if !response.ok() {
        return Err(fetch_error(
            service_url,
            format!("service responded with {}", response.status()),
        ));
    }

    let text = response
        .text()
        .map_err(|e| fetch_error(service_url, format!("{:?}", e)))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| fetch_error(service_url, format!("{:?}", e)))?;

    text.as_string()
        .ok_or_else(|| fetch_error(service_url, "response body is not text"))
}
