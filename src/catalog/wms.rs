//! WMS GetCapabilities parsing.
//!
//! Walks the capabilities document with a streaming reader and collects every
//! named `<Layer>`, at any nesting depth. Unnamed layers are groups and only
//! contribute inherited bounds to their children.

use crate::error::CatalogError;
use crate::globe::GeoBounds;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A layer advertised by a WMS service.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsLayer {
    /// Machine name used in GetMap `LAYERS=`
    pub name: String,
    /// Human-readable title, used as display name
    pub title: String,
    pub abstract_text: Option<String>,
    /// Geographic coverage, own or inherited from the parent layer
    pub bounds: Option<GeoBounds>,
    /// Endpoint for GetMap requests
    pub get_map_url: String,
}

impl WmsLayer {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        get_map_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            abstract_text: None,
            bounds: None,
            get_map_url: get_map_url.into(),
        }
    }
}

/// Raw, not yet validated bounding box values.
#[derive(Debug, Clone, Default)]
struct RawBounds {
    west: Option<String>,
    south: Option<String>,
    east: Option<String>,
    north: Option<String>,
}

impl RawBounds {
    fn parse(&self) -> Result<GeoBounds, String> {
        let value = |field: &Option<String>, label: &str| -> Result<f64, String> {
            let raw = field
                .as_deref()
                .ok_or_else(|| format!("bounding box is missing {}", label))?;
            raw.trim()
                .parse::<f64>()
                .map_err(|_| format!("bounding box {} '{}' is not a number", label, raw))
        };
        Ok(GeoBounds::new(
            value(&self.west, "west")?,
            value(&self.south, "south")?,
            value(&self.east, "east")?,
            value(&self.north, "north")?,
        ))
    }
}

/// A `<Layer>` element being read.
#[derive(Debug, Default)]
struct PendingLayer {
    ordinal: usize,
    name: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    bounds: Option<RawBounds>,
}

impl PendingLayer {
    /// Validated bounds, if this layer declared any.
    fn valid_bounds(&self) -> Option<GeoBounds> {
        self.bounds.as_ref().and_then(|raw| raw.parse().ok())
    }

    /// Turns the element into an entry; `None` for group layers.
    fn finish(
        self,
        inherited: Option<GeoBounds>,
        get_map_url: &str,
    ) -> Option<Result<WmsLayer, CatalogError>> {
        let name = self.name?;
        let malformed = |reason: String| CatalogError::MalformedEntry {
            index: self.ordinal,
            reason,
        };

        let name = name.trim().to_string();
        if name.is_empty() {
            return Some(Err(malformed("layer has an empty <Name>".to_string())));
        }

        let bounds = match &self.bounds {
            Some(raw) => match raw.parse() {
                Ok(bounds) => Some(bounds),
                Err(reason) => return Some(Err(malformed(reason))),
            },
            None => inherited,
        };

        let title = self
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| name.clone());

        Some(Ok(WmsLayer {
            name,
            title,
            abstract_text: self.abstract_text.map(|text| text.trim().to_string()),
            bounds,
            get_map_url: get_map_url.to_string(),
        }))
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).to_string()
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key.as_bytes())
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.to_string())
}

/// Per-document parser state.
struct CapabilitiesParser<'a> {
    service_url: &'a str,
    path: Vec<String>,
    stack: Vec<PendingLayer>,
    finished: Vec<(usize, Result<WmsLayer, CatalogError>)>,
    get_map_url: Option<String>,
    next_ordinal: usize,
    saw_root: bool,
}

impl<'a> CapabilitiesParser<'a> {
    fn new(service_url: &'a str) -> Self {
        Self {
            service_url,
            path: Vec::new(),
            stack: Vec::new(),
            finished: Vec::new(),
            get_map_url: None,
            next_ordinal: 0,
            saw_root: false,
        }
    }

    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), CatalogError> {
        let name = local_name(element);

        if !self.saw_root {
            if name != "WMS_Capabilities" && name != "WMT_MS_Capabilities" {
                return Err(CatalogError::MalformedDocument(format!(
                    "unexpected root element <{}>",
                    name
                )));
            }
            self.saw_root = true;
        }

        match name.as_str() {
            "Layer" => {
                self.stack.push(PendingLayer {
                    ordinal: self.next_ordinal,
                    ..Default::default()
                });
                self.next_ordinal += 1;
            }
            // Blank and self-closing names produce no text event
            "Name" if self.parent_is_layer() => {
                if let Some(layer) = self.stack.last_mut() {
                    layer.name.get_or_insert_with(String::new);
                }
            }
            // WMS 1.1.1 carries the bounds as attributes
            "LatLonBoundingBox" if self.parent_is_layer() => {
                if let Some(layer) = self.stack.last_mut() {
                    layer.bounds = Some(RawBounds {
                        west: attribute(element, "minx"),
                        south: attribute(element, "miny"),
                        east: attribute(element, "maxx"),
                        north: attribute(element, "maxy"),
                    });
                }
            }
            "EX_GeographicBoundingBox" if self.parent_is_layer() => {
                if let Some(layer) = self.stack.last_mut() {
                    layer.bounds = Some(RawBounds::default());
                }
            }
            "OnlineResource" if self.get_map_url.is_none() && self.in_element("GetMap") => {
                self.get_map_url = attribute(element, "href");
            }
            _ => {}
        }

        self.path.push(name);
        Ok(())
    }

    fn close(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };
        if name != "Layer" {
            return;
        }
        let Some(layer) = self.stack.pop() else {
            return;
        };

        let ordinal = layer.ordinal;
        let inherited = self.stack.iter().rev().find_map(PendingLayer::valid_bounds);
        let get_map_url = self.get_map_url.as_deref().unwrap_or(self.service_url);
        if let Some(entry) = layer.finish(inherited, get_map_url) {
            self.finished.push((ordinal, entry));
        }
    }

    fn text(&mut self, text: String) {
        let Some(current) = self.path.last().map(String::as_str) else {
            return;
        };
        let parent = self
            .path
            .len()
            .checked_sub(2)
            .map(|index| self.path[index].as_str());

        let Some(layer) = self.stack.last_mut() else {
            return;
        };

        match (parent, current) {
            (Some("Layer"), "Name") => append_text(&mut layer.name, &text),
            (Some("Layer"), "Title") => append_text(&mut layer.title, &text),
            (Some("Layer"), "Abstract") => append_text(&mut layer.abstract_text, &text),
            (Some("EX_GeographicBoundingBox"), field) => {
                if let Some(bounds) = layer.bounds.as_mut() {
                    let slot = match field {
                        "westBoundLongitude" => &mut bounds.west,
                        "southBoundLatitude" => &mut bounds.south,
                        "eastBoundLongitude" => &mut bounds.east,
                        "northBoundLatitude" => &mut bounds.north,
                        _ => return,
                    };
                    append_text(slot, &text);
                }
            }
            _ => {}
        }
    }

    fn parent_is_layer(&self) -> bool {
        self.path.last().map(String::as_str) == Some("Layer")
    }

    fn in_element(&self, name: &str) -> bool {
        self.path.iter().any(|element| element == name)
    }

    fn finish(mut self) -> Result<Vec<Result<WmsLayer, CatalogError>>, CatalogError> {
        if !self.saw_root {
            return Err(CatalogError::MalformedDocument(
                "document has no root element".to_string(),
            ));
        }
        if !self.path.is_empty() {
            return Err(CatalogError::MalformedDocument(format!(
                "document ended inside <{}>",
                self.path.join("/")
            )));
        }

        // Layers finish innermost first; report them in document order
        self.finished.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(self.finished.into_iter().map(|(_, entry)| entry).collect())
    }
}

/// Text of one element may arrive in several events (text, entities, CDATA).
fn append_text(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}

/// Parses a capabilities document into its named layers, in document order.
///
/// A document-level problem fails the whole parse, so nothing from a broken
/// document is ever applied. A broken entry only fails its own slot.
pub fn parse_capabilities(
    xml: &str,
    service_url: &str,
) -> Result<Vec<Result<WmsLayer, CatalogError>>, CatalogError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut parser = CapabilitiesParser::new(service_url);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => parser.open(e)?,
            Ok(Event::Empty(ref e)) => {
                parser.open(e)?;
                parser.close();
            }
            Ok(Event::End(_)) => parser.close(),
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| {
                    CatalogError::MalformedDocument(format!("invalid text content: {}", e))
                })?;
                parser.text(text.to_string());
            }
            Ok(Event::CData(e)) => {
                parser.text(String::from_utf8_lossy(&e.into_inner()).to_string());
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CatalogError::MalformedDocument(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    parser.finish()
}
