//! Remote layer catalog discovery.
//!
//! This module provides functionality for:
//! - Fetching a WMS service's GetCapabilities document without blocking the UI
//! - Parsing the document into per-layer entries
//! - Handing discovered layers back to the UI thread one at a time

mod loader;
mod wms;

pub use loader::{CatalogLoader, CatalogMessage, CatalogState};
pub use wms::{parse_capabilities, WmsLayer};

use crate::error::CatalogError;
use url::Url;

/// Builds the GetCapabilities request URL for a WMS service endpoint.
///
/// Query parameters already present on the endpoint are kept.
pub fn capabilities_url(service_url: &str) -> Result<Url, CatalogError> {
    let mut url = Url::parse(service_url).map_err(|e| CatalogError::Fetch {
        url: service_url.to_string(),
        reason: format!("invalid service URL: {}", e),
    })?;

    url.query_pairs_mut()
        .append_pair("SERVICE", "WMS")
        .append_pair("REQUEST", "GetCapabilities")
        .append_pair("VERSION", "1.3.0");

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_url() {
        let url = capabilities_url("https://worldwind43.arc.nasa.gov/wms").unwrap();
        assert_eq!(
            url.as_str(),
            "https://worldwind43.arc.nasa.gov/wms?SERVICE=WMS&REQUEST=GetCapabilities&VERSION=1.3.0"
        );
    }

    #[test]
    fn test_capabilities_url_keeps_existing_query() {
        let url = capabilities_url("https://maps.example.test/ows?map=volcano").unwrap();
        assert_eq!(
            url.query(),
            Some("map=volcano&SERVICE=WMS&REQUEST=GetCapabilities&VERSION=1.3.0")
        );
    }

    #[test]
    fn test_invalid_service_url() {
        assert!(matches!(
            capabilities_url("worldwind43/wms"),
            Err(CatalogError::Fetch { .. })
        ));
    }
}
