//! Carrier-header parsing for reverse-proxy sub-requests.
//!
//! A reverse proxy guarding segment files asks the gateway whether to serve a
//! request by issuing a sub-request that carries the original request in two
//! headers: one with the original path and query (e.g. nginx `$request_uri`)
//! and one with supplementary query parameters (e.g. nginx `$args`). The
//! supplementary parameters override the original ones on key collision.

use std::collections::HashMap;

use http::{HeaderMap, HeaderName};

use crate::config::ConfigError;

/// Names of the headers carrying the original request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierHeaders {
    /// Header carrying the original path and query.
    pub original_uri: HeaderName,
    /// Header carrying supplementary query parameters.
    pub original_args: HeaderName,
}

impl Default for CarrierHeaders {
    fn default() -> Self {
        Self {
            original_uri: HeaderName::from_static("x-original-uri"),
            original_args: HeaderName::from_static("x-original-args"),
        }
    }
}

impl CarrierHeaders {
    /// Build carrier headers from configured names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] if either name is not a valid
    /// HTTP header name.
    pub fn new(original_uri: &str, original_args: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            original_uri: parse_header_name("original_uri_header", original_uri)?,
            original_args: parse_header_name("original_args_header", original_args)?,
        })
    }

    /// Read both carriers from `headers` and merge them.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> CarrierParams {
        let value = |name: &HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
        merge_carrier_params(value(&self.original_uri), value(&self.original_args))
    }
}

/// The original request reconstructed from the carrier headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierParams {
    /// The original request path, if one was carried.
    pub path: Option<String>,
    /// Merged query parameters. Empty values are dropped.
    pub params: HashMap<String, String>,
}

impl CarrierParams {
    /// Look up a merged query parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Merge the two carriers into one parameter map.
///
/// `original_uri` may be a path with query (`/hls/seg0.ts?expiry=1&sig=ab`) or
/// an absolute URL. `supplementary` is a bare query string whose parameters
/// replace those from `original_uri` with the same key. Within one carrier the
/// first occurrence of a key wins.
///
/// # Examples
///
/// ```
/// use streamgate_core::subrequest::merge_carrier_params;
///
/// let merged = merge_carrier_params(
///     Some("/hls/streamkey/seg0.ts?expiry=1&sig=old"),
///     Some("sig=new"),
/// );
/// assert_eq!(merged.path.as_deref(), Some("/hls/streamkey/seg0.ts"));
/// assert_eq!(merged.get("expiry"), Some("1"));
/// assert_eq!(merged.get("sig"), Some("new"));
/// ```
#[must_use]
pub fn merge_carrier_params(original_uri: Option<&str>, supplementary: Option<&str>) -> CarrierParams {
    let mut merged = CarrierParams::default();

    if let Some(uri) = original_uri {
        let (path, query) = split_uri(uri.trim());
        merged.path = (!path.is_empty()).then(|| path.to_owned());
        merged.params = parse_query(query);
    }

    if let Some(args) = supplementary {
        merged.params.extend(parse_query(args.trim()));
    }

    merged
}

/// Split a carried URI into its path and query, dropping any scheme,
/// authority and fragment.
pub(crate) fn split_uri(uri: &str) -> (&str, &str) {
    let uri = uri.split_once('#').map_or(uri, |(before, _)| before);
    let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => path,
    };
    (path, query)
}

fn parse_query(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if !value.is_empty() {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}

fn parse_header_name(setting: &'static str, name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ConfigError::InvalidHeaderName {
        setting,
        name: name.to_owned(),
    })
}
