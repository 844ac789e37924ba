//! Error types for land-compare.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading polygons or talking to the
/// calculation service.
#[derive(Debug, Error)]
pub enum Error {
    /// The calculation service answered with a non-2xx status.
    #[error("calculation service returned HTTP {status}")]
    HttpStatus {
        /// Status code of the response.
        status: u16,
    },

    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the JSON document we expected.
    #[error("malformed response body: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// I/O error reading an input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk failed.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// KML parse error.
    #[error("invalid KML in {path}: {reason}")]
    Kml {
        /// File being read.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// GPX parse error.
    #[error("invalid GPX in {path}: {reason}")]
    Gpx {
        /// File being read.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// GeoJSON parse error.
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The file extension is not one of kml, gpx, geojson, json.
    #[error("unsupported polygon file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The input contained no polygon at all.
    #[error("no polygon found in {0}")]
    NoPolygon(PathBuf),

    /// Projection setup or transform failed.
    #[error("projection error: {0}")]
    Projection(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the transport or of decoding the body, as opposed
    /// to a well-formed non-2xx answer.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::MalformedResponse(_))
    }
}

/// Result type for land-compare operations.
pub type Result<T> = std::result::Result<T, Error>;
