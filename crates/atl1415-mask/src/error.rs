//! Error types for the mask crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or resampling mask grids.
#[derive(Debug, Error)]
pub enum MaskError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF decode error: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    /// Invalid GeoTIFF - missing or malformed georeferencing tags.
    #[error("Invalid GeoTIFF {path}: {reason}")]
    InvalidGeoTiff {
        /// File being read.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The decoded sample count does not match a single-band image.
    #[error("Unsupported raster layout: expected {expected} samples, found {found}")]
    UnsupportedLayout {
        /// Samples expected for a single-band image.
        expected: usize,
        /// Samples actually decoded.
        found: usize,
    },

    /// Cell array and axis lengths disagree.
    #[error("Grid shape mismatch: {cells} cells for a {width}x{height} grid")]
    ShapeMismatch {
        /// Number of cells supplied.
        cells: usize,
        /// Length of the x axis.
        width: usize,
        /// Length of the y axis.
        height: usize,
    },

    /// An axis is too short or not strictly increasing.
    #[error("Invalid grid axis: {0}")]
    InvalidAxis(String),
}
