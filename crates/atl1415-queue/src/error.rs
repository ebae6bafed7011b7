//! Error types for queue generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort queue generation.
#[derive(Debug, Error)]
pub enum QueueError {
    /// I/O error tied to a specific file.
    #[error("cannot access {path}: {source}")]
    File {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Mask loading or resampling failed.
    #[error("mask error: {0}")]
    Mask(#[from] atl1415_mask::MaskError),

    /// One or more required keys are absent from the merged defaults.
    #[error("required key(s) not in defaults files: {}", .0.join(", "))]
    MissingDefaults(Vec<String>),

    /// An expected directory does not exist.
    #[error("missing directory: {0}")]
    MissingDirectory(PathBuf),

    /// The ATL11 index was found neither as given nor under the ATL14 root.
    #[error("could not find ATL11 index in {rooted} or {original}")]
    MissingAtl11Index {
        /// Index path joined onto the ATL14 root.
        rooted: PathBuf,
        /// Index path as written in the defaults.
        original: PathBuf,
    },

    /// A vector mask has no precomputed 40 km raster next to it.
    #[error("gridded mask file {0} not found")]
    MissingGriddedMask(PathBuf),

    /// The mask file extension is not one of tif, h5, shp or db.
    #[error("unsupported mask file type: {0}")]
    UnsupportedMask(PathBuf),

    /// No tile spacing on the command line or in the defaults.
    #[error("no tile spacing given: pass --tile_spacing or set --tile_spacing or -W in the defaults")]
    MissingTileSpacing,

    /// Tile spacing could not be parsed or is not positive.
    #[error("invalid tile spacing: {0}")]
    InvalidTileSpacing(String),

    /// A region file line could not be parsed.
    #[error("malformed region file {path}, line {line}: {text}")]
    MalformedRegion {
        /// Region file path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Offending line.
        text: String,
    },

    /// A region file lacks the XR or YR range.
    #[error("region file {path} has no {key} range")]
    IncompleteRegion {
        /// Region file path.
        path: PathBuf,
        /// Missing key.
        key: &'static str,
    },
}

impl QueueError {
    /// Attach a path to an I/O error.
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QueueError::File {
            path: path.into(),
            source,
        }
    }
}
