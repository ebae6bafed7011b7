//! # atl1415-mask
//!
//! Mask grids used to decide which ATL14/ATL15 tiles get processed.
//!
//! A mask arrives as a single-band GeoTIFF in a polar-stereographic
//! projection. This crate reads it into a [`GeoRaster`] (cell-center axes plus
//! sample values), thresholds it into a boolean [`MaskGrid`], and provides the
//! operations needed to turn a coarse mask into a set of tile centers:
//! padding the canvas, separable box dilation, and bilinear sampling at
//! arbitrary map coordinates.
//!
//! ## Example
//!
//! ```no_run
//! use atl1415_mask::GeoRaster;
//!
//! let raster = GeoRaster::from_file("masks/AIS_mask_1km.tif")?;
//! let mut mask = raster.mask_where(|v| v != 0.0);
//! mask = mask.pad(200)?;
//! mask.dilate_x(61);
//! mask.dilate_y(61);
//!
//! if let Some(v) = mask.interp(-1_600_000.0, 400_000.0) {
//!     println!("dilated mask value: {v:.2}");
//! }
//! # Ok::<(), atl1415_mask::MaskError>(())
//! ```

mod error;
mod geotiff;
mod grid;

pub use error::MaskError;
pub use geotiff::GeoRaster;
pub use grid::MaskGrid;

/// Result type for mask operations.
pub type Result<T> = std::result::Result<T, MaskError>;
