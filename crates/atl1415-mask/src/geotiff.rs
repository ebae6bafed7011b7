//! Single-band GeoTIFF rasters.

use crate::{MaskError, MaskGrid, Result};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

/// A single-band raster with cell-center coordinate axes.
///
/// Both axes are stored in increasing order. Row 0 of `values` corresponds to
/// `y[0]` (the southern edge for north-up images), which is the opposite of the
/// on-disk row order of a north-up GeoTIFF.
#[derive(Debug, Clone)]
pub struct GeoRaster {
    /// Cell-center x coordinates, increasing.
    x: Vec<f64>,
    /// Cell-center y coordinates, increasing.
    y: Vec<f64>,
    /// Sample values in row-major order, `y.len()` rows of `x.len()` columns.
    values: Vec<f32>,
}

impl GeoRaster {
    /// Load a raster from a GeoTIFF file.
    ///
    /// The georeferencing must be given by `ModelTiepoint` and
    /// `ModelPixelScale` tags; only the first band is read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut decoder = Decoder::new(file)?;

        // Continental 1 km masks run to tens of millions of cells
        let mut limits = Limits::default();
        limits.decoding_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.intermediate_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.ifd_value_size = 1024 * 1024 * 1024;
        decoder = decoder.with_limits(limits);

        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);

        let (x, y_top_down) = Self::read_axes(&mut decoder, path, width, height)?;
        let samples = Self::decode_samples(&mut decoder)?;

        if samples.len() != width * height {
            return Err(MaskError::UnsupportedLayout {
                expected: width * height,
                found: samples.len(),
            });
        }

        debug!(
            "Read {}x{} raster from {} (x {:.1}..{:.1}, y {:.1}..{:.1})",
            width,
            height,
            path.display(),
            x.first().copied().unwrap_or_default(),
            x.last().copied().unwrap_or_default(),
            y_top_down.last().copied().unwrap_or_default(),
            y_top_down.first().copied().unwrap_or_default(),
        );

        Self::from_rows(x, y_top_down, samples)
    }

    /// Build a raster from axes and row-major samples.
    ///
    /// The y axis may be given in either order; rows are flipped as needed so
    /// that the stored y axis increases.
    pub fn from_rows(x: Vec<f64>, y: Vec<f64>, values: Vec<f32>) -> Result<Self> {
        let (width, height) = (x.len(), y.len());
        if values.len() != width * height {
            return Err(MaskError::ShapeMismatch {
                cells: values.len(),
                width,
                height,
            });
        }
        check_increasing("x", &x)?;

        if height > 1 && y[0] > y[height - 1] {
            let mut y = y;
            y.reverse();
            check_increasing("y", &y)?;
            let mut flipped = Vec::with_capacity(values.len());
            for row in values.chunks(width).rev() {
                flipped.extend_from_slice(row);
            }
            return Ok(Self {
                x,
                y,
                values: flipped,
            });
        }

        check_increasing("y", &y)?;
        Ok(Self { x, y, values })
    }

    /// Compute cell-center axes from the GeoTIFF tie point and pixel scale.
    ///
    /// The y axis is returned in file row order (top row first).
    fn read_axes<R: std::io::Read + std::io::Seek>(
        decoder: &mut Decoder<R>,
        path: &Path,
        width: usize,
        height: usize,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let invalid = |reason: &str| MaskError::InvalidGeoTiff {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let tiepoint = decoder
            .get_tag_f64_vec(Tag::ModelTiepointTag)
            .map_err(|_| invalid("missing ModelTiepoint tag"))?;
        let scale = decoder
            .get_tag_f64_vec(Tag::ModelPixelScaleTag)
            .map_err(|_| invalid("missing ModelPixelScale tag"))?;

        if tiepoint.len() < 6 || scale.len() < 2 {
            return Err(invalid("truncated georeferencing tags"));
        }
        if scale[0] <= 0.0 || scale[1] == 0.0 {
            return Err(invalid("non-positive pixel scale"));
        }

        // Tiepoint format: [i, j, k, x, y, z], raster (i, j) maps to model (x, y)
        let (tie_i, tie_j) = (tiepoint[0], tiepoint[1]);
        let (tie_x, tie_y) = (tiepoint[3], tiepoint[4]);
        let (scale_x, scale_y) = (scale[0], scale[1]);

        let x = (0..width)
            .map(|col| tie_x + (col as f64 + 0.5 - tie_i) * scale_x)
            .collect();
        let y = (0..height)
            .map(|row| tie_y - (row as f64 + 0.5 - tie_j) * scale_y)
            .collect();

        Ok((x, y))
    }

    /// Decode the image samples as `f32`, whatever the stored sample type.
    fn decode_samples<R: std::io::Read + std::io::Seek>(
        decoder: &mut Decoder<R>,
    ) -> Result<Vec<f32>> {
        let result = decoder.read_image()?;

        match result {
            DecodingResult::F32(data) => Ok(data),
            DecodingResult::F64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::U64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
            DecodingResult::I64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        }
    }

    /// Threshold the raster into a boolean mask.
    pub fn mask_where<F>(&self, predicate: F) -> MaskGrid
    where
        F: Fn(f32) -> bool,
    {
        let cells = self.values.iter().map(|&v| predicate(v)).collect();
        MaskGrid::from_parts(self.x.clone(), self.y.clone(), cells)
    }

    /// Cell-center x coordinates.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Cell-center y coordinates.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Sample at a column/row index (row 0 is the smallest y).
    pub fn value(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.x.len() || row >= self.y.len() {
            return None;
        }
        Some(self.values[row * self.x.len() + col])
    }

    /// Dimensions as (width, height).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }
}

pub(crate) fn check_increasing(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(MaskError::InvalidAxis(format!("{name} axis is empty")));
    }
    if axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MaskError::InvalidAxis(format!(
            "{name} axis is not strictly increasing"
        )));
    }
    Ok(())
}
