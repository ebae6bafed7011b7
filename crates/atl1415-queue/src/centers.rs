//! Tile-center candidates and the filters applied to them.
//!
//! Candidates come from one of three sources:
//! - a raster mask, via its 1 km companion GeoTIFF which is padded, dilated by
//!   1.5 tile widths and sampled on the half-spacing grid
//! - a vector mask, via a precomputed 40 km GeoTIFF of the same name
//! - an explicit list of `x y` pairs

use crate::{QueueError, Result};
use atl1415_mask::GeoRaster;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Number of empty 1 km cells added around a raster mask before dilation.
pub const MASK_PAD_CELLS: usize = 200;

/// Cell size of the coarse raster the dilation kernel is sized for.
pub const COARSE_CELL_M: f64 = 1000.0;

/// Maximum distance from 1 of the interpolated mask for a center to count.
pub const MASK_TOLERANCE: f64 = 0.1;

/// A point on the tile grid, in projected meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCenter {
    pub x: f64,
    pub y: f64,
}

impl TileCenter {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Exact-match key for deduplication. `-0.0` and `0.0` share a key.
    pub fn key(self) -> (u64, u64) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }

    /// Distance from the projection origin.
    pub fn radius(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Larger of the two absolute coordinates.
    pub fn max_abs(self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    /// Output file name, `E<km>_N<km>.h5`, with kilometers truncated toward zero.
    pub fn file_name(self) -> String {
        format!(
            "E{}_N{}.h5",
            (self.x / 1000.0).trunc() as i64,
            (self.y / 1000.0).trunc() as i64
        )
    }
}

/// Tile width and the half-width used for offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpacing {
    full: f64,
}

impl TileSpacing {
    /// Create a spacing; the width must be finite and positive.
    pub fn new(full: f64) -> Result<Self> {
        if !full.is_finite() || full <= 0.0 {
            return Err(QueueError::InvalidTileSpacing(full.to_string()));
        }
        Ok(Self { full })
    }

    /// Tile width in meters.
    pub fn full(self) -> f64 {
        self.full
    }

    /// Half the tile width in meters.
    pub fn half(self) -> f64 {
        self.full / 2.0
    }
}

/// Radial and absolute-coordinate limits on queued points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordinateBounds {
    /// Points at or inside this radius are dropped.
    pub min_r: Option<f64>,
    /// Points at or outside this radius are dropped.
    pub max_r: Option<f64>,
    /// Points whose larger absolute coordinate is below this are dropped.
    pub min_xy: Option<f64>,
    /// Points with either absolute coordinate above this are dropped.
    pub max_xy: Option<f64>,
}

impl CoordinateBounds {
    /// True if the point passes every active bound.
    pub fn admits(&self, point: TileCenter) -> bool {
        let r = point.radius();
        if self.min_r.is_some_and(|min_r| r <= min_r) {
            return false;
        }
        if self.max_r.is_some_and(|max_r| r >= max_r) {
            return false;
        }
        if self.min_xy.is_some_and(|min_xy| point.max_abs() < min_xy) {
            return false;
        }
        if self.max_xy.is_some_and(|max_xy| point.max_abs() > max_xy) {
            return false;
        }
        true
    }
}

/// Set of points already queued in this run.
#[derive(Debug, Default)]
pub struct SeenCenters {
    keys: HashSet<(u64, u64)>,
}

impl SeenCenters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a point; returns false if it was already present.
    pub fn insert(&mut self, point: TileCenter) -> bool {
        self.keys.insert(point.key())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Where candidate tile centers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CenterSource {
    /// Raster mask, sampled through its 1 km companion GeoTIFF.
    RasterMask { coarse_grid: PathBuf },
    /// Vector mask, read through its precomputed 40 km GeoTIFF.
    VectorMask { gridded_mask: PathBuf },
    /// Explicit list of `x y` pairs, one per line.
    XyList { path: PathBuf },
}

impl CenterSource {
    /// Pick the source for a mask file by its extension.
    pub fn from_mask_file(mask_file: &Path) -> Result<Self> {
        let ext = mask_file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext {
            "tif" | "h5" => Ok(CenterSource::RasterMask {
                coarse_grid: coarse_grid_path(mask_file),
            }),
            "shp" | "db" => {
                let base = mask_file.with_extension("");
                let mut gridded = base.into_os_string();
                gridded.push("_40km.tif");
                Ok(CenterSource::VectorMask {
                    gridded_mask: PathBuf::from(gridded),
                })
            }
            _ => Err(QueueError::UnsupportedMask(mask_file.to_path_buf())),
        }
    }

    /// Produce candidate tile centers.
    pub fn candidate_centers(&self, spacing: TileSpacing) -> Result<Vec<TileCenter>> {
        let centers = match self {
            CenterSource::RasterMask { coarse_grid } => raster_centers(coarse_grid, spacing)?,
            CenterSource::VectorMask { gridded_mask } => vector_centers(gridded_mask)?,
            CenterSource::XyList { path } => {
                info!("reading xy_list_file : {}", path.display());
                read_xy_list(path)?
            }
        };
        info!("{} candidate tile centers", centers.len());
        Ok(centers)
    }
}

/// Path of the 1 km GeoTIFF that accompanies a raster mask.
///
/// `*_100m.h5`, `*_240m.h5` and `*_full.h5` map to `*_1km.tif`; any other name
/// has `100m` or `125m` replaced by `1km`.
pub fn coarse_grid_path(mask_file: &Path) -> PathBuf {
    let name = mask_file.to_string_lossy();
    let is_h5 = mask_file.extension().is_some_and(|e| e == "h5");
    let base = mask_file.with_extension("");
    let base = base.to_string_lossy();

    let coarse = if is_h5 && base.contains("_100m") {
        name.replace("_100m.h5", "_1km.tif")
    } else if is_h5 && base.contains("_240m") {
        name.replace("_240m.h5", "_1km.tif")
    } else if base.contains("_full") {
        name.replace("_full.h5", "_1km.tif")
    } else {
        name.replace("100m", "1km").replace("125m", "1km")
    };
    PathBuf::from(coarse)
}

fn raster_centers(coarse_grid: &Path, spacing: TileSpacing) -> Result<Vec<TileCenter>> {
    info!("Reading coarse mask {}", coarse_grid.display());
    let raster = GeoRaster::from_file(coarse_grid)?;

    let mut mask = raster.mask_where(|v| v != 0.0).pad(MASK_PAD_CELLS)?;
    let kernel = (3.0 * spacing.half() / COARSE_CELL_M) as usize + 1;
    debug!("Dilating {}x{} mask by {} cells", mask.x().len(), mask.y().len(), kernel);
    mask.dilate_x(kernel);
    mask.dilate_y(kernel);

    let half = spacing.half();
    let full = spacing.full();
    let xs = snap_axis(mask.x(), half);
    let ys = snap_axis(mask.y(), half);

    let on_tile_grid = |v: f64| v.rem_euclid(full) == 0.0;
    let mut centers = Vec::new();
    for &y in &ys {
        if !on_tile_grid(y) {
            continue;
        }
        for &x in &xs {
            if !on_tile_grid(x) {
                continue;
            }
            let inside = mask
                .interp(x, y)
                .is_some_and(|v| (v - 1.0).abs() < MASK_TOLERANCE);
            if inside {
                centers.push(TileCenter::new(x, y));
            }
        }
    }
    Ok(centers)
}

/// Round axis values to the nearest multiple of `step` and deduplicate.
fn snap_axis(axis: &[f64], step: f64) -> Vec<f64> {
    let mut snapped: Vec<f64> = axis
        .iter()
        .map(|v| (v / step).round_ties_even() * step + 0.0)
        .collect();
    snapped.sort_by(f64::total_cmp);
    snapped.dedup();
    snapped
}

fn vector_centers(gridded_mask: &Path) -> Result<Vec<TileCenter>> {
    if !gridded_mask.is_file() {
        return Err(QueueError::MissingGriddedMask(gridded_mask.to_path_buf()));
    }
    info!("Reading gridded mask {}", gridded_mask.display());
    let mask = GeoRaster::from_file(gridded_mask)?.mask_where(|v| v == 1.0);
    Ok(mask
        .set_cells()
        .map(|(x, y)| TileCenter::new(x, y))
        .collect())
}

/// Read whitespace-separated coordinate pairs. Lines that are not exactly two
/// numbers are logged and skipped.
pub fn read_xy_list(path: &Path) -> Result<Vec<TileCenter>> {
    let text = std::fs::read_to_string(path).map_err(|e| QueueError::file(path, e))?;
    Ok(parse_xy_list(&text))
}

pub fn parse_xy_list(text: &str) -> Vec<TileCenter> {
    text.lines()
        .filter_map(|line| {
            let center = parse_xy_line(line);
            if center.is_none() {
                warn!("could not parse:\n{}", line);
            }
            center
        })
        .collect()
}

fn parse_xy_line(line: &str) -> Option<TileCenter> {
    let mut fields = line.split_whitespace();
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(TileCenter::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_truncates_toward_zero() {
        assert_eq!(TileCenter::new(-20_500.0, 40_999.0).file_name(), "E-20_N40.h5");
        assert_eq!(TileCenter::new(-500.0, 0.0).file_name(), "E0_N0.h5");
    }

    #[test]
    fn test_key_merges_signed_zero() {
        assert_eq!(TileCenter::new(-0.0, 5.0).key(), TileCenter::new(0.0, 5.0).key());
        assert_ne!(TileCenter::new(1.0, 5.0).key(), TileCenter::new(5.0, 1.0).key());
    }

    #[test]
    fn test_seen_centers_rejects_repeats() {
        let mut seen = SeenCenters::new();
        assert!(seen.insert(TileCenter::new(1.0, 2.0)));
        assert!(!seen.insert(TileCenter::new(1.0, 2.0)));
        assert!(seen.insert(TileCenter::new(2.0, 1.0)));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_tile_spacing_must_be_positive() {
        assert!(TileSpacing::new(0.0).is_err());
        assert!(TileSpacing::new(f64::NAN).is_err());
        assert_eq!(TileSpacing::new(40_000.0).unwrap().half(), 20_000.0);
    }

    #[test]
    fn test_bounds_radius() {
        let bounds = CoordinateBounds {
            min_r: Some(5.0),
            max_r: Some(10.0),
            ..Default::default()
        };

        assert!(!bounds.admits(TileCenter::new(3.0, 4.0)));
        assert!(bounds.admits(TileCenter::new(6.0, 0.0)));
        assert!(!bounds.admits(TileCenter::new(6.0, 8.0)));
    }

    #[test]
    fn test_bounds_absolute_xy() {
        let bounds = CoordinateBounds {
            min_xy: Some(10.0),
            max_xy: Some(20.0),
            ..Default::default()
        };

        assert!(!bounds.admits(TileCenter::new(5.0, -5.0)));
        assert!(bounds.admits(TileCenter::new(5.0, -10.0)));
        assert!(bounds.admits(TileCenter::new(20.0, 0.0)));
        assert!(!bounds.admits(TileCenter::new(0.0, -21.0)));
    }

    #[test]
    fn test_inactive_bounds_admit_everything() {
        assert!(CoordinateBounds::default().admits(TileCenter::new(1e9, -1e9)));
    }

    #[test]
    fn test_coarse_grid_path_variants() {
        let cases = [
            ("/m/AIS_mask_100m.h5", "/m/AIS_mask_1km.tif"),
            ("/m/GL_mask_240m.h5", "/m/GL_mask_1km.tif"),
            ("/m/AIS_full.h5", "/m/AIS_1km.tif"),
            ("/m/AIS_125m.tif", "/m/AIS_1km.tif"),
            ("/m/AIS_100m_v2.tif", "/m/AIS_1km_v2.tif"),
            ("/m/AIS_1km.tif", "/m/AIS_1km.tif"),
        ];
        for (mask, coarse) in cases {
            assert_eq!(coarse_grid_path(Path::new(mask)), PathBuf::from(coarse), "{mask}");
        }
    }

    #[test]
    fn test_source_from_extension() {
        assert_eq!(
            CenterSource::from_mask_file(Path::new("/m/AIS_coast.shp")).unwrap(),
            CenterSource::VectorMask {
                gridded_mask: PathBuf::from("/m/AIS_coast_40km.tif")
            }
        );
        assert!(matches!(
            CenterSource::from_mask_file(Path::new("/m/AIS_100m.h5")).unwrap(),
            CenterSource::RasterMask { .. }
        ));
        assert!(matches!(
            CenterSource::from_mask_file(Path::new("/m/AIS.nc")),
            Err(QueueError::UnsupportedMask(_))
        ));
    }

    #[test]
    fn test_missing_gridded_mask() {
        let source = CenterSource::VectorMask {
            gridded_mask: PathBuf::from("/nonexistent/AIS_40km.tif"),
        };
        let err = source
            .candidate_centers(TileSpacing::new(40_000.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, QueueError::MissingGriddedMask(_)));
    }

    #[test]
    fn test_parse_xy_list_skips_bad_lines() {
        let centers = parse_xy_list("0 0\n40000 -80000.5\nbad line\n1 2 3\n\n  -1e5\t2e5  \n");
        assert_eq!(
            centers,
            vec![
                TileCenter::new(0.0, 0.0),
                TileCenter::new(40_000.0, -80_000.5),
                TileCenter::new(-100_000.0, 200_000.0),
            ]
        );
    }

    #[test]
    fn test_snap_axis_dedups() {
        let axis = [-1500.0, -500.0, 500.0, 1500.0, 9500.0, 10500.0];
        assert_eq!(snap_axis(&axis, 10_000.0), vec![0.0, 10_000.0]);
    }
}
