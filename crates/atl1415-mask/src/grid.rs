//! Boolean mask grids and the resampling operations used for tile selection.

use crate::geotiff::check_increasing;
use crate::{MaskError, Result};

/// A boolean mask over a rectilinear grid of cell centers.
///
/// Cells are stored row-major with row 0 at the smallest y. Both axes are
/// strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGrid {
    x: Vec<f64>,
    y: Vec<f64>,
    cells: Vec<bool>,
}

impl MaskGrid {
    /// Create a mask grid, validating the axes and cell count.
    pub fn new(x: Vec<f64>, y: Vec<f64>, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != x.len() * y.len() {
            return Err(MaskError::ShapeMismatch {
                cells: cells.len(),
                width: x.len(),
                height: y.len(),
            });
        }
        check_increasing("x", &x)?;
        check_increasing("y", &y)?;
        Ok(Self { x, y, cells })
    }

    /// Create a mask grid from parts already validated by the caller.
    pub(crate) fn from_parts(x: Vec<f64>, y: Vec<f64>, cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), x.len() * y.len());
        Self { x, y, cells }
    }

    /// Cell-center x coordinates.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Cell-center y coordinates.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Dimensions as (width, height).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    /// Mask value at a column/row index.
    pub fn get(&self, col: usize, row: usize) -> Option<bool> {
        if col >= self.x.len() || row >= self.y.len() {
            return None;
        }
        Some(self.cells[row * self.x.len() + col])
    }

    /// Number of cells set in the mask.
    pub fn count_set(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Coordinates of every set cell, in row-major order.
    pub fn set_cells(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let width = self.x.len();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(idx, _)| (self.x[idx % width], self.y[idx / width]))
    }

    /// Extend the canvas by `n` empty cells on every side.
    ///
    /// New cells continue the spacing of the first two axis values; both axes
    /// therefore need at least two entries.
    pub fn pad(&self, n: usize) -> Result<Self> {
        let x = pad_axis("x", &self.x, n)?;
        let y = pad_axis("y", &self.y, n)?;

        let (width, height) = self.dimensions();
        let new_width = x.len();
        let mut cells = vec![false; new_width * y.len()];
        for row in 0..height {
            let src = &self.cells[row * width..(row + 1) * width];
            let start = (row + n) * new_width + n;
            cells[start..start + width].copy_from_slice(src);
        }

        Ok(Self { x, y, cells })
    }

    /// Dilate along x with a box kernel `size` cells wide.
    ///
    /// For even sizes a set cell spreads one cell further toward -x than +x.
    pub fn dilate_x(&mut self, size: usize) {
        if size <= 1 {
            return;
        }
        let width = self.x.len();
        for row in self.cells.chunks_mut(width) {
            let dilated = dilate_line(row, size);
            row.copy_from_slice(&dilated);
        }
    }

    /// Dilate along y with a box kernel `size` cells tall.
    pub fn dilate_y(&mut self, size: usize) {
        if size <= 1 {
            return;
        }
        let (width, height) = self.dimensions();
        let mut column = vec![false; height];
        for col in 0..width {
            for (row, value) in column.iter_mut().enumerate() {
                *value = self.cells[row * width + col];
            }
            for (row, value) in dilate_line(&column, size).into_iter().enumerate() {
                self.cells[row * width + col] = value;
            }
        }
    }

    /// Bilinear interpolation of the mask (as 0/1) at a map coordinate.
    ///
    /// Returns `None` outside the span of cell centers.
    pub fn interp(&self, x: f64, y: f64) -> Option<f64> {
        let (i0, i1, fx) = locate(&self.x, x)?;
        let (j0, j1, fy) = locate(&self.y, y)?;

        let value = |col: usize, row: usize| -> f64 {
            if self.cells[row * self.x.len() + col] {
                1.0
            } else {
                0.0
            }
        };

        Some(
            value(i0, j0) * (1.0 - fx) * (1.0 - fy)
                + value(i1, j0) * fx * (1.0 - fy)
                + value(i0, j1) * (1.0 - fx) * fy
                + value(i1, j1) * fx * fy,
        )
    }
}

fn pad_axis(name: &str, axis: &[f64], n: usize) -> Result<Vec<f64>> {
    if axis.len() < 2 {
        return Err(MaskError::InvalidAxis(format!(
            "{name} axis needs at least two values to pad"
        )));
    }
    let step = axis[1] - axis[0];
    let first = axis[0];
    let last = axis[axis.len() - 1];

    let mut padded = Vec::with_capacity(axis.len() + 2 * n);
    padded.extend((1..=n).rev().map(|k| first - k as f64 * step));
    padded.extend_from_slice(axis);
    padded.extend((1..=n).map(|k| last + k as f64 * step));
    Ok(padded)
}

/// Box dilation of one line. The window covers `(size-1)/2` cells before and
/// `size/2` cells after each position.
fn dilate_line(line: &[bool], size: usize) -> Vec<bool> {
    let before = (size - 1) / 2;
    let after = size / 2;

    let mut prefix = Vec::with_capacity(line.len() + 1);
    prefix.push(0usize);
    for &set in line {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + usize::from(set));
    }

    (0..line.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(line.len());
            prefix[hi] > prefix[lo]
        })
        .collect()
}

/// Find the bracketing indices and fractional offset of `v` on an axis.
fn locate(axis: &[f64], v: f64) -> Option<(usize, usize, f64)> {
    let last = axis.len().checked_sub(1)?;
    if v.is_nan() || v < axis[0] || v > axis[last] {
        return None;
    }
    if last == 0 {
        return Some((0, 0, 0.0));
    }
    let upper = axis.partition_point(|&a| a <= v).min(last);
    let lower = upper - 1;
    let frac = (v - axis[lower]) / (axis[upper] - axis[lower]);
    Some((lower, upper, frac))
}
