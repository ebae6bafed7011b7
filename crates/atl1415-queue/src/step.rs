//! Processing steps and the tile-grid offsets each one visits.

use crate::{TileCenter, TileSpacing};
use clap::ValueEnum;
use std::fmt;

/// Offsets for steps that run once per tile center.
const CENTER_OFFSETS: [(f64, f64); 1] = [(0.0, 0.0)];

/// Axis-aligned offsets, in half-spacing units, to the four tile edges.
const EDGE_OFFSETS: [(f64, f64); 4] = [(-1.0, 0.0), (0.0, -1.0), (0.0, 1.0), (1.0, 0.0)];

/// Diagonal offsets, in half-spacing units, to the four tile corners.
const CORNER_OFFSETS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];

/// Processing stage of an ATL15 run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Step {
    /// Solve on each tile center.
    Centers,
    /// Solve on tile edges, stitching neighboring centers.
    Edges,
    /// Solve on tile corners.
    Corners,
    /// First pass of the two-pass solution.
    Prelim,
    /// Second pass, re-solving prelim tiles with matched edges.
    Matched,
}

impl Step {
    /// Name used for directories and the `--<step>` flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Centers => "centers",
            Step::Edges => "edges",
            Step::Corners => "corners",
            Step::Prelim => "prelim",
            Step::Matched => "matched",
        }
    }

    /// Offsets from a tile center, in units of half the tile spacing.
    pub fn offsets(self) -> &'static [(f64, f64)] {
        match self {
            Step::Centers | Step::Prelim | Step::Matched => &CENTER_OFFSETS,
            Step::Edges => &EDGE_OFFSETS,
            Step::Corners => &CORNER_OFFSETS,
        }
    }

    /// Points this step visits around one tile center.
    pub fn expand(self, center: TileCenter, spacing: TileSpacing) -> impl Iterator<Item = TileCenter> {
        let half = spacing.half();
        self.offsets()
            .iter()
            .map(move |&(dx, dy)| TileCenter::new(center.x + dx * half, center.y + dy * half))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
