//! # atl1415-queue
//!
//! Builds the job queue for an ATL11 → ATL15 gridding run.
//!
//! A run is described by one or more defaults files (`--key=value` lines
//! shared by every job). From those and a region mask this crate works out
//! which tiles need processing for a given [`Step`], and writes one shell
//! command per tile for an external job runner:
//!
//! ```text
//! ATL11_to_ATL15.py --xy0 -1600000 400000 --centers @/data/rel001/south/AIS/input_args_AIS.txt ; ... ; echo COMPLETE
//! ```
//!
//! The stages are:
//! - [`Defaults`] merges the defaults files.
//! - [`RunConfig`] validates them and resolves the release directory tree.
//! - [`CenterSource`] yields candidate tile centers from a raster mask, a
//!   vector mask or an explicit coordinate list.
//! - [`QueuePlan`] expands centers into the step's offsets, filters and
//!   deduplicates them, and renders the queue lines.

pub mod centers;
pub mod cli;
pub mod config;
pub mod defaults;
mod error;
pub mod queue;
pub mod region;
pub mod step;

pub use centers::{CenterSource, CoordinateBounds, SeenCenters, TileCenter, TileSpacing};
pub use config::{Hemisphere, RunConfig};
pub use defaults::Defaults;
pub use error::QueueError;
pub use queue::{Disposition, ErrorMode, QueueOptions, QueuePlan, QueueSummary};
pub use region::RegionBounds;
pub use step::Step;

use std::path::PathBuf;
use tracing::info;

/// Result type for queue generation.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Generate the queue file described by `args`, returning its path.
pub fn run(args: &cli::Args) -> Result<PathBuf> {
    let region = args
        .region_file
        .as_deref()
        .map(RegionBounds::from_file)
        .transpose()?;

    let defaults = Defaults::from_files(&args.defaults_files)?;
    let config = RunConfig::from_defaults(defaults, args.tile_spacing.map(f64::from))?;

    let defaults_file = match config.write_merged_defaults()? {
        Some(path) => path,
        // clap guarantees at least one defaults file
        None => args.defaults_files.last().cloned().unwrap_or_default(),
    };
    config.ensure_step_dir(args.step)?;

    let source = match &args.xy_list_file {
        Some(path) => CenterSource::XyList { path: path.clone() },
        None => CenterSource::from_mask_file(&config.mask_file)?,
    };
    let mut centers = source.candidate_centers(config.tile_spacing)?;
    if let Some(region) = region {
        centers.retain(|&c| region.contains(c));
        info!("{} centers inside region bounds", centers.len());
    }

    let options = QueueOptions {
        step: args.step,
        spacing: config.tile_spacing,
        defaults_file,
        region_dir: config.region_dir.clone(),
        error_mode: args.error_mode(),
        replace: args.replace(),
        environment: args.environment.clone(),
        prior_edge_include: args.prior_edge_include,
        bounds: args.bounds(),
    };
    let plan = QueuePlan::build(&centers, &options);

    let queue_file = args.queue_file.clone().unwrap_or_else(|| {
        PathBuf::from(format!("1415_queue_{}_{}.txt", config.region, args.step))
    });
    plan.write(&queue_file)?;
    Ok(queue_file)
}
