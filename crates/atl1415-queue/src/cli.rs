use crate::queue::DEFAULT_PRIOR_EDGE_INCLUDE;
use crate::Step;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "make-1415-queue")]
#[command(about = "Generate a list of commands to run ATL11_to_ATL15")]
#[command(version)]
#[command(allow_negative_numbers = true)]
pub struct Args {
    /// Processing step to queue
    #[arg(value_enum)]
    pub step: Step,

    /// Defaults files (key=value lines), merged in order
    #[arg(required = true, value_name = "DEFAULTS_FILE")]
    pub defaults_files: Vec<PathBuf>,

    /// Region file with XR = [min, max] and YR = [min, max] lines
    #[arg(long = "region_file", short = 'R', value_name = "FILE")]
    pub region_file: Option<PathBuf>,

    /// File of "x y" tile centers to use instead of the mask
    #[arg(long = "xy_list_file", value_name = "FILE")]
    pub xy_list_file: Option<PathBuf>,

    /// Do not queue error-calculation runs
    #[arg(long = "skip_errors", short = 's')]
    pub skip_errors: bool,

    /// Queue only error-calculation runs (implies --replace)
    #[arg(long = "errors_only")]
    pub errors_only: bool,

    /// Tile spacing in meters (default: from the defaults files)
    #[arg(long = "tile_spacing", value_name = "METERS")]
    pub tile_spacing: Option<u32>,

    /// Distance from prior edges included in matched runs
    #[arg(long = "prior_edge_include", value_name = "METERS", default_value_t = DEFAULT_PRIOR_EDGE_INCLUDE)]
    pub prior_edge_include: f64,

    /// Conda environment to activate before each job
    #[arg(long = "environment", short = 'e', value_name = "NAME")]
    pub environment: Option<String>,

    /// Skip tiles at or inside this distance from the origin
    #[arg(long = "min_R", value_name = "METERS")]
    pub min_r: Option<f64>,

    /// Skip tiles at or beyond this distance from the origin
    #[arg(long = "max_R", value_name = "METERS")]
    pub max_r: Option<f64>,

    /// Skip tiles whose x and y are both smaller than this in magnitude
    #[arg(long = "min_xy", value_name = "METERS")]
    pub min_xy: Option<f64>,

    /// Skip tiles with x or y larger than this in magnitude
    #[arg(long = "max_xy", value_name = "METERS")]
    pub max_xy: Option<f64>,

    /// Queue file to write (default: 1415_queue_<region>_<step>.txt)
    #[arg(long = "queue_file", short = 'q', value_name = "FILE")]
    pub queue_file: Option<PathBuf>,

    /// Queue tiles even if their output file exists
    #[arg(long = "replace")]
    pub replace: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Which solves each job runs.
    pub fn error_mode(&self) -> crate::ErrorMode {
        if self.skip_errors {
            crate::ErrorMode::Skip
        } else if self.errors_only {
            crate::ErrorMode::ErrorsOnly
        } else {
            crate::ErrorMode::WithErrors
        }
    }

    /// Errors-only runs always overwrite.
    pub fn replace(&self) -> bool {
        self.replace || self.errors_only
    }

    pub fn bounds(&self) -> crate::CoordinateBounds {
        crate::CoordinateBounds {
            min_r: self.min_r,
            max_r: self.max_r,
            min_xy: self.min_xy,
            max_xy: self.max_xy,
        }
    }
}
