//! Queue file assembly.
//!
//! Every candidate point ends in exactly one [`Disposition`]: dropped by the
//! coordinate bounds, dropped as a duplicate, skipped because its output
//! already exists, skipped because its prelim input is missing, or emitted as
//! one queue line.

use crate::{CoordinateBounds, QueueError, Result, SeenCenters, Step, TileCenter, TileSpacing};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Program each queue line invokes.
pub const PROGRAM: &str = "ATL11_to_ATL15.py";

/// Flag that switches the program to error propagation.
pub const CALC_ERROR_FLAG: &str = "--calc_error_for_xy";

/// Marker echoed after each job so the runner can spot finished lines.
pub const COMPLETION_MARKER: &str = "echo COMPLETE";

/// Default distance, in meters, that matched tiles include from prior edges.
pub const DEFAULT_PRIOR_EDGE_INCLUDE: f64 = 1000.0;

/// Which solves each non-matched job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Main solve followed by an error-calculation solve.
    WithErrors,
    /// Error calculation only.
    ErrorsOnly,
    /// Main solve only.
    Skip,
}

/// Settings shared by every job in a queue.
#[derive(Debug, Clone)]
pub struct QueueOptions {
    pub step: Step,
    pub spacing: TileSpacing,
    /// Defaults file passed to every job with `@`.
    pub defaults_file: PathBuf,
    /// Region directory, parent of the per-step directories.
    pub region_dir: PathBuf,
    pub error_mode: ErrorMode,
    /// Queue jobs even if their output file exists.
    pub replace: bool,
    /// Conda environment activated before each job.
    pub environment: Option<String>,
    pub prior_edge_include: f64,
    pub bounds: CoordinateBounds,
}

/// Outcome for one candidate point.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Emitted(String),
    OutOfBounds,
    Duplicate,
    OutputExists(PathBuf),
    MissingPrelim(PathBuf),
}

/// Counts of each disposition in a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub candidates: usize,
    pub emitted: usize,
    pub out_of_bounds: usize,
    pub duplicates: usize,
    pub output_exists: usize,
    pub missing_prelim: usize,
}

/// Queue lines for one run, in emission order.
#[derive(Debug, Clone, Default)]
pub struct QueuePlan {
    pub lines: Vec<String>,
    pub summary: QueueSummary,
}

impl QueuePlan {
    /// Expand each center for the step and decide every resulting point.
    pub fn build(centers: &[TileCenter], options: &QueueOptions) -> Self {
        let mut plan = QueuePlan::default();
        let mut seen = SeenCenters::new();

        for &center in centers {
            for point in options.step.expand(center, options.spacing) {
                plan.summary.candidates += 1;
                match decide(point, options, &mut seen) {
                    Disposition::Emitted(line) => {
                        plan.summary.emitted += 1;
                        plan.lines.push(line);
                    }
                    Disposition::OutOfBounds => plan.summary.out_of_bounds += 1,
                    Disposition::Duplicate => plan.summary.duplicates += 1,
                    Disposition::OutputExists(_) => plan.summary.output_exists += 1,
                    Disposition::MissingPrelim(prelim) => {
                        warn!("missing prelim file {}", prelim.display());
                        plan.summary.missing_prelim += 1;
                    }
                }
            }
        }

        let s = &plan.summary;
        info!(
            "{} candidates: {} queued, {} out of bounds, {} duplicate, {} already done, {} missing prelim",
            s.candidates, s.emitted, s.out_of_bounds, s.duplicates, s.output_exists, s.missing_prelim
        );
        plan
    }

    /// Write the queue file, one line per job.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| QueueError::file(path, e))?;
        let mut out = std::io::BufWriter::new(file);
        for line in &self.lines {
            writeln!(out, "{line}").map_err(|e| QueueError::file(path, e))?;
        }
        out.flush().map_err(|e| QueueError::file(path, e))?;
        Ok(())
    }
}

/// Decide what happens to one point.
///
/// Points that pass the bounds are recorded as seen before the output checks,
/// so a point skipped for an existing output still blocks later duplicates.
pub fn decide(point: TileCenter, options: &QueueOptions, seen: &mut SeenCenters) -> Disposition {
    if !options.bounds.admits(point) {
        return Disposition::OutOfBounds;
    }
    if !seen.insert(point) {
        return Disposition::Duplicate;
    }

    let command = if options.step == Step::Matched {
        let prelim = options
            .region_dir
            .join(Step::Prelim.as_str())
            .join(point.file_name());
        if !prelim.is_file() {
            return Disposition::MissingPrelim(prelim);
        }
        let matched = options
            .region_dir
            .join(Step::Matched.as_str())
            .join(point.file_name());
        matched_command(&prelim, &matched, options)
    } else {
        let out_file = options
            .region_dir
            .join(options.step.as_str())
            .join(point.file_name());
        if out_file.is_file() && !options.replace {
            return Disposition::OutputExists(out_file);
        }
        tile_command(point, options)
    };

    let command = match &options.environment {
        Some(env) => format!("source activate {env}; {command}"),
        None => command,
    };
    Disposition::Emitted(format!("{command}; {COMPLETION_MARKER}"))
}

/// Command for a centers/edges/corners/prelim job.
fn tile_command(point: TileCenter, options: &QueueOptions) -> String {
    let base = format!(
        "{PROGRAM} --xy0 {} {} --{} @{} ",
        point.x.trunc() as i64,
        point.y.trunc() as i64,
        options.step,
        options.defaults_file.display()
    );
    match options.error_mode {
        ErrorMode::WithErrors => format!("{base}; {base} {CALC_ERROR_FLAG}"),
        ErrorMode::ErrorsOnly => format!("{base}{CALC_ERROR_FLAG}"),
        ErrorMode::Skip => base,
    }
}

/// Command for a matched job reading a prelim tile.
fn matched_command(prelim: &Path, matched: &Path, options: &QueueOptions) -> String {
    format!(
        "{PROGRAM} --matched --data_file {} --out_name {} --prior_edge_include {} @{}",
        prelim.display(),
        matched.display(),
        float_text(options.prior_edge_include),
        options.defaults_file.display()
    )
}

/// Shortest round-trip text for a float: plain decimal with at least one
/// fractional digit for exponents in `-4..16`, otherwise scientific with a
/// signed, two-digit-minimum exponent (`1e+16`, `1.5e-05`).
fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{value:e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if (-4..16).contains(&exp) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}
