//! Validated run configuration built from merged defaults.

use crate::defaults::Defaults;
use crate::{QueueError, Result, Step, TileSpacing};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Key holding the base directory that gets appended to the merged defaults.
pub const BASE_DIR_KEY: &str = "-b";

/// Hemisphere of the region, as named in the release directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// `1` means north; every other value means south.
    pub fn from_defaults_value(value: &str) -> Self {
        if value.trim() == "1" {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    /// Directory name under the release directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            Hemisphere::North => "north",
            Hemisphere::South => "south",
        }
    }
}

/// Everything queue generation needs from the defaults files.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Merged defaults, after mask and index paths have been resolved.
    pub defaults: Defaults,
    /// Region name (`--region`).
    pub region: String,
    pub hemisphere: Hemisphere,
    /// `<ATL14_root>/rel<Release>`
    pub release_dir: PathBuf,
    /// `<release_dir>/<hemisphere>`
    pub hemi_dir: PathBuf,
    /// Directory holding the per-step output directories.
    pub region_dir: PathBuf,
    /// Mask file, joined onto `--mask_dir` if one was given.
    pub mask_file: PathBuf,
    pub tile_spacing: TileSpacing,
}

impl RunConfig {
    /// Validate merged defaults and resolve derived paths.
    ///
    /// `tile_spacing` overrides `--tile_spacing` and `-W` from the defaults.
    pub fn from_defaults(mut defaults: Defaults, tile_spacing: Option<f64>) -> Result<Self> {
        let missing = defaults.missing_required();
        if !missing.is_empty() {
            return Err(QueueError::MissingDefaults(missing));
        }

        apply_mask_dir(&mut defaults);

        // Required keys are present past this point
        let required = |key: &str| defaults.get(key).unwrap_or_default().to_string();
        let atl14_root = PathBuf::from(required("--ATL14_root"));
        let region = required("--region");
        let hemisphere = Hemisphere::from_defaults_value(&required("--Hemisphere"));
        let mask_file = PathBuf::from(required("--mask_file"));

        let release_dir = atl14_root.join(format!("rel{}", required("--Release")));
        let hemi_dir = release_dir.join(hemisphere.dir_name());
        let region_dir = match defaults
            .get("--base_directory")
            .or_else(|| defaults.get(BASE_DIR_KEY))
        {
            Some(dir) => PathBuf::from(dir),
            None => hemi_dir.join(&region),
        };

        for dir in [&release_dir, &hemi_dir, &region_dir] {
            if !dir.is_dir() {
                return Err(QueueError::MissingDirectory(dir.clone()));
            }
        }

        resolve_atl11_index(&mut defaults, &atl14_root)?;

        let tile_spacing = resolve_tile_spacing(&defaults, tile_spacing)?;
        info!(
            "Region {} ({}), tile spacing {} m",
            region,
            hemisphere.dir_name(),
            tile_spacing.full()
        );

        Ok(Self {
            defaults,
            region,
            hemisphere,
            release_dir,
            hemi_dir,
            region_dir,
            mask_file,
            tile_spacing,
        })
    }

    /// Write `input_args_<region>.txt` into the region directory, with the
    /// region directory appended as `-b`.
    ///
    /// Returns `None` without writing anything when the defaults already carry
    /// a `-b` entry; callers then reference the input defaults file directly.
    pub fn write_merged_defaults(&self) -> Result<Option<PathBuf>> {
        if self.defaults.contains_key(BASE_DIR_KEY) {
            return Ok(None);
        }
        let path = self.merged_defaults_path();
        let mut merged = self.defaults.clone();
        merged.insert(BASE_DIR_KEY, self.region_dir.display().to_string());
        merged.write_file(&path)?;
        info!("Wrote merged defaults to {}", path.display());
        Ok(Some(path))
    }

    /// Location of the merged defaults file.
    pub fn merged_defaults_path(&self) -> PathBuf {
        self.region_dir.join(format!("input_args_{}.txt", self.region))
    }

    /// Output directory for a step.
    pub fn step_dir(&self, step: Step) -> PathBuf {
        self.region_dir.join(step.as_str())
    }

    /// Create the output directory for a step if it does not exist.
    pub fn ensure_step_dir(&self, step: Step) -> Result<PathBuf> {
        let dir = self.step_dir(step);
        if !dir.is_dir() {
            std::fs::create_dir(&dir).map_err(|e| QueueError::file(&dir, e))?;
            info!("Created {}", dir.display());
        }
        Ok(dir)
    }
}

/// Join `--mask_file` (and a relative `--tide_mask_file`) onto `--mask_dir`,
/// then drop `--mask_dir`.
fn apply_mask_dir(defaults: &mut Defaults) {
    let Some(mask_dir) = defaults.remove("--mask_dir") else {
        return;
    };
    let mask_dir = Path::new(&mask_dir);

    if let Some(mask_file) = defaults.get("--mask_file") {
        let joined = mask_dir.join(mask_file);
        defaults.insert("--mask_file", joined.display().to_string());
    }
    if let Some(tide) = defaults.get("--tide_mask_file") {
        if !Path::new(tide).is_file() {
            let joined = mask_dir.join(tide);
            defaults.insert("--tide_mask_file", joined.display().to_string());
        }
    }
}

/// Accept `--ATL11_index` as given if it exists, otherwise look for it under
/// the ATL14 root and record the resolved path.
fn resolve_atl11_index(defaults: &mut Defaults, atl14_root: &Path) -> Result<()> {
    let Some(index) = defaults.get("--ATL11_index") else {
        warn!("no --ATL11_index in defaults files");
        return Ok(());
    };
    let original = PathBuf::from(index);
    if original.is_file() {
        return Ok(());
    }

    let rooted = atl14_root.join(&original);
    if !rooted.is_file() {
        return Err(QueueError::MissingAtl11Index { rooted, original });
    }
    defaults.insert("--ATL11_index", rooted.display().to_string());
    Ok(())
}

fn resolve_tile_spacing(defaults: &Defaults, cli: Option<f64>) -> Result<TileSpacing> {
    let width = match cli {
        Some(width) => width,
        None => {
            let raw = defaults
                .get("--tile_spacing")
                .or_else(|| defaults.get("-W"))
                .ok_or(QueueError::MissingTileSpacing)?;
            raw.parse()
                .map_err(|_| QueueError::InvalidTileSpacing(raw.to_string()))?
        }
    };
    TileSpacing::new(width)
}
