//! Shared fixtures: a release directory tree with a 1 km GeoTIFF mask.

#![allow(dead_code)]

use atl1415_queue::cli::Args;
use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Write a north-up 8-bit GeoTIFF. `rows` is given top (north) row first.
pub fn write_geotiff(path: &Path, x0: f64, y_top: f64, cell: f64, width: u32, rows: &[Vec<u8>]) {
    let height = rows.len() as u32;
    let data: Vec<u8> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    assert_eq!(data.len(), (width * height) as usize);

    let file = std::fs::File::create(path).expect("create tif");
    let mut encoder = TiffEncoder::new(file).expect("encoder");
    let mut image = encoder
        .new_image::<colortype::Gray8>(width, height)
        .expect("image");
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[cell, cell, 0.0][..])
        .expect("scale tag");
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, x0, y_top, 0.0][..])
        .expect("tiepoint tag");
    image.write_data(&data).expect("write data");
}

/// ATL14 root with `rel001/south/AIS`, a mask directory and an ATL11 index.
pub struct Fixture {
    pub dir: TempDir,
    pub root: PathBuf,
    pub region_dir: PathBuf,
    pub defaults_file: PathBuf,
}

impl Fixture {
    /// Build the tree. The 1 km mask covers a 100 km square centered on the
    /// origin, so a 40 km tile grid selects the nine centers at -40, 0, 40 km.
    pub fn new() -> Self {
        Self::with_defaults("")
    }

    /// Build the tree, appending `extra` lines to the defaults file.
    pub fn with_defaults(extra: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("ATL14");
        let region_dir = root.join("rel001").join("south").join("AIS");
        let mask_dir = root.join("masks");
        std::fs::create_dir_all(&region_dir).expect("region dir");
        std::fs::create_dir_all(&mask_dir).expect("mask dir");
        std::fs::write(root.join("ATL11_index.h5"), b"").expect("index");

        let rows = vec![vec![1u8; 100]; 100];
        write_geotiff(
            &mask_dir.join("AIS_mask_1km.tif"),
            -50_000.0,
            50_000.0,
            1000.0,
            100,
            &rows,
        );

        let defaults_file = dir.path().join("defaults_AIS.txt");
        let text = format!(
            "--ATL14_root={}\n--region=AIS\n--Release=001\n--Hemisphere=-1\n--mask_dir={}\n--mask_file=AIS_mask_100m.h5\n--ATL11_index=ATL11_index.h5\n-W=40000\n{}",
            root.display(),
            mask_dir.display(),
            extra
        );
        std::fs::write(&defaults_file, text).expect("defaults");

        Self {
            dir,
            root,
            region_dir,
            defaults_file,
        }
    }

    /// Path for a queue file inside the fixture.
    pub fn queue_path(&self) -> PathBuf {
        self.dir.path().join("queue.txt")
    }

    /// Merged defaults file the run writes into the region directory.
    pub fn merged_defaults(&self) -> PathBuf {
        self.region_dir.join("input_args_AIS.txt")
    }

    /// Parse arguments for `step`, this fixture's defaults and queue file, plus `extra`.
    pub fn args(&self, step: &str, extra: &[&str]) -> Args {
        let mut argv = vec![
            "make-1415-queue".to_string(),
            step.to_string(),
            self.defaults_file.display().to_string(),
            "-q".to_string(),
            self.queue_path().display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).expect("parse args")
    }

    /// Create an empty output tile file under a step directory.
    pub fn touch_tile(&self, step: &str, name: &str) {
        let dir = self.region_dir.join(step);
        std::fs::create_dir_all(&dir).expect("step dir");
        std::fs::write(dir.join(name), b"").expect("tile file");
    }
}

/// Read the queue file as lines.
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("read queue")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Pull the `--xy0 <x> <y>` pair out of a queue line.
pub fn xy0(line: &str) -> (i64, i64) {
    let mut fields = line.split_whitespace().skip_while(|f| *f != "--xy0").skip(1);
    let x = fields.next().expect("x").parse().expect("int x");
    let y = fields.next().expect("y").parse().expect("int y");
    (x, y)
}
