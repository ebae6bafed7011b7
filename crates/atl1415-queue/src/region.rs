//! Region bounding-box files.
//!
//! A region file holds lines like `XR = [-1600000, -800000]` and
//! `YR = [200000, 900000]`. Other two-letter keys are accepted and ignored.

use crate::{QueueError, Result, TileCenter};
use std::collections::HashMap;
use std::path::Path;

/// Axis-aligned region used to restrict tile centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    /// Inclusive x range.
    pub x_range: [f64; 2],
    /// Exclusive y range.
    pub y_range: [f64; 2],
}

impl RegionBounds {
    /// Read a region file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| QueueError::file(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse region file contents; `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut ranges: HashMap<String, [f64; 2]> = HashMap::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || QueueError::MalformedRegion {
                path: path.to_path_buf(),
                line: idx + 1,
                text: line.to_string(),
            };
            let (key, range) = parse_range_line(line).ok_or_else(malformed)?;
            ranges.insert(key, range);
        }

        let get = |key: &'static str| {
            ranges
                .get(key)
                .copied()
                .ok_or_else(|| QueueError::IncompleteRegion {
                    path: path.to_path_buf(),
                    key,
                })
        };

        Ok(Self {
            x_range: get("XR")?,
            y_range: get("YR")?,
        })
    }

    /// Check whether a center lies inside the region.
    ///
    /// The x test includes both ends, the y test excludes them.
    pub fn contains(&self, center: TileCenter) -> bool {
        center.x >= self.x_range[0]
            && center.x <= self.x_range[1]
            && center.y > self.y_range[0]
            && center.y < self.y_range[1]
    }
}

/// Parse `KK = [min, max]`, where the key is the two characters before `=`.
fn parse_range_line(line: &str) -> Option<(String, [f64; 2])> {
    let (lhs, rhs) = line.split_once('=')?;
    let lhs = lhs.trim_end();
    let key_start = lhs.char_indices().rev().nth(1)?.0;
    let key = &lhs[key_start..];

    let inner = rhs.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (min, max) = inner.split_once(',')?;
    let min: f64 = min.trim().parse().ok()?;
    let max: f64 = max.trim().parse().ok()?;

    Some((key.to_string(), [min, max]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_file() {
        let text = "XR = [-1600000, -800000]\nYR=[ 2e5, 9e5 ]\n\n";
        let region = RegionBounds::parse(text, Path::new("AIS.txt")).expect("parse");

        assert_eq!(region.x_range, [-1_600_000.0, -800_000.0]);
        assert_eq!(region.y_range, [200_000.0, 900_000.0]);
    }

    #[test]
    fn test_missing_range_is_an_error() {
        let err = RegionBounds::parse("XR = [0, 1]\n", Path::new("r.txt")).unwrap_err();
        assert!(matches!(err, QueueError::IncompleteRegion { key: "YR", .. }));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = RegionBounds::parse("XR = [0, 1]\nYR = 0, 1\n", Path::new("r.txt")).unwrap_err();
        assert!(matches!(err, QueueError::MalformedRegion { line: 2, .. }));
    }

    #[test]
    fn test_contains_is_inclusive_in_x_only() {
        let region = RegionBounds {
            x_range: [0.0, 10.0],
            y_range: [0.0, 10.0],
        };

        assert!(region.contains(TileCenter::new(0.0, 5.0)));
        assert!(region.contains(TileCenter::new(10.0, 5.0)));
        assert!(!region.contains(TileCenter::new(5.0, 0.0)));
        assert!(!region.contains(TileCenter::new(5.0, 10.0)));
        assert!(!region.contains(TileCenter::new(-1.0, 5.0)));
    }
}
