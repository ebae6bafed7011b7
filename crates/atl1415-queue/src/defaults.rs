//! `key=value` defaults files.
//!
//! Defaults files hold the command-line arguments shared by every job of a
//! run (`--region=AIS`, `-W=40000`, ...). Several files can be merged; a later
//! file overrides the value of a key set by an earlier one, but the key keeps
//! its original position so the merged file reads in a stable order.

use crate::{QueueError, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Keys that must be present before any job can be queued.
pub const REQUIRED_KEYS: [&str; 5] = [
    "--ATL14_root",
    "--region",
    "--Release",
    "--Hemisphere",
    "--mask_file",
];

/// Insertion-ordered map of defaults keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    entries: Vec<(String, String)>,
}

impl Defaults {
    /// Create an empty set of defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and merge defaults files in order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut defaults = Self::new();
        for path in paths {
            let path = path.as_ref();
            let text =
                std::fs::read_to_string(path).map_err(|e| QueueError::file(path, e))?;
            let before = defaults.len();
            defaults.merge_str(&text);
            tracing::debug!(
                "Read {} ({} new keys, {} total)",
                path.display(),
                defaults.len() - before,
                defaults.len()
            );
        }
        Ok(defaults)
    }

    /// Merge `key=value` lines into this map.
    ///
    /// Each line is split at its first `=`; surrounding whitespace is trimmed
    /// from key and value. Lines without `=` or with an empty key are ignored.
    pub fn merge_str(&mut self, text: &str) {
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            self.insert(key, value.trim());
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value, keeping the key's position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Required keys that are not present, in [`REQUIRED_KEYS`] order.
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_KEYS
            .iter()
            .filter(|key| !self.contains_key(key))
            .map(|key| key.to_string())
            .collect()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `key=value` lines.
    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            let _ = writeln!(out, "{key}={value}");
        }
        out
    }

    /// Write as a defaults file.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_file_string()).map_err(|e| QueueError::file(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_splits_at_first_equals() {
        let mut defaults = Defaults::new();
        defaults.merge_str("--region=AIS\n -W = 40000 \nno equals here\n=orphan\n--expr=a=b\n");

        assert_eq!(defaults.get("--region"), Some("AIS"));
        assert_eq!(defaults.get("-W"), Some("40000"));
        assert_eq!(defaults.get("--expr"), Some("a=b"));
        assert_eq!(defaults.len(), 3);
    }

    #[test]
    fn test_later_values_override_in_place() {
        let mut defaults = Defaults::new();
        defaults.merge_str("--region=AIS\n--Release=001\n");
        defaults.merge_str("--region=GL\n--Hemisphere=1\n");

        let keys: Vec<_> = defaults.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["--region", "--Release", "--Hemisphere"]);
        assert_eq!(defaults.get("--region"), Some("GL"));
    }

    #[test]
    fn test_missing_required_lists_all_absent_keys() {
        let mut defaults = Defaults::new();
        defaults.merge_str("--region=AIS\n--mask_file=mask.tif\n");

        assert_eq!(
            defaults.missing_required(),
            vec!["--ATL14_root", "--Release", "--Hemisphere"]
        );
    }

    #[test]
    fn test_remove_and_render() {
        let mut defaults = Defaults::new();
        defaults.merge_str("--mask_dir=/masks\n--region=AIS\n");

        assert_eq!(defaults.remove("--mask_dir").as_deref(), Some("/masks"));
        assert_eq!(defaults.remove("--mask_dir"), None);
        assert_eq!(defaults.to_file_string(), "--region=AIS\n");
    }
}
