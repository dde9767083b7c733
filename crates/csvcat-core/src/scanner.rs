//! Directory scanner for discovering CSV files and grouping them by file name

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered file: its path and base name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Full path to the file
    pub path: PathBuf,
    /// Final path component (e.g. "plate1.csv"), the grouping key
    pub name: String,
}

impl FileEntry {
    /// Build an entry from a path, or None if the path has no UTF-8 file name
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self { path, name })
    }
}

/// All discovered files sharing one base name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameGroup {
    /// Shared base name
    pub name: String,
    /// Member files, sorted by path
    pub entries: Vec<FileEntry>,
}

impl NameGroup {
    /// Paths of the member files, in merge order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }
}

/// Options controlling a directory scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// File name suffix to match (case-sensitive)
    pub extension: String,
    /// Follow symbolic links while walking; loops are reported as errors
    pub follow_links: bool,
    /// Skip files directly inside this directory whose name ends with `exclude_suffix`
    pub exclude_dir: Option<PathBuf>,
    /// Name suffix marking files in `exclude_dir` as earlier outputs
    pub exclude_suffix: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: ".csv".to_string(),
            follow_links: false,
            exclude_dir: None,
            exclude_suffix: None,
        }
    }
}

/// Result of scanning a directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directory that was scanned
    pub root: PathBuf,
    /// Every matching file in traversal order
    pub entries: Vec<FileEntry>,
    /// Files grouped by base name, sorted by name
    pub groups: Vec<NameGroup>,
    /// Total number of files found
    pub total_files: usize,
}

impl ScanResult {
    /// Find a group by base name
    pub fn find_group(&self, name: &str) -> Option<&NameGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Get all distinct base names
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }
}

/// List every `.csv` file below `root` with default options
pub fn scan_paths<P: AsRef<Path>>(root: P) -> Result<Vec<FileEntry>> {
    collect_entries(root.as_ref(), &ScanOptions::default())
}

/// Scan a directory for matching files and group them by base name
pub fn scan_directory<P: AsRef<Path>>(root: P, options: &ScanOptions) -> Result<ScanResult> {
    let root = root.as_ref();
    let entries = collect_entries(root, options)?;
    let groups = group_by_name(&entries);

    Ok(ScanResult {
        root: root.to_path_buf(),
        total_files: entries.len(),
        entries,
        groups,
    })
}

/// Group entries by base name; groups sorted by name, members by path
pub fn group_by_name(entries: &[FileEntry]) -> Vec<NameGroup> {
    let mut by_name: BTreeMap<&str, Vec<FileEntry>> = BTreeMap::new();

    for entry in entries {
        by_name
            .entry(entry.name.as_str())
            .or_default()
            .push(entry.clone());
    }

    by_name
        .into_iter()
        .map(|(name, mut entries)| {
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            NameGroup {
                name: name.to_string(),
                entries,
            }
        })
        .collect()
}

/// Fail unless `root` is an existing directory
pub fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(Error::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

fn collect_entries(root: &Path, options: &ScanOptions) -> Result<Vec<FileEntry>> {
    check_root(root)?;

    // Compare canonical forms so "out", "./out" and "in/../out" all match
    let exclude_dir = options
        .exclude_dir
        .as_ref()
        .and_then(|d| d.canonicalize().ok());

    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(options.follow_links) {
        let entry = entry?;
        let path = entry.path();

        // Symlinks to directories count as directories
        if path.is_dir() {
            continue;
        }

        let Some(file) = FileEntry::from_path(path.to_path_buf()) else {
            debug!("Skipping file with non UTF-8 name: {:?}", path);
            continue;
        };

        if !file.name.ends_with(&options.extension) {
            continue;
        }

        if is_previous_output(&file, exclude_dir.as_deref(), options) {
            debug!("Skipping earlier output: {}", file.path.display());
            continue;
        }

        entries.push(file);
    }

    Ok(entries)
}

fn is_previous_output(file: &FileEntry, exclude_dir: Option<&Path>, options: &ScanOptions) -> bool {
    let (Some(dir), Some(suffix)) = (exclude_dir, options.exclude_suffix.as_deref()) else {
        return false;
    };

    let in_dir = file
        .path
        .parent()
        .and_then(|p| p.canonicalize().ok())
        .is_some_and(|p| p == dir);

    in_dir && file.name.ends_with(suffix)
}
