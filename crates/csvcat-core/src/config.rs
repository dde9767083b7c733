//! Merge configuration, loadable from and savable to JSON

use crate::error::{Error, Result};
use crate::scanner::ScanOptions;
use crate::writer::WriteOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What to do when a group fails to load or merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the whole run at the first failure
    #[default]
    Abort,
    /// Record the failing group and continue with the next one
    SkipGroup,
}

/// Settings for a merge run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Extension of input files; also the token replaced when naming outputs
    pub extension: String,
    /// Inserted before the extension in output names
    pub suffix: String,
    /// Prepend each row's original index within its source file
    pub include_index: bool,
    /// Failure handling per group
    pub on_error: ErrorPolicy,
    /// Process groups on the rayon thread pool
    pub parallel: bool,
    /// Create the output directory if it does not exist
    pub create_output_dir: bool,
    /// Follow symbolic links during the scan
    pub follow_links: bool,
    /// Ignore earlier outputs sitting in the output directory
    pub skip_previous_outputs: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            extension: ".csv".to_string(),
            suffix: "_concat".to_string(),
            include_index: false,
            on_error: ErrorPolicy::Abort,
            parallel: false,
            create_output_dir: false,
            follow_links: false,
            skip_previous_outputs: true,
        }
    }
}

impl MergeConfig {
    /// Load a config file from JSON; absent fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).map_err(|e| Error::FileWrite {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// The output file name suffix, e.g. "_concat.csv"
    pub fn output_suffix(&self) -> String {
        format!("{}{}", self.suffix, self.extension)
    }

    /// Scanner options for an input tree whose outputs go to `outfolder`
    pub fn scan_options(&self, outfolder: &Path) -> ScanOptions {
        let (exclude_dir, exclude_suffix) = if self.skip_previous_outputs {
            (Some(outfolder.to_path_buf()), Some(self.output_suffix()))
        } else {
            (None, None)
        };

        ScanOptions {
            extension: self.extension.clone(),
            follow_links: self.follow_links,
            exclude_dir,
            exclude_suffix,
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            include_index: self.include_index,
        }
    }
}
