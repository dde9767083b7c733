//! Merge engine: concatenates every group of same-named CSV files into one output file

use crate::config::{ErrorPolicy, MergeConfig};
use crate::error::{Error, Result};
use crate::parser::parse_csv;
use crate::scanner::{check_root, scan_directory, NameGroup, ScanResult};
use crate::table::{CellValue, Column, Table};
use crate::writer::write_csv;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Row-wise union of every table in a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedTable {
    /// Base name of the group
    pub name: String,
    /// Union of all source columns, in first-seen order
    pub columns: Vec<Column>,
    /// Rows from every source, in load order
    pub rows: Vec<MergedRow>,
    /// Files that contributed to this table, in load order
    pub sources: Vec<PathBuf>,
}

/// A row in the merged table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRow {
    /// Index into [`MergedTable::sources`]
    pub source: usize,
    /// Position of the row within its source file
    pub source_index: usize,
    /// One cell per merged column; `Missing` where the source lacked the column
    pub cells: Vec<CellValue>,
}

impl MergedTable {
    /// Create an empty merged table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a cell by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.find_column(column)?;
        self.rows.get(row).and_then(|r| r.cells.get(col.index))
    }

    /// Source file of a row
    pub fn row_source(&self, row: usize) -> Option<&Path> {
        self.rows
            .get(row)
            .and_then(|r| self.sources.get(r.source))
            .map(PathBuf::as_path)
    }

    /// Append all rows of `table`, widening the column set as needed
    ///
    /// The table is consumed so its memory is released once folded in.
    pub fn append(&mut self, table: Table) {
        let source = self.sources.len();
        self.sources.push(table.source_path);

        let known: HashMap<&str, usize> = self
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.index))
            .collect();

        // Unified index for each of this table's columns
        let mut mapping = Vec::with_capacity(table.columns.len());
        let mut added = Vec::new();
        for col in &table.columns {
            match known.get(col.name.as_str()) {
                Some(&idx) => mapping.push(idx),
                None => {
                    let idx = self.columns.len() + added.len();
                    added.push(Column::new(col.name.clone(), idx));
                    mapping.push(idx);
                }
            }
        }
        drop(known);

        if !added.is_empty() {
            self.columns.extend(added);
            let width = self.columns.len();
            for row in &mut self.rows {
                row.cells.resize(width, CellValue::Missing);
            }
        }

        let width = self.columns.len();
        self.rows.reserve(table.rows.len());
        for (source_index, row) in table.rows.into_iter().enumerate() {
            let mut cells = vec![CellValue::Missing; width];
            for (value, &idx) in row.cells.into_iter().zip(&mapping) {
                cells[idx] = value;
            }
            self.rows.push(MergedRow {
                source,
                source_index,
                cells,
            });
        }
    }
}

/// Concatenate already-loaded tables in the given order
pub fn merge_tables(name: &str, tables: Vec<Table>) -> MergedTable {
    let mut merged = MergedTable::new(name);
    for table in tables {
        merged.append(table);
    }
    merged
}

/// Load every file of a group and concatenate them in path order
///
/// Any file that fails to load fails the whole group.
pub fn merge_group(group: &NameGroup) -> Result<MergedTable> {
    let mut merged = MergedTable::new(group.name.as_str());

    for path in group.paths() {
        debug!("Reading {}", path.display());
        let table = parse_csv(path)?;
        merged.append(table);
    }

    Ok(merged)
}

/// Derive the output file name for a base name
///
/// A trailing `extension` is replaced by `suffix` + `extension`
/// ("data.csv" -> "data_concat.csv"). Names without that trailing token are
/// returned unchanged.
pub fn output_file_name(base: &str, extension: &str, suffix: &str) -> String {
    match base.strip_suffix(extension) {
        Some(stem) if !extension.is_empty() => format!("{}{}{}", stem, suffix, extension),
        _ => base.to_string(),
    }
}

/// One group scheduled for merging
#[derive(Debug, Clone)]
pub struct MergeJob<'a> {
    pub group: &'a NameGroup,
    /// Output file name, relative to the output directory
    pub file_name: String,
    pub output: PathBuf,
}

/// Several groups that would write the same output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingCollision {
    /// Output name of the first colliding group
    pub file_name: String,
    /// Base names of the colliding groups, in processing order
    pub groups: Vec<String>,
}

/// Jobs for a scan, in processing order
#[derive(Debug, Clone)]
pub struct MergePlan<'a> {
    pub jobs: Vec<MergeJob<'a>>,
    pub collisions: Vec<NamingCollision>,
}

/// A written output file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Base name of the group
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub sources: Vec<PathBuf>,
}

/// A group left out under [`ErrorPolicy::SkipGroup`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub name: String,
    pub error: String,
}

/// Outcome of a merge run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeReport {
    pub files_scanned: usize,
    pub artifacts: Vec<OutputArtifact>,
    pub skipped: Vec<SkippedGroup>,
    pub collisions: Vec<NamingCollision>,
    /// Whether groups were processed on the rayon pool
    pub parallel: bool,
}

/// Drives scanning, merging and writing
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    config: MergeConfig,
}

impl MergeEngine {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Scan `infolder` and write one concatenated file per base name to `outfolder`
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        infolder: P,
        outfolder: Q,
    ) -> Result<MergeReport> {
        let infolder = infolder.as_ref();
        let outfolder = outfolder.as_ref();

        // Nothing is created on disk for an input that cannot be scanned
        check_root(infolder)?;
        self.prepare_output_dir(outfolder)?;

        info!(
            "Searching for all {} files below: {}",
            self.config.extension,
            infolder.display()
        );
        let scan = scan_directory(infolder, &self.config.scan_options(outfolder))?;
        info!("Found {} {} files", scan.total_files, self.config.extension);
        info!("Unique file names: {:?}", scan.group_names());

        // Names differing only in case share a file only where the output directory ignores case
        let folded = self.plan(&scan, outfolder, true);
        let plan = if folded.collisions.is_empty() || dir_ignores_case(outfolder)? {
            folded
        } else {
            debug!(
                "{} is case-sensitive; output names differing in case are distinct files",
                outfolder.display()
            );
            self.plan(&scan, outfolder, false)
        };

        for collision in &plan.collisions {
            warn!(
                "Groups {:?} all write to {}; the last one processed wins",
                collision.groups, collision.file_name
            );
        }

        // Colliding groups share an output path and must not be written concurrently
        let parallel = self.config.parallel && plan.collisions.is_empty();

        let mut report = MergeReport {
            files_scanned: scan.total_files,
            collisions: plan.collisions.clone(),
            parallel,
            ..MergeReport::default()
        };

        match (self.config.on_error, parallel) {
            (ErrorPolicy::Abort, false) => {
                for job in &plan.jobs {
                    report.artifacts.push(self.process(job)?);
                }
            }
            (ErrorPolicy::Abort, true) => {
                report.artifacts = plan
                    .jobs
                    .par_iter()
                    .map(|job| self.process(job))
                    .collect::<Result<Vec<_>>>()?;
            }
            (ErrorPolicy::SkipGroup, false) => {
                for job in &plan.jobs {
                    record_outcome(&mut report, job, self.process(job))?;
                }
            }
            (ErrorPolicy::SkipGroup, true) => {
                let outcomes: Vec<_> = plan
                    .jobs
                    .par_iter()
                    .map(|job| (job, self.process(job)))
                    .collect();
                for (job, outcome) in outcomes {
                    record_outcome(&mut report, job, outcome)?;
                }
            }
        }

        info!(
            "Wrote {} file(s) to {}",
            report.artifacts.len(),
            outfolder.display()
        );
        Ok(report)
    }

    /// Work out output paths for every group without touching the filesystem
    ///
    /// With `fold_case`, output names that differ only in letter case count as
    /// collisions, as they do on a case-insensitive output directory.
    pub fn plan<'a>(
        &self,
        scan: &'a ScanResult,
        outfolder: &Path,
        fold_case: bool,
    ) -> MergePlan<'a> {
        let jobs: Vec<MergeJob<'a>> = scan
            .groups
            .iter()
            .map(|group| {
                let file_name =
                    output_file_name(&group.name, &self.config.extension, &self.config.suffix);
                MergeJob {
                    output: outfolder.join(&file_name),
                    file_name,
                    group,
                }
            })
            .collect();

        let mut by_output: BTreeMap<String, NamingCollision> = BTreeMap::new();
        for job in &jobs {
            let key = if fold_case {
                job.file_name.to_lowercase()
            } else {
                job.file_name.clone()
            };
            by_output
                .entry(key)
                .or_insert_with(|| NamingCollision {
                    file_name: job.file_name.clone(),
                    groups: Vec::new(),
                })
                .groups
                .push(job.group.name.clone());
        }

        let collisions = by_output
            .into_values()
            .filter(|c| c.groups.len() > 1)
            .collect();

        MergePlan { jobs, collisions }
    }

    fn process(&self, job: &MergeJob) -> Result<OutputArtifact> {
        info!(
            "####### Processing {} ({} files)",
            job.group.name,
            job.group.entries.len()
        );

        let merged = merge_group(job.group)?;

        info!("Save merged to outfile: {}", job.output.display());
        let rows = write_csv(&merged, &job.output, &self.config.write_options())?;

        Ok(OutputArtifact {
            name: merged.name,
            path: job.output.clone(),
            rows,
            columns: merged.columns.len(),
            sources: merged.sources,
        })
    }

    fn prepare_output_dir(&self, outfolder: &Path) -> Result<()> {
        if outfolder.is_dir() {
            return Ok(());
        }
        if outfolder.exists() {
            return Err(Error::NotADirectory(outfolder.to_path_buf()));
        }
        if !self.config.create_output_dir {
            return Err(Error::OutputDirNotFound(outfolder.to_path_buf()));
        }

        debug!("Creating output directory {}", outfolder.display());
        fs::create_dir_all(outfolder).map_err(|e| Error::FileWrite {
            path: outfolder.to_path_buf(),
            source: e,
        })
    }
}

/// Check whether `dir` resolves file names case-insensitively
///
/// Writes and removes a small marker file in `dir`.
pub fn dir_ignores_case(dir: &Path) -> Result<bool> {
    let marker = dir.join(format!(".csvcat-case-check-{}", std::process::id()));
    fs::write(&marker, b"").map_err(|e| Error::FileWrite {
        path: marker.clone(),
        source: e,
    })?;

    let flipped = dir.join(format!(".CSVCAT-CASE-CHECK-{}", std::process::id()));
    let ignores_case = flipped.exists();

    if let Err(e) = fs::remove_file(&marker) {
        warn!("Could not remove {}: {}", marker.display(), e);
    }

    Ok(ignores_case)
}

/// Keep a group's result under [`ErrorPolicy::SkipGroup`]; output write failures still abort
fn record_outcome(
    report: &mut MergeReport,
    job: &MergeJob,
    outcome: Result<OutputArtifact>,
) -> Result<()> {
    match outcome {
        Ok(artifact) => report.artifacts.push(artifact),
        Err(e @ Error::FileWrite { .. }) => return Err(e),
        Err(e) => {
            warn!("Skipping {}: {}", job.group.name, e);
            report.skipped.push(SkippedGroup {
                name: job.group.name.clone(),
                error: e.to_string(),
            });
        }
    }
    Ok(())
}

/// Concatenate same-named CSV files below `infolder` into `outfolder` with default settings
pub fn concat_csvs<P: AsRef<Path>, Q: AsRef<Path>>(infolder: P, outfolder: Q) -> Result<()> {
    MergeEngine::default().run(infolder, outfolder).map(|_| ())
}
