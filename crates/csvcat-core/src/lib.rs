//! csvcat-core: Core library for concatenating same-named CSV files
//!
//! This library provides functionality to:
//! - Scan a directory tree for CSV files
//! - Group them by file name
//! - Parse and concatenate each group row-wise (column union)
//! - Write one `<name>_concat.csv` per group to an output directory
//! - Estimate batch job walltime from resource choices

pub mod config;
pub mod error;
pub mod merger;
pub mod parser;
pub mod resources;
pub mod scanner;
pub mod table;
pub mod writer;

pub use config::{ErrorPolicy, MergeConfig};
pub use error::{Error, ErrorKind, Result};
pub use merger::{
    concat_csvs, dir_ignores_case, merge_group, merge_tables, output_file_name, MergeEngine,
    MergePlan, MergeReport, MergedRow, MergedTable, NamingCollision, OutputArtifact,
    SkippedGroup,
};
pub use parser::{parse_csv, parse_csv_str};
pub use resources::JobResources;
pub use scanner::{
    check_root, group_by_name, scan_directory, scan_paths, FileEntry, NameGroup, ScanOptions,
    ScanResult,
};
pub use table::{CellValue, Column, Row, Table};
pub use writer::{to_csv_string, write_csv, WriteOptions};
