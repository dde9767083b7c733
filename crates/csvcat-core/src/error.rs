//! Error types for csvcat-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in csvcat-core
#[derive(Debug, Error)]
pub enum Error {
    /// Input root does not exist
    #[error("input directory '{0}' does not exist")]
    RootNotFound(PathBuf),

    /// Input root exists but is not a directory
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    /// Output directory does not exist and creation was not requested
    #[error("output directory '{0}' does not exist")]
    OutputDirNotFound(PathBuf),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structural problem in a CSV file
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Job resource value outside its allowed range
    #[error("{name} must be between {min} and {max}, got {value}")]
    InvalidResource {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unreadable input, unwritable output
    FileSystem,
    /// A source file is not valid tabular data
    Parse,
    /// Bad configuration or parameter values
    Config,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RootNotFound(_)
            | Error::NotADirectory(_)
            | Error::OutputDirNotFound(_)
            | Error::Walk(_)
            | Error::FileRead { .. }
            | Error::FileWrite { .. }
            | Error::Io(_) => ErrorKind::FileSystem,
            // An IO failure surfaced through the csv reader is still a filesystem problem
            Error::Csv { source, .. } if matches!(source.kind(), csv::ErrorKind::Io(_)) => {
                ErrorKind::FileSystem
            }
            Error::Csv { .. } | Error::CsvParse { .. } => ErrorKind::Parse,
            Error::InvalidResource { .. } | Error::Json(_) => ErrorKind::Config,
        }
    }

    /// Whether this error came from reading a malformed source file
    pub fn is_parse_error(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::RootNotFound(PathBuf::from("/nope")).kind(),
            ErrorKind::FileSystem
        );
        assert_eq!(
            Error::CsvParse {
                path: PathBuf::from("a.csv"),
                message: "bad".to_string(),
            }
            .kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            Error::InvalidResource {
                name: "cpus_per_node",
                value: 0,
                min: 1,
                max: 10,
            }
            .kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_invalid_resource_message() {
        let err = Error::InvalidResource {
            name: "images_per_batch",
            value: 500,
            min: 1,
            max: 300,
        };
        assert_eq!(
            err.to_string(),
            "images_per_batch must be between 1 and 300, got 500"
        );
    }
}
