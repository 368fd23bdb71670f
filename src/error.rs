use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for texflat operations
#[derive(Error, Debug)]
pub enum FlattenError {
    /// IO error when reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An included file could not be found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The base path does not exist or is not a directory
    #[error("{path} is not a valid path.")]
    InvalidBasePath { path: PathBuf },

    /// The main input file does not exist under the base path
    #[error("Input file, {path}, does not exist.")]
    InputNotFound { path: PathBuf },

    /// Refusing to overwrite an existing output file
    #[error("Output file, {path}, is an existing file.")]
    OutputExists { path: PathBuf },

    /// A file includes itself, directly or through other files
    #[error("Cyclic include of {path}: {chain}")]
    CyclicInclude { path: PathBuf, chain: String },

    /// Include nesting went past the configured bound
    #[error("Include depth exceeds {max_depth} at {path}")]
    DepthExceeded { path: PathBuf, max_depth: usize },

    /// Regex compilation error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlattenError>;
