//! # texflat
//!
//! Flattens a LaTeX thesis into a single document by inlining every
//! `\input{...tex}` reachable from the main file, so that line-based tools
//! such as `latexdiff` can compare whole theses.
//!
//! ## Features
//!
//! - Recursive inlining of `\input{path.tex}` lines in document order
//! - A `\newcommand{\dir}{prefix}` directory macro substituted into later includes
//! - Whole-line `%` comments are dropped
//! - Paths resolved against an explicit base directory, never the process cwd
//! - Cycle detection and an optional include depth bound
//! - Include graph scanning for dry runs and listings
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```no_run
//! use texflat::{FlattenConfig, flatten_to_string};
//!
//! let config = FlattenConfig {
//!     base_dir: "thesis".into(),
//!     ..FlattenConfig::default()
//! };
//!
//! match flatten_to_string(&config, "ed_thesis.tex") {
//!     Ok(document) => print!("{document}"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Print the flattened thesis
//! texflat thesis/ ed_thesis
//!
//! # Write it to thesis/flat.tex
//! texflat thesis/ ed_thesis flat.tex
//! ```

pub mod directive;
pub mod error;
pub mod flatten;
pub mod fs_utils;

// Re-export main types and functions for convenience
pub use directive::{Directive, DirectiveParser};
pub use error::{FlattenError, Result};
pub use flatten::{
    FlattenConfig, IncludeRecord, display_relative, flatten, flatten_to_string, scan_includes,
};
pub use fs_utils::{ValidatedInputs, validate_inputs};
