use crate::error::{FlattenError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension every flattened input and output carries
pub const TEX_EXTENSION: &str = ".tex";

/// Reads the contents of a file at the given path
///
/// # Errors
///
/// - `FlattenError::FileNotFound` if the path doesn't exist or isn't a file.
/// - `FlattenError::Io` if there's an error reading the file.
pub fn read_file_contents(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(FlattenError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    fs::read_to_string(path).map_err(std::convert::Into::into)
}

/// Appends `.tex` unless the name already ends with it (any case)
pub fn ensure_tex_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(TEX_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{TEX_EXTENSION}")
    }
}

/// Builds the base-relative path of an included file.
///
/// A leading `macro_name` token in `target` is replaced by `dir_value`;
/// targets without the token get `dir_value` prepended unchanged.
pub fn resolve_include_path(dir_value: &str, target: &str, macro_name: &str) -> String {
    let stripped = if macro_name.is_empty() {
        target
    } else {
        target.strip_prefix(macro_name).unwrap_or(target)
    };
    format!("{dir_value}{stripped}")
}

/// Inputs that passed the command-line checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    /// Directory every include is resolved against
    pub base_dir: PathBuf,
    /// Main file name relative to `base_dir`, with `.tex` extension
    pub main_file: String,
    /// Output path (inside `base_dir` unless absolute), if writing to a file
    pub output: Option<PathBuf>,
}

/// Checks the base directory, main file and optional output file
///
/// # Errors
///
/// - `FlattenError::InvalidBasePath` if `base_dir` is not an existing directory.
/// - `FlattenError::InputNotFound` if the main file does not exist under `base_dir`.
/// - `FlattenError::OutputExists` if the output file is already present.
pub fn validate_inputs(
    base_dir: &Path,
    main_file: &str,
    output: Option<&str>,
) -> Result<ValidatedInputs> {
    if !base_dir.is_dir() {
        return Err(FlattenError::InvalidBasePath {
            path: base_dir.to_path_buf(),
        });
    }

    let main_file = ensure_tex_extension(main_file);
    if !base_dir.join(&main_file).is_file() {
        return Err(FlattenError::InputNotFound {
            path: PathBuf::from(main_file),
        });
    }

    let output = match output {
        Some(name) => {
            let path = base_dir.join(ensure_tex_extension(name));
            if path.exists() {
                return Err(FlattenError::OutputExists { path });
            }
            Some(path)
        }
        None => None,
    };

    Ok(ValidatedInputs {
        base_dir: base_dir.to_path_buf(),
        main_file,
        output,
    })
}
