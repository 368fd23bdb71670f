use crate::directive::{DEFAULT_DIR_MACRO, Directive, DirectiveParser};
use crate::error::{FlattenError, Result};
use crate::fs_utils::{read_file_contents, resolve_include_path};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Configuration for flattening
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Directory every file path is resolved against
    pub base_dir: PathBuf,
    /// Macro whose definition sets the include directory prefix
    pub dir_macro: String,
    /// Fail on a file that includes itself instead of recursing forever
    pub detect_cycles: bool,
    /// Maximum include nesting below the main file
    pub max_depth: Option<usize>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            dir_macro: DEFAULT_DIR_MACRO.to_string(),
            detect_cycles: true,
            max_depth: None,
        }
    }
}

/// One include directive met while walking the include graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeRecord {
    /// File containing the directive, relative to the base directory
    pub source: String,
    /// 1-based line number of the directive in `source`
    pub line: usize,
    /// Path exactly as written inside `\input{}`
    pub target: String,
    /// Target after directory macro substitution, relative to the base directory
    pub path: String,
    /// `path` joined onto the base directory
    pub resolved: PathBuf,
    /// Nesting depth of the included file (the main file is depth 0)
    pub depth: usize,
    /// Whether the included file exists
    pub exists: bool,
}

/// Receives the results of a walk over the include graph
trait Visitor {
    fn content(&mut self, line: &str) -> Result<()>;

    fn include(&mut self, _record: &IncludeRecord) -> Result<()> {
        Ok(())
    }

    fn missing(&mut self, record: &IncludeRecord) -> Result<()> {
        Err(FlattenError::FileNotFound {
            path: record.resolved.clone(),
        })
    }
}

/// Writes content lines straight into the output sink
struct SinkVisitor<'w, W: Write> {
    sink: &'w mut W,
}

impl<W: Write> Visitor for SinkVisitor<'_, W> {
    fn content(&mut self, line: &str) -> Result<()> {
        self.sink.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Collects include records, tolerating missing files
#[derive(Default)]
struct ScanVisitor {
    records: Vec<IncludeRecord>,
}

impl Visitor for ScanVisitor {
    fn content(&mut self, _line: &str) -> Result<()> {
        Ok(())
    }

    fn include(&mut self, record: &IncludeRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn missing(&mut self, _record: &IncludeRecord) -> Result<()> {
        Ok(())
    }
}

/// Depth-first walk state shared across the recursion
struct Walker<'c> {
    config: &'c FlattenConfig,
    parser: DirectiveParser,
    /// Canonical paths of the files currently being read, outermost first
    open: Vec<PathBuf>,
    /// Base-relative names matching `open`, for error messages
    chain: Vec<String>,
}

impl<'c> Walker<'c> {
    fn new(config: &'c FlattenConfig) -> Result<Self> {
        Ok(Self {
            config,
            parser: DirectiveParser::new(&config.dir_macro)?,
            open: Vec::new(),
            chain: Vec::new(),
        })
    }

    fn walk<V: Visitor>(
        &mut self,
        rel_path: &str,
        inherited_dir: &str,
        depth: usize,
        visitor: &mut V,
    ) -> Result<()> {
        if let Some(max_depth) = self.config.max_depth
            && depth > max_depth
        {
            return Err(FlattenError::DepthExceeded {
                path: PathBuf::from(rel_path),
                max_depth,
            });
        }

        let path = self.config.base_dir.join(rel_path);
        let contents = read_file_contents(&path)?;

        if self.config.detect_cycles {
            let canonical = fs::canonicalize(&path)?;
            if self.open.contains(&canonical) {
                let mut chain = self.chain.clone();
                chain.push(rel_path.to_string());
                return Err(FlattenError::CyclicInclude {
                    path: PathBuf::from(rel_path),
                    chain: chain.join(" -> "),
                });
            }
            self.open.push(canonical);
            self.chain.push(rel_path.to_string());
        }

        let result = self.walk_lines(rel_path, &contents, inherited_dir, depth, visitor);

        if self.config.detect_cycles {
            self.open.pop();
            self.chain.pop();
        }
        result
    }

    fn walk_lines<V: Visitor>(
        &mut self,
        rel_path: &str,
        contents: &str,
        inherited_dir: &str,
        depth: usize,
        visitor: &mut V,
    ) -> Result<()> {
        // Shadows the caller's value; never flows back up
        let mut dir_value = inherited_dir.to_string();

        for (index, line) in contents.split_inclusive('\n').enumerate() {
            match self.parser.classify(line) {
                Directive::Comment => {}
                Directive::DirDefinition { value } => {
                    dir_value = value.to_string();
                }
                Directive::Include { target } => {
                    let next = resolve_include_path(&dir_value, target, self.parser.macro_name());
                    let resolved = self.config.base_dir.join(&next);
                    let record = IncludeRecord {
                        source: rel_path.to_string(),
                        line: index + 1,
                        target: target.to_string(),
                        exists: resolved.is_file(),
                        path: next,
                        resolved,
                        depth: depth + 1,
                    };

                    visitor.include(&record)?;
                    if record.exists {
                        self.walk(&record.path, &dir_value, depth + 1, visitor)?;
                    } else {
                        visitor.missing(&record)?;
                    }
                }
                Directive::Content => visitor.content(line)?,
            }
        }

        Ok(())
    }
}

/// Flattens `filename` (relative to `config.base_dir`) into `sink`
///
/// # Errors
///
/// - `FlattenError::FileNotFound` if the main file or any included file is missing.
/// - `FlattenError::CyclicInclude` if a file includes itself and cycle detection is on.
/// - `FlattenError::DepthExceeded` if nesting passes `config.max_depth`.
/// - `FlattenError::Io` on read or write failures.
pub fn flatten<W: Write>(config: &FlattenConfig, filename: &str, sink: &mut W) -> Result<()> {
    let mut walker = Walker::new(config)?;
    let mut visitor = SinkVisitor { sink };
    walker.walk(filename, "", 0, &mut visitor)
}

/// Flattens `filename` into an in-memory string
///
/// # Errors
///
/// Same as [`flatten`].
pub fn flatten_to_string(config: &FlattenConfig, filename: &str) -> Result<String> {
    let mut buffer = Vec::new();
    flatten(config, filename, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| FlattenError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Walks the include graph of `filename` without producing output
///
/// Missing includes are reported with `exists == false` instead of failing.
///
/// # Errors
///
/// - `FlattenError::FileNotFound` if the main file is missing.
/// - `FlattenError::CyclicInclude` and `FlattenError::DepthExceeded` as for [`flatten`].
pub fn scan_includes(config: &FlattenConfig, filename: &str) -> Result<Vec<IncludeRecord>> {
    let mut walker = Walker::new(config)?;
    let mut visitor = ScanVisitor::default();
    walker.walk(filename, "", 0, &mut visitor)?;
    Ok(visitor.records)
}

/// Display form of a path relative to the base directory
pub fn display_relative(path: &Path, base_dir: &Path) -> String {
    path.strip_prefix(base_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}
