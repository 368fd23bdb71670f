use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use texflat::directive::DEFAULT_DIR_MACRO;
use texflat::{
    FlattenConfig, FlattenError, IncludeRecord, Result, ValidatedInputs, display_relative,
    flatten, scan_includes, validate_inputs,
};

const LONG_HELP: &str = r#"
Recognized lines:
  % ...                        - Comment, dropped
  \newcommand{\dir}{chapters/} - Sets the prefix for later \dir includes
  \input{\dirintro.tex}        - Replaced by chapters/intro.tex, flattened
  anything else                - Copied through unchanged

Examples:
  # Print the flattened thesis
  texflat thesis/ ed_thesis
  # Write it to thesis/flat.tex (refuses to overwrite)
  texflat thesis/ ed_thesis.tex flat
  # Check that every included file exists
  texflat thesis/ ed_thesis --dry-run
  # Show the include tree
  texflat thesis/ ed_thesis --list=tree
  # Include graph as JSON for scripting
  texflat thesis/ ed_thesis --list=json

Works well as a preprocessing step before latexdiff.
"#;

/// Flatten a LaTeX thesis into a single file.
///
/// Every `\input{...tex}` reachable from the main file is inlined in place so
/// that tools like latexdiff can work on one document.
#[derive(Parser, Debug)]
#[command(
    name = "texflat",
    version,
    about = "Flatten a LaTeX thesis into a single file.",
    after_long_help = LONG_HELP,
    arg_required_else_help = true
)]
struct Cli {
    /// Path to the directory holding the main thesis file
    #[arg(value_name = "BASE_PATH")]
    base_path: PathBuf,

    /// Name of the main thesis file, usually ed_thesis.tex
    #[arg(value_name = "MAIN_FILE")]
    main_file: String,

    /// Output file created inside BASE_PATH (defaults to stdout)
    #[arg(value_name = "OUTPUT_FILE")]
    output: Option<String>,

    /// Macro whose definition sets the include directory
    #[arg(long, value_name = "NAME", env = "TEXFLAT_DIR_MACRO", default_value = DEFAULT_DIR_MACRO)]
    dir_macro: String,

    /// Fail when includes nest deeper than this
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Don't check for files that include themselves
    #[arg(long)]
    allow_cycles: bool,

    /// Check that every included file exists without writing output
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,

    /// List included files (optionally with format: plain, tree, json)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "plain", conflicts_with = "dry_run")]
    list: Option<ListFormat>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum ListFormat {
    /// One resolved path per line
    Plain,
    /// Paths indented by include depth
    Tree,
    /// JSON output for scripting
    Json,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help always counts as a failed run
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                e.print().ok();
                std::process::exit(1);
            }
            _ => e.exit(),
        },
    };

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => LogLevel::Error,
        (false, 0) => LogLevel::Warn,
        (false, 1) => LogLevel::Info,
        (false, 2) => LogLevel::Debug,
        (false, _) => LogLevel::Trace,
    };

    let inputs = match validate_inputs(&cli.base_path, &cli.main_file, cli.output.as_deref()) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let config = FlattenConfig {
        base_dir: inputs.base_dir.clone(),
        dir_macro: cli.dir_macro.clone(),
        detect_cycles: !cli.allow_cycles,
        max_depth: cli.max_depth,
    };
    log(
        log_level,
        LogLevel::Debug,
        &format!(
            "Base directory {}, directory macro {}",
            config.base_dir.display(),
            config.dir_macro
        ),
    );

    let result = if cli.dry_run {
        dry_run(&config, &inputs.main_file, log_level)
    } else if let Some(list_format) = cli.list {
        list_includes(&config, &inputs.main_file, list_format, log_level)
    } else {
        write_flattened(&config, &inputs, log_level)
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn write_flattened(
    config: &FlattenConfig,
    inputs: &ValidatedInputs,
    log_level: LogLevel,
) -> Result<()> {
    log(
        log_level,
        LogLevel::Info,
        &format!("Flattening {}", inputs.main_file),
    );

    // Nothing reaches stdout or disk unless the whole traversal succeeds
    let mut buffer = Vec::new();
    flatten(config, &inputs.main_file, &mut buffer)?;
    log(
        log_level,
        LogLevel::Debug,
        &format!("Flattened document is {} bytes", buffer.len()),
    );

    if let Some(output_path) = &inputs.output {
        log(
            log_level,
            LogLevel::Info,
            &format!("Writing output to {}", output_path.display()),
        );
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(output_path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => FlattenError::OutputExists {
                    path: output_path.clone(),
                },
                _ => FlattenError::Io(e),
            })?;
        file.write_all(&buffer)?;
        file.flush()?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&buffer)?;
        stdout.flush()?;
    }

    log(log_level, LogLevel::Info, "Flattening complete!");
    Ok(())
}

fn dry_run(config: &FlattenConfig, main_file: &str, log_level: LogLevel) -> Result<()> {
    log(
        log_level,
        LogLevel::Info,
        "Performing dry run - validating includes...",
    );

    let records = scan_includes(config, main_file)?;

    let mut valid_count = 0;
    let mut invalid_count = 0;

    for record in &records {
        let location = format!("{}:{}", record.source, record.line);
        if record.exists {
            log(
                log_level,
                LogLevel::Info,
                &format!("✓ {location} {} -> {}", record.target, record.path),
            );
            valid_count += 1;
        } else {
            log(
                log_level,
                LogLevel::Warn,
                &format!(
                    "✗ {location} {} -> {} (not found)",
                    record.target, record.path
                ),
            );
            invalid_count += 1;
        }
    }

    println!("\nSummary: {} includes found", records.len());
    if valid_count > 0 {
        println!("  ✓ {valid_count} valid");
    }
    if invalid_count > 0 {
        println!("  ✗ {invalid_count} missing");
        std::process::exit(1);
    }

    Ok(())
}

fn list_includes(
    config: &FlattenConfig,
    main_file: &str,
    format: ListFormat,
    log_level: LogLevel,
) -> Result<()> {
    log(log_level, LogLevel::Debug, "Listing included files...");

    let records = scan_includes(config, main_file)?;

    match format {
        ListFormat::Plain => {
            for record in &records {
                println!("{}", record.path);
            }
        }
        ListFormat::Tree => {
            println!("{main_file}");
            for record in &records {
                println!("{}", tree_line(record, &config.base_dir));
            }
        }
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&records)?;
            println!("{json}");
        }
    }

    Ok(())
}

fn tree_line(record: &IncludeRecord, base_dir: &std::path::Path) -> String {
    let indent = "  ".repeat(record.depth);
    let name = display_relative(&record.resolved, base_dir);
    if record.exists {
        format!("{indent}{name}")
    } else {
        format!("{indent}{name} (missing)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

fn log(current_level: LogLevel, message_level: LogLevel, message: &str) {
    if message_level >= current_level {
        eprintln!(
            "[{}] {}",
            match message_level {
                LogLevel::Trace => "TRACE",
                LogLevel::Debug => "DEBUG",
                LogLevel::Info => "INFO",
                LogLevel::Warn => "WARN",
                LogLevel::Error => "ERROR",
            },
            message
        );
    }
}
