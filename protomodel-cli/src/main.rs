//! # protomodel
//!
//! Generate a proto3 service schema from a Rust view-model struct.
//!
//! ## Usage
//!
//! ```bash
//! # Generate from the current directory, detecting the *ViewModel root
//! protomodel generate
//!
//! # Pick the root and output directory explicitly
//! protomodel generate --model TodoListViewModel --output ./proto
//!
//! # Preview without writing
//! protomodel generate --dry-run
//!
//! # Write a commented protomodel.toml
//! protomodel init
//!
//! # Fail (exit code 2) when the checked-in schema is stale
//! protomodel validate --path ./proto/todo_list_view_model.proto
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use protomodel::Diagnostic;
use protomodel_cli::{
    config::{CliArgs, Config, ConfigManager, OutputFormat, CONFIG_FILENAME},
    error::{CliError, ParseError},
    generator::SchemaGenerator,
    scanner::{SourceFile, SourceScanner},
    writer::{FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "protomodel")]
#[command(
    author,
    version,
    about = "Generate proto3 service schemas from Rust view models",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schema of a view-model struct
    Generate {
        /// Input directory (or file) containing Rust sources
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Root struct name
        #[arg(short, long)]
        model: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter source files by relative path (glob)
        #[arg(long)]
        filter: Option<String>,

        /// Print the schema instead of writing it
        #[arg(long)]
        dry_run: bool,

        /// Fail when a type falls back to a default encoding
        #[arg(long)]
        deny_warnings: bool,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Initialize a new protomodel configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Check that a generated schema is up to date
    Validate {
        /// Path to the generated schema
        #[arg(short, long)]
        path: PathBuf,

        /// Input directory (or file) containing Rust sources
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Root struct name
        #[arg(short, long)]
        model: Option<String>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            input,
            model,
            output,
            config,
            filter,
            dry_run,
            deny_warnings,
            format,
        } => {
            let args = CliArgs {
                model,
                output,
                format,
                deny_warnings,
            };
            cmd_generate(&input, config.as_deref(), filter.as_deref(), &args, dry_run)
        }

        Commands::Init { output, force } => cmd_init(&output, force),

        Commands::Validate {
            path,
            input,
            model,
            config,
        } => {
            let args = CliArgs {
                model,
                ..Default::default()
            };
            cmd_validate(&path, &input, config.as_deref(), &args)
        }
    }
}

fn load_config(config_path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(config_path)?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

fn scan(input: &Path, filter: Option<&str>) -> Result<Vec<SourceFile>, CliError> {
    let mut scanner = SourceScanner::new(input);
    if let Some(pattern) = filter {
        scanner = scanner.with_filter(pattern)?;
    }
    scanner.scan()
}

/// Generate command implementation.
fn cmd_generate(
    input: &Path,
    config_path: Option<&Path>,
    filter: Option<&str>,
    args: &CliArgs,
    dry_run: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path, args)?;

    println!("{}", "Scanning for Rust source files...".cyan());
    let files = scan(input, filter)?;
    println!("  Found {} Rust file(s)", files.len().to_string().green());

    println!("{}", "Generating schema...".cyan());
    let generator = SchemaGenerator::new(config);
    let generation = generator.generate(&files).map_err(report_parse_errors)?;

    println!(
        "  {} → {} message(s), {} rpc(s)",
        generation.model_name.bold(),
        generation.message_count.to_string().green(),
        generation.rpc_count.to_string().green()
    );
    print_diagnostics(&generation.diagnostics);
    generator.check_diagnostics(&generation)?;

    let writer = FileWriter::new(dry_run);
    let result = writer.write(&generation.output_path, &generation.content)?;
    tracing::debug!(
        path = %result.path().display(),
        written = result.was_written(),
        "generate finished"
    );

    match result {
        WriteResult::Written { path, bytes } => {
            println!(
                "{} Written {} bytes to {}",
                "✓".green(),
                bytes,
                path.display()
            );
        }
        WriteResult::Unchanged { path } => {
            println!("{} {} is up to date", "✓".green(), path.display());
        }
        WriteResult::DryRun { path, content } => {
            println!(
                "{} Would write to {}:",
                "[dry-run]".yellow(),
                path.display()
            );
            println!("{}", "─".repeat(60).dimmed());
            print!("{}", content);
            println!("{}", "─".repeat(60).dimmed());
        }
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: &Path, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(format!(
            "Configuration file already exists: {}",
            output.display()
        )));
    }

    std::fs::write(output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );
    Ok(())
}

/// Validate command implementation.
fn cmd_validate(
    schema_path: &Path,
    input: &Path,
    config_path: Option<&Path>,
    args: &CliArgs,
) -> Result<(), CliError> {
    println!("{}", "Validating schema...".cyan());

    if !schema_path.exists() {
        return Err(CliError::Validation(format!(
            "Schema file not found: {}",
            schema_path.display()
        )));
    }
    let existing = std::fs::read_to_string(schema_path)?;

    let config = load_config(config_path, args)?;
    let files = scan(input, None)?;
    let generation = SchemaGenerator::new(config)
        .generate(&files)
        .map_err(report_parse_errors)?;

    if existing.trim() == generation.content.trim() {
        println!("{} Schema is up to date", "✓".green());
        Ok(())
    } else {
        println!("{} Schema is out of date", "✗".red());
        println!("  Run 'protomodel generate' to update");
        Err(CliError::Validation(format!(
            "{} is out of date",
            schema_path.display()
        )))
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!(
        "{} {} diagnostic(s):",
        "Warning:".yellow(),
        diagnostics.len()
    );
    for diagnostic in diagnostics {
        println!(
            "  {} [{}] {}",
            diagnostic.path.bold(),
            diagnostic.type_name,
            diagnostic.message
        );
    }
}

fn report_parse_errors(error: CliError) -> CliError {
    if let CliError::Parse(ref parse_error) = error {
        println!("{}", "Parse errors:".red());
        println!("  {}", format_parse_error(parse_error));
    }
    error
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

/// Format a parse error for display.
fn format_parse_error(error: &ParseError) -> String {
    match error {
        ParseError::Syntax {
            file,
            line,
            column,
            message,
        } => format!("{}:{}:{}: {}", file.display(), line, column, message),
        ParseError::Multiple(errors) => errors
            .iter()
            .map(format_parse_error)
            .collect::<Vec<_>>()
            .join("\n  "),
    }
}
