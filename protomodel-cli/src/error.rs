//! Error types for the CLI.
//!
//! Each pipeline stage has its own error enum; [`CliError`] wraps them all
//! and decides the process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to parse source file: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to generate schema: {0}")]
    Generate(#[from] protomodel::GenerateError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// The object model could not be extracted from the sources.
    #[error("Failed to build object model: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Validation failed (schema out of date, or warnings denied).
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            _ => 1,
        }
    }
}

/// Error during source file scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No Rust files found in: {path}")]
    NoRustFiles { path: PathBuf },

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error during Rust source parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error in {file}:{line}:{column}: {message}")]
    Syntax {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Multiple parse errors:\n{}", format_errors(.0))]
    Multiple(Vec<ParseError>),
}

/// Error while turning parsed sources into an object model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Root type '{name}' not found in the scanned sources")]
    RootNotFound { name: String },

    #[error("Root type '{name}' is not a struct with named fields")]
    NotAStruct { name: String },

    #[error("No root type given and none could be detected; pass --model or set [model] name")]
    NoRootDetected,

    #[error(
        "Several root candidates found ({}); pass --model or set [model] name",
        .candidates.join(", ")
    )]
    AmbiguousRoot { candidates: Vec<String> },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ParseError {
    /// Create a syntax error with location information.
    pub fn syntax(file: PathBuf, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            file,
            line,
            column,
            message: message.into(),
        }
    }
}

impl ScanError {
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    pub fn no_rust_files(path: PathBuf) -> Self {
        Self::NoRustFiles { path }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
