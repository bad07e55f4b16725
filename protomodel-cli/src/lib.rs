//! # protomodel-cli
//!
//! Extracts an object model from Rust sources and generates its proto3
//! service schema with [`protomodel`].
//!
//! ## Architecture
//!
//! - [`config`] - `protomodel.toml` loading and CLI overrides
//! - [`scanner`] - source file discovery and filtering
//! - [`parser`] - `syn` parsing into a [`TypeIndex`]
//! - [`type_parser`] - `syn::Type` to type descriptor conversion
//! - [`index`] - member lookup and root model extraction
//! - [`generator`] - schema emission and output formats
//! - [`writer`] - file output and dry-run support
//! - [`error`] - error types and exit codes

pub mod config;
pub mod error;
pub mod generator;
pub mod index;
pub mod parser;
pub mod scanner;
pub mod type_parser;
pub mod writer;

pub use config::{Config, ConfigManager, OutputFormat};
pub use error::{CliError, CliResult};
pub use generator::{Generation, SchemaGenerator};
pub use index::TypeIndex;
pub use parser::RustParser;
pub use scanner::{SourceFile, SourceScanner};
pub use type_parser::TypeParser;
pub use writer::{FileWriter, WriteResult};
