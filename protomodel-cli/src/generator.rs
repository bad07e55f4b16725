//! Schema generation from scanned sources.

use std::path::PathBuf;

use protomodel::{Diagnostic, SchemaEmitter};

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, CliResult, ParseError};
use crate::parser::RustParser;
use crate::scanner::SourceFile;

/// A rendered schema ready to be written.
#[derive(Debug)]
pub struct Generation {
    pub model_name: String,
    pub output_path: PathBuf,
    pub content: String,
    pub message_count: usize,
    pub rpc_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs parse, extraction and emission with one configuration.
#[derive(Debug)]
pub struct SchemaGenerator {
    config: Config,
}

impl SchemaGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate the schema of the configured (or detected) root type.
    ///
    /// Any file that fails to parse aborts generation; a partial index would
    /// silently drop the types declared in it.
    pub fn generate(&self, files: &[SourceFile]) -> CliResult<Generation> {
        let (index, mut errors) = RustParser::new().parse_files(files);
        match errors.len() {
            0 => {}
            1 => return Err(errors.remove(0).into()),
            _ => return Err(ParseError::Multiple(errors).into()),
        }

        let model_name = match self.config.model.name {
            Some(ref name) => name.clone(),
            None => {
                let name = index.detect_root()?;
                tracing::info!(model = %name, "detected root type");
                name
            }
        };

        let model = index.object_model(&model_name)?;
        let output = SchemaEmitter::new(self.config.emitter_config()).emit(&model, &index)?;

        let content = match self.config.output.format {
            OutputFormat::Proto => output.text(),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(&output)?;
                json.push('\n');
                json
            }
        };

        Ok(Generation {
            output_path: self.config.output_path(&model_name),
            model_name,
            content,
            message_count: output.schema.messages.len(),
            rpc_count: output.schema.service.rpcs.len(),
            diagnostics: output.diagnostics,
        })
    }

    /// Fail when diagnostics were reported and `deny_warnings` is set.
    pub fn check_diagnostics(&self, generation: &Generation) -> CliResult<()> {
        if self.config.diagnostics.deny_warnings && !generation.diagnostics.is_empty() {
            return Err(CliError::Validation(format!(
                "{} diagnostic(s) reported with deny_warnings set",
                generation.diagnostics.len()
            )));
        }
        Ok(())
    }
}
