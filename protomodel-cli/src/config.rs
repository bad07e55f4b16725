//! Configuration management for the CLI.
//!
//! Configuration is read from `protomodel.toml` and merged with
//! command-line arguments; CLI values win.

use crate::error::{CliResult, ConfigError};
use protomodel::EmitterConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "protomodel.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub proto: ProtoConfig,
    pub types: TypesConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Root type selection.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Name of the root struct; detected when absent.
    pub name: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,

    /// Output filename; derived from the model name when absent.
    pub file: Option<String>,

    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// proto3 source text.
    #[default]
    Proto,
    /// JSON description of the schema and its diagnostics.
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Proto => "proto",
            Self::Json => "json",
        }
    }
}

/// Settings passed through to the schema emitter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProtoConfig {
    pub package: Option<String>,
    pub message_suffix: String,
    pub service_name: Option<String>,
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// Namespaces never expanded into messages, on top of `std`, `core`
    /// and `alloc`.
    pub disallowed_namespaces: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Treat soft diagnostics as a failure.
    pub deny_warnings: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./generated"),
            file: None,
            format: OutputFormat::Proto,
        }
    }
}

impl Default for ProtoConfig {
    fn default() -> Self {
        Self {
            package: None,
            message_suffix: "State".to_string(),
            service_name: None,
            options: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Emitter settings derived from this configuration.
    pub fn emitter_config(&self) -> EmitterConfig {
        let mut config = EmitterConfig::default().with_message_suffix(&self.proto.message_suffix);
        config.package = self.proto.package.clone();
        config.service_name = self.proto.service_name.clone();
        config.options = self.proto.options.clone();
        for namespace in &self.types.disallowed_namespaces {
            config = config.with_disallowed_namespace(namespace.as_str());
        }
        config
    }

    /// Path of the output file for `model_name`.
    ///
    /// Without an explicit file name this is `{model_name}.{ext}` in
    /// snake_case.
    pub fn output_path(&self, model_name: &str) -> PathBuf {
        let file = self.output.file.clone().unwrap_or_else(|| {
            format!(
                "{}.{}",
                protomodel::naming::field_name(model_name),
                self.output.format.extension()
            )
        });
        self.output.dir.join(file)
    }

    fn validate(&self, path: &Path) -> CliResult<()> {
        if self.proto.message_suffix.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
            return Err(ConfigError::invalid_value(
                "proto.message_suffix",
                format!(
                    "'{}' in {} is not a valid identifier suffix",
                    self.proto.message_suffix,
                    path.display()
                ),
            )
            .into());
        }
        Ok(())
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without a path the default location is tried. A missing default file
    /// yields the default configuration; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let (config_path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILENAME), false),
        };

        if !config_path.exists() {
            if explicit {
                return Err(ConfigError::not_found(config_path).into());
            }
            tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path.clone(), e.to_string()))?;
        config.validate(&config_path)?;

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref model) = args.model {
            config.model.name = Some(model.clone());
        }

        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(format) = args.format {
            config.output.format = format;
        }

        if args.deny_warnings {
            config.diagnostics.deny_warnings = true;
        }

        config
    }

    /// Default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# protomodel configuration file

[model]
# Root struct of the object model. Detected from a single `*ViewModel`
# struct when left unset.
# name = "CounterViewModel"

[output]
# Output directory for the generated schema
dir = "./generated"

# Output file name; defaults to the snake_case model name
# file = "counter_view_model.proto"

# Output format: "proto" or "json"
format = "proto"

[proto]
# Proto package declaration
# package = "counter.v1"

# Suffix of the root and nested state messages
message_suffix = "State"

# Service name; defaults to "{Model}Service"
# service_name = "CounterService"

[proto.options]
# csharp_namespace = "Counter.Grpc"

[types]
# Namespaces never expanded into messages (std, core and alloc always are)
disallowed_namespaces = []

[diagnostics]
# Fail when a type falls back to a default encoding
deny_warnings = false
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub deny_warnings: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, None);
        assert_eq!(config.output.dir, PathBuf::from("./generated"));
        assert_eq!(config.output.format, OutputFormat::Proto);
        assert_eq!(config.proto.message_suffix, "State");
        assert!(!config.diagnostics.deny_warnings);
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[model]
name = "TodoViewModel"

[output]
dir = "./proto"
file = "todo.proto"
format = "json"

[proto]
package = "todo.v1"
message_suffix = "Dto"
service_name = "TodoService"

[proto.options]
csharp_namespace = "Todo.Grpc"

[types]
disallowed_namespaces = ["tokio"]

[diagnostics]
deny_warnings = true
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.model.name.as_deref(), Some("TodoViewModel"));
        assert_eq!(config.output.file.as_deref(), Some("todo.proto"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.proto.package.as_deref(), Some("todo.v1"));
        assert_eq!(config.proto.options["csharp_namespace"], "Todo.Grpc");
        assert_eq!(config.types.disallowed_namespaces, vec!["tokio"]);
        assert!(config.diagnostics.deny_warnings);
    }

    #[test]
    fn test_merge_cli_args_overrides() {
        let args = CliArgs {
            model: Some("Other".to_string()),
            output: Some(PathBuf::from("./custom")),
            format: Some(OutputFormat::Json),
            deny_warnings: true,
        };

        let merged = ConfigManager::merge_cli_args(Config::default(), &args);
        assert_eq!(merged.model.name.as_deref(), Some("Other"));
        assert_eq!(merged.output.dir, PathBuf::from("./custom"));
        assert_eq!(merged.output.format, OutputFormat::Json);
        assert!(merged.diagnostics.deny_warnings);
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let mut config = Config::default();
        config.diagnostics.deny_warnings = true;

        let merged = ConfigManager::merge_cli_args(config.clone(), &CliArgs::default());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_output_path() {
        let mut config = Config::default();
        assert_eq!(
            config.output_path("CounterViewModel"),
            PathBuf::from("./generated/counter_view_model.proto")
        );

        config.output.format = OutputFormat::Json;
        assert_eq!(
            config.output_path("CounterViewModel"),
            PathBuf::from("./generated/counter_view_model.json")
        );

        config.output.file = Some("api.json".to_string());
        assert_eq!(config.output_path("X"), PathBuf::from("./generated/api.json"));
    }

    #[test]
    fn test_emitter_config() {
        let mut config = Config::default();
        config.proto.package = Some("demo".to_string());
        config.types.disallowed_namespaces = vec!["tokio".to_string()];

        let emitter = config.emitter_config();
        assert_eq!(emitter.package.as_deref(), Some("demo"));
        assert_eq!(emitter.message_suffix, "State");
        assert!(emitter.disallowed_namespaces.contains(&"tokio".to_string()));
        assert!(emitter.disallowed_namespaces.contains(&"std".to_string()));
    }

    #[test]
    fn test_invalid_suffix_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[proto]\nmessage_suffix = \"Bad Suffix\"\n").unwrap();

        let err = ConfigManager::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("proto.message_suffix"));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let result = ConfigManager::load(Some(Path::new("/nonexistent/protomodel.toml")));
        assert!(result.is_err());
    }
}
