use crate::cli::{Cli, OutputFormat};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Main configuration combining decoder limits and output settings.
///
/// Can be loaded from files, env vars, or CLI args with precedence order:
/// CLI > File > Environment > Defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bounds applied to every read the decoder performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Longest header or inline line accepted, terminator included.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Largest `*<N>` accepted.
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    /// Largest `$<M>` accepted.
    #[serde(default = "default_max_bulk_len")]
    pub max_bulk_len: usize,
}

fn default_max_line_len() -> usize {
    64 * 1024
}

fn default_max_args() -> usize {
    1024 * 1024
}

fn default_max_bulk_len() -> usize {
    512 * 1024 * 1024
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            max_args: default_max_args(),
            max_bulk_len: default_max_bulk_len(),
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_len == 0 {
            return Err(ConfigError::Validation("max_line_len must be positive".to_string()));
        }
        if self.max_args == 0 {
            return Err(ConfigError::Validation("max_args must be positive".to_string()));
        }
        if self.max_bulk_len == 0 {
            return Err(ConfigError::Validation("max_bulk_len must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub keep_going: bool,
    #[serde(default)]
    pub metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            keep_going: false,
            metrics: false,
        }
    }
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(len) = env_usize("DECODER_MAX_LINE_LEN")? {
            config.decoder.max_line_len = len;
        }
        if let Some(args) = env_usize("DECODER_MAX_ARGS")? {
            config.decoder.max_args = args;
        }
        if let Some(len) = env_usize("DECODER_MAX_BULK_LEN")? {
            config.decoder.max_bulk_len = len;
        }

        match std::env::var("DECODER_METRICS").as_deref() {
            Ok("1") | Ok("true") => config.output.metrics = true,
            Ok("0") | Ok("false") => config.output.metrics = false,
            _ => {}
        }

        Ok(config)
    }

    /// Create config with CLI args taking precedence over environment and file.
    ///
    /// Precedence: CLI > File > Environment > Defaults
    pub fn from_sources(cli: &Cli) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        let file_config = cli
            .config
            .as_ref()
            .map(Self::load_from_file)
            .transpose()?;
        let base = file_config.unwrap_or(env_config);

        let decoder = DecoderConfig {
            max_line_len: cli.max_line_len.unwrap_or(base.decoder.max_line_len),
            max_args: cli.max_args.unwrap_or(base.decoder.max_args),
            max_bulk_len: cli.max_bulk_len.unwrap_or(base.decoder.max_bulk_len),
        };

        let output = OutputConfig {
            format: cli.output.clone().unwrap_or(base.output.format),
            keep_going: cli.keep_going || base.output.keep_going,
            metrics: cli.metrics || base.output.metrics,
        };

        let config = Config { decoder, output };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decoder.validate()
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Validation(format!("{} must be a byte count, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}
