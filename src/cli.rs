use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "redis-request")]
#[command(about = "Decode Redis multibulk and inline requests from a byte stream")]
#[command(long_about = "Reads a captured client byte stream (file or stdin) and prints every request it contains, \
reporting protocol violations with the exact syntax that was expected")]
#[command(version)]
pub struct Cli {
    /// Captured byte stream to decode (stdin when omitted)
    pub input: Option<PathBuf>,

    /// Configuration file path (JSON format)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Longest header or inline line accepted, in bytes
    #[arg(long)]
    pub max_line_len: Option<usize>,

    /// Largest argument count accepted in a *<N> header
    #[arg(long)]
    pub max_args: Option<usize>,

    /// Largest argument payload accepted in a $<M> header, in bytes
    #[arg(long)]
    pub max_bulk_len: Option<usize>,

    /// How decoded requests are printed
    #[arg(short, long)]
    pub output: Option<OutputFormat>,

    /// Continue with the next line after a protocol error
    #[arg(short, long)]
    pub keep_going: bool,

    /// Record decode metrics through OpenTelemetry
    #[arg(long)]
    pub metrics: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per request
    #[default]
    Json,
    /// Command name followed by quoted arguments
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Log level selected by the verbosity flags.
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::TRACE
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
