use std::process::ExitCode;
use tokio::io::{AsyncRead, BufReader};
use tracing::{debug, error, info};

use redis_request::cli::Cli;
use redis_request::config::Config;
use redis_request::error::{AppError, Result};
use redis_request::metrics::Metrics;
use redis_request::output::{write_requests, Summary};
use redis_request::telemetry::init_telemetry;
use redis_request::RequestDecoder;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(summary) => {
            info!(
                "Decoded {} requests, {} protocol errors",
                summary.requests, summary.protocol_errors
            );
            if summary.protocol_errors == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<Summary> {
    let config = Config::from_sources(cli)?;
    debug!("Effective configuration: {:?}", config);

    let telemetry = init_telemetry(config.output.metrics);

    let input: Box<dyn AsyncRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            info!("Decoding requests from {}", path.display());
            Box::new(tokio::fs::File::open(path).await?)
        }
        None => {
            info!("Decoding requests from stdin");
            Box::new(tokio::io::stdin())
        }
    };
    let mut source = BufReader::new(input);
    let mut stdout = tokio::io::stdout();

    let decoder = RequestDecoder::with_config(config.decoder);
    let result = write_requests(
        &decoder,
        &mut source,
        &mut stdout,
        &config.output,
        Metrics::get(),
    )
    .await;
    telemetry.shutdown()?;

    let mut summary = result?;
    match summary.transport_error.take() {
        Some(e) => Err(AppError::Decode(e)),
        None => Ok(summary),
    }
}
